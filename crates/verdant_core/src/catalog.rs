//! Strain catalog: the shared, read-only cultivar registry.
//!
//! ## Example `strains.toml`
//!
//! ```toml
//! [[strain]]
//! id = "northern_lights"
//! name = "Northern Lights"
//! morphology = "Compact"
//! height = { min = 90.0, max = 120.0 }
//! width = { min = 60.0, max = 80.0 }
//! flowering_days = { min = 49.0, max = 56.0 }
//! yield_grams = { min = 350.0, max = 450.0 }
//! ```

use crate::error::{Result, SimError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use verdant_data::{Morphology, Range, StrainProfile};

#[derive(Serialize, Deserialize, Debug, Default)]
struct CatalogFile {
    #[serde(default, rename = "strain")]
    strains: Vec<StrainProfile>,
}

/// Strains keyed by id. Profiles are immutable once inserted.
#[derive(Debug, Clone, Default)]
pub struct StrainCatalog {
    strains: BTreeMap<String, Arc<StrainProfile>>,
}

impl StrainCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Three reference cultivars covering every morphology.
    #[must_use]
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for strain in builtin_strains() {
            catalog.strains.insert(strain.id.clone(), Arc::new(strain));
        }
        catalog
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content)
            .map_err(|e| SimError::config(format!("strain catalog: {e}")))?;
        Self::from_profiles(file.strains)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let strains: Vec<StrainProfile> = serde_json::from_str(content)
            .map_err(|e| SimError::config(format!("strain catalog: {e}")))?;
        Self::from_profiles(strains)
    }

    /// Reads a TOML catalog from disk.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SimError::config(e.to_string()).with_context(path.to_string()))?;
        Self::from_toml(&content).map_err(|e| e.with_context(path.to_string()))
    }

    fn from_profiles(strains: Vec<StrainProfile>) -> Result<Self> {
        let mut catalog = Self::new();
        for strain in strains {
            if catalog.strains.contains_key(&strain.id) {
                return Err(SimError::config(format!("duplicate strain id '{}'", strain.id)));
            }
            catalog.insert(strain)?;
        }
        Ok(catalog)
    }

    /// Adds or replaces a strain. Plants already referencing the old profile
    /// keep their `Arc` until the next lookup.
    pub fn insert(&mut self, strain: StrainProfile) -> Result<Arc<StrainProfile>> {
        validate_strain(&strain)?;
        let strain = Arc::new(strain);
        self.strains.insert(strain.id.clone(), Arc::clone(&strain));
        Ok(strain)
    }

    pub fn remove(&mut self, id: &str) -> Option<Arc<StrainProfile>> {
        self.strains.remove(id)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<StrainProfile>> {
        self.strains.get(id).cloned()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.strains.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.strains.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.strains.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strains.is_empty()
    }
}

fn validate_strain(strain: &StrainProfile) -> Result<()> {
    if strain.id.trim().is_empty() {
        return Err(SimError::config("strain id must not be empty"));
    }
    let ranges: [(&str, &Range); 11] = [
        ("height", &strain.height),
        ("width", &strain.width),
        ("flowering_days", &strain.flowering_days),
        ("yield_grams", &strain.yield_grams),
        ("optimal.temperature", &strain.optimal.temperature),
        ("optimal.humidity", &strain.optimal.humidity),
        ("optimal.light", &strain.optimal.light),
        ("optimal.co2", &strain.optimal.co2),
        ("variation.size", &strain.variation.size),
        ("variation.color", &strain.variation.color),
        ("variation.morphology", &strain.variation.morphology),
    ];
    for (name, range) in ranges {
        if !range.is_valid() {
            return Err(SimError::config(format!(
                "strain '{}': {name} range [{}, {}] is invalid",
                strain.id, range.min, range.max
            )));
        }
    }
    if strain.variation.size.min < 0.0 || strain.variation.morphology.min < 0.0 {
        return Err(SimError::config(format!(
            "strain '{}': variation multipliers must be non-negative",
            strain.id
        )));
    }
    Ok(())
}

fn builtin_strains() -> Vec<StrainProfile> {
    let mut compact = StrainProfile::with_id("northern_lights");
    compact.name = "Northern Lights".to_string();
    compact.morphology = Morphology::Compact;
    compact.height = Range::new(90.0, 120.0);
    compact.width = Range::new(60.0, 80.0);
    compact.flowering_days = Range::new(49.0, 56.0);
    compact.yield_grams = Range::new(350.0, 450.0);
    compact.optimal.temperature = Range::new(18.0, 26.0);
    compact.traits.leaf_density = 1.2;
    compact.traits.bud_density = 1.1;
    compact.base_color = [0.16, 0.42, 0.20];
    compact.extra_traits.insert("terpene_intensity".to_string(), 0.8);

    let mut balanced = StrainProfile::with_id("blue_dream");
    balanced.name = "Blue Dream".to_string();
    balanced.height = Range::new(120.0, 180.0);
    balanced.width = Range::new(70.0, 100.0);
    balanced.flowering_days = Range::new(63.0, 70.0);
    balanced.yield_grams = Range::new(450.0, 600.0);
    balanced.base_color = [0.24, 0.52, 0.30];
    balanced.extra_traits.insert("terpene_intensity".to_string(), 1.1);

    let mut tall = StrainProfile::with_id("durban_poison");
    tall.name = "Durban Poison".to_string();
    tall.morphology = Morphology::Tall;
    tall.height = Range::new(150.0, 240.0);
    tall.width = Range::new(60.0, 90.0);
    tall.flowering_days = Range::new(56.0, 65.0);
    tall.yield_grams = Range::new(400.0, 550.0);
    tall.optimal.temperature = Range::new(22.0, 30.0);
    tall.optimal.humidity = Range::new(35.0, 55.0);
    tall.traits.branch_density = 0.8;
    tall.traits.leaf_density = 0.85;
    tall.traits.trichrome_amount = 1.2;
    tall.variation.size = Range::new(0.85, 1.25);
    tall.base_color = [0.30, 0.60, 0.18];
    tall.extra_traits.insert("terpene_intensity".to_string(), 1.3);

    vec![compact, balanced, tall]
}
