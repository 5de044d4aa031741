use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Closed numeric interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f32,
    pub max: f32,
}

impl Range {
    #[must_use]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn midpoint(&self) -> f32 {
        (self.min + self.max) * 0.5
    }

    #[must_use]
    pub fn width(&self) -> f32 {
        self.max - self.min
    }

    /// Inclusive on both bounds.
    #[must_use]
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Distance from `value` to the nearest bound, 0 when inside.
    #[must_use]
    pub fn distance_outside(&self, value: f32) -> f32 {
        if value < self.min {
            self.min - value
        } else if value > self.max {
            value - self.max
        } else {
            0.0
        }
    }

    #[must_use]
    pub fn lerp(&self, t: f32) -> f32 {
        self.min + (self.max - self.min) * t
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

/// Overall plant architecture of a cultivar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Morphology {
    /// Short, dense, cold-hardy.
    Compact,
    #[default]
    Balanced,
    /// Stretchy, airy, heat-hardy.
    Tall,
}

/// Optimal environmental window for a strain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimalRanges {
    /// Degrees Celsius.
    pub temperature: Range,
    /// Relative humidity, percent.
    pub humidity: Range,
    /// PPFD, µmol/m²/s.
    pub light: Range,
    /// Parts per million.
    pub co2: Range,
}

impl Default for OptimalRanges {
    fn default() -> Self {
        Self {
            temperature: Range::new(20.0, 28.0),
            humidity: Range::new(40.0, 60.0),
            light: Range::new(400.0, 900.0),
            co2: Range::new(400.0, 1200.0),
        }
    }
}

/// How strongly a single environmental factor harms or heals a plant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StressResponse {
    /// Multiplier on health damage caused by this factor's stress.
    pub sensitivity: f32,
    /// Multiplier on health recovery while this factor is unstressed.
    pub recovery: f32,
}

impl Default for StressResponse {
    fn default() -> Self {
        Self {
            sensitivity: 1.0,
            recovery: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StressResponses {
    pub temperature: StressResponse,
    pub humidity: StressResponse,
    pub light: StressResponse,
    pub co2: StressResponse,
}

/// Base density multipliers copied into every instance of a strain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraitMultipliers {
    pub branch_density: f32,
    pub leaf_density: f32,
    pub bud_density: f32,
    pub trichrome_amount: f32,
}

impl Default for TraitMultipliers {
    fn default() -> Self {
        Self {
            branch_density: 1.0,
            leaf_density: 1.0,
            bud_density: 1.0,
            trichrome_amount: 1.0,
        }
    }
}

/// Uniform multiplier ranges used when deriving per-instance genetics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariationRanges {
    pub size: Range,
    pub color: Range,
    pub morphology: Range,
}

impl Default for VariationRanges {
    fn default() -> Self {
        Self {
            size: Range::new(0.8, 1.2),
            color: Range::new(0.9, 1.1),
            morphology: Range::new(0.85, 1.15),
        }
    }
}

/// Static biological parameters of a cultivar.
///
/// Loaded once and shared read-only by every plant of the strain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrainProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub morphology: Morphology,
    /// Mature height, centimetres.
    pub height: Range,
    /// Mature canopy width, centimetres.
    pub width: Range,
    /// Flowering time, days.
    pub flowering_days: Range,
    /// Dry yield per plant, grams.
    pub yield_grams: Range,
    #[serde(default)]
    pub optimal: OptimalRanges,
    #[serde(default)]
    pub stress_response: StressResponses,
    #[serde(default)]
    pub traits: TraitMultipliers,
    #[serde(default)]
    pub variation: VariationRanges,
    /// Linear RGB base foliage color.
    #[serde(default = "default_base_color")]
    pub base_color: [f32; 3],
    /// Additional named traits, e.g. `terpene_intensity`.
    #[serde(default)]
    pub extra_traits: BTreeMap<String, f32>,
}

fn default_base_color() -> [f32; 3] {
    [0.22, 0.55, 0.18]
}

impl StrainProfile {
    /// A balanced strain with default optimal ranges, handy as a template.
    #[must_use]
    pub fn with_id(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            morphology: Morphology::Balanced,
            height: Range::new(80.0, 120.0),
            width: Range::new(50.0, 70.0),
            flowering_days: Range::new(56.0, 70.0),
            yield_grams: Range::new(300.0, 500.0),
            optimal: OptimalRanges::default(),
            stress_response: StressResponses::default(),
            traits: TraitMultipliers::default(),
            variation: VariationRanges::default(),
            base_color: default_base_color(),
            extra_traits: BTreeMap::new(),
        }
    }
}
