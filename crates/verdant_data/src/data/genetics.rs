use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Resolved, per-instance numeric trait set.
///
/// Created once when a plant is registered. The only later change is an
/// explicit epigenetic adaptation, which produces a replacement profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneticProfile {
    /// Strain the profile was derived from.
    pub strain_id: String,
    /// Target mature height, centimetres.
    pub size: f32,
    pub branch_density: f32,
    pub leaf_density: f32,
    pub bud_density: f32,
    pub growth_rate: f32,
    pub flowering_speed: f32,
    pub yield_potential: f32,
    pub heat_tolerance: f32,
    pub cold_tolerance: f32,
    pub drought_tolerance: f32,
    pub trichrome_amount: f32,
    /// Offset from 1.0 applied to the strain's base color.
    pub color_variation: f32,
    /// Named strain-specific traits.
    pub traits: BTreeMap<String, f32>,
    /// 0 for plants derived directly from a strain, parents' max + 1 otherwise.
    pub generation: u32,
    /// Simulation time of creation, seconds.
    pub created_at: f64,
}

impl GeneticProfile {
    /// Looks up a trait by name, covering both the fixed fields and the
    /// named trait map.
    #[must_use]
    pub fn trait_value(&self, name: &str) -> Option<f32> {
        let fixed = match name {
            "size" => self.size,
            "branch_density" => self.branch_density,
            "leaf_density" => self.leaf_density,
            "bud_density" => self.bud_density,
            "growth_rate" => self.growth_rate,
            "flowering_speed" => self.flowering_speed,
            "yield_potential" => self.yield_potential,
            "heat_tolerance" => self.heat_tolerance,
            "cold_tolerance" => self.cold_tolerance,
            "drought_tolerance" => self.drought_tolerance,
            "trichrome_amount" => self.trichrome_amount,
            "color_variation" => self.color_variation,
            _ => return self.traits.get(name).copied(),
        };
        Some(fixed)
    }
}

impl Default for GeneticProfile {
    fn default() -> Self {
        Self {
            strain_id: String::new(),
            size: 100.0,
            branch_density: 1.0,
            leaf_density: 1.0,
            bud_density: 1.0,
            growth_rate: 1.0,
            flowering_speed: 1.0,
            yield_potential: 1.0,
            heat_tolerance: 1.0,
            cold_tolerance: 1.0,
            drought_tolerance: 1.0,
            trichrome_amount: 1.0,
            color_variation: 0.0,
            traits: BTreeMap::new(),
            generation: 0,
            created_at: 0.0,
        }
    }
}
