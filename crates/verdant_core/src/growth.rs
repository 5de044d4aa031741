//! Growth-rate pipeline: genetics × environment × stage × time.

use crate::config::GrowthConfig;
use crate::context::TimeControls;
use verdant_data::{GeneticProfile, GrowthStage, GrowthState, StressVector};

#[derive(Debug, Clone)]
pub struct GrowthRateModel {
    pub base_rate: f32,
    pub vegetative_bonus: f32,
    pub accelerated_multiplier: f32,
    pub stressed_multiplier: f32,
    pub min_env_multiplier: f32,
    pub max_env_multiplier: f32,
}

impl Default for GrowthRateModel {
    fn default() -> Self {
        Self::from_config(&GrowthConfig::default())
    }
}

impl GrowthRateModel {
    #[must_use]
    pub fn from_config(config: &GrowthConfig) -> Self {
        Self {
            base_rate: config.base_rate,
            vegetative_bonus: config.vegetative_bonus,
            accelerated_multiplier: config.accelerated_multiplier,
            stressed_multiplier: config.stressed_multiplier,
            min_env_multiplier: config.min_env_multiplier,
            max_env_multiplier: config.max_env_multiplier,
        }
    }

    /// Fixed per-stage pace. `Harvested` does not grow.
    #[must_use]
    pub fn stage_multiplier(stage: GrowthStage) -> f32 {
        match stage {
            GrowthStage::Seedling => 2.0,
            GrowthStage::Vegetative => 1.5,
            GrowthStage::Flowering => 0.8,
            GrowthStage::Harvest => 0.1,
            GrowthStage::Harvested => 0.0,
            _ => 1.0,
        }
    }

    /// `lerp(1.0, stressed, overall)` damped by efficiency, then clamped.
    ///
    /// `efficiency` is the product of any extra environmental modifiers; the
    /// plant's health damping is applied on top of it.
    #[must_use]
    pub fn env_multiplier(&self, stress: &StressVector, health: f32, efficiency: f32) -> f32 {
        let overall = stress.overall.clamp(0.0, 1.0);
        let base = 1.0 + (self.stressed_multiplier - 1.0) * overall;
        let health_damping = 0.5 + 0.5 * health.clamp(0.0, 1.0);
        let efficiency = if efficiency.is_finite() {
            efficiency.max(0.0)
        } else {
            1.0
        };
        (base * efficiency * health_damping).clamp(self.min_env_multiplier, self.max_env_multiplier)
    }

    #[must_use]
    pub fn genetic_multiplier(&self, stage: GrowthStage, genetics: &GeneticProfile) -> f32 {
        let mut multiplier = genetics.growth_rate.max(0.0);
        match stage {
            GrowthStage::Flowering => multiplier *= genetics.flowering_speed.max(0.0),
            GrowthStage::Vegetative => multiplier *= self.vegetative_bonus,
            _ => {}
        }
        multiplier
    }

    #[must_use]
    pub fn time_multiplier(&self, time: TimeControls) -> f32 {
        let accel = if time.accelerated {
            self.accelerated_multiplier
        } else {
            1.0
        };
        time.multiplier.max(0.0) * accel
    }

    /// Growth units gained over `delta_time` seconds. Never negative.
    #[must_use]
    pub fn increment(
        &self,
        state: &GrowthState,
        genetics: &GeneticProfile,
        stress: &StressVector,
        time: TimeControls,
        efficiency: f32,
        delta_time: f32,
    ) -> f32 {
        let value = self.base_rate.max(0.0)
            * self.env_multiplier(stress, state.health, efficiency)
            * self.genetic_multiplier(state.stage, genetics)
            * Self::stage_multiplier(state.stage)
            * self.time_multiplier(time)
            * delta_time.max(0.0);
        if value.is_finite() {
            value.max(0.0)
        } else {
            0.0
        }
    }

    /// Growth units per second under the given conditions.
    #[must_use]
    pub fn rate(
        &self,
        state: &GrowthState,
        genetics: &GeneticProfile,
        stress: &StressVector,
        time: TimeControls,
        efficiency: f32,
    ) -> f32 {
        self.increment(state, genetics, stress, time, efficiency, 1.0)
    }
}
