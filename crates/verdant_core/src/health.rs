//! Plant health: slow damage under stress, recovery in good conditions.

use crate::config::HealthConfig;
use verdant_data::{EnvironmentalSample, GeneticProfile, StrainProfile, StressVector};

#[derive(Debug, Clone)]
pub struct HealthModel {
    pub damage_rate: f32,
    pub recovery_rate: f32,
    pub recovery_threshold: f32,
}

impl Default for HealthModel {
    fn default() -> Self {
        Self::from_config(&HealthConfig::default())
    }
}

impl HealthModel {
    #[must_use]
    pub fn from_config(config: &HealthConfig) -> Self {
        Self {
            damage_rate: config.damage_rate,
            recovery_rate: config.recovery_rate,
            recovery_threshold: config.recovery_threshold,
        }
    }

    /// Per-factor stress weighted by the strain's sensitivity and divided by
    /// the genetic tolerance facing the same direction.
    #[must_use]
    pub fn weighted_stress(
        stress: &StressVector,
        sample: &EnvironmentalSample,
        genetics: &GeneticProfile,
        strain: &StrainProfile,
    ) -> f32 {
        let response = &strain.stress_response;
        let temperature_tolerance = if sample.temperature > strain.optimal.temperature.max {
            genetics.heat_tolerance
        } else {
            genetics.cold_tolerance
        };
        let humidity_tolerance = if sample.humidity < strain.optimal.humidity.min {
            genetics.drought_tolerance
        } else {
            1.0
        };
        stress.temperature * response.temperature.sensitivity / temperature_tolerance.max(0.1)
            + stress.humidity * response.humidity.sensitivity / humidity_tolerance.max(0.1)
            + stress.light * response.light.sensitivity
            + stress.co2 * response.co2.sensitivity
    }

    /// Health after `delta_time` seconds, in `[0, 1]`.
    #[must_use]
    pub fn update(
        &self,
        health: f32,
        stress: &StressVector,
        sample: &EnvironmentalSample,
        genetics: &GeneticProfile,
        strain: &StrainProfile,
        delta_time: f32,
    ) -> f32 {
        let dt = delta_time.max(0.0);
        let damage = self.damage_rate * Self::weighted_stress(stress, sample, genetics, strain).max(0.0);
        let mut next = health - damage * dt;
        if stress.overall < self.recovery_threshold {
            let r = &strain.stress_response;
            let recovery = (r.temperature.recovery + r.humidity.recovery + r.light.recovery + r.co2.recovery) / 4.0;
            next += self.recovery_rate * recovery.max(0.0) * dt;
        }
        if next.is_finite() {
            next.clamp(0.0, 1.0)
        } else {
            health.clamp(0.0, 1.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hot() -> (StressVector, EnvironmentalSample) {
        let stress = StressVector {
            temperature: 1.0,
            overall: 0.25,
            ..Default::default()
        };
        let sample = EnvironmentalSample {
            temperature: 40.0,
            ..Default::default()
        };
        (stress, sample)
    }

    #[test]
    fn test_stress_damages_health() {
        let model = HealthModel::default();
        let (stress, sample) = hot();
        let strain = StrainProfile::with_id("s");
        let after = model.update(1.0, &stress, &sample, &GeneticProfile::default(), &strain, 10.0);
        assert!((after - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_heat_tolerance_reduces_damage() {
        let model = HealthModel::default();
        let (stress, sample) = hot();
        let strain = StrainProfile::with_id("s");
        let tough = GeneticProfile {
            heat_tolerance: 2.0,
            ..Default::default()
        };
        let soft = model.update(1.0, &stress, &sample, &GeneticProfile::default(), &strain, 10.0);
        let hard = model.update(1.0, &stress, &sample, &tough, &strain, 10.0);
        assert!(hard > soft);
    }

    #[test]
    fn test_recovers_when_unstressed() {
        let model = HealthModel::default();
        let strain = StrainProfile::with_id("s");
        let after = model.update(
            0.5,
            &StressVector::default(),
            &EnvironmentalSample::default(),
            &GeneticProfile::default(),
            &strain,
            20.0,
        );
        assert!((after - 0.6).abs() < 1e-6);
        let full = model.update(
            1.0,
            &StressVector::default(),
            &EnvironmentalSample::default(),
            &GeneticProfile::default(),
            &strain,
            20.0,
        );
        assert_eq!(full, 1.0);
    }
}
