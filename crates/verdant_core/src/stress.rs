//! Environmental stress model.
//!
//! Converts an ambient sample and a strain's optimal window into a per-factor
//! stress vector. Evaluation is pure: identical inputs give bit-identical
//! outputs.

use serde::{Deserialize, Serialize};
use verdant_data::{EnvironmentalSample, Range, StrainProfile, StressVector};

/// Degrees outside the optimal window at which temperature stress saturates.
pub const TEMPERATURE_TOLERANCE: f32 = 10.0;
/// Humidity percent points outside the window at which stress saturates.
pub const HUMIDITY_TOLERANCE: f32 = 30.0;
/// PPFD outside the window at which light stress saturates.
pub const LIGHT_TOLERANCE: f32 = 500.0;
/// ppm outside the window at which CO2 stress saturates.
pub const CO2_TOLERANCE: f32 = 400.0;

/// How per-factor stress collapses into the overall scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StressAggregator {
    #[default]
    Mean,
    Max,
}

impl StressAggregator {
    #[must_use]
    pub fn aggregate(&self, factors: [f32; 4]) -> f32 {
        match self {
            StressAggregator::Mean => factors.iter().sum::<f32>() / factors.len() as f32,
            StressAggregator::Max => factors.into_iter().fold(0.0, f32::max),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StressModel {
    pub aggregator: StressAggregator,
}

impl StressModel {
    #[must_use]
    pub fn new(aggregator: StressAggregator) -> Self {
        Self { aggregator }
    }

    #[must_use]
    pub fn evaluate(&self, strain: &StrainProfile, conditions: &EnvironmentalSample) -> StressVector {
        let sample = conditions.clamped();
        let optimal = &strain.optimal;
        let temperature = factor_stress(&optimal.temperature, sample.temperature, TEMPERATURE_TOLERANCE);
        let humidity = factor_stress(&optimal.humidity, sample.humidity, HUMIDITY_TOLERANCE);
        let light = factor_stress(&optimal.light, sample.light, LIGHT_TOLERANCE);
        let co2 = factor_stress(&optimal.co2, sample.co2, CO2_TOLERANCE);
        let overall = self.aggregator.aggregate([temperature, humidity, light, co2]);
        StressVector {
            temperature,
            humidity,
            light,
            co2,
            overall,
        }
    }
}

/// Evaluates stress with the default (mean) aggregation.
#[must_use]
pub fn evaluate(strain: &StrainProfile, conditions: &EnvironmentalSample) -> StressVector {
    StressModel::default().evaluate(strain, conditions)
}

fn factor_stress(optimal: &Range, value: f32, tolerance: f32) -> f32 {
    if optimal.contains(value) {
        return 0.0;
    }
    (optimal.distance_outside(value) / tolerance).clamp(0.0, 1.0)
}
