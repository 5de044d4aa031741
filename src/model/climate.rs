//! Day/night climate driver for the bundled runner.

use serde::{Deserialize, Serialize};
use verdant_data::EnvironmentalSample;

/// Smooth sinusoidal cycle around a base sample. Full light for the first
/// `photoperiod` fraction of each day, dimmed for the rest.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DayNightCycle {
    pub day_length: f64,
    pub photoperiod: f64,
    pub base: EnvironmentalSample,
    /// Peak temperature offset from `base`, degrees.
    pub temperature_swing: f32,
    /// Relative humidity offset, inverse to temperature.
    pub humidity_swing: f32,
    /// Light multiplier outside the photoperiod.
    pub night_light: f32,
}

impl Default for DayNightCycle {
    fn default() -> Self {
        Self {
            day_length: 240.0,
            photoperiod: 0.75,
            base: EnvironmentalSample::default(),
            temperature_swing: 3.0,
            humidity_swing: 8.0,
            night_light: 0.7,
        }
    }
}

impl DayNightCycle {
    /// Fraction of the current day elapsed at `now`, in `[0, 1)`.
    #[must_use]
    pub fn phase(&self, now: f64) -> f64 {
        if self.day_length <= 0.0 {
            return 0.0;
        }
        (now / self.day_length).rem_euclid(1.0)
    }

    #[must_use]
    pub fn is_day(&self, now: f64) -> bool {
        self.phase(now) < self.photoperiod
    }

    #[must_use]
    pub fn sample(&self, now: f64) -> EnvironmentalSample {
        let wave = (self.phase(now) * std::f64::consts::TAU).sin() as f32;
        EnvironmentalSample {
            temperature: self.base.temperature + self.temperature_swing * wave,
            humidity: self.base.humidity - self.humidity_swing * wave,
            light: if self.is_day(now) {
                self.base.light
            } else {
                self.base.light * self.night_light
            },
            ..self.base
        }
        .clamped()
    }
}
