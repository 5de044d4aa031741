use serde::{Deserialize, Serialize};

/// World position of a plant.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub fn distance(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Ambient conditions at a point in the grow space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalSample {
    /// Degrees Celsius.
    pub temperature: f32,
    /// Relative humidity, percent.
    pub humidity: f32,
    /// PPFD, µmol/m²/s.
    pub light: f32,
    /// Parts per million.
    pub co2: f32,
    /// Metres per second.
    pub air_velocity: f32,
}

impl Default for EnvironmentalSample {
    fn default() -> Self {
        Self {
            temperature: 24.0,
            humidity: 50.0,
            light: 600.0,
            co2: 800.0,
            air_velocity: 0.5,
        }
    }
}

impl EnvironmentalSample {
    pub const TEMPERATURE_BOUNDS: (f32, f32) = (-50.0, 70.0);
    pub const HUMIDITY_BOUNDS: (f32, f32) = (0.0, 100.0);
    pub const LIGHT_BOUNDS: (f32, f32) = (0.0, 3000.0);
    pub const CO2_BOUNDS: (f32, f32) = (0.0, 5000.0);
    pub const AIR_VELOCITY_BOUNDS: (f32, f32) = (0.0, 60.0);

    /// Clamps every field to its physically meaningful bounds.
    ///
    /// NaN readings collapse to the lower bound.
    #[must_use]
    pub fn clamped(&self) -> Self {
        fn clamp(v: f32, (lo, hi): (f32, f32)) -> f32 {
            if v.is_nan() {
                lo
            } else {
                v.clamp(lo, hi)
            }
        }
        Self {
            temperature: clamp(self.temperature, Self::TEMPERATURE_BOUNDS),
            humidity: clamp(self.humidity, Self::HUMIDITY_BOUNDS),
            light: clamp(self.light, Self::LIGHT_BOUNDS),
            co2: clamp(self.co2, Self::CO2_BOUNDS),
            air_velocity: clamp(self.air_velocity, Self::AIR_VELOCITY_BOUNDS),
        }
    }

    #[must_use]
    pub fn is_within_bounds(&self) -> bool {
        self.clamped() == *self
    }
}

/// Per-factor deviation from optimal conditions, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StressVector {
    pub temperature: f32,
    pub humidity: f32,
    pub light: f32,
    pub co2: f32,
    /// Aggregate of the four factors.
    pub overall: f32,
}

impl StressVector {
    #[must_use]
    pub fn factors(&self) -> [f32; 4] {
        [self.temperature, self.humidity, self.light, self.co2]
    }

    #[must_use]
    pub fn peak(&self) -> f32 {
        self.factors().into_iter().fold(0.0, f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped_fixes_negative_humidity() {
        let sample = EnvironmentalSample {
            humidity: -12.0,
            co2: 9000.0,
            ..Default::default()
        };
        let clamped = sample.clamped();
        assert_eq!(clamped.humidity, 0.0);
        assert_eq!(clamped.co2, 5000.0);
        assert!(!sample.is_within_bounds());
        assert!(clamped.is_within_bounds());
    }

    #[test]
    fn test_clamped_nan_goes_to_lower_bound() {
        let sample = EnvironmentalSample {
            light: f32::NAN,
            ..Default::default()
        };
        assert_eq!(sample.clamped().light, 0.0);
    }

    #[test]
    fn test_stress_peak() {
        let s = StressVector {
            temperature: 0.1,
            humidity: 0.7,
            light: 0.0,
            co2: 0.3,
            overall: 0.275,
        };
        assert_eq!(s.peak(), 0.7);
    }
}
