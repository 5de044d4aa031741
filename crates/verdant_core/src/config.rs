//! Configuration management for simulation parameters.
//!
//! Strongly-typed configuration that maps onto `config.toml`. Every section
//! has defaults, so a file only needs to mention the values it overrides.
//!
//! ## Example `config.toml`
//!
//! ```toml
//! [simulation]
//! tick_rate_hz = 10.0
//! seed = 42
//! deterministic = true
//!
//! [growth]
//! base_rate = 1.5
//!
//! [stress]
//! aggregator = "Max"
//!
//! [scheduler]
//! tick_budget = 2000
//! ```

use crate::stress::StressAggregator;
use serde::{Deserialize, Serialize};
use verdant_data::GrowthStage;

/// Tick rates, seeding and progression switches.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SimulationConfig {
    /// Fixed growth/lifecycle tick rate.
    pub tick_rate_hz: f64,
    /// Target visual frame rate of the real-time runner.
    pub frame_rate_hz: f64,
    pub seed: Option<u64>,
    pub deterministic: bool,
    pub auto_progression: bool,
    /// Keep ready plants in `Harvest` until they are harvested explicitly.
    pub hold_at_harvest: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: 10.0,
            frame_rate_hz: 60.0,
            seed: None,
            deterministic: false,
            auto_progression: true,
            hold_at_harvest: false,
        }
    }
}

/// Growth units each stage takes at unit rate.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct StageDurations {
    pub seed: f32,
    pub germination: f32,
    pub seedling: f32,
    pub vegetative: f32,
    pub pre_flowering: f32,
    pub flowering: f32,
    pub harvest: f32,
}

impl Default for StageDurations {
    fn default() -> Self {
        Self {
            seed: 20.0,
            germination: 40.0,
            seedling: 90.0,
            vegetative: 240.0,
            pre_flowering: 60.0,
            flowering: 360.0,
            harvest: 30.0,
        }
    }
}

impl StageDurations {
    /// `Harvested` has no duration.
    #[must_use]
    pub fn duration(&self, stage: GrowthStage) -> f32 {
        match stage {
            GrowthStage::Seed => self.seed,
            GrowthStage::Germination => self.germination,
            GrowthStage::Seedling => self.seedling,
            GrowthStage::Vegetative => self.vegetative,
            GrowthStage::PreFlowering => self.pre_flowering,
            GrowthStage::Flowering => self.flowering,
            GrowthStage::Harvest => self.harvest,
            GrowthStage::Harvested => 0.0,
        }
    }

    #[must_use]
    pub fn total(&self) -> f32 {
        GrowthStage::ALL.iter().map(|s| self.duration(*s)).sum()
    }

    /// Same duration for every growing stage.
    #[must_use]
    pub fn uniform(duration: f32) -> Self {
        Self {
            seed: duration,
            germination: duration,
            seedling: duration,
            vegetative: duration,
            pre_flowering: duration,
            flowering: duration,
            harvest: duration,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct GrowthConfig {
    pub base_rate: f32,
    pub stage_durations: StageDurations,
    pub vegetative_bonus: f32,
    pub accelerated_multiplier: f32,
    /// Environmental multiplier at full stress, before clamping.
    pub stressed_multiplier: f32,
    pub min_env_multiplier: f32,
    pub max_env_multiplier: f32,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            base_rate: 1.0,
            stage_durations: StageDurations::default(),
            vegetative_bonus: 1.2,
            accelerated_multiplier: 10.0,
            stressed_multiplier: 0.3,
            min_env_multiplier: 0.1,
            max_env_multiplier: 2.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct StressConfig {
    pub aggregator: StressAggregator,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Seconds between updates for flowering/harvest plants.
    pub high_priority_interval: f64,
    /// Seconds between updates for every other plant at reference distance.
    pub normal_interval: f64,
    /// Distance at or under which a plant updates at its base interval.
    pub reference_distance: f32,
    /// Floor on the distance factor so far plants still update eventually.
    pub min_distance_factor: f32,
    /// Hard cap on full updates per tick. `None` disables truncation.
    pub tick_budget: Option<usize>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            high_priority_interval: 0.1,
            normal_interval: 0.5,
            reference_distance: 10.0,
            min_distance_factor: 0.05,
            tick_budget: None,
        }
    }
}

/// Inheritance parameters used when breeding from parent profiles.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct GeneticsConfig {
    /// Chance a trait is taken from the stronger parent instead of the mean.
    pub dominant_trait_probability: f32,
    /// Chance each trait mutates after blending.
    pub mutation_probability: f32,
    /// Maximum relative size of a mutation.
    pub mutation_rate: f32,
    /// Growth and yield boost for crosses between different strains.
    pub hybrid_vigor_bonus: f32,
    /// Tolerance gained per unit of directional stress on each transition.
    pub epigenetic_rate: f32,
}

impl Default for GeneticsConfig {
    fn default() -> Self {
        Self {
            dominant_trait_probability: 0.6,
            mutation_probability: 0.1,
            mutation_rate: 0.05,
            hybrid_vigor_bonus: 0.1,
            epigenetic_rate: 0.02,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct HealthConfig {
    /// Health lost per second at full weighted stress.
    pub damage_rate: f32,
    /// Health regained per second while overall stress is low.
    pub recovery_rate: f32,
    /// Overall stress under which plants recover.
    pub recovery_threshold: f32,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            damage_rate: 0.01,
            recovery_rate: 0.005,
            recovery_threshold: 0.1,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct MetricsConfig {
    pub snapshot_interval_ticks: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            snapshot_interval_ticks: 100,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct SimConfig {
    pub simulation: SimulationConfig,
    pub growth: GrowthConfig,
    pub stress: StressConfig,
    pub scheduler: SchedulerConfig,
    pub genetics: GeneticsConfig,
    pub health: HealthConfig,
    pub metrics: MetricsConfig,
}

impl SimConfig {
    /// Validates configuration values and returns an error if any are invalid.
    pub fn validate(&self) -> anyhow::Result<()> {
        let sim = &self.simulation;
        anyhow::ensure!(sim.tick_rate_hz > 0.0, "Tick rate must be positive");
        anyhow::ensure!(sim.tick_rate_hz <= 1000.0, "Tick rate too high (max 1000)");
        anyhow::ensure!(sim.frame_rate_hz > 0.0, "Frame rate must be positive");

        let growth = &self.growth;
        anyhow::ensure!(growth.base_rate >= 0.0, "Base growth rate must be non-negative");
        anyhow::ensure!(
            growth.vegetative_bonus >= 0.0,
            "Vegetative bonus must be non-negative"
        );
        anyhow::ensure!(
            growth.accelerated_multiplier >= 1.0,
            "Accelerated multiplier must be at least 1.0"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&growth.stressed_multiplier),
            "Stressed multiplier must be between 0.0 and 1.0"
        );
        anyhow::ensure!(
            growth.min_env_multiplier >= 0.0
                && growth.min_env_multiplier <= growth.max_env_multiplier,
            "Environment multiplier bounds must satisfy 0 <= min <= max"
        );
        for stage in GrowthStage::ALL.iter().filter(|s| !s.is_terminal()) {
            anyhow::ensure!(
                growth.stage_durations.duration(*stage) > 0.0,
                "Stage duration for {:?} must be positive",
                stage
            );
        }

        let sched = &self.scheduler;
        anyhow::ensure!(
            sched.high_priority_interval >= 0.0 && sched.normal_interval >= 0.0,
            "Scheduler intervals must be non-negative"
        );
        anyhow::ensure!(
            sched.reference_distance > 0.0,
            "Reference distance must be positive"
        );
        anyhow::ensure!(
            sched.min_distance_factor > 0.0 && sched.min_distance_factor <= 1.0,
            "Minimum distance factor must be in (0.0, 1.0]"
        );

        let genetics = &self.genetics;
        anyhow::ensure!(
            (0.0..=1.0).contains(&genetics.dominant_trait_probability),
            "Dominant trait probability must be between 0.0 and 1.0"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&genetics.mutation_probability),
            "Mutation probability must be between 0.0 and 1.0"
        );
        anyhow::ensure!(
            (0.0..1.0).contains(&genetics.mutation_rate),
            "Mutation rate must be in [0.0, 1.0)"
        );
        anyhow::ensure!(
            genetics.hybrid_vigor_bonus >= 0.0,
            "Hybrid vigor bonus must be non-negative"
        );
        anyhow::ensure!(
            genetics.epigenetic_rate >= 0.0,
            "Epigenetic rate must be non-negative"
        );

        let health = &self.health;
        anyhow::ensure!(
            health.damage_rate >= 0.0 && health.recovery_rate >= 0.0,
            "Health rates must be non-negative"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&health.recovery_threshold),
            "Recovery threshold must be between 0.0 and 1.0"
        );

        anyhow::ensure!(
            self.metrics.snapshot_interval_ticks > 0,
            "Metrics snapshot interval must be positive"
        );
        Ok(())
    }

    /// Parses and validates configuration from TOML.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load_or_default(path: &str) -> anyhow::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path, "No config file found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Growth tick period, seconds.
    #[must_use]
    pub fn tick_interval(&self) -> f64 {
        1.0 / self.simulation.tick_rate_hz
    }
}
