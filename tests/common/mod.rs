#[macro_use]
pub mod macros;

use uuid::Uuid;
use verdant_lib::model::catalog::StrainCatalog;
use verdant_lib::model::config::{SimConfig, StageDurations};
use verdant_lib::model::context::{SimulationContext, TimeControls, Viewpoint};
use verdant_lib::model::simulation::Simulation;
use verdant_lib::model::data::{EnvironmentalSample, Position, SimulationEvent, StrainProfile};

#[allow(dead_code)]
pub struct SimBuilder {
    config: SimConfig,
    catalog: StrainCatalog,
    plants: Vec<(String, Position)>,
}

#[allow(dead_code)]
impl SimBuilder {
    pub fn new() -> Self {
        let mut config = SimConfig::default();
        config.simulation.seed = Some(42);
        config.simulation.deterministic = true;
        config.scheduler.normal_interval = 0.0;
        Self {
            config,
            catalog: StrainCatalog::builtin(),
            plants: Vec::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.simulation.seed = Some(seed);
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut SimConfig),
    {
        modifier(&mut self.config);
        self
    }

    /// Every stage lasts `duration` growth units.
    pub fn with_short_stages(self, duration: f32) -> Self {
        self.with_config(|c| c.growth.stage_durations = StageDurations::uniform(duration))
    }

    pub fn with_strain(mut self, strain: StrainProfile) -> Self {
        self.catalog
            .insert(strain)
            .expect("test strain should be valid");
        self
    }

    pub fn with_plant(mut self, strain_id: &str, position: Position) -> Self {
        self.plants.push((strain_id.to_string(), position));
        self
    }

    pub fn with_plants(mut self, strain_id: &str, count: usize) -> Self {
        for i in 0..count {
            self.plants
                .push((strain_id.to_string(), Position::new(i as f32, 0.0, 0.0)));
        }
        self
    }

    pub fn build(self) -> (Simulation, Vec<Uuid>) {
        let mut sim =
            Simulation::new(self.config, self.catalog).expect("test config should be valid");
        let ids = self
            .plants
            .iter()
            .map(|(strain, position)| {
                sim.register_plant(strain, *position, 0.0)
                    .expect("Failed to register plant")
            })
            .collect();
        (sim, ids)
    }
}

/// Drives a simulation with a fixed sample and a viewer at the origin.
#[allow(dead_code)]
pub struct Driver {
    pub env: EnvironmentalSample,
    pub view: Viewpoint,
    pub time: TimeControls,
    pub now: f64,
    pub dt: f64,
}

#[allow(dead_code)]
impl Driver {
    pub fn new() -> Self {
        Self {
            env: EnvironmentalSample::default(),
            view: Viewpoint::default(),
            time: TimeControls::default(),
            now: 0.0,
            dt: 0.1,
        }
    }

    pub fn with_env(mut self, env: EnvironmentalSample) -> Self {
        self.env = env;
        self
    }

    pub fn run(&mut self, sim: &mut Simulation, ticks: usize) -> Vec<SimulationEvent> {
        let mut events = Vec::new();
        for _ in 0..ticks {
            self.now += self.dt;
            let ctx = SimulationContext::new(self.now, self.dt, &self.env, &self.view)
                .with_time(self.time);
            events.extend(sim.tick(&ctx).events);
        }
        events
    }
}
