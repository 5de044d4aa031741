use super::stage::GrowthStage;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Periodic simulation throughput summary.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    pub tick: u64,
    pub active_plants: usize,
    pub average_growth_rate: f32,
    /// Full plant updates per simulated second over the snapshot window.
    pub updates_per_second: f64,
    /// Plants fully recomputed on the snapshot tick.
    pub updated: usize,
    /// Plants skipped by the scheduler on the snapshot tick.
    pub skipped: usize,
}

/// Notification delivered to external listeners after a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum SimulationEvent {
    StageTransition {
        plant_id: Uuid,
        from: GrowthStage,
        to: GrowthStage,
        timestamp: f64,
    },
    MilestoneAchieved {
        plant_id: Uuid,
        milestone_id: String,
        timestamp: f64,
    },
    Harvested {
        plant_id: Uuid,
        yield_grams: f32,
        timestamp: f64,
    },
    Warning {
        plant_id: Uuid,
        message: String,
    },
    Metrics(PerformanceSnapshot),
}

impl SimulationEvent {
    /// Plant the event concerns, if any.
    #[must_use]
    pub fn plant_id(&self) -> Option<Uuid> {
        match self {
            SimulationEvent::StageTransition { plant_id, .. }
            | SimulationEvent::MilestoneAchieved { plant_id, .. }
            | SimulationEvent::Harvested { plant_id, .. }
            | SimulationEvent::Warning { plant_id, .. } => Some(*plant_id),
            SimulationEvent::Metrics(_) => None,
        }
    }
}
