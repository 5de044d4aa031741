use super::stage::GrowthStage;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named, one-time progress threshold within a stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: String,
    pub name: String,
    pub stage: GrowthStage,
    /// Stage progress in `[0, 1]` at which the milestone is reached.
    pub threshold: f32,
}

impl Milestone {
    #[must_use]
    pub fn new(id: &str, name: &str, stage: GrowthStage, threshold: f32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            stage,
            threshold: threshold.clamp(0.0, 1.0),
        }
    }
}

/// Record of a plant reaching a milestone. Unique per (plant, milestone).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneAchievement {
    pub milestone_id: String,
    pub plant_id: Uuid,
    /// Simulation time, seconds.
    pub timestamp: f64,
}
