use super::environment::{EnvironmentalSample, Position, StressVector};
use super::stage::GrowthStage;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Mutable lifecycle state of one plant instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthState {
    pub plant_id: Uuid,
    /// Key into the strain catalog. Genetics are keyed by `plant_id`.
    pub strain_id: String,
    pub position: Position,
    pub stage: GrowthStage,
    /// Completion of the current stage, `[0, 1]`. Reset on every transition.
    pub stage_progress: f32,
    /// Completion of the whole lifecycle, `[0, 1]`. Never decreases.
    pub growth_progress: f32,
    /// Growth units per second at the last update.
    pub growth_rate: f32,
    /// `[0, 1]`, damped by sustained stress.
    pub health: f32,
    /// Simulation time of the last full update, seconds.
    pub last_update: f64,
    pub active: bool,
}

impl GrowthState {
    #[must_use]
    pub fn new(plant_id: Uuid, strain_id: &str, position: Position, now: f64) -> Self {
        Self {
            plant_id,
            strain_id: strain_id.to_string(),
            position,
            stage: GrowthStage::Seed,
            stage_progress: 0.0,
            growth_progress: 0.0,
            growth_rate: 0.0,
            health: 1.0,
            last_update: now,
            active: true,
        }
    }
}

/// Immutable record of one stage change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleTransitionRecord {
    pub from: GrowthStage,
    pub to: GrowthStage,
    pub timestamp: f64,
    pub growth_progress: f32,
    pub environment: EnvironmentalSample,
    pub stress: StressVector,
}

/// Size/color pair the animation layer interpolates toward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisualTarget {
    /// Uniform scale relative to the strain's reference height.
    pub size: f32,
    /// Linear RGB.
    pub color: [f32; 3],
}

impl Default for VisualTarget {
    fn default() -> Self {
        Self {
            size: 0.0,
            color: [0.0; 3],
        }
    }
}

/// Read-only view of a plant for external consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantSnapshot {
    pub plant_id: Uuid,
    pub strain_id: String,
    pub stage: GrowthStage,
    pub stage_progress: f32,
    pub growth_progress: f32,
    pub growth_rate: f32,
    pub health: f32,
    pub stress: StressVector,
    pub target: VisualTarget,
}
