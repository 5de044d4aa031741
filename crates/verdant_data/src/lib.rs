//! Core data structures for the Verdant plant simulation.
//!
//! Everything in this crate is plain, serializable data. Simulation logic
//! lives in `verdant_core`.

pub mod data;

pub use data::environment::{EnvironmentalSample, Position, StressVector};
pub use data::events::{PerformanceSnapshot, SimulationEvent};
pub use data::genetics::GeneticProfile;
pub use data::milestone::{Milestone, MilestoneAchievement};
pub use data::stage::GrowthStage;
pub use data::state::{GrowthState, LifecycleTransitionRecord, PlantSnapshot, VisualTarget};
pub use data::strain::{
    Morphology, OptimalRanges, Range, StrainProfile, StressResponse, StressResponses,
    TraitMultipliers, VariationRanges,
};
