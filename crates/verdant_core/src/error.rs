//! Error types for verdant_core.
//!
//! Nothing here is fatal to the host: callers either reject the offending
//! command or skip the affected plant for one tick.

use thiserror::Error;
use uuid::Uuid;
use verdant_data::GrowthStage;

/// Main error type for simulation operations.
#[derive(Error, Debug)]
pub enum SimError {
    /// A manual stage change that is not exactly one step forward.
    #[error("Invalid transition from {from:?} to {to:?}")]
    InvalidTransition { from: GrowthStage, to: GrowthStage },

    /// Genetics or strain reference absent for a registered plant.
    #[error("Missing {profile} profile for plant {plant_id}")]
    MissingProfile { plant_id: Uuid, profile: String },

    #[error("Unknown plant: {0}")]
    UnknownPlant(Uuid),

    #[error("Unknown strain: {0}")]
    UnknownStrain(String),

    /// Breeding asked for more than two parents.
    #[error("Expected at most 2 parents, got {0}")]
    InvalidParents(usize),

    /// Configuration or catalog failed to parse or validate.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    Context {
        context: String,
        source: Box<SimError>,
    },
}

/// Result type alias for verdant_core operations.
pub type Result<T> = std::result::Result<T, SimError>;

impl SimError {
    #[must_use]
    pub fn missing_genetics(plant_id: Uuid) -> Self {
        Self::MissingProfile {
            plant_id,
            profile: "genetic".to_string(),
        }
    }

    #[must_use]
    pub fn missing_strain(plant_id: Uuid) -> Self {
        Self::MissingProfile {
            plant_id,
            profile: "strain".to_string(),
        }
    }

    #[must_use]
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Wraps an error with additional context.
    #[must_use]
    pub fn with_context<S: Into<String>>(self, context: S) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

impl From<anyhow::Error> for SimError {
    fn from(err: anyhow::Error) -> Self {
        Self::Config(err.to_string())
    }
}
