//! # Verdant Core
//!
//! The plant-lifecycle simulation engine for Verdant.
//!
//! This crate contains the deterministic simulation logic, including:
//! - Genetic variation and inheritance from strain profiles
//! - Environmental stress evaluation and plant health
//! - Growth-rate computation and the growth-stage state machine
//! - One-time milestone tracking
//! - Distance- and priority-aware update scheduling
//! - Metrics collection and structured logging
//!
//! ## Architecture
//!
//! A fixed-rate growth tick mutates plant state; a variable-rate frame loop
//! only reads visual targets. Within a tick, per-plant work runs in parallel
//! with Rayon and is applied sequentially in plant-id order, so a seeded run
//! is reproducible regardless of thread count.
//!
//! ## Example
//!
//! ```
//! use verdant_core::catalog::StrainCatalog;
//! use verdant_core::config::SimConfig;
//! use verdant_core::context::{SimulationContext, Viewpoint};
//! use verdant_core::simulation::Simulation;
//! use verdant_data::{EnvironmentalSample, Position};
//!
//! let mut config = SimConfig::default();
//! config.simulation.seed = Some(42);
//! let mut sim = Simulation::new(config, StrainCatalog::builtin()).unwrap();
//! let plant = sim.register_plant("blue_dream", Position::default(), 0.0).unwrap();
//!
//! let env = EnvironmentalSample::default();
//! let view = Viewpoint::default();
//! let report = sim.tick(&SimulationContext::new(1.0, 0.1, &env, &view));
//! assert_eq!(report.updated, 1);
//! assert!(sim.snapshot(&plant).unwrap().stage_progress > 0.0);
//! ```

/// Strain catalog loading and lookup
pub mod catalog;
/// Configuration management for simulation parameters
pub mod config;
/// Per-tick host inputs (time, environment, viewer distance)
pub mod context;
/// Error types
pub mod error;
/// Genetic variation, inheritance and epigenetic adaptation
pub mod genetics;
/// Growth-rate model
pub mod growth;
/// Plant health damage and recovery
pub mod health;
/// Growth-stage state machine
pub mod lifecycle;
/// Performance metrics collection and logging
pub mod metrics;
/// Milestone catalog and achievement log
pub mod milestones;
/// Per-tick working-set selection
pub mod scheduler;
/// Tick pipeline and plant registry
pub mod simulation;
/// Environmental stress model
pub mod stress;
/// Visual size/color targets and frame interpolation
pub mod visual;

pub use catalog::StrainCatalog;
pub use config::SimConfig;
pub use context::{DistanceHints, EnvironmentSource, SimulationContext, TimeControls};
pub use error::{Result, SimError};
pub use metrics::{init_logging, Metrics};
pub use simulation::{Simulation, TickReport, UnregisterHandle};
