//! # Verdant
//!
//! Plant-lifecycle simulation for cultivation games. The simulation engine
//! lives in `verdant_core`; this crate bundles it with a climate driver and
//! the headless and real-time runners used by the `verdant` binary.

pub mod app;
pub mod model;
