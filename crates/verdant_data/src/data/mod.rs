//! Core data structures for the Verdant simulation.

pub mod environment;
pub mod events;
pub mod genetics;
pub mod milestone;
pub mod stage;
pub mod state;
pub mod strain;
