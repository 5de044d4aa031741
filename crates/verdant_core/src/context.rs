//! Per-tick inputs supplied by the host.
//!
//! Nothing in the core reads clocks, cameras or weather from global state;
//! the host passes a [`SimulationContext`] into every tick instead.

use std::collections::HashMap;
use uuid::Uuid;
use verdant_data::{EnvironmentalSample, Position};

/// Global time controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeControls {
    pub multiplier: f32,
    /// Debug/fast-forward switch, multiplies growth by the configured factor.
    pub accelerated: bool,
}

impl Default for TimeControls {
    fn default() -> Self {
        Self {
            multiplier: 1.0,
            accelerated: false,
        }
    }
}

/// Supplies ambient conditions for a point in the grow space.
pub trait EnvironmentSource: Send + Sync {
    fn sample_at(&self, position: &Position) -> EnvironmentalSample;
}

/// A single sample applies everywhere.
impl EnvironmentSource for EnvironmentalSample {
    fn sample_at(&self, _position: &Position) -> EnvironmentalSample {
        *self
    }
}

/// Axis-aligned grid of climate zones on the x/z plane.
#[derive(Debug, Clone)]
pub struct EnvironmentGrid {
    pub origin_x: f32,
    pub origin_z: f32,
    pub cell_size: f32,
    pub columns: usize,
    pub rows: usize,
    pub cells: Vec<EnvironmentalSample>,
    /// Used outside the grid.
    pub fallback: EnvironmentalSample,
}

impl EnvironmentGrid {
    #[must_use]
    pub fn filled(
        columns: usize,
        rows: usize,
        cell_size: f32,
        sample: EnvironmentalSample,
    ) -> Self {
        Self {
            origin_x: 0.0,
            origin_z: 0.0,
            cell_size,
            columns,
            rows,
            cells: vec![sample; columns * rows],
            fallback: sample,
        }
    }

    fn cell_index(&self, position: &Position) -> Option<usize> {
        if self.cell_size <= 0.0 {
            return None;
        }
        let cx = ((position.x - self.origin_x) / self.cell_size).floor();
        let cz = ((position.z - self.origin_z) / self.cell_size).floor();
        if cx < 0.0 || cz < 0.0 {
            return None;
        }
        let (cx, cz) = (cx as usize, cz as usize);
        if cx >= self.columns || cz >= self.rows {
            return None;
        }
        Some(cz * self.columns + cx)
    }

    pub fn set_cell(&mut self, column: usize, row: usize, sample: EnvironmentalSample) {
        if column < self.columns && row < self.rows {
            let idx = row * self.columns + column;
            if let Some(cell) = self.cells.get_mut(idx) {
                *cell = sample;
            }
        }
    }
}

impl EnvironmentSource for EnvironmentGrid {
    fn sample_at(&self, position: &Position) -> EnvironmentalSample {
        self.cell_index(position)
            .and_then(|idx| self.cells.get(idx))
            .copied()
            .unwrap_or(self.fallback)
    }
}

/// Distance from each plant to the primary viewpoint.
pub trait DistanceHints: Send + Sync {
    /// `None` when the collaborator has no estimate for the plant.
    fn distance(&self, plant_id: &Uuid, position: &Position) -> Option<f32>;
}

/// Camera position; distances are Euclidean.
#[derive(Debug, Clone, Copy, Default)]
pub struct Viewpoint {
    pub position: Position,
}

impl DistanceHints for Viewpoint {
    fn distance(&self, _plant_id: &Uuid, position: &Position) -> Option<f32> {
        Some(self.position.distance(position))
    }
}

/// Precomputed distances from an external spatial index.
impl DistanceHints for HashMap<Uuid, f32> {
    fn distance(&self, plant_id: &Uuid, _position: &Position) -> Option<f32> {
        self.get(plant_id).copied()
    }
}

/// Everything one growth tick reads from the outside world.
pub struct SimulationContext<'a> {
    /// Simulation time at the end of this tick, seconds.
    pub now: f64,
    /// Fallback step when a plant has never been updated.
    pub delta_time: f64,
    pub time: TimeControls,
    pub environment: &'a dyn EnvironmentSource,
    pub distances: &'a dyn DistanceHints,
    /// Extra environmental efficiency (lighting upgrades, nutrients...).
    pub efficiency: f32,
    /// Overrides the configured tick budget when set.
    pub tick_budget: Option<usize>,
}

impl<'a> SimulationContext<'a> {
    #[must_use]
    pub fn new(
        now: f64,
        delta_time: f64,
        environment: &'a dyn EnvironmentSource,
        distances: &'a dyn DistanceHints,
    ) -> Self {
        Self {
            now,
            delta_time,
            time: TimeControls::default(),
            environment,
            distances,
            efficiency: 1.0,
            tick_budget: None,
        }
    }

    #[must_use]
    pub fn with_time(mut self, time: TimeControls) -> Self {
        self.time = time;
        self
    }

    #[must_use]
    pub fn with_budget(mut self, budget: Option<usize>) -> Self {
        self.tick_budget = budget;
        self
    }

    #[must_use]
    pub fn with_efficiency(mut self, efficiency: f32) -> Self {
        self.efficiency = efficiency;
        self
    }
}
