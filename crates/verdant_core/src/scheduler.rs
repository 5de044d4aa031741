//! Per-tick working-set selection.
//!
//! Only plants whose update interval has elapsed are advanced in a tick. The
//! interval depends on the plant's stage (flowering plants change visibly and
//! update more often) and on its distance to the viewer.

use crate::config::SchedulerConfig;
use std::cmp::Ordering;
use uuid::Uuid;
use verdant_data::GrowthStage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Normal,
    High,
}

/// Flowering and Harvest plants are high priority.
#[must_use]
pub fn priority_for(stage: GrowthStage) -> Priority {
    match stage {
        GrowthStage::Flowering | GrowthStage::Harvest => Priority::High,
        _ => Priority::Normal,
    }
}

/// What the scheduler needs to know about one plant.
#[derive(Debug, Clone, Copy)]
pub struct SchedulingCandidate {
    pub plant_id: Uuid,
    pub stage: GrowthStage,
    /// Distance to the primary viewpoint, if known.
    pub distance: Option<f32>,
    pub last_update: f64,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct UpdateScheduler {
    pub high_priority_interval: f64,
    pub normal_interval: f64,
    pub reference_distance: f32,
    pub min_distance_factor: f32,
}

impl Default for UpdateScheduler {
    fn default() -> Self {
        Self::from_config(&SchedulerConfig::default())
    }
}

impl UpdateScheduler {
    #[must_use]
    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self {
            high_priority_interval: config.high_priority_interval,
            normal_interval: config.normal_interval,
            reference_distance: config.reference_distance,
            min_distance_factor: config.min_distance_factor,
        }
    }

    /// `clamp01(reference / distance)`, floored at `min_distance_factor`.
    ///
    /// Unknown distances count as the reference distance.
    #[must_use]
    pub fn distance_factor(&self, distance: Option<f32>) -> f32 {
        let raw = match distance {
            Some(d) if d.is_finite() && d > 0.0 => (self.reference_distance / d).clamp(0.0, 1.0),
            Some(d) if d.is_finite() => 1.0,
            Some(_) => 0.0,
            None => 1.0,
        };
        raw.max(self.min_distance_factor)
    }

    /// Seconds that must elapse between two updates of the candidate.
    #[must_use]
    pub fn interval_for(&self, candidate: &SchedulingCandidate) -> f64 {
        let base = match priority_for(candidate.stage) {
            Priority::High => self.high_priority_interval,
            Priority::Normal => self.normal_interval,
        };
        base / f64::from(self.distance_factor(candidate.distance))
    }

    fn is_due(&self, candidate: &SchedulingCandidate, now: f64) -> bool {
        match priority_for(candidate.stage) {
            Priority::High => true,
            Priority::Normal => now - candidate.last_update >= self.interval_for(candidate),
        }
    }

    /// Plant ids to fully update this tick.
    ///
    /// Every active high-priority plant is selected; normal plants only once
    /// their interval has elapsed. With a budget the set is cut down to the
    /// highest priority, then stalest, plants. The result is in plant-id
    /// order.
    #[must_use]
    pub fn select_for_update(
        &self,
        candidates: &[SchedulingCandidate],
        now: f64,
        tick_budget: Option<usize>,
    ) -> Vec<Uuid> {
        let mut due: Vec<&SchedulingCandidate> = candidates
            .iter()
            .filter(|c| c.active && !c.stage.is_terminal() && self.is_due(c, now))
            .collect();

        if let Some(budget) = tick_budget {
            if due.len() > budget {
                let eligible = due.len();
                due.sort_by(|a, b| rank(b, a, now));
                due.truncate(budget);
                tracing::debug!(eligible, budget, "Tick budget exhausted, deferring updates");
            }
        }

        let mut selected: Vec<Uuid> = due.into_iter().map(|c| c.plant_id).collect();
        selected.sort_unstable();
        selected
    }
}

/// Ascending by (priority, staleness); ties favour the lower plant id.
fn rank(a: &SchedulingCandidate, b: &SchedulingCandidate, now: f64) -> Ordering {
    priority_for(a.stage)
        .cmp(&priority_for(b.stage))
        .then_with(|| (now - a.last_update).total_cmp(&(now - b.last_update)))
        .then_with(|| b.plant_id.cmp(&a.plant_id))
}
