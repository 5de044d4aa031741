//! Growth-stage state machine.
//!
//! Stages advance strictly forward, one step at a time. Automatic transitions
//! fire once stage progress reaches 1.0; manual transitions are validated so a
//! corrupt external command can never skip or rewind a stage.

use crate::config::{SimConfig, StageDurations};
use crate::context::TimeControls;
use crate::error::{Result, SimError};
use crate::growth::GrowthRateModel;
use verdant_data::{
    EnvironmentalSample, GeneticProfile, GrowthStage, GrowthState, LifecycleTransitionRecord,
    StressVector,
};

/// Conditions shared by every plant step in a tick.
#[derive(Debug, Clone, Copy)]
pub struct StepConditions {
    pub now: f64,
    pub time: TimeControls,
    pub efficiency: f32,
    /// Snapshot stored in transition records.
    pub sample: EnvironmentalSample,
}

/// Outcome of one [`LifecycleStateMachine::advance`] call.
#[derive(Debug, Clone, Default)]
pub struct Advance {
    pub increment: f32,
    pub transitioned: bool,
    pub record: Option<LifecycleTransitionRecord>,
}

#[derive(Debug, Clone)]
pub struct LifecycleStateMachine {
    pub durations: StageDurations,
    pub auto_progression: bool,
    pub hold_at_harvest: bool,
    pub growth: GrowthRateModel,
}

impl Default for LifecycleStateMachine {
    fn default() -> Self {
        Self::from_config(&SimConfig::default())
    }
}

impl LifecycleStateMachine {
    #[must_use]
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            durations: config.growth.stage_durations.clone(),
            auto_progression: config.simulation.auto_progression,
            hold_at_harvest: config.simulation.hold_at_harvest,
            growth: GrowthRateModel::from_config(&config.growth),
        }
    }

    /// Applies one growth step to `state` in place.
    pub fn advance(
        &self,
        state: &mut GrowthState,
        delta_time: f32,
        stress: &StressVector,
        genetics: &GeneticProfile,
        conditions: &StepConditions,
    ) -> Advance {
        state.last_update = conditions.now;
        if !state.active || state.stage.is_terminal() {
            state.growth_rate = 0.0;
            return Advance::default();
        }

        let increment = self.growth.increment(
            state,
            genetics,
            stress,
            conditions.time,
            conditions.efficiency,
            delta_time,
        );

        let duration = self.durations.duration(state.stage);
        state.stage_progress = if duration > 0.0 {
            (state.stage_progress + increment / duration).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let total = self.durations.total();
        if total > 0.0 {
            state.growth_progress = (state.growth_progress + increment / total).clamp(0.0, 1.0);
        }
        state.growth_rate = self.growth.rate(
            state,
            genetics,
            stress,
            conditions.time,
            conditions.efficiency,
        );

        let mut outcome = Advance {
            increment,
            ..Default::default()
        };
        if self.should_auto_advance(state) {
            if let Some(next) = state.stage.next() {
                let record = self.transition(state, next, stress, genetics, conditions);
                outcome.transitioned = true;
                outcome.record = Some(record);
            }
        }
        outcome
    }

    fn should_auto_advance(&self, state: &GrowthState) -> bool {
        if !self.auto_progression || state.stage_progress < 1.0 {
            return false;
        }
        !(self.hold_at_harvest && state.stage == GrowthStage::Harvest)
    }

    /// Manually moves `state` to `target`.
    ///
    /// Only the immediate next stage is accepted. Asking a harvested plant to
    /// become harvested again is a no-op.
    pub fn force_transition(
        &self,
        state: &mut GrowthState,
        target: GrowthStage,
        stress: &StressVector,
        genetics: &GeneticProfile,
        conditions: &StepConditions,
    ) -> Result<Option<LifecycleTransitionRecord>> {
        if state.stage.is_terminal() && target == state.stage {
            return Ok(None);
        }
        if state.stage.next() != Some(target) {
            return Err(SimError::InvalidTransition {
                from: state.stage,
                to: target,
            });
        }
        Ok(Some(self.transition(state, target, stress, genetics, conditions)))
    }

    fn transition(
        &self,
        state: &mut GrowthState,
        to: GrowthStage,
        stress: &StressVector,
        genetics: &GeneticProfile,
        conditions: &StepConditions,
    ) -> LifecycleTransitionRecord {
        let from = state.stage;
        state.stage = to;
        state.stage_progress = 0.0;
        state.growth_progress = state.growth_progress.max(self.completed_fraction(to));
        state.growth_rate = self.growth.rate(
            state,
            genetics,
            stress,
            conditions.time,
            conditions.efficiency,
        );
        LifecycleTransitionRecord {
            from,
            to,
            timestamp: conditions.now,
            growth_progress: state.growth_progress,
            environment: conditions.sample,
            stress: *stress,
        }
    }

    /// Fraction of the lifecycle covered by the stages before `stage`.
    #[must_use]
    pub fn completed_fraction(&self, stage: GrowthStage) -> f32 {
        if stage.is_terminal() {
            return 1.0;
        }
        let total = self.durations.total();
        if total <= 0.0 {
            return 0.0;
        }
        let done: f32 = GrowthStage::ALL
            .iter()
            .take_while(|s| **s != stage)
            .map(|s| self.durations.duration(*s))
            .sum();
        (done / total).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;
    use verdant_data::Position;

    fn conditions() -> StepConditions {
        StepConditions {
            now: 10.0,
            time: TimeControls::default(),
            efficiency: 1.0,
            sample: EnvironmentalSample::default(),
        }
    }

    fn plant(stage: GrowthStage, progress: f32) -> GrowthState {
        let mut s = GrowthState::new(Uuid::from_u128(1), "test", Position::default(), 0.0);
        s.stage = stage;
        s.stage_progress = progress;
        s
    }

    #[test]
    fn test_vegetative_crosses_into_pre_flowering() {
        let machine = LifecycleStateMachine::default();
        let mut state = plant(GrowthStage::Vegetative, 0.95);
        // Vegetative: 1.2 * 1.5 per second over 240 units; 10 s gives 0.075.
        let outcome = machine.advance(
            &mut state,
            10.0,
            &StressVector::default(),
            &GeneticProfile::default(),
            &conditions(),
        );
        assert!(outcome.increment / 240.0 >= 0.05);
        assert!(outcome.transitioned);
        assert_eq!(state.stage, GrowthStage::PreFlowering);
        assert_eq!(state.stage_progress, 0.0);
        let record = outcome.record.unwrap();
        assert_eq!(record.from, GrowthStage::Vegetative);
        assert_eq!(record.to, GrowthStage::PreFlowering);
        assert_eq!(record.timestamp, 10.0);
    }

    #[test]
    fn test_no_transition_without_auto_progression() {
        let mut machine = LifecycleStateMachine::default();
        machine.auto_progression = false;
        let mut state = plant(GrowthStage::Seed, 0.99);
        let outcome = machine.advance(
            &mut state,
            100.0,
            &StressVector::default(),
            &GeneticProfile::default(),
            &conditions(),
        );
        assert!(!outcome.transitioned);
        assert_eq!(state.stage, GrowthStage::Seed);
        assert_eq!(state.stage_progress, 1.0);
    }

    #[test]
    fn test_hold_at_harvest() {
        let mut machine = LifecycleStateMachine::default();
        machine.hold_at_harvest = true;
        let mut state = plant(GrowthStage::Harvest, 1.0);
        let outcome = machine.advance(
            &mut state,
            1.0,
            &StressVector::default(),
            &GeneticProfile::default(),
            &conditions(),
        );
        assert!(!outcome.transitioned);
        assert_eq!(state.stage, GrowthStage::Harvest);
    }

    #[test]
    fn test_force_transition_rejects_skips_and_rewinds() {
        let machine = LifecycleStateMachine::default();
        let mut state = plant(GrowthStage::Seedling, 0.4);
        let before = state.clone();
        for target in [
            GrowthStage::Seed,
            GrowthStage::Seedling,
            GrowthStage::Flowering,
            GrowthStage::Harvested,
        ] {
            let err = machine
                .force_transition(
                    &mut state,
                    target,
                    &StressVector::default(),
                    &GeneticProfile::default(),
                    &conditions(),
                )
                .unwrap_err();
            assert!(matches!(err, SimError::InvalidTransition { .. }));
            assert_eq!(state, before);
        }
        let record = machine
            .force_transition(
                &mut state,
                GrowthStage::Vegetative,
                &StressVector::default(),
                &GeneticProfile::default(),
                &conditions(),
            )
            .unwrap();
        assert!(record.is_some());
        assert_eq!(state.stage, GrowthStage::Vegetative);
        assert_eq!(state.stage_progress, 0.0);
    }

    #[test]
    fn test_harvested_to_harvested_is_noop() {
        let machine = LifecycleStateMachine::default();
        let mut state = plant(GrowthStage::Harvested, 0.0);
        let result = machine.force_transition(
            &mut state,
            GrowthStage::Harvested,
            &StressVector::default(),
            &GeneticProfile::default(),
            &conditions(),
        );
        assert!(matches!(result, Ok(None)));
    }

    #[test]
    fn test_growth_progress_never_decreases_across_transitions() {
        let machine = LifecycleStateMachine::default();
        let mut state = plant(GrowthStage::Seed, 0.0);
        let mut last = 0.0;
        for _ in 0..20_000 {
            machine.advance(
                &mut state,
                0.5,
                &StressVector::default(),
                &GeneticProfile::default(),
                &conditions(),
            );
            assert!(state.growth_progress >= last);
            last = state.growth_progress;
            if state.stage.is_terminal() {
                break;
            }
        }
        assert_eq!(state.stage, GrowthStage::Harvested);
        assert_eq!(state.growth_progress, 1.0);
    }

    #[test]
    fn test_completed_fraction() {
        let mut machine = LifecycleStateMachine::default();
        machine.durations = StageDurations::uniform(10.0);
        assert_eq!(machine.completed_fraction(GrowthStage::Seed), 0.0);
        assert!((machine.completed_fraction(GrowthStage::Seedling) - 2.0 / 7.0).abs() < 1e-6);
        assert_eq!(machine.completed_fraction(GrowthStage::Harvested), 1.0);
    }
}
