//! Simulation orchestrator.
//!
//! Owns every plant and runs the tick pipeline:
//!
//! 1. **Schedule**: pick the working set synchronously.
//! 2. **Compute**: advance each selected plant in parallel on a private copy
//!    of its state, reading only its own genetics, the shared strain and the
//!    environment.
//! 3. **Apply**: write results back sequentially in plant-id order, record
//!    transitions and achievements, then deliver events.
//!
//! Removal requested through an [`UnregisterHandle`] may arrive from any
//! thread at any time; a result computed for a plant removed mid-tick is
//! discarded at apply time.

use crate::catalog::StrainCatalog;
use crate::config::SimConfig;
use crate::context::SimulationContext;
use crate::error::{Result, SimError};
use crate::genetics::GeneticVariationGenerator;
use crate::health::HealthModel;
use crate::lifecycle::{LifecycleStateMachine, StepConditions};
use crate::metrics::{Metrics, TickStats};
use crate::milestones::{AchievementLog, MilestoneTracker};
use crate::scheduler::{SchedulingCandidate, UpdateScheduler};
use crate::stress::StressModel;
use crate::visual::target_for;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use uuid::Uuid;
use verdant_data::{
    EnvironmentalSample, GeneticProfile, GrowthStage, GrowthState, LifecycleTransitionRecord,
    MilestoneAchievement, PlantSnapshot, Position, SimulationEvent, StrainProfile, StressVector,
    VisualTarget,
};

/// Thread-safe removal requests, honoured at the next apply phase.
#[derive(Debug, Clone, Default)]
pub struct UnregisterHandle {
    pending: Arc<Mutex<HashSet<Uuid>>>,
}

impl UnregisterHandle {
    /// Marks `plant_id` for removal. Safe to call from any thread, even while
    /// a tick is running.
    pub fn request(&self, plant_id: Uuid) {
        self.lock().insert(plant_id);
    }

    #[must_use]
    pub fn is_pending(&self, plant_id: &Uuid) -> bool {
        self.lock().contains(plant_id)
    }

    fn pending(&self) -> HashSet<Uuid> {
        self.lock().clone()
    }

    fn drain(&self) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = self.lock().drain().collect();
        ids.sort_unstable();
        ids
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<Uuid>> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// What one tick did.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub tick: u64,
    /// Tick-wide event queue, in plant-id order.
    pub events: Vec<SimulationEvent>,
    pub updated: usize,
    pub skipped: usize,
}

/// Last conditions a plant was evaluated under.
#[derive(Debug, Clone, Copy, Default)]
struct Observation {
    sample: EnvironmentalSample,
    stress: StressVector,
}

/// Immutable inputs of one plant's compute phase.
struct PlantJob {
    state: GrowthState,
    genetics: Option<Arc<GeneticProfile>>,
    strain: Option<Arc<StrainProfile>>,
}

struct PlantUpdate {
    state: GrowthState,
    observation: Observation,
    target: VisualTarget,
    record: Option<LifecycleTransitionRecord>,
    /// Achievements in chronological order.
    achievements: Vec<MilestoneAchievement>,
    /// Achievements before this index were reached before the transition.
    before_transition: usize,
    adapted: Option<GeneticProfile>,
}

enum PlantOutcome {
    Updated(Box<PlantUpdate>),
    Missing { plant_id: Uuid, error: SimError },
}

/// Read-only models shared by every compute job.
struct StepModels<'a> {
    lifecycle: &'a LifecycleStateMachine,
    stress: &'a StressModel,
    health: &'a HealthModel,
    generator: &'a GeneticVariationGenerator,
    milestones: &'a MilestoneTracker,
    achieved: &'a AchievementLog,
}

pub struct Simulation {
    config: SimConfig,
    catalog: StrainCatalog,
    plants: BTreeMap<Uuid, GrowthState>,
    genetics: HashMap<Uuid, Arc<GeneticProfile>>,
    observations: HashMap<Uuid, Observation>,
    targets: BTreeMap<Uuid, VisualTarget>,
    transitions: HashMap<Uuid, Vec<LifecycleTransitionRecord>>,
    achievements: AchievementLog,
    lifecycle: LifecycleStateMachine,
    stress_model: StressModel,
    health: HealthModel,
    generator: GeneticVariationGenerator,
    milestones: MilestoneTracker,
    scheduler: UpdateScheduler,
    metrics: Metrics,
    rng: ChaCha8Rng,
    subscribers: Vec<Sender<SimulationEvent>>,
    unregister: UnregisterHandle,
    tick: u64,
}

impl Simulation {
    /// Validates `config` and builds an empty simulation.
    pub fn new(config: SimConfig, catalog: StrainCatalog) -> Result<Self> {
        config.validate()?;
        let rng = match config.simulation.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None if config.simulation.deterministic => ChaCha8Rng::seed_from_u64(0),
            None => ChaCha8Rng::from_entropy(),
        };
        Ok(Self {
            lifecycle: LifecycleStateMachine::from_config(&config),
            stress_model: StressModel::new(config.stress.aggregator),
            health: HealthModel::from_config(&config.health),
            generator: GeneticVariationGenerator::new(config.genetics.clone()),
            milestones: MilestoneTracker::default(),
            scheduler: UpdateScheduler::from_config(&config.scheduler),
            metrics: Metrics::new(config.metrics.snapshot_interval_ticks),
            catalog,
            plants: BTreeMap::new(),
            genetics: HashMap::new(),
            observations: HashMap::new(),
            targets: BTreeMap::new(),
            transitions: HashMap::new(),
            achievements: AchievementLog::new(),
            rng,
            subscribers: Vec::new(),
            unregister: UnregisterHandle::default(),
            tick: 0,
            config,
        })
    }

    /// Replaces the milestone catalog.
    #[must_use]
    pub fn with_milestones(mut self, milestones: MilestoneTracker) -> Self {
        self.milestones = milestones;
        self
    }

    pub fn register_strain(&mut self, strain: StrainProfile) -> Result<()> {
        self.catalog.insert(strain)?;
        Ok(())
    }

    /// Removes a strain from the catalog. Plants of that strain are skipped
    /// with a warning on every tick until the strain is registered again.
    pub fn remove_strain(&mut self, strain_id: &str) -> Option<Arc<StrainProfile>> {
        self.catalog.remove(strain_id)
    }

    /// Plants a new seed of `strain_id` with freshly rolled genetics.
    pub fn register_plant(&mut self, strain_id: &str, position: Position, now: f64) -> Result<Uuid> {
        self.register_seedling(strain_id, position, &[], now)
    }

    /// Plants a seed bred from up to two registered parents.
    pub fn register_seedling(
        &mut self,
        strain_id: &str,
        position: Position,
        parents: &[Uuid],
        now: f64,
    ) -> Result<Uuid> {
        let strain = self
            .catalog
            .get(strain_id)
            .ok_or_else(|| SimError::UnknownStrain(strain_id.to_string()))?;
        if parents.len() > 2 {
            return Err(SimError::InvalidParents(parents.len()));
        }
        let parent_profiles = parents
            .iter()
            .map(|id| self.genetics.get(id).cloned().ok_or(SimError::UnknownPlant(*id)))
            .collect::<Result<Vec<_>>>()?;
        let parent_refs: Vec<&GeneticProfile> = parent_profiles.iter().map(Arc::as_ref).collect();
        let genetics = self
            .generator
            .generate(&strain, &parent_refs, now, &mut self.rng)?;

        let plant_id = uuid::Builder::from_random_bytes(self.rng.gen()).into_uuid();
        let state = GrowthState::new(plant_id, strain_id, position, now);
        let observation = Observation::default();
        self.targets.insert(
            plant_id,
            target_for(&state, &genetics, &strain, &observation.stress),
        );
        tracing::debug!(
            %plant_id,
            strain = strain_id,
            generation = genetics.generation,
            "Registered plant"
        );
        self.observations.insert(plant_id, observation);
        self.genetics.insert(plant_id, Arc::new(genetics));
        self.plants.insert(plant_id, state);
        Ok(plant_id)
    }

    /// Removes a plant and everything recorded about it.
    pub fn unregister_plant(&mut self, plant_id: &Uuid) -> Result<()> {
        if self.discard(plant_id) {
            Ok(())
        } else {
            Err(SimError::UnknownPlant(*plant_id))
        }
    }

    /// Handle other threads can use to remove plants.
    #[must_use]
    pub fn unregister_handle(&self) -> UnregisterHandle {
        self.unregister.clone()
    }

    /// Pauses or resumes a plant. Inactive plants are never scheduled, and a
    /// resumed plant grows from `now` on.
    pub fn set_active(&mut self, plant_id: &Uuid, active: bool, now: f64) -> Result<()> {
        let state = self
            .plants
            .get_mut(plant_id)
            .ok_or(SimError::UnknownPlant(*plant_id))?;
        if active && !state.active {
            state.last_update = now;
        }
        state.active = active;
        Ok(())
    }

    fn discard(&mut self, plant_id: &Uuid) -> bool {
        let existed = self.plants.remove(plant_id).is_some();
        self.genetics.remove(plant_id);
        self.observations.remove(plant_id);
        self.targets.remove(plant_id);
        self.transitions.remove(plant_id);
        self.achievements.discard_plant(plant_id);
        if existed {
            tracing::debug!(%plant_id, "Unregistered plant");
        }
        existed
    }

    fn process_unregistrations(&mut self) {
        for plant_id in self.unregister.drain() {
            self.discard(&plant_id);
        }
    }

    /// New channel receiving every event emitted from now on.
    pub fn subscribe(&mut self) -> Receiver<SimulationEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Runs one growth tick.
    pub fn tick(&mut self, ctx: &SimulationContext) -> TickReport {
        self.tick += 1;
        self.process_unregistrations();

        let candidates: Vec<SchedulingCandidate> = self
            .plants
            .values()
            .map(|s| SchedulingCandidate {
                plant_id: s.plant_id,
                stage: s.stage,
                distance: ctx.distances.distance(&s.plant_id, &s.position),
                last_update: s.last_update,
                active: s.active,
            })
            .collect();
        let budget = ctx.tick_budget.or(self.config.scheduler.tick_budget);
        let selected = self.scheduler.select_for_update(&candidates, ctx.now, budget);
        let growing = candidates
            .iter()
            .filter(|c| c.active && !c.stage.is_terminal())
            .count();
        let skipped = growing.saturating_sub(selected.len());

        let jobs: Vec<PlantJob> = selected
            .iter()
            .filter_map(|id| self.plants.get(id))
            .map(|state| PlantJob {
                genetics: self.genetics.get(&state.plant_id).cloned(),
                strain: self.catalog.get(&state.strain_id),
                state: state.clone(),
            })
            .collect();

        let models = StepModels {
            lifecycle: &self.lifecycle,
            stress: &self.stress_model,
            health: &self.health,
            generator: &self.generator,
            milestones: &self.milestones,
            achieved: &self.achievements,
        };
        let outcomes: Vec<PlantOutcome> = jobs
            .into_par_iter()
            .map(|job| step_plant(job, &models, ctx))
            .collect();

        let cancelled = self.unregister.pending();
        let mut events = Vec::new();
        let mut updated = 0;
        for outcome in outcomes {
            match outcome {
                PlantOutcome::Updated(update) => {
                    if cancelled.contains(&update.state.plant_id) {
                        continue;
                    }
                    updated += 1;
                    self.apply(*update, &mut events);
                }
                PlantOutcome::Missing { plant_id, error } => {
                    if cancelled.contains(&plant_id) {
                        continue;
                    }
                    tracing::warn!(%plant_id, error = %error, "Skipping plant update");
                    if let Some(state) = self.plants.get_mut(&plant_id) {
                        state.last_update = ctx.now;
                    }
                    self.metrics.increment_counter("missing_profile");
                    events.push(SimulationEvent::Warning {
                        plant_id,
                        message: error.to_string(),
                    });
                }
            }
        }
        self.process_unregistrations();

        let stats = TickStats {
            now: ctx.now,
            active_plants: self.growing().count(),
            updated,
            skipped,
            average_growth_rate: self.average_growth_rate(),
        };
        if let Some(snapshot) = self.metrics.record_tick(stats) {
            events.push(SimulationEvent::Metrics(snapshot));
        }
        tracing::debug!(tick = self.tick, updated, skipped, events = events.len(), "Tick complete");

        self.dispatch(&events);
        TickReport {
            tick: self.tick,
            events,
            updated,
            skipped,
        }
    }

    fn apply(&mut self, update: PlantUpdate, events: &mut Vec<SimulationEvent>) {
        let PlantUpdate {
            state,
            observation,
            target,
            record,
            achievements,
            before_transition,
            adapted,
        } = update;
        let plant_id = state.plant_id;

        let mut achievements = achievements.into_iter();
        for achievement in achievements.by_ref().take(before_transition) {
            self.record_achievement(achievement, events);
        }
        if let Some(record) = record {
            events.push(transition_event(plant_id, &record));
            self.transitions.entry(plant_id).or_default().push(record);
        }
        for achievement in achievements {
            self.record_achievement(achievement, events);
        }
        if let Some(adapted) = adapted {
            self.genetics.insert(plant_id, Arc::new(adapted));
        }
        self.observations.insert(plant_id, observation);
        self.targets.insert(plant_id, target);
        self.plants.insert(plant_id, state);
    }

    fn record_achievement(&mut self, achievement: MilestoneAchievement, events: &mut Vec<SimulationEvent>) {
        let event = SimulationEvent::MilestoneAchieved {
            plant_id: achievement.plant_id,
            milestone_id: achievement.milestone_id.clone(),
            timestamp: achievement.timestamp,
        };
        if self.achievements.record(achievement) {
            events.push(event);
        }
    }

    fn dispatch(&mut self, events: &[SimulationEvent]) {
        if events.is_empty() {
            return;
        }
        self.subscribers
            .retain(|tx| events.iter().all(|e| tx.send(e.clone()).is_ok()));
    }

    /// Manually advances a plant to `target`, which must be its next stage.
    pub fn force_transition(
        &mut self,
        plant_id: &Uuid,
        target: GrowthStage,
        now: f64,
    ) -> Result<Option<LifecycleTransitionRecord>> {
        let mut events = Vec::new();
        let record = self.transition_plant(plant_id, target, now, &mut events)?;
        self.dispatch(&events);
        Ok(record)
    }

    /// Cuts a plant that is in `Harvest`, returning its estimated dry yield
    /// in grams. Harvesting an already harvested plant yields nothing.
    pub fn harvest(&mut self, plant_id: &Uuid, now: f64) -> Result<f32> {
        let state = self.plants.get(plant_id).ok_or(SimError::UnknownPlant(*plant_id))?;
        if state.stage == GrowthStage::Harvested {
            return Ok(0.0);
        }
        if state.stage != GrowthStage::Harvest {
            return Err(SimError::InvalidTransition {
                from: state.stage,
                to: GrowthStage::Harvested,
            });
        }
        let health = state.health;
        let strain = self
            .catalog
            .get(&state.strain_id)
            .ok_or_else(|| SimError::missing_strain(*plant_id))?;
        let yield_potential = self
            .genetics
            .get(plant_id)
            .ok_or_else(|| SimError::missing_genetics(*plant_id))?
            .yield_potential;

        let mut events = Vec::new();
        self.transition_plant(plant_id, GrowthStage::Harvested, now, &mut events)?;
        let yield_grams =
            (strain.yield_grams.midpoint() * yield_potential * (0.5 + 0.5 * health)).max(0.0);
        events.push(SimulationEvent::Harvested {
            plant_id: *plant_id,
            yield_grams,
            timestamp: now,
        });
        self.metrics.increment_counter("harvested");
        tracing::info!(%plant_id, yield_grams, "Plant harvested");
        self.dispatch(&events);
        Ok(yield_grams)
    }

    fn transition_plant(
        &mut self,
        plant_id: &Uuid,
        target: GrowthStage,
        now: f64,
        events: &mut Vec<SimulationEvent>,
    ) -> Result<Option<LifecycleTransitionRecord>> {
        let mut state = self
            .plants
            .get(plant_id)
            .cloned()
            .ok_or(SimError::UnknownPlant(*plant_id))?;
        let genetics = self
            .genetics
            .get(plant_id)
            .cloned()
            .ok_or_else(|| SimError::missing_genetics(*plant_id))?;
        let strain = self
            .catalog
            .get(&state.strain_id)
            .ok_or_else(|| SimError::missing_strain(*plant_id))?;
        let observation = self.observations.get(plant_id).copied().unwrap_or_default();
        let conditions = StepConditions {
            now,
            time: Default::default(),
            efficiency: 1.0,
            sample: observation.sample,
        };

        let from_progress = state.stage_progress;
        let Some(record) = self.lifecycle.force_transition(
            &mut state,
            target,
            &observation.stress,
            &genetics,
            &conditions,
        )?
        else {
            return Ok(None);
        };

        let earlier =
            self.milestones
                .check_and_record(*plant_id, record.from, from_progress, &self.achievements, now);
        for achievement in earlier {
            self.record_achievement(achievement, events);
        }
        events.push(transition_event(*plant_id, &record));
        let later = self.milestones.check_and_record(
            *plant_id,
            state.stage,
            state.stage_progress,
            &self.achievements,
            now,
        );
        for achievement in later {
            self.record_achievement(achievement, events);
        }

        let genetics = if self.generator.config.epigenetic_rate > 0.0 {
            let adapted =
                self.generator
                    .adapt(&genetics, &strain, &observation.sample, &observation.stress);
            let adapted = Arc::new(adapted);
            self.genetics.insert(*plant_id, Arc::clone(&adapted));
            adapted
        } else {
            genetics
        };
        self.targets.insert(
            *plant_id,
            target_for(&state, &genetics, &strain, &observation.stress),
        );
        self.transitions
            .entry(*plant_id)
            .or_default()
            .push(record.clone());
        self.plants.insert(*plant_id, state);
        Ok(Some(record))
    }

    #[must_use]
    pub fn snapshot(&self, plant_id: &Uuid) -> Option<PlantSnapshot> {
        let state = self.plants.get(plant_id)?;
        let observation = self.observations.get(plant_id).copied().unwrap_or_default();
        Some(PlantSnapshot {
            plant_id: *plant_id,
            strain_id: state.strain_id.clone(),
            stage: state.stage,
            stage_progress: state.stage_progress,
            growth_progress: state.growth_progress,
            growth_rate: state.growth_rate,
            health: state.health,
            stress: observation.stress,
            target: self.targets.get(plant_id).copied().unwrap_or_default(),
        })
    }

    /// Snapshots of every plant, in plant-id order.
    #[must_use]
    pub fn snapshots(&self) -> Vec<PlantSnapshot> {
        self.plants.keys().filter_map(|id| self.snapshot(id)).collect()
    }

    #[must_use]
    pub fn state(&self, plant_id: &Uuid) -> Option<&GrowthState> {
        self.plants.get(plant_id)
    }

    #[must_use]
    pub fn genetics(&self, plant_id: &Uuid) -> Option<&GeneticProfile> {
        self.genetics.get(plant_id).map(Arc::as_ref)
    }

    /// Append-only transition log of a plant.
    #[must_use]
    pub fn transitions(&self, plant_id: &Uuid) -> &[LifecycleTransitionRecord] {
        self.transitions
            .get(plant_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    #[must_use]
    pub fn achievements(&self, plant_id: &Uuid) -> Vec<MilestoneAchievement> {
        self.achievements.for_plant(plant_id).cloned().collect()
    }

    /// Latest visual targets, for the frame loop.
    #[must_use]
    pub fn targets(&self) -> &BTreeMap<Uuid, VisualTarget> {
        &self.targets
    }

    pub fn plant_ids(&self) -> impl Iterator<Item = &Uuid> {
        self.plants.keys()
    }

    #[must_use]
    pub fn plant_count(&self) -> usize {
        self.plants.len()
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.plants.values().filter(|s| s.active).count()
    }

    /// Active plants that have not been harvested.
    fn growing(&self) -> impl Iterator<Item = &GrowthState> {
        self.plants
            .values()
            .filter(|s| s.active && !s.stage.is_terminal())
    }

    fn average_growth_rate(&self) -> f32 {
        let (sum, count) = self
            .growing()
            .fold((0.0f32, 0usize), |(sum, n), s| (sum + s.growth_rate, n + 1));
        if count == 0 {
            0.0
        } else {
            sum / count as f32
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &StrainCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    #[must_use]
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick
    }
}

fn transition_event(plant_id: Uuid, record: &LifecycleTransitionRecord) -> SimulationEvent {
    SimulationEvent::StageTransition {
        plant_id,
        from: record.from,
        to: record.to,
        timestamp: record.timestamp,
    }
}

/// Seconds since the plant's last update.
fn elapsed(state: &GrowthState, ctx: &SimulationContext) -> f32 {
    let since = ctx.now - state.last_update;
    if state.last_update.is_finite() && since >= 0.0 {
        since as f32
    } else {
        ctx.delta_time.max(0.0) as f32
    }
}

fn step_plant(job: PlantJob, models: &StepModels, ctx: &SimulationContext) -> PlantOutcome {
    let PlantJob {
        mut state,
        genetics,
        strain,
    } = job;
    let plant_id = state.plant_id;
    let Some(genetics) = genetics else {
        return PlantOutcome::Missing {
            plant_id,
            error: SimError::missing_genetics(plant_id),
        };
    };
    let Some(strain) = strain else {
        return PlantOutcome::Missing {
            plant_id,
            error: SimError::missing_strain(plant_id),
        };
    };

    let sample = ctx.environment.sample_at(&state.position).clamped();
    let stress = models.stress.evaluate(&strain, &sample);
    let delta_time = elapsed(&state, ctx);
    state.health = models
        .health
        .update(state.health, &stress, &sample, &genetics, &strain, delta_time);

    let conditions = StepConditions {
        now: ctx.now,
        time: ctx.time,
        efficiency: ctx.efficiency,
        sample,
    };
    let advance = models
        .lifecycle
        .advance(&mut state, delta_time, &stress, &genetics, &conditions);

    let mut achievements = Vec::new();
    let mut before_transition = 0;
    if let Some(record) = &advance.record {
        achievements.extend(models.milestones.check_and_record(
            plant_id,
            record.from,
            1.0,
            models.achieved,
            ctx.now,
        ));
        before_transition = achievements.len();
    }
    achievements.extend(models.milestones.check_and_record(
        plant_id,
        state.stage,
        state.stage_progress,
        models.achieved,
        ctx.now,
    ));

    let adapted = advance
        .record
        .as_ref()
        .filter(|_| models.generator.config.epigenetic_rate > 0.0)
        .map(|_| models.generator.adapt(&genetics, &strain, &sample, &stress));
    let target = target_for(
        &state,
        adapted.as_ref().unwrap_or(&*genetics),
        &strain,
        &stress,
    );

    PlantOutcome::Updated(Box::new(PlantUpdate {
        state,
        observation: Observation { sample, stress },
        target,
        record: advance.record,
        achievements,
        before_transition,
        adapted,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StageDurations;
    use crate::context::{TimeControls, Viewpoint};

    fn config() -> SimConfig {
        let mut config = SimConfig::default();
        config.simulation.seed = Some(7);
        config.growth.stage_durations = StageDurations::uniform(1.0);
        config.scheduler.normal_interval = 0.0;
        config
    }

    fn sim() -> Simulation {
        Simulation::new(config(), StrainCatalog::builtin()).unwrap()
    }

    fn run(sim: &mut Simulation, ticks: usize, start: f64) -> Vec<SimulationEvent> {
        let env = EnvironmentalSample::default();
        let view = Viewpoint::default();
        let mut events = Vec::new();
        for i in 1..=ticks {
            let ctx = SimulationContext::new(start + i as f64 * 0.1, 0.1, &env, &view)
                .with_time(TimeControls::default());
            events.extend(sim.tick(&ctx).events);
        }
        events
    }

    #[test]
    fn test_register_unknown_strain() {
        let mut sim = sim();
        let err = sim
            .register_plant("nope", Position::default(), 0.0)
            .unwrap_err();
        assert!(matches!(err, SimError::UnknownStrain(_)));
        assert_eq!(sim.plant_count(), 0);
    }

    #[test]
    fn test_empty_population_tick_is_noop() {
        let mut sim = sim();
        let events = run(&mut sim, 3, 0.0);
        assert!(events.is_empty());
        assert_eq!(sim.tick_count(), 3);
    }

    #[test]
    fn test_plant_grows_to_harvested() {
        let mut sim = sim();
        let id = sim
            .register_plant("blue_dream", Position::default(), 0.0)
            .unwrap();
        let events = run(&mut sim, 400, 0.0);

        let state = sim.state(&id).unwrap();
        assert_eq!(state.stage, GrowthStage::Harvested);
        assert_eq!(state.growth_progress, 1.0);
        assert_eq!(sim.transitions(&id).len(), 7);

        let transitions = events
            .iter()
            .filter(|e| matches!(e, SimulationEvent::StageTransition { .. }))
            .count();
        assert_eq!(transitions, 7);
        let harvest_ready = events
            .iter()
            .filter(|e| matches!(e, SimulationEvent::MilestoneAchieved { milestone_id, .. } if milestone_id == "harvest_ready"))
            .count();
        assert_eq!(harvest_ready, 1);
    }

    #[test]
    fn test_end_of_stage_milestone_precedes_transition() {
        let mut sim = sim();
        let id = sim
            .register_plant("blue_dream", Position::default(), 0.0)
            .unwrap();
        let events = run(&mut sim, 400, 0.0);
        let germinated = events
            .iter()
            .position(|e| {
                matches!(e, SimulationEvent::MilestoneAchieved { milestone_id, .. } if milestone_id == "germinated")
            })
            .unwrap();
        let to_seedling = events
            .iter()
            .position(|e| {
                matches!(e, SimulationEvent::StageTransition { to: GrowthStage::Seedling, .. })
            })
            .unwrap();
        assert!(germinated < to_seedling);
        assert!(sim.achievements(&id).iter().any(|a| a.milestone_id == "germinated"));
    }

    #[test]
    fn test_subscribers_receive_tick_events() {
        let mut sim = sim();
        let rx = sim.subscribe();
        sim.register_plant("blue_dream", Position::default(), 0.0)
            .unwrap();
        let events = run(&mut sim, 20, 0.0);
        let received: Vec<_> = rx.try_iter().collect();
        assert_eq!(received, events);
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let mut sim = sim();
        drop(sim.subscribe());
        sim.register_plant("blue_dream", Position::default(), 0.0)
            .unwrap();
        run(&mut sim, 20, 0.0);
        assert!(sim.subscribers.is_empty());
    }

    #[test]
    fn test_missing_strain_warns_and_keeps_plant() {
        let mut sim = sim();
        let id = sim
            .register_plant("blue_dream", Position::default(), 0.0)
            .unwrap();
        sim.remove_strain("blue_dream");
        let events = run(&mut sim, 1, 0.0);
        assert!(matches!(
            events.as_slice(),
            [SimulationEvent::Warning { plant_id, .. }] if *plant_id == id
        ));
        let state = sim.state(&id).unwrap();
        assert!(state.active);
        assert_eq!(state.stage, GrowthStage::Seed);
        assert_eq!(sim.metrics().counter("missing_profile"), 1);
    }

    #[test]
    fn test_unregister_handle_removes_everything() {
        let mut sim = sim();
        let id = sim
            .register_plant("blue_dream", Position::default(), 0.0)
            .unwrap();
        run(&mut sim, 30, 0.0);
        assert!(!sim.transitions(&id).is_empty());

        let handle = sim.unregister_handle();
        let remote = std::thread::spawn(move || handle.request(id));
        remote.join().unwrap();
        let events = run(&mut sim, 1, 3.0);

        assert!(events.iter().all(|e| e.plant_id() != Some(id)));
        assert!(sim.state(&id).is_none());
        assert!(sim.genetics(&id).is_none());
        assert!(sim.transitions(&id).is_empty());
        assert!(sim.achievements(&id).is_empty());
        assert!(sim.targets().get(&id).is_none());
    }

    #[test]
    fn test_force_transition_and_harvest() {
        let mut sim = Simulation::new(
            {
                let mut c = config();
                c.simulation.auto_progression = false;
                c
            },
            StrainCatalog::builtin(),
        )
        .unwrap();
        let id = sim
            .register_plant("northern_lights", Position::default(), 0.0)
            .unwrap();

        let err = sim
            .force_transition(&id, GrowthStage::Flowering, 1.0)
            .unwrap_err();
        assert!(matches!(err, SimError::InvalidTransition { .. }));
        assert!(matches!(
            sim.harvest(&id, 1.0),
            Err(SimError::InvalidTransition { .. })
        ));

        let mut stage = GrowthStage::Seed;
        while let Some(next) = stage.next().filter(|s| *s != GrowthStage::Harvested) {
            assert!(sim.force_transition(&id, next, 2.0).unwrap().is_some());
            stage = next;
        }
        assert_eq!(sim.state(&id).unwrap().stage, GrowthStage::Harvest);

        let rx = sim.subscribe();
        let grams = sim.harvest(&id, 3.0).unwrap();
        assert!(grams > 0.0);
        assert_eq!(sim.state(&id).unwrap().stage, GrowthStage::Harvested);
        let events: Vec<_> = rx.try_iter().collect();
        assert!(events
            .iter()
            .any(|e| matches!(e, SimulationEvent::Harvested { .. })));
        assert_eq!(sim.harvest(&id, 4.0).unwrap(), 0.0);
        assert!(sim
            .force_transition(&id, GrowthStage::Harvested, 5.0)
            .unwrap()
            .is_none());
        assert_eq!(sim.transitions(&id).len(), 7);
    }

    #[test]
    fn test_seedling_from_parents() {
        let mut sim = sim();
        let a = sim
            .register_plant("northern_lights", Position::default(), 0.0)
            .unwrap();
        let b = sim
            .register_plant("durban_poison", Position::default(), 0.0)
            .unwrap();
        let child = sim
            .register_seedling("blue_dream", Position::default(), &[a, b], 1.0)
            .unwrap();
        assert_eq!(sim.genetics(&child).unwrap().generation, 1);

        let err = sim
            .register_seedling("blue_dream", Position::default(), &[a, b, child], 1.0)
            .unwrap_err();
        assert!(matches!(err, SimError::InvalidParents(3)));
        let err = sim
            .register_seedling("blue_dream", Position::default(), &[Uuid::nil()], 1.0)
            .unwrap_err();
        assert!(matches!(err, SimError::UnknownPlant(_)));
    }

    #[test]
    fn test_budget_limits_updates() {
        let mut sim = sim();
        for i in 0..10 {
            sim.register_plant("blue_dream", Position::new(i as f32, 0.0, 0.0), 0.0)
                .unwrap();
        }
        let env = EnvironmentalSample::default();
        let view = Viewpoint::default();
        let ctx = SimulationContext::new(1.0, 0.1, &env, &view).with_budget(Some(4));
        let report = sim.tick(&ctx);
        assert_eq!(report.updated, 4);
        assert_eq!(report.skipped, 6);
    }

    #[test]
    fn test_same_seed_same_outcome() {
        let outcome = || {
            let mut sim = sim();
            let ids: Vec<_> = (0..5)
                .map(|i| {
                    sim.register_plant("durban_poison", Position::new(i as f32, 0.0, 0.0), 0.0)
                        .unwrap()
                })
                .collect();
            let events = run(&mut sim, 50, 0.0);
            (ids, events, sim.snapshots())
        };
        assert_eq!(outcome(), outcome());
    }

    fn one_tick_progress() -> f32 {
        let mut sim = sim();
        let id = sim
            .register_plant("blue_dream", Position::default(), 0.0)
            .unwrap();
        run(&mut sim, 1, 0.0);
        sim.state(&id).unwrap().stage_progress
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = config();
        config.genetics.dominant_trait_probability = 1.5;
        let err = Simulation::new(config, StrainCatalog::builtin()).err().unwrap();
        assert!(matches!(err, SimError::Config(_)));
    }

    #[test]
    fn test_resumed_plant_does_not_catch_up() {
        let mut sim = sim();
        let id = sim
            .register_plant("blue_dream", Position::default(), 0.0)
            .unwrap();
        sim.set_active(&id, false, 0.0).unwrap();
        run(&mut sim, 100, 0.0);
        assert_eq!(sim.state(&id).unwrap().stage_progress, 0.0);

        sim.set_active(&id, true, 10.0).unwrap();
        run(&mut sim, 1, 10.0);
        let progress = sim.state(&id).unwrap().stage_progress;
        assert!((progress - one_tick_progress()).abs() < 1e-5, "progress {progress}");
    }

    #[test]
    fn test_missing_strain_ticks_are_not_credited() {
        let mut sim = sim();
        let id = sim
            .register_plant("blue_dream", Position::default(), 0.0)
            .unwrap();
        let strain = sim.remove_strain("blue_dream").unwrap();
        run(&mut sim, 100, 0.0);
        assert_eq!(sim.state(&id).unwrap().stage_progress, 0.0);

        sim.register_strain(StrainProfile::clone(&strain)).unwrap();
        run(&mut sim, 1, 10.0);
        let progress = sim.state(&id).unwrap().stage_progress;
        assert!((progress - one_tick_progress()).abs() < 1e-5, "progress {progress}");
    }

    #[test]
    fn test_harvested_plants_left_out_of_metrics() {
        let mut config = config();
        config.metrics.snapshot_interval_ticks = 1;
        let mut sim = Simulation::new(config, StrainCatalog::builtin()).unwrap();
        let done = sim
            .register_plant("blue_dream", Position::default(), 0.0)
            .unwrap();
        run(&mut sim, 400, 0.0);
        assert_eq!(sim.state(&done).unwrap().stage, GrowthStage::Harvested);

        let fresh = sim
            .register_plant("blue_dream", Position::new(1.0, 0.0, 0.0), 40.0)
            .unwrap();
        let env = EnvironmentalSample::default();
        let view = Viewpoint::default();
        let report = sim.tick(&SimulationContext::new(40.1, 0.1, &env, &view));
        assert_eq!(report.updated, 1);
        assert_eq!(report.skipped, 0);

        let snapshot = report
            .events
            .iter()
            .find_map(|e| match e {
                SimulationEvent::Metrics(snapshot) => Some(snapshot.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(snapshot.active_plants, 1);
        assert_eq!(snapshot.skipped, 0);
        assert_eq!(
            snapshot.average_growth_rate,
            sim.state(&fresh).unwrap().growth_rate
        );
    }
}
