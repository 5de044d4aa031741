use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

use crate::model::catalog::StrainCatalog;
use crate::model::climate::DayNightCycle;
use crate::model::config::SimConfig;
use crate::model::context::{SimulationContext, TimeControls, Viewpoint};
use crate::model::simulation::{Simulation, TickReport};
use crate::model::data::{PerformanceSnapshot, Position, SimulationEvent};
use crate::model::visual::VisualInterpolator;

/// Spacing between plants on the planting grid, metres.
const PLANT_SPACING: f32 = 1.5;

/// Totals reported when a run ends.
#[derive(Serialize, Debug, Clone, Default)]
pub struct RunSummary {
    pub ticks: u64,
    pub sim_seconds: f64,
    pub plants: usize,
    pub transitions: u64,
    pub milestones: u64,
    pub warnings: u64,
    pub harvested: u64,
    pub total_yield_grams: f64,
    pub stages: BTreeMap<String, usize>,
    pub average_health: f32,
    pub last_metrics: Option<PerformanceSnapshot>,
}

pub struct App {
    pub running: bool,
    pub paused: bool,
    pub config: SimConfig,
    pub sim: Simulation,
    pub climate: DayNightCycle,
    pub viewpoint: Viewpoint,
    pub time: TimeControls,
    pub tick_budget: Option<usize>,
    pub interpolator: VisualInterpolator,
    pub sim_time: f64,
    pub frame_count: u64,
    pub summary: RunSummary,
}

impl App {
    pub fn new(config: SimConfig, catalog: StrainCatalog) -> Result<Self> {
        let sim = Simulation::new(config.clone(), catalog)?;
        Ok(Self {
            running: true,
            paused: false,
            tick_budget: config.scheduler.tick_budget,
            config,
            sim,
            climate: DayNightCycle::default(),
            viewpoint: Viewpoint::default(),
            time: TimeControls::default(),
            interpolator: VisualInterpolator::default(),
            sim_time: 0.0,
            frame_count: 0,
            summary: RunSummary::default(),
        })
    }

    /// Plants `count` seeds on a square grid, cycling through the catalog.
    pub fn populate(&mut self, count: usize) -> Result<Vec<Uuid>> {
        let strains: Vec<String> = self.sim.catalog().ids().map(str::to_string).collect();
        anyhow::ensure!(!strains.is_empty(), "Strain catalog is empty");

        let columns = (count as f64).sqrt().ceil().max(1.0) as usize;
        let mut ids = Vec::with_capacity(count);
        for i in 0..count {
            let position = Position::new(
                (i % columns) as f32 * PLANT_SPACING,
                0.0,
                (i / columns) as f32 * PLANT_SPACING,
            );
            let strain = &strains[i % strains.len()];
            ids.push(self.sim.register_plant(strain, position, self.sim_time)?);
        }
        // Look at the middle of the bed.
        let centre = (columns as f32 - 1.0) * PLANT_SPACING * 0.5;
        self.viewpoint.position = Position::new(centre, 8.0, centre);
        tracing::info!(plants = count, strains = strains.len(), "Planted grow room");
        Ok(ids)
    }

    /// Runs one growth tick at the configured tick interval.
    pub fn step(&mut self) -> TickReport {
        let dt = self.config.tick_interval();
        self.sim_time += dt;
        let sample = self.climate.sample(self.sim_time);
        let ctx = SimulationContext::new(self.sim_time, dt, &sample, &self.viewpoint)
            .with_time(self.time)
            .with_budget(self.tick_budget);
        let report = self.sim.tick(&ctx);
        self.absorb(&report);
        if self.config.simulation.hold_at_harvest {
            self.harvest_ready(&report);
        }
        report
    }

    /// Advances displayed visuals by `dt` seconds of wall time.
    pub fn frame(&mut self, dt: f32) {
        self.interpolator.frame(self.sim.targets(), dt);
        self.frame_count += 1;
    }

    fn absorb(&mut self, report: &TickReport) {
        self.summary.ticks = report.tick;
        for event in &report.events {
            match event {
                SimulationEvent::StageTransition { .. } => self.summary.transitions += 1,
                SimulationEvent::MilestoneAchieved { .. } => self.summary.milestones += 1,
                SimulationEvent::Warning { .. } => self.summary.warnings += 1,
                SimulationEvent::Harvested { .. } => {}
                SimulationEvent::Metrics(snapshot) => {
                    self.summary.last_metrics = Some(snapshot.clone());
                }
            }
        }
    }

    /// Cuts every plant that reached `harvest_ready` this tick.
    fn harvest_ready(&mut self, report: &TickReport) {
        let ready: Vec<Uuid> = report
            .events
            .iter()
            .filter_map(|e| match e {
                SimulationEvent::MilestoneAchieved {
                    plant_id,
                    milestone_id,
                    ..
                } if milestone_id == "harvest_ready" => Some(*plant_id),
                _ => None,
            })
            .collect();
        for plant_id in ready {
            match self.sim.harvest(&plant_id, self.sim_time) {
                Ok(grams) => {
                    self.summary.harvested += 1;
                    self.summary.total_yield_grams += f64::from(grams);
                }
                Err(e) => tracing::warn!(%plant_id, error = %e, "Harvest failed"),
            }
        }
    }

    /// Ticks as fast as possible, skipping the frame loop.
    pub fn run_headless(&mut self, ticks: u64) -> RunSummary {
        let started = Instant::now();
        for _ in 0..ticks {
            if !self.running {
                break;
            }
            self.step();
        }
        tracing::info!(
            ticks,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Headless run finished"
        );
        self.finish()
    }

    /// Real-time run: a fixed-rate growth tick and a variable-rate frame
    /// loop share one task. Stops after `ticks` ticks, or on Ctrl-C.
    pub async fn run(&mut self, ticks: Option<u64>) -> Result<RunSummary> {
        let mut tick_timer =
            tokio::time::interval(Duration::from_secs_f64(self.config.tick_interval()));
        tick_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut frame_timer = tokio::time::interval(Duration::from_secs_f64(
            1.0 / self.config.simulation.frame_rate_hz,
        ));
        frame_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last_frame = Instant::now();
        let mut done = 0u64;

        while self.running {
            tokio::select! {
                _ = tick_timer.tick() => {
                    if self.paused {
                        continue;
                    }
                    self.step();
                    done += 1;
                    if ticks.is_some_and(|limit| done >= limit) {
                        self.running = false;
                    }
                }
                _ = frame_timer.tick() => {
                    let dt = last_frame.elapsed().as_secs_f32();
                    last_frame = Instant::now();
                    self.frame(dt);
                }
                signal = tokio::signal::ctrl_c() => {
                    signal?;
                    tracing::info!("Shutdown requested");
                    self.running = false;
                }
            }
        }
        Ok(self.finish())
    }

    fn finish(&mut self) -> RunSummary {
        let snapshots = self.sim.snapshots();
        let mut summary = self.summary.clone();
        summary.sim_seconds = self.sim_time;
        summary.plants = snapshots.len();
        summary.stages = BTreeMap::new();
        for snapshot in &snapshots {
            *summary.stages.entry(snapshot.stage.to_string()).or_insert(0) += 1;
        }
        summary.average_health = if snapshots.is_empty() {
            0.0
        } else {
            snapshots.iter().map(|s| s.health).sum::<f32>() / snapshots.len() as f32
        };
        summary
    }
}
