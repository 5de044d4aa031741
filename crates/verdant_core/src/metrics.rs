//! Performance metrics collection for the simulation.
//!
//! Provides structured logging and periodic throughput snapshots.

use std::collections::BTreeMap;
use verdant_data::PerformanceSnapshot;

/// Per-tick figures fed into [`Metrics::record_tick`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TickStats {
    pub now: f64,
    pub active_plants: usize,
    pub updated: usize,
    pub skipped: usize,
    pub average_growth_rate: f32,
}

/// Metrics collector owned by a simulation.
#[derive(Debug, Clone)]
pub struct Metrics {
    tick_count: u64,
    snapshot_interval: u64,
    window_start: Option<f64>,
    window_updates: u64,
    total_updates: u64,
    counters: BTreeMap<String, u64>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Metrics {
    /// Creates a collector emitting a snapshot every `snapshot_interval` ticks.
    #[must_use]
    pub fn new(snapshot_interval: u64) -> Self {
        Self {
            tick_count: 0,
            snapshot_interval: snapshot_interval.max(1),
            window_start: None,
            window_updates: 0,
            total_updates: 0,
            counters: BTreeMap::new(),
        }
    }

    /// Records a completed tick. Returns a snapshot on every
    /// `snapshot_interval`-th tick.
    pub fn record_tick(&mut self, stats: TickStats) -> Option<PerformanceSnapshot> {
        self.tick_count += 1;
        self.window_updates += stats.updated as u64;
        self.total_updates += stats.updated as u64;
        let window_start = *self.window_start.get_or_insert(stats.now);

        if !self.tick_count.is_multiple_of(self.snapshot_interval) {
            return None;
        }

        let elapsed = stats.now - window_start;
        let updates_per_second = if elapsed > 0.0 {
            self.window_updates as f64 / elapsed
        } else {
            0.0
        };
        let snapshot = PerformanceSnapshot {
            tick: self.tick_count,
            active_plants: stats.active_plants,
            average_growth_rate: stats.average_growth_rate,
            updates_per_second,
            updated: stats.updated,
            skipped: stats.skipped,
        };
        tracing::info!(
            tick = snapshot.tick,
            active_plants = snapshot.active_plants,
            average_growth_rate = snapshot.average_growth_rate,
            updates_per_second = snapshot.updates_per_second,
            "Simulation tick"
        );

        self.window_start = Some(stats.now);
        self.window_updates = 0;
        Some(snapshot)
    }

    /// Increments a named counter.
    pub fn increment_counter(&mut self, name: &str) {
        *self.counters.entry(name.to_string()).or_insert(0) += 1;
    }

    #[must_use]
    pub fn counter(&self, name: &str) -> u64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    /// Gets the current tick count.
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Full plant updates since creation.
    #[must_use]
    pub fn total_updates(&self) -> u64 {
        self.total_updates
    }
}

/// Initialize tracing subscriber for logging.
///
/// Honours `RUST_LOG`, defaulting to `info`.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(filter)
            .finish(),
    )
    .ok();
}
