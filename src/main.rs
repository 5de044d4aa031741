use anyhow::{Context, Result};
use clap::Parser;
use verdant_lib::app::App;
use verdant_lib::model::catalog::StrainCatalog;
use verdant_lib::model::config::SimConfig;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Mode to run the simulation in
    #[arg(short, long, value_enum, default_value = "headless")]
    mode: Mode,

    /// Custom config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Strain catalog (TOML); the built-in catalog is used when omitted
    #[arg(short, long)]
    strains: Option<String>,

    /// Number of plants to seed
    #[arg(short, long, default_value_t = 1000)]
    plants: usize,

    /// Ticks to run (real-time mode runs until Ctrl-C when omitted)
    #[arg(short, long)]
    ticks: Option<u64>,

    /// RNG seed, overrides the config file
    #[arg(long)]
    seed: Option<u64>,

    /// Global growth time multiplier
    #[arg(long, default_value_t = 1.0)]
    time_multiplier: f32,

    /// Fast-forward growth
    #[arg(long)]
    accelerated: bool,

    /// Maximum full plant updates per tick
    #[arg(long)]
    budget: Option<usize>,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum Mode {
    Headless,
    Realtime,
}

const DEFAULT_HEADLESS_TICKS: u64 = 10_000;

#[tokio::main]
async fn main() -> Result<()> {
    verdant_core::init_logging();
    let args = Args::parse();

    let mut config = SimConfig::load_or_default(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config))?;
    if let Some(seed) = args.seed {
        config.simulation.seed = Some(seed);
        config.simulation.deterministic = true;
    }
    if args.budget.is_some() {
        config.scheduler.tick_budget = args.budget;
    }
    config.validate()?;

    let catalog = match &args.strains {
        Some(path) => StrainCatalog::load(path)?,
        None => StrainCatalog::builtin(),
    };

    let mut app = App::new(config, catalog)?;
    app.time.multiplier = args.time_multiplier;
    app.time.accelerated = args.accelerated;
    app.populate(args.plants)?;

    let summary = match args.mode {
        Mode::Headless => app.run_headless(args.ticks.unwrap_or(DEFAULT_HEADLESS_TICKS)),
        Mode::Realtime => app.run(args.ticks).await?,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
