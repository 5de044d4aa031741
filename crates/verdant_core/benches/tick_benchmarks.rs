use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use verdant_core::catalog::StrainCatalog;
use verdant_core::config::SimConfig;
use verdant_core::context::{SimulationContext, Viewpoint};
use verdant_core::simulation::Simulation;
use verdant_core::stress;
use verdant_data::{EnvironmentalSample, Position, StrainProfile};

fn populated(plants: usize) -> Simulation {
    let mut config = SimConfig::default();
    config.simulation.seed = Some(42);
    let mut sim = Simulation::new(config, StrainCatalog::builtin()).expect("default config");
    let strains = ["northern_lights", "blue_dream", "durban_poison"];
    for i in 0..plants {
        let position = Position::new((i % 100) as f32, 0.0, (i / 100) as f32);
        sim.register_plant(strains[i % strains.len()], position, 0.0)
            .expect("builtin strain");
    }
    sim
}

/// Benchmark one full tick over 10k plants.
fn bench_tick_10k(c: &mut Criterion) {
    let env = EnvironmentalSample::default();
    let view = Viewpoint::default();

    c.bench_function("tick_10k", |b| {
        b.iter_batched(
            || populated(10_000),
            |mut sim| {
                let report = sim.tick(&SimulationContext::new(1.0, 0.1, &env, &view));
                black_box(report)
            },
            BatchSize::LargeInput,
        )
    });
}

/// Benchmark a budgeted tick.
fn bench_tick_budgeted(c: &mut Criterion) {
    let env = EnvironmentalSample::default();
    let view = Viewpoint::default();

    c.bench_function("tick_10k_budget_2000", |b| {
        b.iter_batched(
            || populated(10_000),
            |mut sim| {
                let ctx = SimulationContext::new(1.0, 0.1, &env, &view).with_budget(Some(2000));
                black_box(sim.tick(&ctx))
            },
            BatchSize::LargeInput,
        )
    });
}

/// Benchmark stress evaluation.
fn bench_stress_evaluate(c: &mut Criterion) {
    let strain = StrainProfile::with_id("bench");
    let sample = EnvironmentalSample {
        temperature: 33.0,
        humidity: 25.0,
        ..Default::default()
    };

    c.bench_function("stress_evaluate", |b| {
        b.iter(|| black_box(stress::evaluate(black_box(&strain), black_box(&sample))))
    });
}

criterion_group!(
    benches,
    bench_tick_10k,
    bench_tick_budgeted,
    bench_stress_evaluate
);
criterion_main!(benches);
