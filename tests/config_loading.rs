use verdant_lib::model::catalog::StrainCatalog;
use verdant_lib::model::config::SimConfig;
use verdant_lib::model::data::{GrowthStage, Morphology};
use verdant_lib::model::stress::StressAggregator;

#[test]
fn test_shipped_config_parses() {
    let config = SimConfig::from_toml(include_str!("../config.toml")).unwrap();
    assert_eq!(config.simulation.seed, Some(42));
    assert!(config.simulation.hold_at_harvest);
    assert_eq!(config.stress.aggregator, StressAggregator::Mean);
    assert_eq!(config.growth.stage_durations.duration(GrowthStage::Flowering), 360.0);
    assert_eq!(config.metrics.snapshot_interval_ticks, 100);
    assert!((config.tick_interval() - 0.1).abs() < 1e-12);
}

#[test]
fn test_partial_config_keeps_defaults() {
    let config = SimConfig::from_toml("[scheduler]\ntick_budget = 500\n").unwrap();
    let defaults = SimConfig::default();
    assert_eq!(config.scheduler.tick_budget, Some(500));
    assert_eq!(config.growth.base_rate, defaults.growth.base_rate);
    assert_eq!(config.simulation.tick_rate_hz, defaults.simulation.tick_rate_hz);
}

#[test]
fn test_invalid_config_rejected() {
    assert!(SimConfig::from_toml("[simulation]\ntick_rate_hz = 0.0\n").is_err());
    assert!(SimConfig::from_toml("[metrics]\nsnapshot_interval_ticks = 0\n").is_err());
    assert!(SimConfig::from_toml("[health]\nrecovery_threshold = 2.0\n").is_err());
}

#[test]
fn test_missing_config_falls_back_to_defaults() {
    let config = SimConfig::load_or_default("does/not/exist.toml").unwrap();
    assert_eq!(config.simulation.tick_rate_hz, SimConfig::default().simulation.tick_rate_hz);
}

#[test]
fn test_shipped_strains_parse() {
    let catalog = StrainCatalog::from_toml(include_str!("../strains.toml")).unwrap();
    assert_eq!(catalog.len(), 2);

    let nl = catalog.get("northern_lights").unwrap();
    assert_eq!(nl.morphology, Morphology::Compact);
    assert_eq!(nl.optimal.temperature.max, 26.0);
    assert_eq!(nl.extra_traits.get("terpene_intensity"), Some(&0.8));

    let dp = catalog.get("durban_poison").unwrap();
    assert_eq!(dp.morphology, Morphology::Tall);
    assert_eq!(dp.stress_response.temperature.sensitivity, 0.8);
    assert_eq!(dp.variation.size.max, 1.25);
}
