use proptest::prelude::*;
use uuid::Uuid;
use verdant_lib::model::scheduler::{priority_for, Priority, SchedulingCandidate, UpdateScheduler};
use verdant_lib::model::data::GrowthStage;

prop_compose! {
    fn arb_candidate()(
        id in any::<u128>(),
        stage in 0usize..GrowthStage::ALL.len(),
        distance in prop::option::of(0.0f32..500.0),
        last_update in 0.0f64..100.0,
        active in prop::bool::weighted(0.9)
    ) -> SchedulingCandidate {
        SchedulingCandidate {
            plant_id: Uuid::from_u128(id),
            stage: GrowthStage::ALL[stage],
            distance,
            last_update,
            active,
        }
    }
}

fn is_high(c: &SchedulingCandidate) -> bool {
    c.active && priority_for(c.stage) == Priority::High
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn test_high_priority_always_fit_in_budget(
        candidates in prop::collection::vec(arb_candidate(), 0..60),
        slack in 0usize..20
    ) {
        let scheduler = UpdateScheduler::default();
        let high: Vec<Uuid> = candidates.iter().filter(|c| is_high(c)).map(|c| c.plant_id).collect();
        let budget = high.len() + slack;
        let selected = scheduler.select_for_update(&candidates, 100.0, Some(budget));
        prop_assert!(selected.len() <= budget);
        for id in &high {
            prop_assert!(selected.contains(id), "high priority plant {} dropped", id);
        }
    }

    #[test]
    fn test_selection_respects_budget_and_activity(
        candidates in prop::collection::vec(arb_candidate(), 0..60),
        budget in prop::option::of(0usize..30)
    ) {
        let scheduler = UpdateScheduler::default();
        let selected = scheduler.select_for_update(&candidates, 100.0, budget);
        if let Some(b) = budget {
            prop_assert!(selected.len() <= b);
        }
        prop_assert!(selected.windows(2).all(|w| w[0] <= w[1]));
        for id in &selected {
            let c = candidates.iter().find(|c| c.plant_id == *id).unwrap();
            prop_assert!(c.active);
            prop_assert!(c.stage != GrowthStage::Harvested);
        }
    }

    #[test]
    fn test_distance_factor_bounds(distance in prop::option::of(-10.0f32..1e6)) {
        let scheduler = UpdateScheduler::default();
        let f = scheduler.distance_factor(distance);
        prop_assert!(f >= scheduler.min_distance_factor);
        prop_assert!(f <= 1.0);
    }

    #[test]
    fn test_farther_never_updates_more_often(near in 0.1f32..100.0, extra in 0.0f32..1000.0) {
        let scheduler = UpdateScheduler::default();
        let candidate = |distance| SchedulingCandidate {
            plant_id: Uuid::nil(),
            stage: GrowthStage::Vegetative,
            distance: Some(distance),
            last_update: 0.0,
            active: true,
        };
        prop_assert!(scheduler.interval_for(&candidate(near + extra)) >= scheduler.interval_for(&candidate(near)));
    }
}
