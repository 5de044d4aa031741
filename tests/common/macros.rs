/// Asserts that a plant is in the given growth stage.
#[macro_export]
macro_rules! assert_stage {
    ($sim:expr, $id:expr, $stage:expr) => {
        let state = $sim.state(&$id).expect("Plant not found in simulation");
        assert_eq!(
            state.stage, $stage,
            "Plant {} is in {:?}, expected {:?}",
            $id, state.stage, $stage
        );
    };
}

/// Asserts that a plant has been removed along with its records.
#[macro_export]
macro_rules! assert_plant_gone {
    ($sim:expr, $id:expr) => {
        assert!($sim.state(&$id).is_none(), "Plant {} still registered", $id);
        assert!($sim.genetics(&$id).is_none(), "Plant {} genetics kept", $id);
        assert!(
            $sim.transitions(&$id).is_empty(),
            "Plant {} transition log kept",
            $id
        );
        assert!(
            $sim.achievements(&$id).is_empty(),
            "Plant {} achievements kept",
            $id
        );
    };
}

/// Counts events matching a pattern.
#[macro_export]
macro_rules! count_events {
    ($events:expr, $pattern:pat) => {
        $events.iter().filter(|e| matches!(e, $pattern)).count()
    };
}
