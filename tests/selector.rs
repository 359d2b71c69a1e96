use memfo::{
    jump_steps, uniform_indices, ColumnSelector, PanCommand, Sample, SampleStore, StoreLimits,
    ViewState,
};

fn filled(upto: u64) -> SampleStore {
    let mut store = SampleStore::new(1);
    for t in 1..=upto {
        store.append(Sample::from_fields(t, [("Cached", t)]));
    }
    store
}

fn keys(columns: &[&Sample]) -> Vec<u64> {
    columns.iter().map(|s| s.time_key).collect()
}

#[test]
fn uniform_spreads_over_history_and_ends_live() {
    let store = filled(10);
    assert_eq!(uniform_indices(10, 3), [9, 4, 0]);

    let mut selector = ColumnSelector::new();
    let columns = selector.select_uniform(&store, 3);
    assert_eq!(keys(&columns), [1, 6, 10]);
}

#[test]
fn uniform_shows_everything_when_it_fits() {
    let store = filled(4);
    let mut selector = ColumnSelector::new();
    assert_eq!(keys(&selector.select_uniform(&store, 10)), [1, 2, 3, 4]);
    assert_eq!(keys(&selector.select_uniform(&store, 1)), [4]);
    assert!(selector.select_uniform(&store, 0).is_empty());
}

#[test]
fn fixed_interval_columns_hold_until_boundary() {
    let mut store = filled(20);
    let mut selector = ColumnSelector::new();
    assert_eq!(
        keys(&selector.select_fixed_interval(&store, 5, 4, true)),
        [5, 10, 15, 20]
    );

    for t in 21..=24 {
        store.append(Sample::from_fields(t, [("Cached", t)]));
        let columns = selector.select_fixed_interval(&store, 5, 4, false);
        assert_eq!(keys(&columns), [10, 15, 20, t]);
        assert_eq!(selector.state(), ViewState::Live);
    }
}

#[test]
fn live_boundary_is_strictly_older_than_live() {
    let store = filled(15);
    let mut selector = ColumnSelector::new();
    let columns = selector.select_fixed_interval(&store, 5, 3, true);
    assert_eq!(keys(&columns), [5, 10, 15]);
}

#[test]
fn panning_pins_and_survives_new_samples() {
    let mut store = filled(40);
    let mut selector = ColumnSelector::new();
    assert_eq!(
        keys(&selector.select_fixed_interval(&store, 5, 4, true)),
        [25, 30, 35, 40]
    );

    selector.queue_pan(PanCommand::Leftmost);
    assert_eq!(
        keys(&selector.select_fixed_interval(&store, 5, 4, false)),
        [5, 10, 15, 40]
    );
    assert_eq!(selector.pin(), Some(15));

    selector.queue_pan(PanCommand::Rightmost);
    selector.select_fixed_interval(&store, 5, 4, false);
    assert_eq!(selector.state(), ViewState::Live);

    selector.queue_pan(PanCommand::StepOlder);
    assert_eq!(
        keys(&selector.select_fixed_interval(&store, 5, 4, false)),
        [20, 25, 30, 40]
    );
    assert_eq!(selector.state(), ViewState::Pinned);

    for t in 41..=46 {
        store.append(Sample::from_fields(t, [("Cached", t)]));
        let columns = selector.select_fixed_interval(&store, 5, 4, false);
        assert_eq!(keys(&columns), [20, 25, 30, t]);
    }

    for _ in 0..3 {
        selector.queue_pan(PanCommand::StepNewer);
    }
    assert_eq!(
        keys(&selector.select_fixed_interval(&store, 5, 4, false)),
        [35, 40, 45, 46]
    );
    assert_eq!(selector.pin(), None);
}

#[test]
fn panning_clamps_at_oldest_page() {
    let store = filled(46);
    let mut selector = ColumnSelector::new();
    selector.select_fixed_interval(&store, 5, 4, true);
    for _ in 0..100 {
        selector.queue_pan(PanCommand::StepOlder);
    }
    let stepped = keys(&selector.select_fixed_interval(&store, 5, 4, false));
    assert_eq!(stepped, [5, 10, 15, 46]);
    assert_eq!(selector.pending(), 0);

    selector.queue_pan(PanCommand::JumpOlder);
    assert_eq!(keys(&selector.select_fixed_interval(&store, 5, 4, false)), stepped);
}

#[test]
fn mode_change_and_uniform_drop_the_pin() {
    let store = filled(40);
    let mut selector = ColumnSelector::new();
    selector.select_fixed_interval(&store, 5, 4, true);
    selector.queue_pan(PanCommand::Leftmost);
    selector.select_fixed_interval(&store, 5, 4, false);
    assert_eq!(selector.state(), ViewState::Pinned);

    let columns = selector.select_fixed_interval(&store, 5, 4, true);
    assert_eq!(keys(&columns), [25, 30, 35, 40]);
    assert_eq!(selector.state(), ViewState::Live);

    selector.queue_pan(PanCommand::StepOlder);
    selector.select_fixed_interval(&store, 5, 4, false);
    selector.queue_pan(PanCommand::StepOlder);
    selector.select_uniform(&store, 4);
    assert_eq!(selector.pin(), None);
    assert_eq!(selector.pending(), 0);
}

#[test]
fn degenerate_inputs_show_only_live() {
    let mut selector = ColumnSelector::new();
    let empty = SampleStore::new(1);
    assert!(selector
        .select_fixed_interval(&empty, 5, 4, true)
        .is_empty());

    let one = filled(1);
    assert_eq!(keys(&selector.select_fixed_interval(&one, 5, 4, true)), [1]);

    let store = filled(40);
    selector.queue_pan(PanCommand::StepOlder);
    assert_eq!(keys(&selector.select_fixed_interval(&store, 5, 1, false)), [40]);
    assert_eq!(selector.pending(), 0);
    assert_eq!(selector.state(), ViewState::Live);

    // No boundary inside the retained history yet.
    let short = filled(3);
    assert_eq!(keys(&selector.select_fixed_interval(&short, 60, 4, true)), [3]);
}

#[test]
fn interval_below_quantum_uses_quantum() {
    let limits = StoreLimits {
        max_samples: 10,
        retention_secs: 86_400,
    };
    let mut store = SampleStore::with_limits(1, limits);
    for t in 1..=40 {
        store.append(Sample::from_fields(t, [("Cached", t)]));
    }
    let q = store.quantum();
    assert!(q > 1);
    let mut selector = ColumnSelector::new();
    let columns = selector.select_fixed_interval(&store, 1, 4, true);
    let keys = keys(&columns);
    for pair in keys.windows(2).take(keys.len() - 2) {
        assert_eq!(pair[1] - pair[0], q);
    }
}

#[test]
fn jump_is_an_eighth_of_history() {
    assert_eq!(jump_steps(600, 5), 15);
    assert_eq!(jump_steps(600, 1), 75);
    assert_eq!(jump_steps(10, 5), 1);
}

#[test]
fn repeated_selection_without_new_data_is_stable() {
    let store = filled(90);
    let mut selector = ColumnSelector::new();
    let first = keys(&selector.select_fixed_interval(&store, 15, 5, true));
    assert_eq!(first, keys(&selector.select_fixed_interval(&store, 15, 5, false)));

    selector.queue_pan(PanCommand::JumpOlder);
    let pinned = keys(&selector.select_fixed_interval(&store, 15, 5, false));
    assert_ne!(pinned, first);
    assert_eq!(pinned, keys(&selector.select_fixed_interval(&store, 15, 5, false)));
}

#[test]
fn mode_change_discards_queued_pans() {
    let store = filled(40);
    let mut selector = ColumnSelector::new();
    selector.queue_pan(PanCommand::StepOlder);
    let columns = selector.select_fixed_interval(&store, 5, 4, true);
    assert_eq!(keys(&columns), [25, 30, 35, 40]);
    assert_eq!(selector.state(), ViewState::Live);
    assert_eq!(selector.pending(), 0);
}

#[test]
fn pin_is_found_again_after_compression() {
    let limits = StoreLimits {
        max_samples: 30,
        retention_secs: 86_400,
    };
    let mut store = SampleStore::with_limits(1, limits);
    for t in 1..=29 {
        store.append(Sample::from_fields(t, [("Cached", t)]));
    }
    let mut selector = ColumnSelector::new();
    selector.select_fixed_interval(&store, 5, 4, true);
    selector.queue_pan(PanCommand::StepOlder);
    assert_eq!(
        keys(&selector.select_fixed_interval(&store, 5, 4, false)),
        [10, 15, 20, 29]
    );
    assert_eq!(selector.pin(), Some(20));

    for t in 30..=35 {
        store.append(Sample::from_fields(t, [("Cached", t)]));
    }
    assert_eq!(store.quantum(), 5);
    assert_eq!(
        keys(&selector.select_fixed_interval(&store, 5, 4, false)),
        [10, 15, 20, 35]
    );
    assert_eq!(selector.pin(), Some(20));
    assert_eq!(selector.state(), ViewState::Pinned);
}

#[test]
fn pin_between_coarser_boundaries_rounds_to_even_step() {
    let limits = StoreLimits {
        max_samples: 12,
        retention_secs: 86_400,
    };
    let mut store = SampleStore::with_limits(1, limits);
    let mut t = 0;
    while store.quantum() < 15 {
        t += 1;
        store.append(Sample::from_fields(t, [("Cached", t)]));
    }
    let mut selector = ColumnSelector::new();
    selector.select_fixed_interval(&store, 15, 3, true);
    selector.queue_pan(PanCommand::StepOlder);
    assert_eq!(
        keys(&selector.select_fixed_interval(&store, 15, 3, false)),
        [30, 45, 75]
    );
    assert_eq!(selector.pin(), Some(45));

    while store.quantum() == 15 {
        t += 1;
        store.append(Sample::from_fields(t, [("Cached", t)]));
    }
    assert_eq!(store.quantum(), 30);
    // 45 sits 4.5 intervals behind the boundary at 180.
    assert_eq!(
        keys(&selector.select_fixed_interval(&store, 15, 3, false)),
        [30, 60, 210]
    );
    assert_eq!(selector.pin(), Some(60));
}
