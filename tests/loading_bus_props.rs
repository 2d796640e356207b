//! Property tests for loading bus counter invariants

use blogdesk::{LoadingBus, PendingKind};
use parking_lot::Mutex;
use proptest::prelude::*;
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
enum Op {
    Increment(PendingKind),
    Decrement(PendingKind),
}

fn kind() -> impl Strategy<Value = PendingKind> {
    prop_oneof![Just(PendingKind::Network), Just(PendingKind::Image)]
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![kind().prop_map(Op::Increment), kind().prop_map(Op::Decrement)]
}

proptest! {
    #[test]
    fn counters_never_go_negative_and_flag_tracks_counts(ops in prop::collection::vec(op(), 0..200)) {
        let bus = LoadingBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = bus.subscribe(move |state| sink.lock().push(state));

        let (mut network, mut image) = (0usize, 0usize);
        let mut clamped = 0u64;
        for op in &ops {
            match *op {
                Op::Increment(PendingKind::Network) => network += 1,
                Op::Increment(PendingKind::Image) => image += 1,
                Op::Decrement(PendingKind::Network) => {
                    if network == 0 { clamped += 1 } else { network -= 1 }
                }
                Op::Decrement(PendingKind::Image) => {
                    if image == 0 { clamped += 1 } else { image -= 1 }
                }
            }
            match *op {
                Op::Increment(k) => bus.increment(k),
                Op::Decrement(k) => bus.decrement(k),
            }
            let state = bus.state();
            prop_assert_eq!(state.network_pending(), network);
            prop_assert_eq!(state.image_pending(), image);
            prop_assert_eq!(state.is_loading(), network + image > 0);
        }

        // One notification per operation, each carrying a consistent flag
        let seen = seen.lock();
        prop_assert_eq!(seen.len(), ops.len());
        for state in seen.iter() {
            prop_assert_eq!(state.is_loading(), state.total_pending() > 0);
        }
        prop_assert_eq!(bus.metrics().snapshot().clamped_decrements, clamped);
    }

    #[test]
    fn balanced_operations_end_idle(counts in prop::collection::vec((kind(), 1usize..5), 1..20)) {
        let bus = LoadingBus::new();
        for (k, n) in &counts {
            for _ in 0..*n {
                bus.increment(*k);
            }
        }
        prop_assert!(bus.is_loading());
        for (k, n) in counts.iter().rev() {
            for _ in 0..*n {
                bus.decrement(*k);
            }
        }
        prop_assert!(!bus.is_loading());
        let metrics = bus.metrics().snapshot();
        prop_assert_eq!(metrics.outstanding(), 0);
        prop_assert_eq!(metrics.clamped_decrements, 0);
        prop_assert_eq!(metrics.peak_pending, counts.iter().map(|(_, n)| *n).sum::<usize>());
    }
}
