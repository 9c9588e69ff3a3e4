//! Property-based invariant tests for the debouncer and destroy signal.
//!
//! 1. Any burst of pushes whose gaps are shorter than the window releases
//!    exactly one value: the last one.
//! 2. Nothing is released before the window elapses after the last push.
//! 3. Firing a destroy signal any number of times runs each hook once.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use proptest::prelude::*;
use shelfkit_core::{Debouncer, DestroySignal, Duration, Instant};

proptest! {
    #[test]
    fn burst_releases_last_value_once(gaps in proptest::collection::vec(0u64..200, 1..20)) {
        let window = Duration::from_millis(200);
        let start = Instant::now();
        let mut d = Debouncer::new(window);
        let mut t = start;
        for (i, gap) in gaps.iter().enumerate() {
            t += Duration::from_millis(*gap);
            d.push(i, t);
            // Polling mid-burst never releases.
            prop_assert!(d.poll(t).is_none());
        }
        let released: Vec<usize> = (0..10)
            .filter_map(|step| d.poll(t + window + Duration::from_millis(step * 50)))
            .collect();
        prop_assert_eq!(released, vec![gaps.len() - 1]);
    }

    #[test]
    fn nothing_before_window(window_ms in 1u64..1000, probe in 0u64..1000) {
        let window = Duration::from_millis(window_ms);
        let t = Instant::now();
        let mut d = Debouncer::new(window);
        d.push((), t);
        let result = d.poll(t + Duration::from_millis(probe));
        prop_assert_eq!(result.is_some(), probe >= window_ms);
    }

    #[test]
    fn destroy_hooks_run_once(hooks in 0usize..10, fires in 1usize..5) {
        let signal = DestroySignal::new();
        let count = Arc::new(AtomicUsize::new(0));
        for _ in 0..hooks {
            let c = Arc::clone(&count);
            signal.on_destroy(move || { c.fetch_add(1, Ordering::SeqCst); });
        }
        let fired: usize = (0..fires).map(|_| usize::from(signal.fire())).sum();
        prop_assert_eq!(fired, 1);
        prop_assert_eq!(count.load(Ordering::SeqCst), hooks);
    }
}
