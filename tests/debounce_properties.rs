// tests/debounce_properties.rs
use std::path::Path;
use std::time::{Duration, Instant};

use proptest::prelude::*;

use devloop::watch::Debouncer;

proptest! {
    /// The second event for a path is accepted iff it arrives at least one
    /// window after the first.
    #[test]
    fn second_event_accepted_iff_window_elapsed(window_ms in 0u64..5_000, gap_ms in 0u64..10_000) {
        let mut debouncer = Debouncer::new(Duration::from_millis(window_ms));
        let t0 = Instant::now();
        let path = Path::new("/repo/app.go");

        prop_assert!(debouncer.accept(path, t0));
        let accepted = debouncer.accept(path, t0 + Duration::from_millis(gap_ms));
        prop_assert_eq!(accepted, gap_ms >= window_ms);
    }

    /// Accepted events for one path are always at least a window apart, and
    /// the first event of any burst is never dropped.
    #[test]
    fn accepted_events_are_spaced_by_the_window(
        window_ms in 1u64..2_000,
        gaps in proptest::collection::vec(0u64..1_500, 1..40),
    ) {
        let window = Duration::from_millis(window_ms);
        let mut debouncer = Debouncer::new(window);
        let path = Path::new("/repo/app.go");

        let mut now = Instant::now();
        let mut last_accepted: Option<Instant> = None;
        for gap in gaps {
            now += Duration::from_millis(gap);
            let expected = last_accepted.is_none_or(|last| now - last >= window);
            let accepted = debouncer.accept(path, now);
            prop_assert_eq!(accepted, expected);
            if accepted {
                last_accepted = Some(now);
            }
        }
    }

    /// Paths never debounce each other.
    #[test]
    fn distinct_paths_are_independent(count in 1usize..64) {
        let mut debouncer = Debouncer::new(Duration::from_secs(60));
        let now = Instant::now();
        for i in 0..count {
            let path = format!("/repo/f{i}.go");
            prop_assert!(debouncer.accept(Path::new(&path), now));
        }
        prop_assert_eq!(debouncer.len(), count);
    }
}
