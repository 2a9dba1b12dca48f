//! Property tests for the angle allocator.
//!
//! 1. Every item gets one angle in [0, 360), pairwise distinct, fixed angles kept.
//! 2. The same holds with a back link, and no item lands on it.
//! 3. Feeding an increasing result back as fixed angles reproduces it.
//! 4. A fixed angle near the back link fails for every threshold covering it.
//! 5. Non-increasing fixed angles always fail.

use corolla::menu::{AngleAllocator, LayoutError, angular_distance};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

/// Up to ten siblings, some of them fixed at strictly increasing tenths of a degree.
fn siblings() -> impl Strategy<Value = Vec<Option<f64>>> {
    (1usize..=10)
        .prop_flat_map(|n| {
            (
                proptest::collection::vec(any::<bool>(), n),
                proptest::collection::btree_set(0u32..3600, 0..=n),
            )
        })
        .prop_map(|(mask, angles)| {
            let mut angles = angles.into_iter().map(|a| f64::from(a) / 10.0);
            mask.into_iter()
                .map(|fixed| if fixed { angles.next() } else { None })
                .collect()
        })
}

fn check_layout(fixed: &[Option<f64>], angles: &[f64]) -> Result<(), TestCaseError> {
    prop_assert_eq!(angles.len(), fixed.len());
    for (i, &angle) in angles.iter().enumerate() {
        prop_assert!((0.0..360.0).contains(&angle), "angle {} of {:?}", angle, angles);
        if let Some(f) = fixed[i] {
            prop_assert_eq!(angle, f);
        }
        for &other in &angles[i + 1..] {
            prop_assert!(
                angular_distance(angle, other) > 1e-6,
                "duplicate angles in {:?}",
                angles
            );
        }
    }
    Ok(())
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Distinct, in range, fixed angles kept
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn layout_is_complete_and_distinct(fixed in siblings()) {
        let angles = AngleAllocator::default().allocate(&fixed, None).unwrap();
        check_layout(&fixed, &angles)?;
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Back link
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn layout_leaves_room_for_the_back_link(fixed in siblings(), back in 0.0f64..360.0) {
        let allocator = AngleAllocator::default();
        let collides = fixed
            .iter()
            .flatten()
            .any(|&a| angular_distance(a, back) <= allocator.collision_threshold());

        match allocator.allocate(&fixed, Some(back)) {
            Ok(angles) => {
                prop_assert!(!collides);
                check_layout(&fixed, &angles)?;
                for &angle in &angles {
                    prop_assert!(angular_distance(angle, back) > 1e-6, "{} on the back link", angle);
                }
            }
            Err(e) => {
                prop_assert!(collides, "unexpected {:?}", e);
                let is_collision = matches!(e, LayoutError::BackLinkCollision { .. });
                prop_assert!(is_collision);
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Idempotence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn increasing_results_are_stable(fixed in siblings()) {
        let allocator = AngleAllocator::default();
        let first = allocator.allocate(&fixed, None).unwrap();
        prop_assume!(first.windows(2).all(|w| w[0] < w[1]));

        let fed_back: Vec<_> = first.iter().copied().map(Some).collect();
        prop_assert_eq!(allocator.allocate(&fed_back, None).unwrap(), first);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Collision threshold
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn near_back_link_always_collides(
        angle in 0.0f64..360.0,
        delta in -1.0f64..=1.0,
        frac in 0.0f64..=1.0,
        free in 0usize..4,
    ) {
        let back = (angle + delta).rem_euclid(360.0);
        let distance = angular_distance(angle, back);
        prop_assume!(distance <= 1.0);
        let threshold = distance + frac * (1.0 - distance);

        let mut fixed = vec![None; free];
        fixed.push(Some(angle));

        let result = AngleAllocator::new(threshold).allocate(&fixed, Some(back));
        let is_collision = matches!(result, Err(LayoutError::BackLinkCollision { .. }));
        prop_assert!(is_collision, "{:?} with threshold {}", result, threshold);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Monotonicity
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn decreasing_fixed_angles_fail(
        n in 2usize..12,
        first in 0.0f64..360.0,
        drop in 0.0f64..=360.0,
        picks in (any::<prop::sample::Index>(), any::<prop::sample::Index>()),
    ) {
        let (a, b) = (picks.0.index(n), picks.1.index(n));
        prop_assume!(a != b);
        let (early, late) = (a.min(b), a.max(b));
        let second = (first - drop).max(0.0);

        let mut fixed = vec![None; n];
        fixed[early] = Some(first);
        fixed[late] = Some(second);

        let result = AngleAllocator::default().allocate(&fixed, None);
        prop_assert_eq!(
            result,
            Err(LayoutError::NotIncreasing { index: late, angle: second })
        );
    }
}
