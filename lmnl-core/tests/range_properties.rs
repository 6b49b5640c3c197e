//! Property-based tests for the range algebra
//!
//! These check the algebraic laws the event generator and the overlap
//! indexer rely on, over arbitrary valid ranges.

use lmnl_core::{CoreError, RangeAddress};
use proptest::prelude::*;

/// Generate valid ranges over a small offset space so relations collide often
fn range_strategy() -> impl Strategy<Value = RangeAddress> {
    (0usize..64, 0usize..32).prop_map(|(start, length)| {
        RangeAddress::new(start, start + length).unwrap()
    })
}

proptest! {
    #[test]
    fn encloses_is_reflexive(a in range_strategy()) {
        prop_assert!(a.encloses(&a));
    }

    #[test]
    fn encloses_is_antisymmetric(a in range_strategy(), b in range_strategy()) {
        if a.encloses(&b) && b.encloses(&a) {
            prop_assert_eq!(a, b);
        }
    }

    #[test]
    fn overlap_is_symmetric(a in range_strategy(), b in range_strategy()) {
        prop_assert_eq!(a.overlap_with(&b), b.overlap_with(&a));
        prop_assert_eq!(a.has_overlap_with(&b), b.has_overlap_with(&a));
    }

    #[test]
    fn ordering_agrees_with_equality(a in range_strategy(), b in range_strategy()) {
        prop_assert_eq!(a.cmp(&b) == core::cmp::Ordering::Equal, a == b);
    }

    #[test]
    fn ordering_is_start_asc_end_desc(a in range_strategy(), b in range_strategy()) {
        if a.start() < b.start() || (a.start() == b.start() && a.end() > b.end()) {
            prop_assert!(a < b);
        }
    }

    #[test]
    fn ordering_is_transitive(
        a in range_strategy(),
        b in range_strategy(),
        c in range_strategy(),
    ) {
        if a <= b && b <= c {
            prop_assert!(a <= c);
        }
    }

    #[test]
    fn subtracting_a_later_range_is_identity(a in range_strategy(), d in range_strategy()) {
        if a.precedes(&d) {
            prop_assert_eq!(a.subtract(&d).unwrap(), a);
        }
    }

    #[test]
    fn subtract_never_yields_invalid_ranges(a in range_strategy(), d in range_strategy()) {
        match a.subtract(&d) {
            Ok(result) => {
                prop_assert!(result.start() <= result.end());
                prop_assert!(result.length() <= a.length());
            }
            Err(CoreError::SubtractionDomain { .. }) => {
                prop_assert!(d.encloses(&a) && d != a);
            }
            Err(other) => prop_assert!(false, "unexpected error {}", other),
        }
    }

    #[test]
    fn intersection_is_enclosed_by_both(a in range_strategy(), b in range_strategy()) {
        if let Some(common) = a.intersection_with(&b) {
            prop_assert!(a.encloses(&common));
            prop_assert!(b.encloses(&common));
            prop_assert_eq!(common.length() as i64, a.overlap_with(&b));
        } else {
            prop_assert!(a.overlap_with(&b) < 0);
        }
    }
}
