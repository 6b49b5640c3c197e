//! Basic tests for lmnl-core

use lmnl_core::*;

fn range(start: usize, end: usize) -> RangeAddress {
    RangeAddress::new(start, end).unwrap()
}

#[test]
fn test_subtract_vectors() {
    assert_eq!(range(0, 20).subtract(&range(20, 40)).unwrap(), range(0, 20));
    assert_eq!(range(10, 20).subtract(&range(0, 10)).unwrap(), range(0, 10));
    assert_eq!(range(0, 20).subtract(&range(5, 15)).unwrap(), range(0, 10));
    assert_eq!(range(0, 10).subtract(&range(5, 26)).unwrap(), range(0, 5));
    assert_eq!(range(0, 20).subtract(&range(0, 20)).unwrap(), range(0, 0));
}

#[test]
fn test_subtract_shrink_and_shift() {
    assert_eq!(range(0, 20).subtract(&range(21, 40)).unwrap(), range(0, 20));
    assert_eq!(range(10, 20).subtract(&range(0, 9)).unwrap(), range(1, 11));
    assert_eq!(range(0, 20).subtract(&range(0, 10)).unwrap(), range(0, 10));
    assert_eq!(range(0, 20).subtract(&range(10, 20)).unwrap(), range(0, 10));
    assert_eq!(range(0, 20).subtract(&range(10, 30)).unwrap(), range(0, 10));
    assert_eq!(range(10, 20).subtract(&range(5, 15)).unwrap(), range(5, 10));
}

#[test]
fn test_subtract_rejects_enclosing_subtrahend() {
    assert_eq!(
        range(0, 20).subtract(&range(0, 40)),
        Err(CoreError::SubtractionDomain {
            start: 0,
            end: 20,
            subtrahend_start: 0,
            subtrahend_end: 40,
        })
    );
    assert!(matches!(
        range(10, 20).subtract(&range(0, 40)),
        Err(CoreError::SubtractionDomain { .. })
    ));
}

#[test]
fn test_encloses() {
    assert!(range(0, 40).encloses(&range(0, 20)));
    assert!(!range(0, 20).encloses(&range(0, 40)));
}

#[test]
fn test_length_and_apply() {
    let text = "The quick brown fox";
    let fox = range(16, 19);
    assert_eq!(fox.length(), 3);
    assert_eq!(fox.apply_to(text).unwrap(), "fox");
    assert!(range(16, 25).apply_to(text).is_err());
}

#[test]
fn test_range_into_std_range() {
    let r: core::ops::Range<usize> = range(2, 5).into();
    assert_eq!(r, 2..5);
    let pair: (usize, usize) = range(2, 5).into();
    assert_eq!(pair, (2, 5));
}

#[test]
fn test_qname_ordering_in_set() {
    let mut names = std::collections::BTreeSet::new();
    names.insert(QName::local("note"));
    names.insert(QName::new("http://lmnl.net/namespaces/lmnl", "document"));
    let first = names.iter().next().unwrap();
    assert_eq!(first.local_name(), "document");
}
