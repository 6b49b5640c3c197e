//! Overlap index tests over document annotations

use lmnl_engine::*;

fn range(start: usize, end: usize) -> RangeAddress {
    RangeAddress::new(start, end).unwrap()
}

/// Document over "abcdef" with `a[0,2] b[1,4] c[0,1] d[0,6] e[2,3]`
fn sample() -> Document {
    let mut doc = Document::new("abcdef");
    let root = doc.root();
    for (name, start, end) in [("a", 0, 2), ("b", 1, 4), ("c", 0, 1), ("d", 0, 6), ("e", 2, 3)] {
        doc.add(root, "lmnl", name, None, range(start, end), AnnotationKind::Annotation)
            .unwrap();
    }
    doc
}

fn names(entries: &[AnnotationRef<'_>]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| entry.node().unwrap().name().local_name().to_string())
        .collect()
}

#[test]
fn test_every_annotation_as_key() {
    let doc = sample();
    let entries = doc.annotation_refs(doc.root()).unwrap();
    let index = OverlapIndexer::new().index(&entries);

    let keys: Vec<RangeAddress> = index.keys().copied().collect();
    assert_eq!(
        keys,
        vec![range(0, 6), range(0, 2), range(0, 1), range(1, 4), range(2, 3)]
    );

    assert_eq!(names(&index[&range(0, 6)]), vec!["a", "b", "c", "d", "e"]);
    assert_eq!(names(&index[&range(0, 2)]), vec!["a", "b", "c", "d"]);
    assert_eq!(names(&index[&range(0, 1)]), vec!["a", "c", "d"]);
    assert_eq!(names(&index[&range(1, 4)]), vec!["a", "b", "d", "e"]);
    assert_eq!(names(&index[&range(2, 3)]), vec!["b", "d", "e"]);
}

#[test]
fn test_partition_restricts_keys_not_values() {
    let doc = sample();
    let entries = doc.annotation_refs(doc.root()).unwrap();
    let indexer = OverlapIndexer::with_partition(|entry: &AnnotationRef<'_>| {
        entry.range().length() <= 1
    });
    let index = indexer.index(&entries);

    assert_eq!(index.len(), 2);
    assert_eq!(names(&index[&range(0, 1)]), vec!["a", "c", "d"]);
    assert_eq!(names(&index[&range(2, 3)]), vec!["b", "d", "e"]);
}

#[test]
fn test_index_entries_expose_text() {
    let doc = sample();
    let entries = doc.annotation_refs(doc.root()).unwrap();
    let index = OverlapIndexer::new().index(&entries);

    let texts: Vec<&str> = index[&range(2, 3)]
        .iter()
        .map(|entry| entry.text().unwrap())
        .collect();
    assert_eq!(texts, vec!["bcd", "abcdef", "c"]);
}

#[test]
fn test_annotation_refs_of_stale_layer() {
    let mut doc = sample();
    let root = doc.root();
    let first = doc.children(root).unwrap()[0];
    doc.remove(root, first).unwrap();

    assert!(matches!(
        doc.annotation_refs(first),
        Err(LomError::StaleNode { .. })
    ));
    assert_eq!(doc.annotation_refs(root).unwrap().len(), 4);
}

#[test]
fn test_refs_compare_by_document_and_handle() {
    let doc = sample();
    let other = sample();
    let id = doc.children(doc.root()).unwrap()[1];

    let left = AnnotationRef::new(&doc, id).unwrap();
    let right = AnnotationRef::new(&doc, id).unwrap();
    let elsewhere = AnnotationRef::new(&other, id).unwrap();
    assert_eq!(left, right);
    assert_ne!(left, elsewhere);
    assert_eq!(left.id(), id);
}

#[test]
fn test_plain_ranges_with_point_keys() {
    let entries = [range(0, 3), range(3, 3), range(3, 5), range(1, 4)];
    let index = OverlapIndexer::new().index(&entries);

    assert_eq!(index[&range(3, 3)], vec![range(3, 3), range(3, 5)]);
    assert_eq!(index[&range(0, 3)], vec![range(0, 3), range(1, 4)]);
    assert_eq!(index[&range(3, 5)], vec![range(3, 3), range(3, 5), range(1, 4)]);
}
