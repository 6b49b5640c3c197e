//! Overlap indexing
//!
//! [`OverlapIndexer`] answers "which entries intersect the span of entry X"
//! for a chosen set of keys in one sweep. Keys are visited in range order;
//! entries ending before the current key and starting before it are evicted
//! from the candidate list, as no later key can reach them.

use crate::document::Document;
use crate::error::Result;
use crate::node::{Node, NodeId};
use lmnl_core::RangeAddress;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::trace;

/// Anything addressing a text segment
pub trait Ranged {
    /// The addressed segment
    fn range(&self) -> RangeAddress;
}

impl Ranged for RangeAddress {
    fn range(&self) -> RangeAddress {
        *self
    }
}

impl<T: Ranged + ?Sized> Ranged for &T {
    fn range(&self) -> RangeAddress {
        (**self).range()
    }
}

/// Borrowed view of one annotation of a document
#[derive(Clone, Copy)]
pub struct AnnotationRef<'a> {
    document: &'a Document,
    id: NodeId,
    range: RangeAddress,
}

impl<'a> AnnotationRef<'a> {
    /// View of the annotation `id`
    pub fn new(document: &'a Document, id: NodeId) -> Result<Self> {
        Ok(Self {
            document,
            id,
            range: document.range(id)?,
        })
    }

    /// Handle of the annotation
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The annotation's node
    pub fn node(&self) -> Result<&'a Node> {
        self.document.node(self.id)
    }

    /// Text of the owner addressed by the annotation
    pub fn text(&self) -> Result<&'a str> {
        self.document.segment_text(self.id)
    }
}

impl Ranged for AnnotationRef<'_> {
    fn range(&self) -> RangeAddress {
        self.range
    }
}

impl PartialEq for AnnotationRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.document, other.document) && self.id == other.id
    }
}

impl Eq for AnnotationRef<'_> {}

impl fmt::Debug for AnnotationRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnotationRef")
            .field("id", &self.id)
            .field("range", &self.range)
            .finish()
    }
}

impl Document {
    /// Views of the direct children of `layer`, in children order
    pub fn annotation_refs(&self, layer: NodeId) -> Result<Vec<AnnotationRef<'_>>> {
        self.children(layer)?
            .iter()
            .map(|&child| AnnotationRef::new(self, child))
            .collect()
    }
}

/// Sweep building a map from key ranges to the entries overlapping them
pub struct OverlapIndexer<T> {
    partition: Option<Box<dyn Fn(&T) -> bool>>,
}

impl<T> Default for OverlapIndexer<T> {
    fn default() -> Self {
        Self { partition: None }
    }
}

impl<T> fmt::Debug for OverlapIndexer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverlapIndexer")
            .field("partitioned", &self.partition.is_some())
            .finish()
    }
}

impl<T: Ranged + Clone> OverlapIndexer<T> {
    /// Indexer using every entry as a key
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexer using only the entries accepted by `partition` as keys
    pub fn with_partition<P>(partition: P) -> Self
    where
        P: Fn(&T) -> bool + 'static,
    {
        Self {
            partition: Some(Box::new(partition)),
        }
    }

    /// Map every key range to the entries overlapping it or sharing its start
    ///
    /// Keys are distinct ranges, so entries with identical ranges share one
    /// key. Each result list keeps the order of `entries`.
    pub fn index(&self, entries: &[T]) -> BTreeMap<RangeAddress, Vec<T>> {
        let keys: BTreeSet<RangeAddress> = entries
            .iter()
            .filter(|entry| self.partition.as_ref().map_or(true, |accept| accept(*entry)))
            .map(Ranged::range)
            .collect();

        let mut candidates: Vec<&T> = entries.iter().collect();
        let mut index = BTreeMap::new();
        for segment in keys {
            let mut overlapping = Vec::new();
            candidates.retain(|candidate| {
                let range = candidate.range();
                if range.has_overlap_with(&segment) || range.start() == segment.start() {
                    overlapping.push((*candidate).clone());
                }
                // a point range at the key start is still reached by later keys
                let expired = range.precedes(&segment) && range.start() < segment.start();
                if expired {
                    trace!(%range, %segment, "evicting candidate");
                }
                !expired
            });
            index.insert(segment, overlapping);
        }
        index
    }
}
