//! Query surface over the annotations of a layer
//!
//! [`AnnotationRepository`] decouples lookups from the in-memory tree so the
//! same queries can be served by other backends. [`Document`] is the
//! in-memory implementation.

use crate::document::Document;
use crate::error::Result;
use crate::node::{AnnotationKind, NodeId};
use lmnl_core::{QName, RangeAddress};
use std::collections::BTreeSet;

/// Finder and mutator for the direct children of a layer
pub trait AnnotationRepository {
    /// Direct children of `layer` matching the filters, in range order
    ///
    /// * `names`: keep children whose name is in the set
    /// * `ranges`: keep children related to at least one query range, where
    ///   `overlapping` selects half-open overlap
    ///   (`start < query.end && end > query.start`) and its negation selects
    ///   containment in the query range
    fn find(
        &self,
        layer: NodeId,
        names: Option<&BTreeSet<QName>>,
        ranges: Option<&[RangeAddress]>,
        overlapping: bool,
    ) -> Result<Vec<NodeId>>;

    /// All direct children of `layer`, in range order
    fn find_all(&self, layer: NodeId) -> Result<Vec<NodeId>> {
        self.find(layer, None, None, true)
    }

    /// Direct children of `layer` with one of the given names
    fn find_named(&self, layer: NodeId, names: &BTreeSet<QName>) -> Result<Vec<NodeId>> {
        self.find(layer, Some(names), None, true)
    }

    /// Direct children of `layer` overlapping one of the given ranges
    fn find_in(&self, layer: NodeId, ranges: &[RangeAddress]) -> Result<Vec<NodeId>> {
        self.find(layer, None, Some(ranges), true)
    }

    /// Create an annotation below `owner`
    fn add(
        &mut self,
        owner: NodeId,
        prefix: &str,
        local_name: &str,
        text: Option<String>,
        range: RangeAddress,
        kind: AnnotationKind,
    ) -> Result<NodeId>;

    /// Remove `annotation` and its descendants from `owner`
    fn remove(&mut self, owner: NodeId, annotation: NodeId) -> Result<()>;
}

fn matches_range(candidate: &RangeAddress, query: &RangeAddress, overlapping: bool) -> bool {
    if overlapping {
        candidate.start() < query.end() && candidate.end() > query.start()
    } else {
        query.encloses(candidate)
    }
}

impl AnnotationRepository for Document {
    fn find(
        &self,
        layer: NodeId,
        names: Option<&BTreeSet<QName>>,
        ranges: Option<&[RangeAddress]>,
        overlapping: bool,
    ) -> Result<Vec<NodeId>> {
        let mut found = Vec::new();
        for &child in self.children(layer)? {
            let node = self.node(child)?;
            if names.is_some_and(|names| !names.contains(node.name())) {
                continue;
            }
            let range = self.range(child)?;
            if let Some(queries) = ranges {
                if !queries
                    .iter()
                    .any(|query| matches_range(&range, query, overlapping))
                {
                    continue;
                }
            }
            found.push((range, child));
        }
        found.sort_by_key(|(range, _)| *range);
        Ok(found.into_iter().map(|(_, child)| child).collect())
    }

    fn add(
        &mut self,
        owner: NodeId,
        prefix: &str,
        local_name: &str,
        text: Option<String>,
        range: RangeAddress,
        kind: AnnotationKind,
    ) -> Result<NodeId> {
        Document::add(self, owner, prefix, local_name, text, range, kind)
    }

    fn remove(&mut self, owner: NodeId, annotation: NodeId) -> Result<()> {
        Document::remove(self, owner, annotation)
    }
}
