//! Annotation construction and teardown
//!
//! A [`Document`](crate::Document) never builds annotation nodes itself; it
//! asks the factory it owns and notifies that same factory once a node has
//! been torn down.

use crate::error::{LomError, Result};
use crate::node::{AnnotationKind, Node, NodeId};
use lmnl_core::{QName, RangeAddress};
use std::collections::BTreeSet;
use std::fmt;

/// Everything a factory needs to build one annotation
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationRequest {
    /// Layer the annotation will be appended to
    pub owner: NodeId,
    /// Namespace prefix as given by the caller
    pub prefix: String,
    /// Resolved qualified name
    pub name: QName,
    /// Own text, `None` to inherit the owner's
    pub text: Option<String>,
    /// Range over the owner's text
    pub range: RangeAddress,
    /// Requested payload kind
    pub kind: AnnotationKind,
}

/// Constructs and destroys annotation nodes
pub trait AnnotationFactory: fmt::Debug {
    /// Build the node for `request`
    ///
    /// The returned node must be of the requested kind; factories that do
    /// not support a kind fail with [`LomError::TypeMismatch`].
    fn create(&mut self, request: AnnotationRequest) -> Result<Node>;

    /// Called once per node after all of its descendants were destroyed
    fn destroy(&mut self, node: &Node);
}

/// Factory accepting every kind and tracking how many nodes are alive
#[derive(Debug, Default, Clone)]
pub struct DefaultAnnotationFactory {
    created: usize,
    destroyed: usize,
}

impl DefaultAnnotationFactory {
    /// New factory with zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Nodes created and not yet destroyed
    pub fn live(&self) -> usize {
        self.created - self.destroyed
    }

    /// Nodes created so far
    pub fn created(&self) -> usize {
        self.created
    }
}

impl AnnotationFactory for DefaultAnnotationFactory {
    fn create(&mut self, request: AnnotationRequest) -> Result<Node> {
        self.created += 1;
        Ok(Node::annotation(
            request.name,
            request.prefix,
            request.text,
            request.range,
            request.kind,
        ))
    }

    fn destroy(&mut self, _node: &Node) {
        self.destroyed = (self.destroyed + 1).min(self.created);
    }
}

/// Factory producing only a fixed set of kinds
#[derive(Debug, Clone)]
pub struct KindRestrictedFactory {
    kinds: BTreeSet<AnnotationKind>,
    inner: DefaultAnnotationFactory,
}

impl KindRestrictedFactory {
    /// Factory accepting exactly `kinds`
    pub fn new(kinds: impl IntoIterator<Item = AnnotationKind>) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
            inner: DefaultAnnotationFactory::new(),
        }
    }

    /// Whether `kind` can be created
    pub fn supports(&self, kind: AnnotationKind) -> bool {
        self.kinds.contains(&kind)
    }

    /// Nodes created and not yet destroyed
    pub fn live(&self) -> usize {
        self.inner.live()
    }
}

impl AnnotationFactory for KindRestrictedFactory {
    fn create(&mut self, request: AnnotationRequest) -> Result<Node> {
        if !self.supports(request.kind) {
            return Err(LomError::TypeMismatch { kind: request.kind });
        }
        self.inner.create(request)
    }

    fn destroy(&mut self, node: &Node) {
        self.inner.destroy(node);
    }
}
