//! Nodes of the ownership tree and the handles addressing them

use crate::namespace::NamespaceContext;
use lmnl_core::{QName, RangeAddress};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Generational handle to a node in a [`Document`](crate::Document)
///
/// A handle stays valid until the node it points at is removed. Slots are
/// reused afterwards, but under a new generation, so an old handle is
/// reported as stale instead of silently addressing the new occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub(crate) fn index(&self) -> usize {
        self.index as usize
    }

    pub(crate) fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node {}v{}", self.index, self.generation)
    }
}

/// Closed set of annotation payload kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnnotationKind {
    /// Plain range annotation
    Annotation,
    /// Markup element imported from a tree-shaped source
    Element,
    /// Comment carried along with the markup
    Comment,
    /// Processing instruction carried along with the markup
    ProcessingInstruction,
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnnotationKind::Annotation => "annotation",
            AnnotationKind::Element => "element",
            AnnotationKind::Comment => "comment",
            AnnotationKind::ProcessingInstruction => "processing-instruction",
        };
        f.write_str(name)
    }
}

/// A layer of the document: the root or one of its (nested) annotations
///
/// The root has neither a range nor a kind. Every other node carries both,
/// its range being interpreted against the text of its owner.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) owner: Option<NodeId>,
    pub(crate) id: Option<String>,
    pub(crate) name: QName,
    pub(crate) prefix: String,
    pub(crate) text: Option<String>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) namespaces: Option<NamespaceContext>,
    pub(crate) range: Option<RangeAddress>,
    pub(crate) kind: Option<AnnotationKind>,
    pub(crate) attributes: BTreeMap<String, String>,
}

impl Node {
    pub(crate) fn root(name: QName, prefix: String, text: String, namespaces: NamespaceContext) -> Self {
        Self {
            owner: None,
            id: None,
            name,
            prefix,
            text: Some(text),
            children: Vec::new(),
            namespaces: Some(namespaces),
            range: None,
            kind: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Build an unowned annotation node
    ///
    /// Meant for [`AnnotationFactory`](crate::AnnotationFactory)
    /// implementations; the document sets the owner when it appends the node.
    pub fn annotation(
        name: QName,
        prefix: impl Into<String>,
        text: Option<String>,
        range: RangeAddress,
        kind: AnnotationKind,
    ) -> Self {
        Self {
            owner: None,
            id: None,
            name,
            prefix: prefix.into(),
            text,
            children: Vec::new(),
            namespaces: None,
            range: Some(range),
            kind: Some(kind),
            attributes: BTreeMap::new(),
        }
    }

    /// Owner of this node, `None` for the root and for detached annotations
    pub fn owner(&self) -> Option<NodeId> {
        self.owner
    }

    /// Fragment identifier, once assigned
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Qualified name
    pub fn name(&self) -> &QName {
        &self.name
    }

    /// Namespace prefix the name was created with
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Text owned by this node itself (not inherited)
    pub fn own_text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Direct children in insertion order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Range over the owner's text, `None` for the root
    pub fn range(&self) -> Option<RangeAddress> {
        self.range
    }

    /// Payload kind, `None` for the root
    pub fn kind(&self) -> Option<AnnotationKind> {
        self.kind
    }

    /// Whether this is the document root
    pub fn is_root(&self) -> bool {
        self.range.is_none()
    }

    /// Attribute value by name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// All attributes, ordered by name
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Set an attribute, returning the previous value
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.attributes.insert(name.into(), value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotation_node_is_unowned() {
        let node = Node::annotation(
            QName::local("p"),
            "",
            None,
            RangeAddress::new(0, 3).unwrap(),
            AnnotationKind::Element,
        );
        assert_eq!(node.owner(), None);
        assert!(!node.is_root());
        assert_eq!(node.kind(), Some(AnnotationKind::Element));
        assert!(node.children().is_empty());
    }

    #[test]
    fn test_attributes() {
        let mut node = Node::annotation(
            QName::local("p"),
            "",
            None,
            RangeAddress::NULL,
            AnnotationKind::Annotation,
        );
        assert_eq!(node.set_attribute("n", "1"), None);
        assert_eq!(node.set_attribute("n", "2").as_deref(), Some("1"));
        assert_eq!(node.attribute("n"), Some("2"));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(AnnotationKind::ProcessingInstruction.to_string(), "processing-instruction");
    }

    #[test]
    fn test_node_id_display() {
        assert_eq!(NodeId::new(3, 1).to_string(), "node 3v1");
    }
}
