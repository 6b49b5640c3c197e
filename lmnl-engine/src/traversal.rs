//! Lazy views over the ownership tree

use crate::document::Document;
use crate::error::Result;
use crate::node::{AnnotationKind, Node, NodeId};

impl Document {
    /// Direct children of `owner` of the given kind
    pub fn select(&self, owner: NodeId, kind: AnnotationKind) -> Result<impl Iterator<Item = NodeId> + '_> {
        self.select_by(owner, move |node| node.kind() == Some(kind))
    }

    /// Direct children of `owner` accepted by `predicate`
    pub fn select_by<'a, P>(&'a self, owner: NodeId, mut predicate: P) -> Result<impl Iterator<Item = NodeId> + 'a>
    where
        P: FnMut(&Node) -> bool + 'a,
    {
        let children = self.children(owner)?;
        Ok(children
            .iter()
            .copied()
            .filter(move |&child| self.node(child).is_ok_and(&mut predicate)))
    }

    /// All descendants of `layer`
    ///
    /// At every node the direct children are yielded first, in children
    /// order, before the subtree of each child is walked in turn. A
    /// grandchild through the first child therefore comes before a
    /// grandchild through the second one, but after all direct children.
    ///
    /// A child handle that no longer resolves is yielded as a `StaleNode`
    /// error, after which the iterator is exhausted.
    pub fn descendants(&self, layer: NodeId) -> Result<Descendants<'_>> {
        let children = self.children(layer)?;
        Ok(Descendants {
            document: self,
            stack: vec![Frame::emit(children)],
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Emit,
    Descend,
}

#[derive(Debug)]
struct Frame<'a> {
    children: &'a [NodeId],
    position: usize,
    phase: Phase,
}

impl<'a> Frame<'a> {
    fn emit(children: &'a [NodeId]) -> Self {
        Self {
            children,
            position: 0,
            phase: Phase::Emit,
        }
    }
}

/// Iterator returned by [`Document::descendants`]
#[derive(Debug)]
pub struct Descendants<'a> {
    document: &'a Document,
    stack: Vec<Frame<'a>>,
}

impl Iterator for Descendants<'_> {
    type Item = Result<NodeId>;

    fn next(&mut self) -> Option<Result<NodeId>> {
        loop {
            let frame = self.stack.last_mut()?;
            let current = frame.children.get(frame.position).copied();
            match (frame.phase, current) {
                (Phase::Emit, Some(child)) => {
                    frame.position += 1;
                    return Some(Ok(child));
                }
                (Phase::Emit, None) => {
                    frame.phase = Phase::Descend;
                    frame.position = 0;
                }
                (Phase::Descend, Some(child)) => {
                    frame.position += 1;
                    match self.document.children(child) {
                        Ok(grandchildren) => self.stack.push(Frame::emit(grandchildren)),
                        Err(err) => {
                            self.stack.clear();
                            return Some(Err(err));
                        }
                    }
                }
                (Phase::Descend, None) => {
                    self.stack.pop();
                }
            }
        }
    }
}
