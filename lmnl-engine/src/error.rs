//! Layered error types
//!
//! Range algebra failures come from `lmnl_core` and are wrapped here next to
//! the structural errors of the ownership tree and the collaborator failures
//! of text repositories and configuration loading.

use crate::node::{AnnotationKind, NodeId};
use lmnl_core::CoreError;
use thiserror::Error;

/// Object model errors
#[derive(Error, Debug)]
pub enum LomError {
    /// Range algebra error
    #[error("range error: {0}")]
    Core(#[from] CoreError),

    /// Namespace prefix not bound in the effective context
    #[error("namespace prefix '{prefix}' is not mapped")]
    UnmappedPrefix {
        /// The prefix that failed to resolve
        prefix: String,
    },

    /// Same prefix bound to two different namespace URIs
    #[error("namespace prefix '{prefix}' already bound to <{existing}>, cannot rebind to <{conflicting}>")]
    NamespaceClash {
        /// The clashing prefix
        prefix: String,
        /// URI already bound in the target context
        existing: String,
        /// URI the merge tried to bind
        conflicting: String,
    },

    /// Removal of a node that is not a child of the given owner
    #[error("{annotation} is not a child of {owner}")]
    NotAChild {
        /// The owner the removal was attempted on
        owner: NodeId,
        /// The node that was to be removed
        annotation: NodeId,
    },

    /// The factory cannot produce the requested annotation kind
    #[error("annotation factory cannot create annotations of kind {kind}")]
    TypeMismatch {
        /// The requested kind
        kind: AnnotationKind,
    },

    /// Handle to a node that has been destroyed
    #[error("{node} refers to a destroyed node")]
    StaleNode {
        /// The stale handle
        node: NodeId,
    },

    /// Attaching a node below itself
    #[error("attaching {annotation} to {owner} would create an ownership cycle")]
    CyclicOwnership {
        /// The prospective owner
        owner: NodeId,
        /// The node being attached
        annotation: NodeId,
    },

    /// Annotation-only operation applied to the document root
    #[error("{node} is the document root, not an annotation")]
    NotAnAnnotation {
        /// The offending handle
        node: NodeId,
    },

    /// Text operation on a layer without text of its own or reachable text
    #[error("{layer} has no text to operate on")]
    MissingText {
        /// The layer lacking text
        layer: NodeId,
    },

    /// Text repository failure, passed through unchanged
    #[error("text repository error: {0}")]
    TextRepository(#[from] std::io::Error),

    /// Invalid or unreadable configuration
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl LomError {
    /// Stable, distinct process exit code for this error kind
    ///
    /// Codes 64-78 follow the BSD `sysexits` convention where one applies.
    pub fn exit_code(&self) -> i32 {
        match self {
            LomError::Core(CoreError::InvalidRange { .. }) => 65,
            LomError::Core(CoreError::OutOfBounds { .. }) => 66,
            LomError::Core(CoreError::SubtractionDomain { .. }) => 67,
            LomError::UnmappedPrefix { .. } => 80,
            LomError::NamespaceClash { .. } => 81,
            LomError::NotAChild { .. } => 82,
            LomError::TypeMismatch { .. } => 83,
            LomError::StaleNode { .. } => 84,
            LomError::CyclicOwnership { .. } => 85,
            LomError::NotAnAnnotation { .. } => 86,
            LomError::MissingText { .. } => 87,
            LomError::TextRepository(_) => 74,
            LomError::Config(_) => 78,
        }
    }

    /// Whether the error points at a programming mistake of the caller
    /// rather than a failing environment
    pub fn is_caller_error(&self) -> bool {
        !matches!(self, LomError::TextRepository(_) | LomError::Config(_))
    }
}

/// Result type for object model operations
pub type Result<T> = std::result::Result<T, LomError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn all_kinds() -> Vec<LomError> {
        let node = NodeId::new(1, 0);
        vec![
            CoreError::InvalidRange { start: 2, end: 1 }.into(),
            CoreError::OutOfBounds {
                start: 0,
                end: 9,
                length: 3,
            }
            .into(),
            CoreError::SubtractionDomain {
                start: 2,
                end: 3,
                subtrahend_start: 0,
                subtrahend_end: 5,
            }
            .into(),
            LomError::UnmappedPrefix {
                prefix: "tei".into(),
            },
            LomError::NamespaceClash {
                prefix: "tei".into(),
                existing: "urn:a".into(),
                conflicting: "urn:b".into(),
            },
            LomError::NotAChild {
                owner: node,
                annotation: node,
            },
            LomError::TypeMismatch {
                kind: AnnotationKind::Comment,
            },
            LomError::StaleNode { node },
            LomError::CyclicOwnership {
                owner: node,
                annotation: node,
            },
            LomError::NotAnAnnotation { node },
            LomError::MissingText { layer: node },
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into(),
            LomError::Config("bad".into()),
        ]
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        let kinds = all_kinds();
        let codes: HashSet<i32> = kinds.iter().map(LomError::exit_code).collect();
        assert_eq!(codes.len(), kinds.len());
    }

    #[test]
    fn test_caller_error_classification() {
        assert!(LomError::UnmappedPrefix {
            prefix: "x".into()
        }
        .is_caller_error());
        assert!(!LomError::Config("bad".into()).is_caller_error());
        let io: LomError = std::io::Error::other("disk").into();
        assert!(!io.is_caller_error());
    }

    #[test]
    fn test_io_error_passes_through() {
        let io: LomError = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "short").into();
        match io {
            LomError::TextRepository(inner) => {
                assert_eq!(inner.kind(), std::io::ErrorKind::UnexpectedEof)
            }
            other => panic!("expected TextRepository, got {other:?}"),
        }
    }

    #[test]
    fn test_display() {
        let error = LomError::UnmappedPrefix {
            prefix: "tei".into(),
        };
        assert_eq!(error.to_string(), "namespace prefix 'tei' is not mapped");
    }
}
