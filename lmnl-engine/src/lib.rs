//! Object model for layered, overlapping markup
//!
//! A [`Document`] is a text plus a tree of annotations. Each annotation
//! addresses a [`RangeAddress`] of its owner's text; the ranges of siblings
//! may nest, overlap or coincide freely. On top of the tree this crate
//! provides
//!
//! - [`AnnotationRepository`] queries by name and range,
//! - the [`EventGenerator`] turning a layer into a start/end event stream,
//! - the [`OverlapIndexer`] mapping ranges to the ranges overlapping them,
//! - [`TextRepository`] storage for layer texts.
//!
//! # Example
//!
//! ```rust
//! use lmnl_engine::{AnnotationKind, Document, Event, EventCollector, EventGenerator, RangeAddress};
//!
//! let mut doc = Document::new("abcd");
//! let root = doc.root();
//! let a = doc.add(root, "lmnl", "a", None, RangeAddress::new(0, 3)?, AnnotationKind::Annotation)?;
//! let b = doc.add(root, "lmnl", "b", None, RangeAddress::new(1, 4)?, AnnotationKind::Annotation)?;
//!
//! let mut collector = EventCollector::new();
//! EventGenerator::new().generate(&doc, root, &mut collector)?;
//! assert_eq!(
//!     collector.events(),
//!     &[
//!         Event::StartDocument(root),
//!         Event::StartAnnotation(a),
//!         Event::StartAnnotation(b),
//!         Event::EndAnnotation(a),
//!         Event::EndAnnotation(b),
//!         Event::EndDocument(root),
//!     ]
//! );
//! # Ok::<(), lmnl_engine::LomError>(())
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod document;
pub mod error;
pub mod events;
pub mod factory;
pub mod id;
pub mod namespace;
pub mod node;
pub mod overlap;
pub mod repository;
pub mod text;
pub mod traversal;

// Re-export key types
pub use config::{DocumentSettings, FactorySettings, LomConfig, NamespaceBinding};
pub use document::Document;
pub use error::{LomError, Result};
pub use events::{range_order, Event, EventCollector, EventGenerator, EventHandler, TieBreak};
pub use factory::{
    AnnotationFactory, AnnotationRequest, DefaultAnnotationFactory, KindRestrictedFactory,
};
pub use id::{DefaultIdGenerator, IdGenerator};
pub use namespace::{NamespaceContext, LMNL_NS_URI, LMNL_PREFIX};
pub use node::{AnnotationKind, Node, NodeId};
pub use overlap::{AnnotationRef, OverlapIndexer, Ranged};
pub use repository::AnnotationRepository;
pub use text::{MemoryTextRepository, TextRepository};
pub use traversal::Descendants;

// Re-export from core for convenience
pub use lmnl_core::{CoreError, QName, RangeAddress};
