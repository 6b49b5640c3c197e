//! Event stream generation
//!
//! [`EventGenerator`] walks a layer and reports its annotations to an
//! [`EventHandler`] as start/end events. Children of one layer are swept by
//! offset: at every offset where a child range starts or ends, first the
//! ranges ending there are closed, then empty ranges are opened and closed
//! at once, then ranges starting there are opened.
//!
//! An optional filter prunes subtrees: a rejected layer is left out of the
//! sweep together with everything below it.
//!
//! Overlapping siblings produce interleaved rather than nested events, so
//! the stream is not well-formed in the XML sense. Consumers have to cope
//! with that.

use crate::document::Document;
use crate::error::LomError;
use crate::node::NodeId;
use lmnl_core::RangeAddress;
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::trace;

/// Receiver of the events of one generation run
///
/// Any error returned aborts the run and is passed to the caller as is.
/// Handler errors must be able to carry [`LomError`]s for stale handles met
/// during the walk.
pub trait EventHandler {
    /// Error aborting the generation
    type Error: From<LomError>;

    /// The walk entered the document root
    fn start_document(&mut self, document: &Document, root: NodeId) -> Result<(), Self::Error>;

    /// The walk left the document root
    fn end_document(&mut self, document: &Document, root: NodeId) -> Result<(), Self::Error>;

    /// An annotation starts
    fn start_annotation(&mut self, document: &Document, annotation: NodeId) -> Result<(), Self::Error>;

    /// An annotation ends
    fn end_annotation(&mut self, document: &Document, annotation: NodeId) -> Result<(), Self::Error>;
}

type Filter = Box<dyn Fn(&Document, NodeId) -> bool>;

/// Tie-break ordering among annotations sharing an offset
pub type TieBreak<'a> = &'a dyn Fn(&Document, NodeId, NodeId) -> Ordering;

/// Produces the event stream of a layer
#[derive(Default)]
pub struct EventGenerator {
    filter: Option<Filter>,
}

impl std::fmt::Debug for EventGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventGenerator")
            .field("filtered", &self.filter.is_some())
            .finish()
    }
}

/// Orders annotations by their ranges
///
/// Handles without a range (the root, stale handles) sort after every ranged
/// annotation and among themselves by handle, so the order stays total.
pub fn range_order(document: &Document, a: NodeId, b: NodeId) -> Ordering {
    match (document.range(a), document.range(b)) {
        (Ok(left), Ok(right)) => left.cmp(&right),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(&b),
    }
}

impl EventGenerator {
    /// Generator reporting every layer
    pub fn new() -> Self {
        Self::default()
    }

    /// Generator skipping every subtree whose top layer `filter` rejects
    pub fn with_filter<F>(filter: F) -> Self
    where
        F: Fn(&Document, NodeId) -> bool + 'static,
    {
        Self {
            filter: Some(Box::new(filter)),
        }
    }

    /// Report `layer` and its subtree, breaking ties by range order
    pub fn generate<H: EventHandler>(
        &self,
        document: &Document,
        layer: NodeId,
        handler: &mut H,
    ) -> Result<(), H::Error> {
        self.generate_with(document, layer, handler, &range_order)
    }

    /// Report `layer` and its subtree, breaking ties with `ordering`
    ///
    /// Ranges closing at the same offset are reported in reversed `ordering`.
    pub fn generate_with<H: EventHandler>(
        &self,
        document: &Document,
        layer: NodeId,
        handler: &mut H,
        ordering: TieBreak<'_>,
    ) -> Result<(), H::Error> {
        if !self.accepts(document, layer) {
            return Ok(());
        }

        let node = document.node(layer)?;
        if node.is_root() {
            handler.start_document(document, layer)?;
        } else {
            handler.start_annotation(document, layer)?;
        }

        let mut offsets: BTreeMap<usize, SmallVec<[(NodeId, RangeAddress); 4]>> = BTreeMap::new();
        for &child in node.children() {
            if !self.accepts(document, child) {
                continue;
            }
            let range = document.range(child)?;
            offsets.entry(range.start()).or_default().push((child, range));
            if range.end() != range.start() {
                offsets.entry(range.end()).or_default().push((child, range));
            }
        }

        for (offset, mut bucket) in offsets {
            trace!(%layer, offset, annotations = bucket.len(), "sweeping offset");

            bucket.sort_by(|(a, _), (b, _)| ordering(document, *b, *a));
            for &(annotation, range) in &bucket {
                if range.end() == offset && range.start() != offset {
                    handler.end_annotation(document, annotation)?;
                }
            }

            bucket.sort_by(|(a, _), (b, _)| ordering(document, *a, *b));
            for &(annotation, range) in &bucket {
                if range.start() == offset && range.end() == offset {
                    handler.start_annotation(document, annotation)?;
                    self.generate_children(document, annotation, handler, ordering)?;
                    handler.end_annotation(document, annotation)?;
                }
            }

            for &(annotation, range) in &bucket {
                if range.start() == offset && range.end() != offset {
                    handler.start_annotation(document, annotation)?;
                    self.generate_children(document, annotation, handler, ordering)?;
                }
            }
        }

        if node.is_root() {
            handler.end_document(document, layer)
        } else {
            handler.end_annotation(document, layer)
        }
    }

    fn generate_children<H: EventHandler>(
        &self,
        document: &Document,
        annotation: NodeId,
        handler: &mut H,
        ordering: TieBreak<'_>,
    ) -> Result<(), H::Error> {
        for &child in document.children(annotation)? {
            self.generate_with(document, child, handler, ordering)?;
        }
        Ok(())
    }

    fn accepts(&self, document: &Document, layer: NodeId) -> bool {
        self.filter
            .as_ref()
            .map_or(true, |filter| filter(document, layer))
    }
}

/// One entry of a recorded event stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Entered the document root
    StartDocument(NodeId),
    /// Left the document root
    EndDocument(NodeId),
    /// Annotation start
    StartAnnotation(NodeId),
    /// Annotation end
    EndAnnotation(NodeId),
}

impl Event {
    /// Node the event refers to
    pub fn node(&self) -> NodeId {
        match *self {
            Event::StartDocument(id)
            | Event::EndDocument(id)
            | Event::StartAnnotation(id)
            | Event::EndAnnotation(id) => id,
        }
    }

    /// Whether this event opens a node
    pub fn is_start(&self) -> bool {
        matches!(self, Event::StartDocument(_) | Event::StartAnnotation(_))
    }
}

/// Handler recording the event stream
#[derive(Debug, Default, Clone)]
pub struct EventCollector {
    events: Vec<Event>,
}

impl EventCollector {
    /// Empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Events recorded so far
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Consume the collector, keeping the events
    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}

impl EventHandler for EventCollector {
    type Error = LomError;

    fn start_document(&mut self, _document: &Document, root: NodeId) -> Result<(), LomError> {
        self.events.push(Event::StartDocument(root));
        Ok(())
    }

    fn end_document(&mut self, _document: &Document, root: NodeId) -> Result<(), LomError> {
        self.events.push(Event::EndDocument(root));
        Ok(())
    }

    fn start_annotation(&mut self, _document: &Document, annotation: NodeId) -> Result<(), LomError> {
        self.events.push(Event::StartAnnotation(annotation));
        Ok(())
    }

    fn end_annotation(&mut self, _document: &Document, annotation: NodeId) -> Result<(), LomError> {
        self.events.push(Event::EndAnnotation(annotation));
        Ok(())
    }
}
