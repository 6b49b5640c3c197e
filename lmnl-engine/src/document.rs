//! The document: an arena of layers owning text and annotations
//!
//! All nodes of one document live in a single arena and refer to each other
//! through [`NodeId`] handles. Ownership transfer is an index rewrite, and
//! a handle to a removed node is reported as [`LomError::StaleNode`].
//!
//! Every mutating operation validates its arguments completely before it
//! changes anything, so a rejected call leaves the tree as it was.

use crate::config::{DocumentSettings, LomConfig};
use crate::error::{LomError, Result};
use crate::factory::{AnnotationFactory, AnnotationRequest, DefaultAnnotationFactory};
use crate::id::IdGenerator;
use crate::namespace::{NamespaceContext, EMPTY_CONTEXT, LMNL_NS_URI};
use crate::node::{AnnotationKind, Node, NodeId};
use lmnl_core::{CoreError, QName, RangeAddress};
use tracing::debug;

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Root of an ownership tree of annotations
///
/// The document owns the base text, the root namespace context and the
/// [`AnnotationFactory`] all annotations are created and destroyed with.
#[derive(Debug)]
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
    base_uri: String,
    factory: Box<dyn AnnotationFactory>,
}

impl Document {
    /// Document named `lmnl:document` with the default factory
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_factory(text, Box::new(DefaultAnnotationFactory::new()))
    }

    /// Document named `lmnl:document` using `factory` for its annotations
    pub fn with_factory(text: impl Into<String>, factory: Box<dyn AnnotationFactory>) -> Self {
        let settings = DocumentSettings::default();
        let name = QName::new(LMNL_NS_URI, settings.local_name);
        Self::build(
            Node::root(name, settings.prefix, text.into(), NamespaceContext::lmnl()),
            settings.base_uri,
            factory,
        )
    }

    /// Document with root name, namespaces, base URI and factory taken from `config`
    pub fn from_config(text: impl Into<String>, config: &LomConfig) -> Result<Self> {
        config.validate()?;
        let context = config.namespace_context()?;
        let settings = &config.document;
        let name = match context.resolve(&settings.prefix) {
            Some(uri) => QName::new(uri, settings.local_name.as_str()),
            None if settings.prefix.is_empty() => QName::local(settings.local_name.as_str()),
            None => {
                return Err(LomError::UnmappedPrefix {
                    prefix: settings.prefix.clone(),
                })
            }
        };
        Ok(Self::build(
            Node::root(name, settings.prefix.clone(), text.into(), context),
            settings.base_uri.clone(),
            config.annotation_factory(),
        ))
    }

    fn build(root: Node, base_uri: String, factory: Box<dyn AnnotationFactory>) -> Self {
        let mut document = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: NodeId::new(0, 0),
            base_uri,
            factory,
        };
        document.root = document.insert(root);
        document
    }

    /// Handle of the root layer
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Node behind `id`
    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.node.as_ref())
            .ok_or(LomError::StaleNode { node: id })
    }

    /// Mutable node behind `id`, for attribute updates
    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.node.as_mut())
            .ok_or(LomError::StaleNode { node: id })
    }

    /// Whether `id` addresses a live node
    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_ok()
    }

    /// Number of live nodes, the root included
    pub fn node_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// The annotation factory owned by this document
    pub fn factory(&self) -> &dyn AnnotationFactory {
        self.factory.as_ref()
    }

    /// Owner of `id`
    pub fn owner(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.owner)
    }

    /// Direct children of `id` in insertion order
    pub fn children(&self, id: NodeId) -> Result<&[NodeId]> {
        Ok(&self.node(id)?.children)
    }

    /// Range of the annotation `id`
    pub fn range(&self, id: NodeId) -> Result<RangeAddress> {
        self.node(id)?
            .range
            .ok_or(LomError::NotAnAnnotation { node: id })
    }

    /// Effective text of `id`: its own, or the nearest owner's
    ///
    /// `None` only for a detached annotation without text of its own.
    pub fn text(&self, id: NodeId) -> Result<Option<&str>> {
        let mut current = id;
        loop {
            let node = self.node(current)?;
            if let Some(text) = node.text.as_deref() {
                return Ok(Some(text));
            }
            match node.owner {
                Some(owner) => current = owner,
                None => return Ok(None),
            }
        }
    }

    /// Segment of the owner's text addressed by the annotation `id`
    pub fn segment_text(&self, id: NodeId) -> Result<&str> {
        let range = self.range(id)?;
        let owner = self
            .node(id)?
            .owner
            .ok_or(LomError::MissingText { layer: id })?;
        let text = self
            .text(owner)?
            .ok_or(LomError::MissingText { layer: owner })?;
        Ok(range.apply_to(text)?)
    }

    /// Base URI node URIs are resolved against
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Replace the base URI
    pub fn set_base_uri(&mut self, base_uri: impl Into<String>) {
        self.base_uri = base_uri.into();
    }

    /// URI of `id`: the base URI with the node's fragment identifier
    pub fn uri(&self, id: NodeId) -> Result<Option<String>> {
        let base = self
            .base_uri
            .split_once('#')
            .map_or(self.base_uri.as_str(), |(base, _)| base);
        Ok(self.node(id)?.id.as_ref().map(|fragment| format!("{base}#{fragment}")))
    }

    /// Set the fragment identifier of `id`
    pub fn set_id(&mut self, id: NodeId, fragment: impl Into<String>) -> Result<()> {
        self.node_mut(id)?.id = Some(fragment.into());
        Ok(())
    }

    /// Give `id` a fresh fragment identifier derived from its qualified name
    pub fn assign_id(&mut self, id: NodeId, generator: &mut dyn IdGenerator) -> Result<String> {
        let fragment = generator.next_for_layer(&self.qualified_name(id)?);
        self.set_id(id, fragment.clone())?;
        Ok(fragment)
    }

    /// `prefix:local`, or just the local name for the empty prefix
    pub fn qualified_name(&self, id: NodeId) -> Result<String> {
        let node = self.node(id)?;
        Ok(if node.prefix.is_empty() {
            node.name.local_name().to_string()
        } else {
            format!("{}:{}", node.prefix, node.name.local_name())
        })
    }

    /// Effective namespace context of `id`
    pub fn namespace_context(&self, id: NodeId) -> Result<&NamespaceContext> {
        let holder = self.context_holder(id)?;
        Ok(self
            .node(holder)?
            .namespaces
            .as_ref()
            .unwrap_or(&EMPTY_CONTEXT))
    }

    /// Resolve `prefix` in the effective namespace context of `id`
    pub fn resolve(&self, id: NodeId, prefix: &str) -> Result<Option<&str>> {
        Ok(self.namespace_context(id)?.resolve(prefix))
    }

    /// Root namespace context
    pub fn namespaces(&self) -> &NamespaceContext {
        self.node(self.root)
            .ok()
            .and_then(|root| root.namespaces.as_ref())
            .unwrap_or(&EMPTY_CONTEXT)
    }

    /// Bind `prefix` to `uri` in the root namespace context
    pub fn add_namespace(&mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Result<()> {
        self.bind_namespace(self.root, prefix, uri)
    }

    /// Bind `prefix` to `uri` in the effective namespace context of `layer`
    ///
    /// For an attached annotation this is the context of the nearest owner
    /// declaring one; a detached annotation binds into its private context.
    pub fn bind_namespace(
        &mut self,
        layer: NodeId,
        prefix: impl Into<String>,
        uri: impl Into<String>,
    ) -> Result<()> {
        let (prefix, uri) = (prefix.into(), uri.into());
        let holder = self.context_holder(layer)?;
        debug!(%holder, prefix = %prefix, uri = %uri, "binding namespace");
        self.node_mut(holder)?
            .namespaces
            .get_or_insert_with(NamespaceContext::new)
            .bind(prefix, uri)
    }

    /// URI bound to `prefix` in the root namespace context
    pub fn namespace(&self, prefix: &str) -> Option<&str> {
        self.namespaces().resolve(prefix)
    }

    /// Prefix bound to `uri` in the root namespace context
    pub fn prefix_for(&self, uri: &str) -> Option<&str> {
        self.namespaces().prefix_for(uri)
    }

    /// Create an annotation through the factory and append it to `owner`
    ///
    /// `prefix` must be bound in the owner's effective namespace context; the
    /// empty prefix may also stay unbound and yields an unnamespaced name.
    pub fn add(
        &mut self,
        owner: NodeId,
        prefix: &str,
        local_name: &str,
        text: Option<String>,
        range: RangeAddress,
        kind: AnnotationKind,
    ) -> Result<NodeId> {
        let name = match self.resolve(owner, prefix)? {
            Some(uri) => QName::new(uri, local_name),
            None if prefix.is_empty() => QName::local(local_name),
            None => {
                return Err(LomError::UnmappedPrefix {
                    prefix: prefix.to_string(),
                })
            }
        };

        let mut node = self.factory.create(AnnotationRequest {
            owner,
            prefix: prefix.to_string(),
            name,
            text,
            range,
            kind,
        })?;
        if node.kind != Some(kind) || node.range.is_none() {
            self.factory.destroy(&node);
            return Err(LomError::TypeMismatch { kind });
        }

        node.owner = Some(owner);
        node.namespaces = None;
        node.children.clear();
        let id = self.insert(node);
        self.node_mut(owner)?.children.push(id);
        debug!(%owner, annotation = %id, %range, %kind, "added annotation");
        Ok(id)
    }

    /// Re-add the annotation `source_id` of `source` below `owner`
    ///
    /// Prefix, local name, own text and range are taken over; children are not.
    pub fn add_copy(
        &mut self,
        owner: NodeId,
        source: &Document,
        source_id: NodeId,
        kind: AnnotationKind,
    ) -> Result<NodeId> {
        let template = CopyTemplate::of(source, source_id)?;
        template.add_to(self, owner, kind)
    }

    /// Re-add the annotation `source` of this document below `owner`
    pub fn copy_within(&mut self, owner: NodeId, source: NodeId, kind: AnnotationKind) -> Result<NodeId> {
        let template = CopyTemplate::of(self, source)?;
        template.add_to(self, owner, kind)
    }

    /// Tear down `annotation` and its descendants and drop it from `owner`
    ///
    /// Descendants are destroyed before their owners, each one reported to the
    /// factory.
    pub fn remove(&mut self, owner: NodeId, annotation: NodeId) -> Result<()> {
        let position = self.child_position(owner, annotation)?;

        for id in self.post_order(annotation)? {
            if let Some(node) = self.release(id) {
                self.factory.destroy(&node);
            }
        }
        self.node_mut(owner)?.children.remove(position);
        debug!(%owner, %annotation, "removed annotation");
        Ok(())
    }

    /// Make `annotation` unowned
    ///
    /// The annotation keeps a private copy of the namespace context that was
    /// effective for it. Detaching an unowned annotation does nothing.
    pub fn detach(&mut self, annotation: NodeId) -> Result<()> {
        let node = self.node(annotation)?;
        if node.is_root() {
            return Err(LomError::NotAnAnnotation { node: annotation });
        }
        let Some(owner) = node.owner else {
            return Ok(());
        };

        let context = self.namespace_context(owner)?.clone();
        self.node_mut(owner)?.children.retain(|&child| child != annotation);
        let node = self.node_mut(annotation)?;
        node.owner = None;
        node.namespaces = Some(context);
        debug!(%owner, %annotation, "detached annotation");
        Ok(())
    }

    /// Append `annotation` to `owner`, detaching it from its current owner
    ///
    /// The annotation's namespace context is merged into the owner's
    /// effective context. Attaching to the current owner moves the
    /// annotation to the end of the children.
    pub fn attach(&mut self, owner: NodeId, annotation: NodeId) -> Result<()> {
        if self.node(annotation)?.is_root() {
            return Err(LomError::NotAnAnnotation { node: annotation });
        }
        if self.is_ancestor_or_self(annotation, owner)? {
            return Err(LomError::CyclicOwnership { owner, annotation });
        }
        let incoming = self.namespace_context(annotation)?.clone();
        self.namespace_context(owner)?.check_merge(&incoming)?;

        self.detach(annotation)?;
        let holder = self.context_holder(owner)?;
        self.node_mut(holder)?
            .namespaces
            .get_or_insert_with(NamespaceContext::new)
            .merge(&incoming)?;

        let node = self.node_mut(annotation)?;
        node.namespaces = None;
        node.owner = Some(owner);
        self.node_mut(owner)?.children.push(annotation);
        debug!(%owner, %annotation, "attached annotation");
        Ok(())
    }

    /// Cut `deleted` out of the own text of `layer` and fix up the ranges
    ///
    /// Annotations addressing exactly the deleted segment, or lying strictly
    /// inside it, are removed. Every other range is recomputed with
    /// [`RangeAddress::subtract`]. Descendants inheriting the layer's text are
    /// adjusted as well. Returns how many annotations were removed (their
    /// descendants not counted). An empty `deleted` range changes nothing.
    pub fn delete_text(&mut self, layer: NodeId, deleted: RangeAddress) -> Result<usize> {
        let text = self
            .node(layer)?
            .text
            .as_deref()
            .ok_or(LomError::MissingText { layer })?;
        let segment = deleted.apply_to(text)?;
        if deleted.is_empty() {
            return Ok(0);
        }
        let start = text
            .char_indices()
            .nth(deleted.start())
            .map_or(text.len(), |(index, _)| index);

        let mut remaining = String::with_capacity(text.len() - segment.len());
        remaining.push_str(&text[..start]);
        remaining.push_str(&text[start + segment.len()..]);

        let mut edits = Vec::new();
        self.plan_range_edits(layer, &deleted, &mut edits)?;

        self.node_mut(layer)?.text = Some(remaining);
        let mut removed = 0;
        for edit in edits {
            match edit {
                RangeEdit::Shift { annotation, range } => {
                    self.node_mut(annotation)?.range = Some(range);
                }
                RangeEdit::Remove { owner, annotation } => {
                    self.remove(owner, annotation)?;
                    removed += 1;
                }
            }
        }
        debug!(%layer, %deleted, removed, "deleted text");
        Ok(removed)
    }

    /// Collect the range changes a deletion of the non-empty `deleted`
    /// segment causes below `layer`, without touching the tree
    fn plan_range_edits(
        &self,
        layer: NodeId,
        deleted: &RangeAddress,
        edits: &mut Vec<RangeEdit>,
    ) -> Result<()> {
        for &child in self.children(layer)? {
            let range = self.range(child)?;
            let shifted = if range == *deleted {
                None
            } else {
                match range.subtract(deleted) {
                    Ok(shifted) => Some(shifted),
                    Err(CoreError::SubtractionDomain { .. }) => None,
                    Err(e) => return Err(e.into()),
                }
            };

            match shifted {
                Some(shifted) => {
                    edits.push(RangeEdit::Shift {
                        annotation: child,
                        range: shifted,
                    });
                    if self.node(child)?.text.is_none() {
                        self.plan_range_edits(child, deleted, edits)?;
                    }
                }
                None => edits.push(RangeEdit::Remove {
                    owner: layer,
                    annotation: child,
                }),
            }
        }
        Ok(())
    }

    fn insert(&mut self, node: Node) -> NodeId {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.node = Some(node);
                NodeId::new(index, slot.generation)
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId::new(index, 0)
            }
        }
    }

    fn release(&mut self, id: NodeId) -> Option<Node> {
        let slot = self.slots.get_mut(id.index())?;
        if slot.generation != id.generation() {
            return None;
        }
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index() as u32);
        Some(node)
    }

    fn child_position(&self, owner: NodeId, annotation: NodeId) -> Result<usize> {
        let not_a_child = LomError::NotAChild { owner, annotation };
        let owner_node = self.node(owner)?;
        if self.node(annotation)?.owner != Some(owner) {
            return Err(not_a_child);
        }
        owner_node
            .children
            .iter()
            .position(|&child| child == annotation)
            .ok_or(not_a_child)
    }

    /// `id` and its descendants, every node after all of its descendants
    fn post_order(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let mut stack = vec![id];
        let mut order = Vec::new();
        while let Some(current) = stack.pop() {
            order.push(current);
            stack.extend_from_slice(&self.node(current)?.children);
        }
        order.reverse();
        Ok(order)
    }

    /// Lowest node on the owner chain of `id` declaring a namespace context,
    /// or the top of the chain when none does
    fn context_holder(&self, id: NodeId) -> Result<NodeId> {
        let mut current = id;
        loop {
            let node = self.node(current)?;
            match (&node.namespaces, node.owner) {
                (Some(_), _) | (None, None) => return Ok(current),
                (None, Some(owner)) => current = owner,
            }
        }
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> Result<bool> {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return Ok(true);
            }
            current = self.node(node)?.owner;
        }
        Ok(false)
    }
}

/// One planned change of a text deletion
enum RangeEdit {
    Shift { annotation: NodeId, range: RangeAddress },
    Remove { owner: NodeId, annotation: NodeId },
}

/// Fields re-derived from an existing annotation when copying it
struct CopyTemplate {
    prefix: String,
    local_name: String,
    text: Option<String>,
    range: RangeAddress,
}

impl CopyTemplate {
    fn of(document: &Document, id: NodeId) -> Result<Self> {
        let node = document.node(id)?;
        Ok(Self {
            prefix: node.prefix.clone(),
            local_name: node.name.local_name().to_string(),
            text: node.text.clone(),
            range: node.range.ok_or(LomError::NotAnAnnotation { node: id })?,
        })
    }

    fn add_to(self, document: &mut Document, owner: NodeId, kind: AnnotationKind) -> Result<NodeId> {
        document.add(
            owner,
            &self.prefix,
            &self.local_name,
            self.text,
            self.range,
            kind,
        )
    }
}
