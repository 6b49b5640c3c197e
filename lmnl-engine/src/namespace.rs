//! Prefix to namespace URI bindings

use crate::error::{LomError, Result};
use std::collections::BTreeMap;

/// Namespace URI of the LMNL vocabulary
pub const LMNL_NS_URI: &str = "http://lmnl.net/namespaces/lmnl";

/// Conventional prefix of [`LMNL_NS_URI`]
pub const LMNL_PREFIX: &str = "lmnl";

pub(crate) static EMPTY_CONTEXT: NamespaceContext = NamespaceContext {
    bindings: BTreeMap::new(),
};

/// A set of prefix bindings with unique prefixes
///
/// Contexts are owned by the lowest node that declares one. Every other
/// node resolves prefixes through its owner chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceContext {
    bindings: BTreeMap<String, String>,
}

impl NamespaceContext {
    /// Empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Context binding only the `lmnl` prefix
    pub fn lmnl() -> Self {
        let mut context = Self::new();
        context
            .bindings
            .insert(LMNL_PREFIX.to_string(), LMNL_NS_URI.to_string());
        context
    }

    /// URI bound to `prefix`
    pub fn resolve(&self, prefix: &str) -> Option<&str> {
        self.bindings.get(prefix).map(String::as_str)
    }

    /// First prefix (in prefix order) bound to `uri`
    pub fn prefix_for(&self, uri: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(_, bound)| bound.as_str() == uri)
            .map(|(prefix, _)| prefix.as_str())
    }

    /// Bind `prefix` to `uri`
    ///
    /// Rebinding a prefix to the URI it already has is a no-op, rebinding it
    /// to another URI is a [`LomError::NamespaceClash`].
    pub fn bind(&mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Result<()> {
        let prefix = prefix.into();
        let uri = uri.into();
        self.check_binding(&prefix, &uri)?;
        self.bindings.insert(prefix, uri);
        Ok(())
    }

    /// Verify that `other` can be merged without clashes
    pub fn check_merge(&self, other: &NamespaceContext) -> Result<()> {
        other
            .bindings
            .iter()
            .try_for_each(|(prefix, uri)| self.check_binding(prefix, uri))
    }

    /// Union of both contexts; nothing is changed when a prefix clashes
    pub fn merge(&mut self, other: &NamespaceContext) -> Result<()> {
        self.check_merge(other)?;
        for (prefix, uri) in &other.bindings {
            self.bindings.insert(prefix.clone(), uri.clone());
        }
        Ok(())
    }

    /// Bindings ordered by prefix
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings
            .iter()
            .map(|(prefix, uri)| (prefix.as_str(), uri.as_str()))
    }

    /// Number of bindings
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether no prefix is bound
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    fn check_binding(&self, prefix: &str, uri: &str) -> Result<()> {
        match self.bindings.get(prefix) {
            Some(existing) if existing != uri => Err(LomError::NamespaceClash {
                prefix: prefix.to_string(),
                existing: existing.clone(),
                conflicting: uri.to_string(),
            }),
            _ => Ok(()),
        }
    }
}

impl<P: Into<String>, U: Into<String>> FromIterator<(P, U)> for NamespaceContext {
    fn from_iter<I: IntoIterator<Item = (P, U)>>(iter: I) -> Self {
        Self {
            bindings: iter
                .into_iter()
                .map(|(prefix, uri)| (prefix.into(), uri.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lmnl_context() {
        let context = NamespaceContext::lmnl();
        assert_eq!(context.resolve("lmnl"), Some(LMNL_NS_URI));
        assert_eq!(context.prefix_for(LMNL_NS_URI), Some("lmnl"));
        assert_eq!(context.resolve("tei"), None);
    }

    #[test]
    fn test_rebinding_same_uri_is_noop() {
        let mut context = NamespaceContext::lmnl();
        context.bind("lmnl", LMNL_NS_URI).unwrap();
        assert_eq!(context.len(), 1);
    }

    #[test]
    fn test_rebinding_other_uri_clashes() {
        let mut context = NamespaceContext::lmnl();
        let err = context.bind("lmnl", "urn:other").unwrap_err();
        assert!(matches!(err, LomError::NamespaceClash { ref prefix, .. } if prefix == "lmnl"));
        assert_eq!(context.resolve("lmnl"), Some(LMNL_NS_URI));
    }

    #[test]
    fn test_merge_is_all_or_nothing() {
        let mut context: NamespaceContext =
            [("lmnl", LMNL_NS_URI), ("tei", "http://www.tei-c.org/ns/1.0")]
                .into_iter()
                .collect();
        let other: NamespaceContext = [("a", "urn:a"), ("tei", "urn:not-tei")]
            .into_iter()
            .collect();

        assert!(context.merge(&other).is_err());
        assert_eq!(context.resolve("a"), None);

        let compatible: NamespaceContext = [("a", "urn:a"), ("lmnl", LMNL_NS_URI)]
            .into_iter()
            .collect();
        context.merge(&compatible).unwrap();
        assert_eq!(context.resolve("a"), Some("urn:a"));
        assert_eq!(context.len(), 3);
    }
}
