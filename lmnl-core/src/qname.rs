//! Namespace-qualified names

use core::cmp::Ordering;
use core::fmt;

/// A local name optionally bound to a namespace URI
///
/// Names compare by namespace first, then by local name. Names without a
/// namespace sort after all namespaced names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QName {
    namespace: Option<String>,
    local_name: String,
}

impl QName {
    /// Create a name in `namespace`
    pub fn new(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local_name: local_name.into(),
        }
    }

    /// Create a name without namespace
    pub fn local(local_name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local_name: local_name.into(),
        }
    }

    /// Namespace URI, if any
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Local part of the name
    pub fn local_name(&self) -> &str {
        &self.local_name
    }
}

impl Ord for QName {
    fn cmp(&self, other: &Self) -> Ordering {
        let namespace = match (&self.namespace, &other.namespace) {
            (Some(a), Some(b)) => a.cmp(b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        namespace.then_with(|| self.local_name.cmp(&other.local_name))
    }
}

impl PartialOrd for QName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(f, "{{{}}}{}", namespace, self.local_name),
            None => f.write_str(&self.local_name),
        }
    }
}
