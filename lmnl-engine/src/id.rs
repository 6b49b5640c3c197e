//! Fragment identifier generation

use lmnl_core::RangeAddress;
use std::collections::HashMap;

/// Source of fragment identifiers for segments and layers
pub trait IdGenerator {
    /// Identifier for a text segment
    fn next_for_range(&mut self, range: &RangeAddress) -> String;

    /// Identifier for a layer with the given `prefix:local` name
    fn next_for_layer(&mut self, qualified_name: &str) -> String;

    /// Forget all counters
    fn reset(&mut self);
}

/// Identifiers of the form `seg_{start}_{end}` and `{prefix}_{local}{n}`
///
/// Layer counters are kept per qualified name and start at zero.
#[derive(Debug, Default, Clone)]
pub struct DefaultIdGenerator {
    layer_ids: HashMap<String, usize>,
}

impl DefaultIdGenerator {
    /// Generator with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for DefaultIdGenerator {
    fn next_for_range(&mut self, range: &RangeAddress) -> String {
        format!("seg_{}_{}", range.start(), range.end())
    }

    fn next_for_layer(&mut self, qualified_name: &str) -> String {
        let key = qualified_name.replace(':', "_");
        let counter = self.layer_ids.entry(key.clone()).or_insert(0);
        let id = format!("{key}{counter}");
        *counter += 1;
        id
    }

    fn reset(&mut self) {
        self.layer_ids.clear();
    }
}
