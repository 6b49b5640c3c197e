//! Text storage collaborators
//!
//! Layer texts can be kept outside the tree. A [`TextRepository`] stores
//! one text per layer and serves full reads as well as segment reads. Its
//! I/O failures reach callers unchanged as [`LomError::TextRepository`].

use crate::document::Document;
use crate::error::{LomError, Result};
use crate::node::NodeId;
use lmnl_core::RangeAddress;
use std::collections::{BTreeMap, HashMap};
use std::io::{self, Read};
use tracing::trace;

/// Storage of layer texts
pub trait TextRepository {
    /// Length of the text of `layer` in characters
    fn length(&self, layer: NodeId) -> Result<usize>;

    /// Stream over the full text of `layer`
    fn read(&self, layer: NodeId) -> Result<Box<dyn Read + '_>>;

    /// Segment of the text of `layer`
    fn read_range(&self, layer: NodeId, range: &RangeAddress) -> Result<String>;

    /// Segments of the text of `layer`, keyed and ordered by range
    fn bulk_read(&self, layer: NodeId, ranges: &[RangeAddress]) -> Result<BTreeMap<RangeAddress, String>> {
        ranges
            .iter()
            .map(|range| Ok((*range, self.read_range(layer, range)?)))
            .collect()
    }

    /// Replace the text of `layer` with the first `length` characters of `content`
    ///
    /// Content shorter than `length` fails with
    /// [`io::ErrorKind::UnexpectedEof`].
    fn write(&mut self, layer: NodeId, content: &mut dyn Read, length: usize) -> Result<()>;
}

/// Texts held in memory, keyed by layer
#[derive(Debug, Default, Clone)]
pub struct MemoryTextRepository {
    texts: HashMap<NodeId, String>,
}

impl MemoryTextRepository {
    /// Empty repository
    pub fn new() -> Self {
        Self::default()
    }

    fn text(&self, layer: NodeId) -> Result<&str> {
        self.texts.get(&layer).map(String::as_str).ok_or_else(|| {
            LomError::TextRepository(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no text stored for {layer}"),
            ))
        })
    }
}

impl TextRepository for MemoryTextRepository {
    fn length(&self, layer: NodeId) -> Result<usize> {
        Ok(self.text(layer)?.chars().count())
    }

    fn read(&self, layer: NodeId) -> Result<Box<dyn Read + '_>> {
        Ok(Box::new(self.text(layer)?.as_bytes()))
    }

    fn read_range(&self, layer: NodeId, range: &RangeAddress) -> Result<String> {
        Ok(range.apply_to(self.text(layer)?)?.to_string())
    }

    fn write(&mut self, layer: NodeId, content: &mut dyn Read, length: usize) -> Result<()> {
        let mut buffer = String::new();
        content.read_to_string(&mut buffer)?;

        let end = match buffer.char_indices().nth(length) {
            Some((index, _)) => index,
            None if buffer.chars().count() == length => buffer.len(),
            None => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("expected {length} characters for {layer}"),
                )
                .into())
            }
        };
        buffer.truncate(end);
        trace!(%layer, length, "stored text");
        self.texts.insert(layer, buffer);
        Ok(())
    }
}

impl Document {
    /// Store the own text of `layer` in `repository`
    pub fn export_text(&self, layer: NodeId, repository: &mut dyn TextRepository) -> Result<()> {
        let text = self
            .node(layer)?
            .own_text()
            .ok_or(LomError::MissingText { layer })?;
        let length = text.chars().count();
        repository.write(layer, &mut text.as_bytes(), length)
    }

    /// Read the segments addressed by the children of `layer` from `repository`
    pub fn read_segments(
        &self,
        layer: NodeId,
        repository: &dyn TextRepository,
    ) -> Result<BTreeMap<RangeAddress, String>> {
        let ranges = self
            .children(layer)?
            .iter()
            .map(|&child| self.range(child))
            .collect::<Result<Vec<_>>>()?;
        repository.bulk_read(layer, &ranges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer() -> NodeId {
        NodeId::new(0, 0)
    }

    #[test]
    fn test_write_then_read() {
        let mut repository = MemoryTextRepository::new();
        repository
            .write(layer(), &mut "hello world".as_bytes(), 11)
            .unwrap();

        assert_eq!(repository.length(layer()).unwrap(), 11);
        let mut text = String::new();
        repository
            .read(layer())
            .unwrap()
            .read_to_string(&mut text)
            .unwrap();
        assert_eq!(text, "hello world");
    }

    #[test]
    fn test_write_truncates_to_length() {
        let mut repository = MemoryTextRepository::new();
        repository
            .write(layer(), &mut "grüße aus Köln".as_bytes(), 5)
            .unwrap();
        assert_eq!(
            repository
                .read_range(layer(), &RangeAddress::new(0, 5).unwrap())
                .unwrap(),
            "grüße"
        );
    }

    #[test]
    fn test_short_write_is_unexpected_eof() {
        let mut repository = MemoryTextRepository::new();
        let err = repository
            .write(layer(), &mut "abc".as_bytes(), 10)
            .unwrap_err();
        match err {
            LomError::TextRepository(io) => assert_eq!(io.kind(), io::ErrorKind::UnexpectedEof),
            other => panic!("expected I/O error, got {other:?}"),
        }
        assert!(repository.length(layer()).is_err());
    }

    #[test]
    fn test_unknown_layer_is_not_found() {
        let repository = MemoryTextRepository::new();
        match repository.length(layer()) {
            Err(LomError::TextRepository(io)) => assert_eq!(io.kind(), io::ErrorKind::NotFound),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_bulk_read_orders_by_range() {
        let mut repository = MemoryTextRepository::new();
        repository.write(layer(), &mut "abcdef".as_bytes(), 6).unwrap();
        let ranges = [
            RangeAddress::new(2, 3).unwrap(),
            RangeAddress::new(0, 6).unwrap(),
            RangeAddress::new(0, 2).unwrap(),
        ];
        let segments = repository.bulk_read(layer(), &ranges).unwrap();
        let values: Vec<&str> = segments.values().map(String::as_str).collect();
        assert_eq!(values, vec!["abcdef", "ab", "c"]);
    }
}
