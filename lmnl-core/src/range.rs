//! Half-open text segment addresses and their algebra
//!
//! Offsets are counted in characters from zero and sit in the *gaps*
//! between characters:
//!
//! ```text
//!   a   b   c   d   e
//! 0 | 1 | 2 | 3 | 4 | 5
//! ```
//!
//! `"bcd"` is addressed by `[1, 4]`, the whole string by `[0, 5]` and the
//! gap between `d` and `e` by the empty segment `[4, 4]`.
//!
//! The relations (`encloses`, `has_overlap_with`, ...) follow Nicol's core
//! range algebra and are what the event generator and the overlap indexer
//! are built on.

use crate::error::{CoreError, Result};
use core::cmp::Ordering;
use core::fmt;

/// Address of a text segment `[start, end)`
///
/// Ordering is by ascending start and, on equal starts, by *descending*
/// end, so an enclosing range sorts before the ranges it encloses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "(usize, usize)", into = "(usize, usize)")
)]
pub struct RangeAddress {
    start: usize,
    end: usize,
}

impl RangeAddress {
    /// The empty segment at offset zero
    pub const NULL: RangeAddress = RangeAddress { start: 0, end: 0 };

    /// Create a segment address, rejecting `start > end`
    pub fn new(start: usize, end: usize) -> Result<Self> {
        if start > end {
            return Err(CoreError::InvalidRange {
                start: start as i64,
                end: end as i64,
            });
        }
        Ok(Self { start, end })
    }

    /// Empty segment pointing at the gap before `offset`
    pub fn point(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Start offset (inclusive)
    pub fn start(&self) -> usize {
        self.start
    }

    /// End offset (exclusive)
    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of characters covered
    pub fn length(&self) -> usize {
        self.end - self.start
    }

    /// Whether this is an empty (atomic) segment
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Extract the addressed segment from `text`
    pub fn apply_to<'a>(&self, text: &'a str) -> Result<&'a str> {
        let out_of_bounds = || CoreError::OutOfBounds {
            start: self.start,
            end: self.end,
            length: text.chars().count(),
        };

        let start = byte_offset(text, self.start).ok_or_else(out_of_bounds)?;
        let end = byte_offset(&text[start..], self.length())
            .map(|len| start + len)
            .ok_or_else(out_of_bounds)?;

        Ok(&text[start..end])
    }

    /// `self.start <= b.start && self.end >= b.end`
    pub fn encloses(&self, b: &RangeAddress) -> bool {
        self.start <= b.start && self.end >= b.end
    }

    /// `self.start < b.start && self.end == b.end`
    pub fn encloses_with_prefix(&self, b: &RangeAddress) -> bool {
        self.start < b.start && self.end == b.end
    }

    /// `self.start == b.start && self.end > b.end`
    pub fn encloses_with_suffix(&self, b: &RangeAddress) -> bool {
        self.start == b.start && self.end > b.end
    }

    /// `self != b && self.start >= b.start && self.end <= b.end`
    pub fn fits_within(&self, b: &RangeAddress) -> bool {
        self != b && self.start >= b.start && self.end <= b.end
    }

    /// `min(end) - max(start)`; zero or negative means no overlap
    pub fn overlap_with(&self, b: &RangeAddress) -> i64 {
        self.end.min(b.end) as i64 - self.start.max(b.start) as i64
    }

    /// `overlap_with(b) > 0`
    pub fn has_overlap_with(&self, b: &RangeAddress) -> bool {
        self.overlap_with(b) > 0
    }

    /// Common segment `[max(start), min(end)]`, or `None` for disjoint ranges
    pub fn intersection_with(&self, b: &RangeAddress) -> Option<RangeAddress> {
        RangeAddress::new(self.start.max(b.start), self.end.min(b.end)).ok()
    }

    /// `b.start >= self.end`
    pub fn precedes(&self, b: &RangeAddress) -> bool {
        b.start >= self.end
    }

    /// `self.start >= b.end - 1`
    pub fn follows(&self, b: &RangeAddress) -> bool {
        self.start + 1 >= b.end
    }

    /// Recompute this address after `subtrahend` has been cut out of the text
    ///
    /// Ranges before the cut are unchanged, ranges after it shift left by
    /// its length, partially overlapping ranges shrink. A subtrahend that
    /// encloses this range without being equal to it has no defined result.
    pub fn subtract(&self, subtrahend: &RangeAddress) -> Result<RangeAddress> {
        if self.end <= subtrahend.start {
            return Ok(*self);
        }

        let length = subtrahend.length();
        if self.start >= subtrahend.end {
            return RangeAddress::new(self.start - length, self.end - length);
        }

        if subtrahend.encloses(self) && subtrahend != self {
            return Err(CoreError::SubtractionDomain {
                start: self.start,
                end: self.end,
                subtrahend_start: subtrahend.start,
                subtrahend_end: subtrahend.end,
            });
        }

        // non-negative: both ranges reach into each other here
        let overlap = self.overlap_with(subtrahend) as usize;
        let start = if self.start < subtrahend.start {
            self.start
        } else {
            self.start - (length - overlap)
        };
        let end = if self.end >= subtrahend.end {
            self.end - length
        } else {
            self.end - overlap
        };
        RangeAddress::new(start, end)
    }
}

/// Byte index of the character offset `offset`, allowing the end of `text`
fn byte_offset(text: &str, offset: usize) -> Option<usize> {
    text.char_indices()
        .map(|(index, _)| index)
        .chain(core::iter::once(text.len()))
        .nth(offset)
}

impl Ord for RangeAddress {
    fn cmp(&self, other: &Self) -> Ordering {
        self.start
            .cmp(&other.start)
            .then_with(|| other.end.cmp(&self.end))
    }
}

impl PartialOrd for RangeAddress {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Default for RangeAddress {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for RangeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

impl TryFrom<(usize, usize)> for RangeAddress {
    type Error = CoreError;

    fn try_from((start, end): (usize, usize)) -> Result<Self> {
        RangeAddress::new(start, end)
    }
}

impl TryFrom<(i64, i64)> for RangeAddress {
    type Error = CoreError;

    fn try_from((start, end): (i64, i64)) -> Result<Self> {
        if start < 0 || end < 0 || start > end {
            return Err(CoreError::InvalidRange { start, end });
        }
        RangeAddress::new(start as usize, end as usize)
    }
}

impl From<RangeAddress> for (usize, usize) {
    fn from(range: RangeAddress) -> Self {
        (range.start, range.end)
    }
}

impl From<RangeAddress> for core::ops::Range<usize> {
    fn from(range: RangeAddress) -> Self {
        range.start..range.end
    }
}
