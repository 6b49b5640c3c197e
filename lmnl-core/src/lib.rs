//! Range algebra for layered, overlapping markup
//!
//! This crate holds the pure value types every other part of the object
//! model is built on: half-open [`RangeAddress`]es over character offsets,
//! namespace-qualified names ([`QName`]) and the deterministic
//! [`CoreError`]s they raise. Nothing here allocates trees or performs I/O.
//!
//! # Example
//!
//! ```rust
//! use lmnl_core::RangeAddress;
//!
//! let word = RangeAddress::new(6, 11).unwrap();
//! assert_eq!(word.apply_to("hello world").unwrap(), "world");
//!
//! // cut "hello " out of the text and recompute the address
//! let cut = RangeAddress::new(0, 6).unwrap();
//! assert_eq!(word.subtract(&cut).unwrap(), RangeAddress::new(0, 5).unwrap());
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod qname;
pub mod range;

pub use error::{CoreError, Result};
pub use qname::QName;
pub use range::RangeAddress;
