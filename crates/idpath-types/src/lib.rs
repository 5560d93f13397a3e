//! Foundation types for idpath.
//!
//! This crate provides the identifier and result types every other idpath
//! crate builds on.
//!
//! # Key Types
//!
//! - [`Id`] — Immutable byte identifier of up to 255 bytes
//! - [`Address`] — Ordered chain of ids flattened into a length-prefixed buffer
//! - [`Outcome`] — Chainable success/failure with source attribution
//! - [`IdError`] — Construction and parse failures for ids and addresses

pub mod address;
pub mod error;
pub mod id;
pub mod outcome;

pub use address::{Address, Ids, ID_SEPARATOR};
pub use error::IdError;
pub use id::{Id, MAX_ID_LEN};
pub use outcome::{Outcome, OutcomeError};
