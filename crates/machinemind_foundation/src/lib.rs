//! Core values, raw records, references, and errors for machinemind.
//!
//! This crate provides:
//! - [`Value`] - The JSON-like value type stored in raw records
//! - [`RawRecord`] - The durable, schema-agnostic representation of one entity
//! - [`EntryType`] - The closed set of entity kinds
//! - [`RegRef`] and [`StorageKey`] - Serializable pointers to stored entities
//! - [`Error`] - Rich error types with context
//! - Persistent collections ([`LtVec`], [`LtMap`])

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod collections;
pub mod entry_type;
pub mod error;
pub mod record;
pub mod reference;
pub mod types;
pub mod value;

pub use collections::{LtMap, LtVec};
pub use entry_type::EntryType;
pub use error::{Error, ErrorContext, ErrorKind};
pub use record::RawRecord;
pub use reference::{RegRef, StorageKey};
pub use types::ValueType;
pub use value::Value;

/// Result type alias using the machinemind [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
