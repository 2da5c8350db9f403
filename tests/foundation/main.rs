//! Integration tests for Layer 0: Foundation
//!
//! Tests for core types: Value, RawRecord, references, EntryType, Error, and
//! persistent collections.

mod collections;
mod errors;
mod records;
mod values;
