//! Integration tests for Layer 3: IO
//!
//! Tests for content-pack parsing and intake, and for registry snapshots.

mod fixtures;
mod snapshots;
