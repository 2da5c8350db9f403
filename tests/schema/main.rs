//! Integration tests for Layer 2: Schema
//!
//! Tests for unpacking packed content into Lancer kinds, and for the
//! relationships between pilots, mechs, and licenses.

mod equipment;
mod fixtures;
mod frames;
mod pilots;
