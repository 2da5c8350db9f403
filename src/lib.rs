//! Machinemind - Typed, cross-referencing game-content registries
//!
//! This crate re-exports all layers of the machinemind system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: machinemind_io          Content-pack intake, MessagePack snapshots
//! Layer 2: machinemind_schema      Entity kinds (load, save, unpack)
//! Layer 1: machinemind_registry    Registries, identity contexts, insinuation
//! Layer 0: machinemind_foundation  Core types (Value, RawRecord, RegRef, Error)
//! ```

pub use machinemind_foundation as foundation;
pub use machinemind_io as io;
pub use machinemind_registry as registry;
pub use machinemind_schema as schema;
