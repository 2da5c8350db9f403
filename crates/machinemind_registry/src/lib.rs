//! Scoped entity registries for machinemind.
//!
//! This crate provides:
//! - [`Registry`] - One named storage scope of raw records, per entity kind
//! - [`RegCat`] - Typed view over one kind's records in a registry
//! - [`Live`] / [`AnyEntry`] - Materialized, mutable entity instances
//! - [`OpCtx`] - Per-operation identity map (one live instance per record)
//! - [`RegEnv`] - Shared environment: configuration, keys, schemas, names
//! - Insinuation: copying an entry and its owned subtree between registries
//!
//! # Example
//!
//! ```ignore
//! let env = RegEnv::new(schemas);
//! let global = env.create_registry("global");
//! let ctx = OpCtx::new();
//!
//! let frame = global.get_cat::<Frame>().lookup_mmid(&ctx, "mf_lancaster")?;
//! let inventory = pilot.inventory();
//! let personal = frame.unwrap().insinuate(&inventory, None)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod category;
pub mod config;
pub mod ctx;
pub mod entry;
pub mod hooks;
mod insinuate;
pub mod keys;
pub mod load;
pub mod registry;
pub mod schema;


pub use category::RegCat;
pub use config::RegistryConfig;
pub use ctx::{OpCtx, Reservation, Slot};
pub use entry::{AnyEntry, Live, RegEntry};
pub use hooks::{InsinuationHook, InsinuationLog, InsinuationRecord};
pub use keys::KeyAllocator;
pub use load::Loader;
pub use registry::{RegEnv, Registry};
pub use schema::{KindSchema, SchemaTable};
