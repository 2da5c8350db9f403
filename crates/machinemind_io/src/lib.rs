//! Content-pack intake and snapshots for machinemind.
//!
//! This crate provides:
//! - [`ContentPack`] - A manifest plus packed JSON records, built from named
//!   files or an unpacked pack directory
//! - [`intake_pack`] - Unpacks a pack's records into a registry in
//!   dependency order
//! - [`to_bytes`] / [`from_bytes`] and file variants - `MessagePack`
//!   snapshots of a registry and its inventories

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod intake;
pub mod pack;
pub mod serialize;

pub use intake::{IntakeSummary, intake_pack};
pub use pack::{
    ContentPack, JsonRecord, MANIFEST_FILE, Manifest, PackData, generate_id, json_to_record,
    json_to_value, pack_id, parse_manifest,
};
pub use serialize::{
    InventorySnapshot, RegistrySnapshot, SNAPSHOT_VERSION, StoredRecord, from_bytes, load_from_file,
    save_to_file, to_bytes,
};
