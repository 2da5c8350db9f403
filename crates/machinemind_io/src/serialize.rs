//! Registry snapshots using `MessagePack`.
//!
//! A snapshot holds a registry's raw records with their storage keys, and
//! the snapshots of every inventory its entries own. Restoring recreates
//! the registry tree under the same names and keys, so references between
//! records keep pointing where they did.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use machinemind_foundation::{EntryType, Error, ErrorKind, RawRecord, Result, StorageKey};
use machinemind_registry::{RegEnv, Registry};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Format version written into every snapshot.
pub const SNAPSHOT_VERSION: u32 = 1;

/// One stored record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Entity kind.
    pub kind: EntryType,
    /// Storage key.
    pub key: StorageKey,
    /// Field data.
    pub raw: RawRecord,
}

/// An inventory and the entry that owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    /// Owner kind.
    pub owner_kind: EntryType,
    /// Owner storage key.
    pub owner_key: StorageKey,
    /// The inventory's contents.
    pub registry: RegistrySnapshot,
}

/// The serializable contents of one registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    /// Format version.
    pub version: u32,
    /// Registry name.
    pub name: String,
    /// Every record, grouped by kind in kind order.
    pub records: Vec<StoredRecord>,
    /// Inventories owned by this registry's entries.
    pub inventories: Vec<InventorySnapshot>,
}

impl RegistrySnapshot {
    /// Captures `reg` and, recursively, its inventories.
    #[must_use]
    pub fn capture(reg: &Registry) -> Self {
        let records = reg
            .kinds()
            .into_iter()
            .flat_map(|kind| {
                reg.keys(kind).into_iter().filter_map(move |key| {
                    reg.get_raw(kind, &key).map(|raw| StoredRecord { kind, key, raw })
                })
            })
            .collect();
        let inventories = reg
            .inventories()
            .into_iter()
            .map(|(owner_kind, owner_key, inventory)| InventorySnapshot {
                owner_kind,
                owner_key,
                registry: Self::capture(&inventory),
            })
            .collect();
        Self {
            version: SNAPSHOT_VERSION,
            name: reg.name().to_string(),
            records,
            inventories,
        }
    }

    /// Records in this registry and every nested inventory.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.records.len()
            + self
                .inventories
                .iter()
                .map(|inv| inv.registry.record_count())
                .sum::<usize>()
    }

    /// Recreates the registry tree in `env`.
    ///
    /// # Errors
    ///
    /// `SerializationError` on a version mismatch or if a registry with
    /// the snapshot's name already exists; `DuplicateKey` if the snapshot
    /// repeats a key.
    pub fn restore(&self, env: &RegEnv) -> Result<Registry> {
        self.check_version()?;
        if env.registry(&self.name).is_some() {
            return Err(serialization_error(format!(
                "registry '{}' already exists",
                self.name
            )));
        }
        let reg = env.create_registry(&self.name);
        self.restore_into(&reg)?;
        debug!(registry = reg.name(), records = self.record_count(), "restored snapshot");
        Ok(reg)
    }

    fn restore_into(&self, reg: &Registry) -> Result<()> {
        self.check_version()?;
        for record in &self.records {
            reg.restore_raw(record.kind, record.key.clone(), record.raw.clone())?;
        }
        for inv in &self.inventories {
            let inventory = reg.inventory_for(inv.owner_kind, &inv.owner_key);
            if inventory.name() != inv.registry.name {
                warn!(
                    expected = %inv.registry.name,
                    actual = inventory.name(),
                    "restored inventory under a different name"
                );
            }
            inv.registry.restore_into(&inventory)?;
        }
        Ok(())
    }

    fn check_version(&self) -> Result<()> {
        if self.version == SNAPSHOT_VERSION {
            Ok(())
        } else {
            Err(serialization_error(format!(
                "unsupported snapshot version {} (expected {SNAPSHOT_VERSION})",
                self.version
            )))
        }
    }
}

fn serialization_error(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::SerializationError(message.into()))
}

/// Serializes a registry tree to bytes using `MessagePack` format.
///
/// Uses named serialization to preserve struct field names.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_bytes(reg: &Registry) -> Result<Vec<u8>> {
    rmp_serde::to_vec_named(&RegistrySnapshot::capture(reg))
        .map_err(|e| serialization_error(e.to_string()))
}

/// Restores a registry tree from `MessagePack` bytes into `env`.
///
/// # Errors
///
/// Returns an error if deserialization or restoring fails.
pub fn from_bytes(env: &RegEnv, bytes: &[u8]) -> Result<Registry> {
    let snapshot: RegistrySnapshot =
        rmp_serde::from_slice(bytes).map_err(|e| serialization_error(e.to_string()))?;
    snapshot.restore(env)
}

/// Saves a registry tree to a file using `MessagePack` format.
///
/// Creates the file if it doesn't exist, or overwrites it if it does.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written to,
/// or if serialization fails.
pub fn save_to_file<P: AsRef<Path>>(reg: &Registry, path: P) -> Result<()> {
    let path = path.as_ref();
    let io_error = |action: &str, e: std::io::Error| {
        Error::new(ErrorKind::IoError(format!(
            "failed to {action} file '{}': {e}",
            path.display()
        )))
    };

    let bytes = to_bytes(reg)?;
    let file = File::create(path).map_err(|e| io_error("create", e))?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&bytes).map_err(|e| io_error("write to", e))?;
    writer.flush().map_err(|e| io_error("flush", e))?;
    Ok(())
}

/// Loads a registry tree from a `MessagePack` file into `env`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or if deserialization fails.
pub fn load_from_file<P: AsRef<Path>>(env: &RegEnv, path: P) -> Result<Registry> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        Error::new(ErrorKind::IoError(format!(
            "failed to open file '{}': {e}",
            path.display()
        )))
    })?;

    let mut reader = BufReader::new(file);
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).map_err(|e| {
        Error::new(ErrorKind::IoError(format!(
            "failed to read file '{}': {e}",
            path.display()
        )))
    })?;

    from_bytes(env, &bytes)
}
