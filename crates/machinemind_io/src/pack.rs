//! Content packs: a manifest plus one JSON list of packed records per
//! content file.

use std::collections::BTreeMap;
use std::io::ErrorKind as IoErrorKind;
use std::path::Path;

use machinemind_foundation::{Error, ErrorKind, RawRecord, Result, Value};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

/// File name of the manifest inside a pack.
pub const MANIFEST_FILE: &str = "lcp_manifest.json";

/// One packed record as it appears in a content file.
pub type JsonRecord = serde_json::Map<String, JsonValue>;

/// Pack metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Pack name.
    pub name: String,
    /// Pack author.
    pub author: String,
    /// Pack version string.
    pub version: String,
    /// Pack description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Prefix for generated item ids. Carried but not applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_prefix: Option<String>,
    /// Cover image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Author website.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

/// Packed records, one list per content file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackData {
    /// `manufacturers.json`
    pub manufacturers: Vec<JsonRecord>,
    /// `factions.json`
    pub factions: Vec<JsonRecord>,
    /// `core_bonuses.json`
    pub core_bonuses: Vec<JsonRecord>,
    /// `frames.json`
    pub frames: Vec<JsonRecord>,
    /// `weapons.json`
    pub weapons: Vec<JsonRecord>,
    /// `systems.json`
    pub systems: Vec<JsonRecord>,
    /// `mods.json`
    pub mods: Vec<JsonRecord>,
    /// `pilot_gear.json`
    pub pilot_gear: Vec<JsonRecord>,
    /// `tags.json`
    pub tags: Vec<JsonRecord>,
    /// `deployables.json`
    pub deployables: Vec<JsonRecord>,
}

impl PackData {
    /// Total packed records across every file.
    #[must_use]
    pub fn len(&self) -> usize {
        [
            &self.manufacturers,
            &self.factions,
            &self.core_bonuses,
            &self.frames,
            &self.weapons,
            &self.systems,
            &self.mods,
            &self.pilot_gear,
            &self.tags,
            &self.deployables,
        ]
        .iter()
        .map(|list| list.len())
        .sum()
    }

    /// Returns true if no file holds any record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A parsed content pack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentPack {
    /// `"{author}/{name}"`.
    pub id: String,
    /// Whether the pack is enabled.
    pub active: bool,
    /// Metadata.
    pub manifest: Manifest,
    /// Content.
    pub data: PackData,
}

impl ContentPack {
    /// Creates an inactive pack, deriving its id from the manifest.
    #[must_use]
    pub fn new(manifest: Manifest, data: PackData) -> Self {
        Self {
            id: pack_id(&manifest),
            active: false,
            manifest,
            data,
        }
    }

    /// Builds a pack from named file contents.
    ///
    /// The manifest is required. A missing content file reads as empty; a
    /// malformed one is logged and skipped. Records without an `id` get one
    /// generated from their `name`, except manufacturers and factions.
    ///
    /// # Errors
    ///
    /// `InvalidManifest` if the manifest is missing or invalid.
    pub fn from_files<'a, I>(files: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let files: BTreeMap<&str, &str> = files.into_iter().collect();
        let manifest = files
            .get(MANIFEST_FILE)
            .ok_or_else(|| invalid_manifest("content pack has no manifest"))
            .and_then(|json| parse_manifest(json))?;

        let read = |name: &str| {
            files
                .get(name)
                .map_or_else(Vec::new, |text| read_records(name, text))
        };
        let data = PackData {
            manufacturers: read("manufacturers.json"),
            factions: read("factions.json"),
            core_bonuses: with_ids(read("core_bonuses.json")),
            frames: with_ids(read("frames.json")),
            weapons: with_ids(read("weapons.json")),
            systems: with_ids(read("systems.json")),
            mods: with_ids(read("mods.json")),
            pilot_gear: with_ids(read("pilot_gear.json")),
            tags: with_ids(read("tags.json")),
            deployables: read("deployables.json"),
        };
        let pack = Self::new(manifest, data);
        debug!(pack = %pack.id, records = pack.data.len(), "parsed content pack");
        Ok(pack)
    }

    /// Builds a pack from an unpacked pack directory.
    ///
    /// # Errors
    ///
    /// `IoError` if the manifest cannot be read, or `InvalidManifest`.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let mut contents: Vec<(&str, String)> = Vec::new();
        for name in std::iter::once(MANIFEST_FILE).chain(CONTENT_FILES) {
            let path = dir.join(name);
            match std::fs::read_to_string(&path) {
                Ok(text) => contents.push((name, text)),
                Err(e) if e.kind() == IoErrorKind::NotFound && name != MANIFEST_FILE => {}
                Err(e) if name == MANIFEST_FILE => {
                    return Err(Error::new(ErrorKind::IoError(format!(
                        "failed to read manifest '{}': {e}",
                        path.display()
                    ))));
                }
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "unreadable pack file, skipping");
                }
            }
        }
        Self::from_files(contents.iter().map(|(name, text)| (*name, text.as_str())))
    }
}

const CONTENT_FILES: [&str; 10] = [
    "manufacturers.json",
    "factions.json",
    "core_bonuses.json",
    "frames.json",
    "weapons.json",
    "systems.json",
    "mods.json",
    "pilot_gear.json",
    "tags.json",
    "deployables.json",
];

fn invalid_manifest(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::InvalidManifest(message.into()))
}

/// Parses and validates a manifest: `name`, `author` and `version` must be
/// strings.
///
/// # Errors
///
/// `InvalidManifest` on malformed JSON or missing fields.
pub fn parse_manifest(json: &str) -> Result<Manifest> {
    let value: JsonValue = serde_json::from_str(json).map_err(|e| invalid_manifest(e.to_string()))?;
    for field in ["name", "author", "version"] {
        if !value.get(field).is_some_and(JsonValue::is_string) {
            return Err(invalid_manifest(format!("`{field}` must be a string")));
        }
    }
    serde_json::from_value(value).map_err(|e| invalid_manifest(e.to_string()))
}

/// The id a pack is known by.
#[must_use]
pub fn pack_id(manifest: &Manifest) -> String {
    format!("{}/{}", manifest.author, manifest.name)
}

/// Derives an item id from a display name: spaces, slashes and hyphens
/// become underscores, anything else outside `[A-Za-z0-9_]` is dropped, and
/// the result is lowercased.
#[must_use]
pub fn generate_id(name: &str) -> String {
    name.chars()
        .map(|c| if matches!(c, ' ' | '/' | '-') { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn read_records(file: &str, text: &str) -> Vec<JsonRecord> {
    let parsed: std::result::Result<Vec<JsonRecord>, _> = serde_json::from_str(text);
    match parsed {
        Ok(records) => records,
        Err(e) => {
            warn!(file, error = %e, "malformed pack file, skipping");
            Vec::new()
        }
    }
}

fn with_ids(mut records: Vec<JsonRecord>) -> Vec<JsonRecord> {
    for record in &mut records {
        let has_id = record.get("id").and_then(JsonValue::as_str).is_some_and(|id| !id.is_empty());
        if has_id {
            continue;
        }
        if let Some(name) = record.get("name").and_then(JsonValue::as_str) {
            let id = generate_id(name);
            record.insert("id".to_string(), JsonValue::String(id));
        }
    }
    records
}

/// Converts a JSON value into a record value. Integral numbers that fit
/// `i64` become `Int`; every other number becomes `Float`.
#[must_use]
pub fn json_to_value(json: &JsonValue) -> Value {
    match json {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Number(n) => n
            .as_i64()
            .map_or_else(|| Value::Float(n.as_f64().unwrap_or(f64::NAN)), Value::Int),
        JsonValue::String(s) => Value::from(s.as_str()),
        JsonValue::Array(items) => Value::from(items.iter().map(json_to_value).collect::<Vec<_>>()),
        JsonValue::Object(map) => {
            Value::map(map.iter().map(|(k, v)| (k.as_str(), json_to_value(v))))
        }
    }
}

/// Converts a packed JSON record into a raw record.
#[must_use]
pub fn json_to_record(record: &JsonRecord) -> RawRecord {
    record
        .iter()
        .map(|(k, v)| (k.as_str(), json_to_value(v)))
        .collect()
}
