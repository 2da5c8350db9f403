//! Content-pack intake: unpacking every packed record into a registry.

use std::collections::BTreeMap;
use std::fmt;

use machinemind_foundation::{EntryType, RawRecord, Result, Value};
use machinemind_registry::{OpCtx, Registry};
use machinemind_schema::{
    CoreBonus, Deployable, Faction, Frame, License, Manufacturer, MechSystem, MechWeapon,
    PilotEquipment,
    TagTemplate, WeaponMod,
};
use serde_json::Value as JsonValue;
use tracing::{debug, info};

use crate::pack::{ContentPack, JsonRecord, json_to_record};

/// How many entries an intake added, per kind.
///
/// Counts include children created along the way (frame traits, core
/// systems, inline deployables).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntakeSummary {
    /// The pack taken in.
    pub pack_id: String,
    counts: BTreeMap<EntryType, usize>,
}

impl IntakeSummary {
    /// Entries of `kind` added.
    #[must_use]
    pub fn count(&self, kind: EntryType) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// Entries added across every kind.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Kinds with at least one added entry, with their counts.
    pub fn iter(&self) -> impl Iterator<Item = (EntryType, usize)> + '_ {
        self.counts.iter().map(|(k, n)| (*k, *n))
    }
}

impl fmt::Display for IntakeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} entries", self.pack_id, self.total())?;
        for (kind, n) in self.iter() {
            write!(f, ", {kind}={n}")?;
        }
        Ok(())
    }
}

/// Unpacks every record of `pack` into `reg`.
///
/// Files are taken in dependency order so ids resolve against what is
/// already stored: tags, manufacturers, factions, weapons, systems, mods,
/// pilot gear, core bonuses, frames, then standalone deployables. Each
/// frame also yields a [`License`] named after it, unlocking every item
/// whose `license` field names the frame.
///
/// # Errors
///
/// The first record that fails to unpack, tagged with its file and index.
/// Records already stored by then stay stored.
pub fn intake_pack(pack: &ContentPack, reg: &Registry, ctx: &OpCtx) -> Result<IntakeSummary> {
    let before: Vec<usize> = EntryType::ALL.iter().map(|kind| reg.count(*kind)).collect();
    let data = &pack.data;
    let id = pack.id.as_str();

    each(id, "tags", &data.tags, |r| TagTemplate::unpack(r, reg, ctx).map(drop))?;
    each(id, "manufacturers", &data.manufacturers, |r| {
        Manufacturer::unpack(r, reg, ctx).map(drop)
    })?;
    each(id, "factions", &data.factions, |r| Faction::unpack(r, reg, ctx).map(drop))?;
    each(id, "weapons", &data.weapons, |r| MechWeapon::unpack(r, reg, ctx).map(drop))?;
    each(id, "systems", &data.systems, |r| MechSystem::unpack(r, reg, ctx).map(drop))?;
    each(id, "mods", &data.mods, |r| WeaponMod::unpack(r, reg, ctx).map(drop))?;
    each(id, "pilot_gear", &data.pilot_gear, |r| PilotEquipment::unpack(r, reg, ctx).map(drop))?;
    each(id, "core_bonuses", &data.core_bonuses, |r| CoreBonus::unpack(r, reg, ctx).map(drop))?;
    each(id, "frames", &data.frames, |r| Frame::unpack(r, reg, ctx).map(drop))?;
    each(id, "deployables", &data.deployables, |r| Deployable::unpack(r, reg, ctx).map(drop))?;

    let licenses = frame_licenses(pack);
    for (i, license) in licenses.iter().enumerate() {
        License::unpack(license, reg, ctx)
            .map_err(|e| e.with_frame(format!("{id}/licenses[{i}]")))?;
    }

    let counts = EntryType::ALL
        .iter()
        .zip(before)
        .filter_map(|(kind, was)| {
            let added = reg.count(*kind).saturating_sub(was);
            (added > 0).then_some((*kind, added))
        })
        .collect();
    let summary = IntakeSummary {
        pack_id: pack.id.clone(),
        counts,
    };
    info!(
        pack = %pack.id,
        registry = reg.name(),
        entries = summary.total(),
        "content pack taken in"
    );
    Ok(summary)
}

fn each(
    pack_id: &str,
    file: &str,
    records: &[JsonRecord],
    mut unpack: impl FnMut(&RawRecord) -> Result<()>,
) -> Result<()> {
    for (i, record) in records.iter().enumerate() {
        unpack(&json_to_record(record))
            .map_err(|e| e.with_frame(format!("{pack_id}/{file}[{i}]")))?;
    }
    if !records.is_empty() {
        debug!(pack = pack_id, file, records = records.len(), "unpacked pack file");
    }
    Ok(())
}

/// One packed license per frame: named after the frame, sourced from its
/// manufacturer, unlocking the frame and every item licensed under it.
fn frame_licenses(pack: &ContentPack) -> Vec<RawRecord> {
    let data = &pack.data;
    let text = |record: &JsonRecord, field: &str| {
        record
            .get(field)
            .and_then(JsonValue::as_str)
            .map(str::to_string)
    };
    let licensed = [&data.weapons, &data.systems, &data.mods];

    data.frames
        .iter()
        .filter_map(|frame| {
            let name = text(frame, "name")?;
            let mut unlocks: Vec<Value> = text(frame, "id").map(Value::from).into_iter().collect();
            unlocks.extend(
                licensed
                    .iter()
                    .flat_map(|list| list.iter())
                    .filter(|item| {
                        text(*item, "license").is_some_and(|l| l.eq_ignore_ascii_case(&name))
                    })
                    .filter_map(|item| text(item, "id"))
                    .map(Value::from),
            );
            let mut license = RawRecord::new().with("name", name.as_str()).with("unlocks", unlocks);
            if let Some(source) = text(frame, "source") {
                license = license.with("manufacturer", source);
            }
            Some(license)
        })
        .collect()
}
