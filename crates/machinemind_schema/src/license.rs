//! Licenses: ranked access to a frame's equipment.

use machinemind_foundation::{EntryType, RawRecord, Result, Value};
use machinemind_registry::{AnyEntry, Live, Loader, OpCtx, RegEntry, Registry};
use tracing::warn;

use crate::manufacturer::Manufacturer;
use crate::unpack;

/// A pilot license for one frame line.
///
/// Licenses are keyed by name (the licensed frame's name), which is what
/// licensed items carry in their `license` field.
#[derive(Debug, Default)]
pub struct License {
    /// Licensed frame name.
    pub name: String,
    /// Manufacturer (foreign).
    pub manufacturer: Option<Live<Manufacturer>>,
    /// Rank held (0 to 3).
    pub rank: i64,
    /// Items unlocked by this license (foreign, any kind).
    pub unlocks: Vec<AnyEntry>,
}

impl License {
    /// Unlocked items available at the held rank, read from each item's
    /// `license_level`.
    #[must_use]
    pub fn unlocked_at_rank(&self) -> Vec<AnyEntry> {
        self.unlocks
            .iter()
            .filter(|item| {
                item.registry()
                    .get_raw(item.kind(), item.key())
                    .and_then(|raw| raw.int("license_level"))
                    .is_none_or(|level| level <= self.rank)
            })
            .cloned()
            .collect()
    }

    /// Creates a license from a packed record whose `manufacturer` is an id
    /// and whose `unlocks` are semantic ids.
    ///
    /// # Errors
    ///
    /// Shape errors, or a referenced record failing to load.
    pub fn unpack(packed: &RawRecord, reg: &Registry, ctx: &OpCtx) -> Result<Live<Self>> {
        let manufacturer = match packed.str("manufacturer") {
            Some(id) => reg
                .get_cat::<Manufacturer>()
                .lookup_mmid(ctx, id)?
                .map_or(Value::Null, |m| Value::from(m.reg_ref())),
            None => Value::Null,
        };
        let mut unlocks = Vec::new();
        for id in unpack::strings(packed, Self::KIND, "unlocks")? {
            match reg.resolve_wildcard_mmid(ctx, &id)? {
                Some(item) => unlocks.push(Value::from(item.reg_ref())),
                None => warn!(kind = %Self::KIND, id = %id, "skipping unresolved unlock"),
            }
        }
        let fields = packed
            .with("manufacturer", manufacturer)
            .with("unlocks", unlocks);
        reg.get_cat::<Self>().create_live(ctx, fields)
    }
}

impl RegEntry for License {
    const KIND: EntryType = EntryType::License;
    const MMID_FIELD: Option<&'static str> = Some("name");

    fn defaults() -> RawRecord {
        RawRecord::new().with("name", "New License").with("rank", 0)
    }

    fn load(&mut self, loader: &Loader<'_>) -> Result<()> {
        self.name = loader.string("name")?;
        self.manufacturer = loader.foreign("manufacturer")?;
        self.rank = loader.int_or("rank", 0)?;
        self.unlocks = loader.foreign_many_any("unlocks")?;
        Ok(())
    }

    fn save(&self) -> RawRecord {
        let unlocks: Vec<Value> = self.unlocks.iter().map(|u| Value::from(u.reg_ref())).collect();
        RawRecord::new()
            .with("name", self.name.as_str())
            .with("manufacturer", self.manufacturer.as_ref().map(Live::reg_ref))
            .with("rank", self.rank)
            .with("unlocks", unlocks)
    }
}
