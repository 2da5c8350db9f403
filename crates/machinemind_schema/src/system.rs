//! Mech systems.

use machinemind_foundation::{EntryType, RawRecord, Result};
use machinemind_registry::{AnyEntry, Live, Loader, OpCtx, RegEntry, Registry};

use crate::common::Effects;
use crate::deployable::Attachments;
use crate::manufacturer::Manufacturer;
use crate::tag::{TagInstance, read_tags, save_tags};
use crate::unpack;

/// A mech-scale system (shields, drones, tech, ...).
#[derive(Debug, Default)]
pub struct MechSystem {
    /// Semantic id (`ms_pattern_a_smoke_charges`).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Manufacturer (foreign).
    pub source: Option<Live<Manufacturer>>,
    /// Licensing frame name.
    pub license: String,
    /// License rank needed.
    pub license_level: i64,
    /// System point cost.
    pub sp: i64,
    /// System type (`System`, `AI`, `Shield`, `Drone`, `Tech`, ...).
    pub kind: String,
    /// Rules text.
    pub effect: String,
    /// Lore text.
    pub description: String,
    /// Remaining limited uses.
    pub uses: i64,
    /// Cascading (AI gone rogue).
    pub cascading: bool,
    /// Destroyed in combat.
    pub destroyed: bool,
    /// Actions, bonuses, synergies, counters.
    pub effects: Effects,
    /// Tags.
    pub tags: Vec<TagInstance>,
    /// Owned deployables and integrated entries.
    pub attachments: Attachments,
}

impl MechSystem {
    /// Creates a system and its inline children from its packed form.
    ///
    /// # Errors
    ///
    /// Shape errors, or a child or the system failing to load.
    pub fn unpack(packed: &RawRecord, reg: &Registry, ctx: &OpCtx) -> Result<Live<Self>> {
        let fields = unpack::equipment(packed, Self::KIND, reg, ctx)?
            .with("source", unpack::source(packed, Self::KIND, reg, ctx)?);
        reg.get_cat::<Self>().create_live(ctx, fields)
    }
}

impl RegEntry for MechSystem {
    const KIND: EntryType = EntryType::MechSystem;

    fn defaults() -> RawRecord {
        RawRecord::new()
            .with("name", "New Mech System")
            .with("license", "")
            .with("license_level", 0)
            .with("sp", 0)
            .with("type", "System")
            .with("effect", "")
            .with("description", "")
            .with("uses", 0)
            .with("cascading", false)
            .with("destroyed", false)
    }

    fn load(&mut self, loader: &Loader<'_>) -> Result<()> {
        self.id = loader.string_or("id", "")?;
        self.name = loader.string("name")?;
        self.source = loader.foreign("source")?;
        self.license = loader.string_or("license", "")?;
        self.license_level = loader.int_or("license_level", 0)?;
        self.sp = loader.int_or("sp", 0)?;
        self.kind = loader.string_or("type", "System")?;
        self.effect = loader.string_or("effect", "")?;
        self.description = loader.string_or("description", "")?;
        self.uses = loader.int_or("uses", 0)?;
        self.cascading = loader.bool_or("cascading", false)?;
        self.destroyed = loader.bool_or("destroyed", false)?;
        self.effects = Effects::load(loader)?;
        self.tags = read_tags(loader, "tags")?;
        self.attachments = Attachments::load(loader)?;
        Ok(())
    }

    fn save(&self) -> RawRecord {
        let record = RawRecord::new()
            .with("id", self.id.as_str())
            .with("name", self.name.as_str())
            .with("source", self.source.as_ref().map(Live::reg_ref))
            .with("license", self.license.as_str())
            .with("license_level", self.license_level)
            .with("sp", self.sp)
            .with("type", self.kind.as_str())
            .with("effect", self.effect.as_str())
            .with("description", self.description.as_str())
            .with("uses", self.uses)
            .with("cascading", self.cascading)
            .with("destroyed", self.destroyed)
            .with("tags", save_tags(&self.tags));
        self.attachments
            .save_into(self.effects.save_into(record))
    }

    fn assoc_entries(&self) -> Vec<AnyEntry> {
        self.attachments.entries()
    }
}
