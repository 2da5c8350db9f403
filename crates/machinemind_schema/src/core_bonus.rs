//! Pilot core bonuses.

use machinemind_foundation::{EntryType, RawRecord, Result};
use machinemind_registry::{AnyEntry, Live, Loader, OpCtx, RegEntry, Registry};

use crate::common::Effects;
use crate::deployable::Attachments;
use crate::unpack;

/// A permanent upgrade a pilot earns from a manufacturer.
#[derive(Debug, Default)]
pub struct CoreBonus {
    /// Semantic id (`cb_auto_stabilizing_hardpoints`).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Manufacturer id this bonus sorts under. Kept as a plain id.
    pub source: String,
    /// Rules text.
    pub effect: String,
    /// Lore text.
    pub description: String,
    /// Rules text that applies only while mounted.
    pub mounted_effect: String,
    /// Actions, bonuses, synergies, counters.
    pub effects: Effects,
    /// Owned deployables and integrated entries.
    pub attachments: Attachments,
}

impl CoreBonus {
    /// Creates a core bonus and its inline children from its packed form.
    ///
    /// # Errors
    ///
    /// Shape errors, or a child or the bonus itself failing to load.
    pub fn unpack(packed: &RawRecord, reg: &Registry, ctx: &OpCtx) -> Result<Live<Self>> {
        let fields = packed
            .with("deployables", unpack::deployables(packed, Self::KIND, reg, ctx)?)
            .with("integrated", unpack::integrated(packed, Self::KIND, reg, ctx)?);
        reg.get_cat::<Self>().create_live(ctx, fields)
    }
}

impl RegEntry for CoreBonus {
    const KIND: EntryType = EntryType::CoreBonus;

    fn defaults() -> RawRecord {
        RawRecord::new()
            .with("name", "New Core Bonus")
            .with("source", "")
            .with("effect", "")
            .with("description", "")
            .with("mounted_effect", "")
    }

    fn load(&mut self, loader: &Loader<'_>) -> Result<()> {
        self.id = loader.string_or("id", "")?;
        self.name = loader.string("name")?;
        self.source = loader.string_or("source", "")?;
        self.effect = loader.string_or("effect", "")?;
        self.description = loader.string_or("description", "")?;
        self.mounted_effect = loader.string_or("mounted_effect", "")?;
        self.effects = Effects::load(loader)?;
        self.attachments = Attachments::load(loader)?;
        Ok(())
    }

    fn save(&self) -> RawRecord {
        let record = RawRecord::new()
            .with("id", self.id.as_str())
            .with("name", self.name.as_str())
            .with("source", self.source.as_str())
            .with("effect", self.effect.as_str())
            .with("description", self.description.as_str())
            .with("mounted_effect", self.mounted_effect.as_str());
        self.attachments
            .save_into(self.effects.save_into(record))
    }

    fn assoc_entries(&self) -> Vec<AnyEntry> {
        self.attachments.entries()
    }
}
