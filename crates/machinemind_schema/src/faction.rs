//! Factions.

use machinemind_foundation::{EntryType, RawRecord, Result};
use machinemind_registry::{Live, Loader, OpCtx, RegEntry, Registry};

/// A political faction a pilot may belong to.
#[derive(Debug, Default)]
pub struct Faction {
    /// Semantic id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Lore text.
    pub description: String,
    /// Logo asset id.
    pub logo: String,
    /// Logo image URL, if hosted.
    pub logo_url: Option<String>,
    /// Theme color.
    pub color: String,
}

impl Faction {
    /// Creates a faction from its packed form.
    ///
    /// # Errors
    ///
    /// Field validation errors.
    pub fn unpack(packed: &RawRecord, reg: &Registry, ctx: &OpCtx) -> Result<Live<Self>> {
        reg.get_cat::<Self>().create_live(ctx, packed.clone())
    }
}

impl RegEntry for Faction {
    const KIND: EntryType = EntryType::Faction;

    fn defaults() -> RawRecord {
        RawRecord::new()
            .with("name", "New Faction")
            .with("description", "")
            .with("logo", "")
            .with("color", "")
    }

    fn load(&mut self, loader: &Loader<'_>) -> Result<()> {
        self.id = loader.string_or("id", "")?;
        self.name = loader.string("name")?;
        self.description = loader.string_or("description", "")?;
        self.logo = loader.string_or("logo", "")?;
        self.logo_url = loader.opt_string("logo_url")?.filter(|url| !url.is_empty());
        self.color = loader.string_or("color", "")?;
        Ok(())
    }

    fn save(&self) -> RawRecord {
        RawRecord::new()
            .with("id", self.id.as_str())
            .with("name", self.name.as_str())
            .with("description", self.description.as_str())
            .with("logo", self.logo.as_str())
            .with("logo_url", self.logo_url.clone())
            .with("color", self.color.as_str())
    }
}
