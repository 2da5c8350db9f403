//! Manufacturers.

use machinemind_foundation::{EntryType, RawRecord, Result};
use machinemind_registry::{Live, Loader, OpCtx, RegEntry, Registry};

/// A corporate manufacturer of frames and gear.
#[derive(Debug, Default)]
pub struct Manufacturer {
    /// Semantic id (`GMS`, `IPS-N`, ...).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Lore text.
    pub description: String,
    /// Dark-theme color.
    pub dark: String,
    /// Light-theme color.
    pub light: String,
    /// Logo asset id.
    pub logo: String,
    /// Logo image URL, if hosted.
    pub logo_url: Option<String>,
    /// Marketing quote.
    pub quote: String,
}

impl Manufacturer {
    /// Creates a manufacturer from its packed form.
    ///
    /// # Errors
    ///
    /// Field validation errors.
    pub fn unpack(packed: &RawRecord, reg: &Registry, ctx: &OpCtx) -> Result<Live<Self>> {
        reg.get_cat::<Self>().create_live(ctx, packed.clone())
    }
}

impl RegEntry for Manufacturer {
    const KIND: EntryType = EntryType::Manufacturer;

    fn defaults() -> RawRecord {
        RawRecord::new()
            .with("id", "")
            .with("name", "New Manufacturer")
            .with("description", "")
            .with("dark", "#000000")
            .with("light", "#ffffff")
            .with("logo", "")
            .with("quote", "")
    }

    fn load(&mut self, loader: &Loader<'_>) -> Result<()> {
        self.id = loader.string("id")?;
        self.name = loader.string("name")?;
        self.description = loader.string_or("description", "")?;
        self.dark = loader.string_or("dark", "#000000")?;
        self.light = loader.string_or("light", "#ffffff")?;
        self.logo = loader.string_or("logo", "")?;
        self.logo_url = loader.opt_string("logo_url")?;
        self.quote = loader.string_or("quote", "")?;
        Ok(())
    }

    fn save(&self) -> RawRecord {
        RawRecord::new()
            .with("id", self.id.as_str())
            .with("name", self.name.as_str())
            .with("description", self.description.as_str())
            .with("dark", self.dark.as_str())
            .with("light", self.light.as_str())
            .with("logo", self.logo.as_str())
            .with("logo_url", self.logo_url.clone())
            .with("quote", self.quote.as_str())
    }
}
