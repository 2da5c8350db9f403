//! Weapon modifications.

use machinemind_foundation::{EntryType, RawRecord, Result};
use machinemind_registry::{AnyEntry, Live, Loader, OpCtx, RegEntry, Registry};

use crate::common::{Damage, Effects, Range, read_all, save_all};
use crate::deployable::Attachments;
use crate::manufacturer::Manufacturer;
use crate::tag::{TagInstance, read_tags, save_tags};
use crate::unpack;

/// A modification installed onto a mech weapon.
#[derive(Debug, Default)]
pub struct WeaponMod {
    /// Semantic id (`wm_nanocomposite_adaptation`).
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
    /// Rules text.
    pub effect: String,
    /// Weapon types it may be applied to (empty: any).
    pub allowed_types: Vec<String>,
    /// Weapon sizes it may be applied to (empty: any).
    pub allowed_sizes: Vec<String>,
    /// Weapon types it may not be applied to.
    pub restricted_types: Vec<String>,
    /// Weapon sizes it may not be applied to.
    pub restricted_sizes: Vec<String>,
    /// Tags on the mod itself.
    pub tags: Vec<TagInstance>,
    /// Tags propagated to the modded weapon.
    pub added_tags: Vec<TagInstance>,
    /// Damage added to the modded weapon.
    pub added_damage: Vec<Damage>,
    /// Range added to the modded weapon.
    pub added_range: Vec<Range>,
    /// Remaining limited uses.
    pub uses: i64,
    /// Cascading (AI gone rogue).
    pub cascading: bool,
    /// Destroyed in combat.
    pub destroyed: bool,
    /// Loaded.
    pub loaded: bool,
    /// Actions, bonuses, synergies, counters.
    pub effects: Effects,
    /// Owned deployables and integrated entries.
    pub attachments: Attachments,
}

impl WeaponMod {
    /// Whether the mod may be installed on a weapon of this type and size.
    #[must_use]
    pub fn accepts(&self, weapon_type: &str, weapon_size: &str) -> bool {
        let allowed = |list: &[String], v: &str| list.is_empty() || list.iter().any(|x| x == v);
        allowed(&self.allowed_types, weapon_type)
            && allowed(&self.allowed_sizes, weapon_size)
            && !self.restricted_types.iter().any(|t| t == weapon_type)
            && !self.restricted_sizes.iter().any(|s| s == weapon_size)
    }

    /// Creates a mod and its inline children from its packed form.
    ///
    /// # Errors
    ///
    /// Shape errors, or a child or the mod failing to load.
    pub fn unpack(packed: &RawRecord, reg: &Registry, ctx: &OpCtx) -> Result<Live<Self>> {
        let fields = unpack::equipment(packed, Self::KIND, reg, ctx)?
            .with("added_tags", unpack::tags(packed, Self::KIND, "added_tags", reg, ctx)?)
            .with("source", unpack::source(packed, Self::KIND, reg, ctx)?);
        reg.get_cat::<Self>().create_live(ctx, fields)
    }
}

impl RegEntry for WeaponMod {
    const KIND: EntryType = EntryType::WeaponMod;

    fn defaults() -> RawRecord {
        RawRecord::new()
            .with("name", "New Weapon Mod")
            .with("license", "")
            .with("license_level", 0)
            .with("sp", 0)
            .with("effect", "")
            .with("uses", 0)
            .with("cascading", false)
            .with("destroyed", false)
            .with("loaded", true)
    }

    fn load(&mut self, loader: &Loader<'_>) -> Result<()> {
        self.id = loader.string_or("id", "")?;
        self.name = loader.string("name")?;
        self.source = loader.foreign("source")?;
        self.license = loader.string_or("license", "")?;
        self.license_level = loader.int_or("license_level", 0)?;
        self.sp = loader.int_or("sp", 0)?;
        self.effect = loader.string_or("effect", "")?;
        self.allowed_types = loader.string_list("allowed_types")?;
        self.allowed_sizes = loader.string_list("allowed_sizes")?;
        self.restricted_types = loader.string_list("restricted_types")?;
        self.restricted_sizes = loader.string_list("restricted_sizes")?;
        self.tags = read_tags(loader, "tags")?;
        self.added_tags = read_tags(loader, "added_tags")?;
        self.added_damage = read_all(loader, "added_damage")?;
        self.added_range = read_all(loader, "added_range")?;
        self.uses = loader.int_or("uses", 0)?;
        self.cascading = loader.bool_or("cascading", false)?;
        self.destroyed = loader.bool_or("destroyed", false)?;
        self.loaded = loader.bool_or("loaded", true)?;
        self.effects = Effects::load(loader)?;
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
            .with("effect", self.effect.as_str())
            .with("allowed_types", self.allowed_types.clone())
            .with("allowed_sizes", self.allowed_sizes.clone())
            .with("restricted_types", self.restricted_types.clone())
            .with("restricted_sizes", self.restricted_sizes.clone())
            .with("tags", save_tags(&self.tags))
            .with("added_tags", save_tags(&self.added_tags))
            .with("added_damage", save_all(&self.added_damage))
            .with("added_range", save_all(&self.added_range))
            .with("uses", self.uses)
            .with("cascading", self.cascading)
            .with("destroyed", self.destroyed)
            .with("loaded", self.loaded);
        self.attachments
            .save_into(self.effects.save_into(record))
    }

    fn assoc_entries(&self) -> Vec<AnyEntry> {
        self.attachments.entries()
    }
}
