//! Mech weapons and their firing profiles.

use machinemind_foundation::{EntryType, RawRecord, Result, Value};
use machinemind_registry::{AnyEntry, Live, Loader, OpCtx, RegEntry, Registry};

use crate::common::{Damage, Effects, Range, read_all, save_all};
use crate::deployable::Attachments;
use crate::manufacturer::Manufacturer;
use crate::tag::{TagInstance, read_tags, save_tags};
use crate::unpack;

/// Fields that move from a single-profile packed weapon into its profile.
const PROFILE_FIELDS: [&str; 12] = [
    "type",
    "damage",
    "range",
    "effect",
    "description",
    "on_attack",
    "on_hit",
    "on_crit",
    "actions",
    "bonuses",
    "synergies",
    "counters",
];

/// One firing mode of a weapon.
#[derive(Debug, Clone)]
pub struct WeaponProfile {
    /// Display name.
    pub name: String,
    /// Weapon type (`Rifle`, `Cannon`, `Melee`, ...).
    pub kind: String,
    /// Damage dealt.
    pub damage: Vec<Damage>,
    /// Reach.
    pub range: Vec<Range>,
    /// Rules text.
    pub effect: String,
    /// Lore text.
    pub description: String,
    /// Rules text on attack.
    pub on_attack: String,
    /// Rules text on hit.
    pub on_hit: String,
    /// Rules text on critical hit.
    pub on_crit: String,
    /// Actions, bonuses, synergies, counters.
    pub effects: Effects,
    /// Tags.
    pub tags: Vec<TagInstance>,
}

impl WeaponProfile {
    fn read(loader: &Loader<'_>) -> Result<Self> {
        Ok(Self {
            name: loader.string_or("name", "Default Profile")?,
            kind: loader.string_or("type", "Rifle")?,
            damage: read_all(loader, "damage")?,
            range: read_all(loader, "range")?,
            effect: loader.string_or("effect", "")?,
            description: loader.string_or("description", "")?,
            on_attack: loader.string_or("on_attack", "")?,
            on_hit: loader.string_or("on_hit", "")?,
            on_crit: loader.string_or("on_crit", "")?,
            effects: Effects::load(loader)?,
            tags: read_tags(loader, "tags")?,
        })
    }

    fn to_value(&self) -> Value {
        let record = RawRecord::new()
            .with("name", self.name.as_str())
            .with("type", self.kind.as_str())
            .with("damage", save_all(&self.damage))
            .with("range", save_all(&self.range))
            .with("effect", self.effect.as_str())
            .with("description", self.description.as_str())
            .with("on_attack", self.on_attack.as_str())
            .with("on_hit", self.on_hit.as_str())
            .with("on_crit", self.on_crit.as_str())
            .with("tags", save_tags(&self.tags));
        self.effects.save_into(record).into_value()
    }
}

/// A mech-scale weapon.
#[derive(Debug, Default)]
pub struct MechWeapon {
    /// Semantic id (`mw_assault_rifle`).
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
    /// Mount size (`Auxiliary`, `Main`, `Heavy`, `Superheavy`).
    pub size: String,
    /// Firing profiles; never empty after unpack.
    pub profiles: Vec<WeaponProfile>,
    /// Index into `profiles` currently in use.
    pub selected_profile: usize,
    /// Cascading (AI gone rogue).
    pub cascading: bool,
    /// Destroyed in combat.
    pub destroyed: bool,
    /// Loaded (for loading weapons).
    pub loaded: bool,
    /// Owned deployables and integrated entries.
    pub attachments: Attachments,
}

impl MechWeapon {
    /// The active profile, if any.
    #[must_use]
    pub fn profile(&self) -> Option<&WeaponProfile> {
        self.profiles.get(self.selected_profile)
    }

    /// Creates a weapon and its inline children from its packed form.
    ///
    /// A packed weapon without `profiles` describes a single profile with
    /// its top-level fields; those move into one profile here.
    ///
    /// # Errors
    ///
    /// Shape errors, or a child or the weapon failing to load.
    pub fn unpack(packed: &RawRecord, reg: &Registry, ctx: &OpCtx) -> Result<Live<Self>> {
        let packed_profiles = match packed.get("profiles") {
            Some(Value::List(_)) => unpack::records(packed, Self::KIND, "profiles")?,
            _ => {
                let profile = PROFILE_FIELDS
                    .iter()
                    .filter_map(|f| packed.get(f).map(|v| (*f, v.clone())))
                    .chain(packed.get("tags").map(|v| ("tags", v.clone())))
                    .chain(packed.get("name").map(|v| ("name", v.clone())))
                    .collect::<RawRecord>();
                vec![profile]
            }
        };
        let mut profiles = Vec::new();
        for p in &packed_profiles {
            let tags = unpack::tags(p, Self::KIND, "tags", reg, ctx)?;
            profiles.push(p.with("tags", tags).into_value());
        }

        let mut fields = PROFILE_FIELDS
            .iter()
            .fold(packed.without("tags"), |rec, f| rec.without(f));
        if let Some(mount) = packed.get("mount").filter(|_| !packed.contains("size")) {
            fields = fields.with("size", mount.clone());
        }
        let fields = fields
            .with("profiles", profiles)
            .with("source", unpack::source(packed, Self::KIND, reg, ctx)?)
            .with("deployables", unpack::deployables(packed, Self::KIND, reg, ctx)?)
            .with("integrated", unpack::integrated(packed, Self::KIND, reg, ctx)?);
        reg.get_cat::<Self>().create_live(ctx, fields)
    }
}

impl RegEntry for MechWeapon {
    const KIND: EntryType = EntryType::MechWeapon;

    fn defaults() -> RawRecord {
        let profile = RawRecord::new()
            .with("name", "Default Profile")
            .with("type", "Rifle")
            .with("effect", "Shoots enemies")
            .with(
                "damage",
                vec![RawRecord::new().with("type", "Kinetic").with("val", "1d6").into_value()],
            )
            .with(
                "range",
                vec![RawRecord::new().with("type", "Range").with("val", 8).into_value()],
            );
        RawRecord::new()
            .with("name", "New Mech Weapon")
            .with("license", "")
            .with("license_level", 0)
            .with("sp", 0)
            .with("size", "Main")
            .with("profiles", vec![profile.into_value()])
            .with("selected_profile", 0)
            .with("cascading", false)
            .with("destroyed", false)
            .with("loaded", false)
    }

    fn load(&mut self, loader: &Loader<'_>) -> Result<()> {
        self.id = loader.string_or("id", "")?;
        self.name = loader.string("name")?;
        self.source = loader.foreign("source")?;
        self.license = loader.string_or("license", "")?;
        self.license_level = loader.int_or("license_level", 0)?;
        self.sp = loader.int_or("sp", 0)?;
        self.size = loader.string_or("size", "Main")?;
        self.profiles = loader
            .record_list("profiles")?
            .iter()
            .map(|p| WeaponProfile::read(&loader.nested(p)))
            .collect::<Result<_>>()?;
        self.selected_profile = usize::try_from(loader.int_or("selected_profile", 0)?).unwrap_or(0);
        self.cascading = loader.bool_or("cascading", false)?;
        self.destroyed = loader.bool_or("destroyed", false)?;
        self.loaded = loader.bool_or("loaded", false)?;
        self.attachments = Attachments::load(loader)?;
        Ok(())
    }

    fn save(&self) -> RawRecord {
        let profiles: Vec<Value> = self.profiles.iter().map(WeaponProfile::to_value).collect();
        let record = RawRecord::new()
            .with("id", self.id.as_str())
            .with("name", self.name.as_str())
            .with("source", self.source.as_ref().map(Live::reg_ref))
            .with("license", self.license.as_str())
            .with("license_level", self.license_level)
            .with("sp", self.sp)
            .with("size", self.size.as_str())
            .with("profiles", profiles)
            .with("selected_profile", i64::try_from(self.selected_profile).unwrap_or(0))
            .with("cascading", self.cascading)
            .with("destroyed", self.destroyed)
            .with("loaded", self.loaded);
        self.attachments.save_into(record)
    }

    fn assoc_entries(&self) -> Vec<AnyEntry> {
        self.attachments.entries()
    }
}
