//! Pilot-scale armor, gear, and weapons.
//!
//! Content packs ship all three in one file, told apart by a `type` field
//! (`Armor`, `Gear`, `Weapon`); [`PilotEquipment::unpack`] dispatches on it.

use machinemind_foundation::{EntryType, Error, RawRecord, Result, Value};
use machinemind_registry::{AnyEntry, Live, Loader, OpCtx, RegEntry, Registry};

use crate::common::{Bonus, Damage, Effects, Range, read_all, save_all};
use crate::deployable::Deployable;
use crate::tag::{TagInstance, read_tags, save_tags};
use crate::unpack;

/// Fields every piece of pilot equipment has.
#[derive(Debug, Default)]
pub struct PilotItem {
    /// Semantic id (`pg_personal_drone`).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Rules and lore text.
    pub description: String,
    /// Actions, bonuses, synergies, counters. Bonuses apply to the pilot.
    pub effects: Effects,
    /// Tags.
    pub tags: Vec<TagInstance>,
    /// Owned deployables.
    pub deployables: Vec<Live<Deployable>>,
}

impl PilotItem {
    fn load(loader: &Loader<'_>) -> Result<Self> {
        Ok(Self {
            id: loader.string_or("id", "")?,
            name: loader.string("name")?,
            description: loader.string_or("description", "")?,
            effects: Effects::load(loader)?,
            tags: read_tags(loader, "tags")?,
            deployables: loader.owned_many("deployables")?,
        })
    }

    fn save(&self) -> RawRecord {
        let deployables: Vec<Value> = self
            .deployables
            .iter()
            .map(|d| Value::from(d.reg_ref()))
            .collect();
        let record = RawRecord::new()
            .with("id", self.id.as_str())
            .with("name", self.name.as_str())
            .with("description", self.description.as_str())
            .with("tags", save_tags(&self.tags))
            .with("deployables", deployables);
        self.effects.save_into(record)
    }

    fn entries(&self) -> Vec<AnyEntry> {
        self.deployables.iter().map(Live::to_any).collect()
    }

    fn unpack_fields(
        packed: &RawRecord,
        kind: EntryType,
        reg: &Registry,
        ctx: &OpCtx,
    ) -> Result<RawRecord> {
        Ok(packed
            .without("type")
            .with("deployables", unpack::deployables(packed, kind, reg, ctx)?)
            .with("tags", unpack::tags(packed, kind, "tags", reg, ctx)?))
    }
}

fn item_defaults(name: &str) -> RawRecord {
    RawRecord::new().with("name", name).with("description", "")
}

// =============================================================================
// Armor
// =============================================================================

/// Pilot armor.
#[derive(Debug, Default)]
pub struct PilotArmor {
    /// Shared equipment fields.
    pub item: PilotItem,
}

impl PilotArmor {
    /// Creates armor from its packed form.
    ///
    /// # Errors
    ///
    /// Shape errors, or a child or the armor failing to load.
    pub fn unpack(packed: &RawRecord, reg: &Registry, ctx: &OpCtx) -> Result<Live<Self>> {
        let fields = PilotItem::unpack_fields(packed, Self::KIND, reg, ctx)?;
        reg.get_cat::<Self>().create_live(ctx, fields)
    }
}

impl RegEntry for PilotArmor {
    const KIND: EntryType = EntryType::PilotArmor;

    fn defaults() -> RawRecord {
        let bonuses = [
            Bonus::new("pilot_hp", 3),
            Bonus::new("pilot_evasion", 8),
            Bonus::new("pilot_edef", 8),
            Bonus::new("pilot_speed", 4),
            Bonus::new("pilot_armor", 1),
        ];
        item_defaults("New Armor").with("bonuses", save_all(&bonuses))
    }

    fn load(&mut self, loader: &Loader<'_>) -> Result<()> {
        self.item = PilotItem::load(loader)?;
        Ok(())
    }

    fn save(&self) -> RawRecord {
        self.item.save()
    }

    fn assoc_entries(&self) -> Vec<AnyEntry> {
        self.item.entries()
    }
}

// =============================================================================
// Gear
// =============================================================================

/// Pilot gear (tools, drones, kits).
#[derive(Debug, Default)]
pub struct PilotGear {
    /// Shared equipment fields.
    pub item: PilotItem,
}

impl PilotGear {
    /// Creates gear from its packed form.
    ///
    /// # Errors
    ///
    /// Shape errors, or a child or the gear failing to load.
    pub fn unpack(packed: &RawRecord, reg: &Registry, ctx: &OpCtx) -> Result<Live<Self>> {
        let fields = PilotItem::unpack_fields(packed, Self::KIND, reg, ctx)?;
        reg.get_cat::<Self>().create_live(ctx, fields)
    }
}

impl RegEntry for PilotGear {
    const KIND: EntryType = EntryType::PilotGear;

    fn defaults() -> RawRecord {
        item_defaults("New Gear")
    }

    fn load(&mut self, loader: &Loader<'_>) -> Result<()> {
        self.item = PilotItem::load(loader)?;
        Ok(())
    }

    fn save(&self) -> RawRecord {
        self.item.save()
    }

    fn assoc_entries(&self) -> Vec<AnyEntry> {
        self.item.entries()
    }
}

// =============================================================================
// Weapons
// =============================================================================

/// A pilot-scale weapon.
#[derive(Debug, Default)]
pub struct PilotWeapon {
    /// Shared equipment fields.
    pub item: PilotItem,
    /// Rules text.
    pub effect: String,
    /// Damage dealt.
    pub damage: Vec<Damage>,
    /// Reach.
    pub range: Vec<Range>,
}

impl PilotWeapon {
    /// Creates a weapon from its packed form.
    ///
    /// # Errors
    ///
    /// Shape errors, or a child or the weapon failing to load.
    pub fn unpack(packed: &RawRecord, reg: &Registry, ctx: &OpCtx) -> Result<Live<Self>> {
        let fields = PilotItem::unpack_fields(packed, Self::KIND, reg, ctx)?;
        reg.get_cat::<Self>().create_live(ctx, fields)
    }
}

impl RegEntry for PilotWeapon {
    const KIND: EntryType = EntryType::PilotWeapon;

    fn defaults() -> RawRecord {
        let range = [Range {
            kind: "Range".to_string(),
            val: Value::Int(5),
        }];
        let damage = [Damage {
            kind: "Kinetic".to_string(),
            val: Value::from("1d3"),
        }];
        item_defaults("New Pilot Weapon")
            .with("effect", "")
            .with("range", save_all(&range))
            .with("damage", save_all(&damage))
    }

    fn load(&mut self, loader: &Loader<'_>) -> Result<()> {
        self.item = PilotItem::load(loader)?;
        self.effect = loader.string_or("effect", "")?;
        self.damage = read_all(loader, "damage")?;
        self.range = read_all(loader, "range")?;
        Ok(())
    }

    fn save(&self) -> RawRecord {
        self.item
            .save()
            .with("effect", self.effect.as_str())
            .with("damage", save_all(&self.damage))
            .with("range", save_all(&self.range))
    }

    fn assoc_entries(&self) -> Vec<AnyEntry> {
        self.item.entries()
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// Any one piece of pilot equipment.
#[derive(Debug, Clone)]
pub enum PilotEquipment {
    /// Armor.
    Armor(Live<PilotArmor>),
    /// Gear.
    Gear(Live<PilotGear>),
    /// Weapon.
    Weapon(Live<PilotWeapon>),
}

impl PilotEquipment {
    /// Unpacks a packed item of any of the three kinds, chosen by `type`.
    ///
    /// # Errors
    ///
    /// `InvalidValue` for an unknown or missing `type`, or the chosen
    /// kind's unpack errors.
    pub fn unpack(packed: &RawRecord, reg: &Registry, ctx: &OpCtx) -> Result<Self> {
        match packed.str("type") {
            Some("Armor") => PilotArmor::unpack(packed, reg, ctx).map(Self::Armor),
            Some("Gear") => PilotGear::unpack(packed, reg, ctx).map(Self::Gear),
            Some("Weapon") => PilotWeapon::unpack(packed, reg, ctx).map(Self::Weapon),
            other => Err(Error::invalid_value(
                EntryType::PilotGear,
                "type",
                format!("expected Armor, Gear or Weapon, got {}", other.unwrap_or("nothing")),
            )),
        }
    }

    /// The kind of the wrapped item.
    #[must_use]
    pub fn kind(&self) -> EntryType {
        match self {
            Self::Armor(_) => EntryType::PilotArmor,
            Self::Gear(_) => EntryType::PilotGear,
            Self::Weapon(_) => EntryType::PilotWeapon,
        }
    }

    /// The wrapped item as a type-erased entry.
    #[must_use]
    pub fn to_any(&self) -> AnyEntry {
        match self {
            Self::Armor(a) => a.to_any(),
            Self::Gear(g) => g.to_any(),
            Self::Weapon(w) => w.to_any(),
        }
    }
}
