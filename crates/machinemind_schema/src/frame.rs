//! Frames and the traits and core systems built into them.
//!
//! Content packs ship a frame with its traits and core system inline. On
//! unpack each becomes an entity of its own, owned by the frame, so copying
//! a frame into another registry copies them along with it.

use machinemind_foundation::{EntryType, RawRecord, Result, Value};
use machinemind_registry::{AnyEntry, Live, Loader, OpCtx, RegEntry, Registry};

use crate::common::{Action, Bonus, Counter, Effects, Synergy, number_value, read_all, save_all};
use crate::deployable::Attachments;
use crate::manufacturer::Manufacturer;
use crate::tag::{TagInstance, read_tags, save_tags};
use crate::unpack;

// =============================================================================
// Frame traits
// =============================================================================

/// A passive or active feature every mech of a frame has.
#[derive(Debug, Default)]
pub struct FrameTrait {
    /// Display name.
    pub name: String,
    /// Rules text.
    pub description: String,
    /// Usage frequency (`Unknown`, `Round`, `Scene`, ...).
    pub usage: String,
    /// Actions, bonuses, synergies, counters.
    pub effects: Effects,
    /// Owned deployables and integrated entries.
    pub attachments: Attachments,
}

impl FrameTrait {
    /// Creates a trait and its inline children from its packed form.
    ///
    /// # Errors
    ///
    /// Shape errors, or a child or the trait failing to load.
    pub fn unpack(packed: &RawRecord, reg: &Registry, ctx: &OpCtx) -> Result<Live<Self>> {
        let fields = packed
            .with("deployables", unpack::deployables(packed, Self::KIND, reg, ctx)?)
            .with("integrated", unpack::integrated(packed, Self::KIND, reg, ctx)?);
        reg.get_cat::<Self>().create_live(ctx, fields)
    }
}

impl RegEntry for FrameTrait {
    const KIND: EntryType = EntryType::FrameTrait;
    const MMID_FIELD: Option<&'static str> = None;

    fn defaults() -> RawRecord {
        RawRecord::new()
            .with("name", "New Frame Trait")
            .with("description", "")
            .with("use", "Unknown")
    }

    fn load(&mut self, loader: &Loader<'_>) -> Result<()> {
        self.name = loader.string("name")?;
        self.description = loader.string_or("description", "")?;
        self.usage = loader.string_or("use", "Unknown")?;
        self.effects = Effects::load(loader)?;
        self.attachments = Attachments::load(loader)?;
        Ok(())
    }

    fn save(&self) -> RawRecord {
        let record = RawRecord::new()
            .with("name", self.name.as_str())
            .with("description", self.description.as_str())
            .with("use", self.usage.as_str());
        self.attachments
            .save_into(self.effects.save_into(record))
    }

    fn assoc_entries(&self) -> Vec<AnyEntry> {
        self.attachments.entries()
    }
}

// =============================================================================
// Core systems
// =============================================================================

/// One half (active or passive) of a core system.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CoreEffect {
    /// Display name.
    pub name: String,
    /// Rules text.
    pub effect: String,
    /// Granted actions.
    pub actions: Vec<Action>,
    /// Stat bonuses.
    pub bonuses: Vec<Bonus>,
    /// Contextual rules text.
    pub synergies: Vec<Synergy>,
}

impl CoreEffect {
    fn load(loader: &Loader<'_>, prefix: &str) -> Result<Self> {
        let field = |suffix: &str| format!("{prefix}_{suffix}");
        Ok(Self {
            name: loader.string_or(&field("name"), "")?,
            effect: loader.string_or(&field("effect"), "")?,
            actions: read_all(loader, &field("actions"))?,
            bonuses: read_all(loader, &field("bonuses"))?,
            synergies: read_all(loader, &field("synergies"))?,
        })
    }

    fn save_into(&self, record: RawRecord, prefix: &str) -> RawRecord {
        record
            .with(format!("{prefix}_name"), self.name.as_str())
            .with(format!("{prefix}_effect"), self.effect.as_str())
            .with(format!("{prefix}_actions"), save_all(&self.actions))
            .with(format!("{prefix}_bonuses"), save_all(&self.bonuses))
            .with(format!("{prefix}_synergies"), save_all(&self.synergies))
    }
}

/// A frame's core system: a once-per-mission active plus a passive.
#[derive(Debug, Default)]
pub struct CoreSystem {
    /// Display name.
    pub name: String,
    /// Lore text.
    pub description: String,
    /// Usage frequency.
    pub usage: String,
    /// Activation cost of the core power.
    pub activation: String,
    /// Deactivation cost, if any.
    pub deactivation: String,
    /// The core power.
    pub active: CoreEffect,
    /// The always-on half.
    pub passive: CoreEffect,
    /// Tracked resources.
    pub counters: Vec<Counter>,
    /// Tags.
    pub tags: Vec<TagInstance>,
    /// Owned deployables and integrated entries.
    pub attachments: Attachments,
}

impl CoreSystem {
    /// Creates a core system and its inline children from its packed form.
    ///
    /// # Errors
    ///
    /// Shape errors, or a child or the core system failing to load.
    pub fn unpack(packed: &RawRecord, reg: &Registry, ctx: &OpCtx) -> Result<Live<Self>> {
        let fields = unpack::equipment(packed, Self::KIND, reg, ctx)?;
        reg.get_cat::<Self>().create_live(ctx, fields)
    }
}

impl RegEntry for CoreSystem {
    const KIND: EntryType = EntryType::CoreSystem;
    const MMID_FIELD: Option<&'static str> = None;

    fn defaults() -> RawRecord {
        RawRecord::new()
            .with("name", "New Core Active")
            .with("description", "")
            .with("use", "Unknown")
            .with("activation", "Quick")
            .with("deactivation", "None")
            .with("active_name", "Core Active")
            .with("active_effect", "effect")
            .with("passive_name", "Core Passive")
            .with("passive_effect", "effect")
    }

    fn load(&mut self, loader: &Loader<'_>) -> Result<()> {
        self.name = loader.string("name")?;
        self.description = loader.string_or("description", "")?;
        self.usage = loader.string_or("use", "Unknown")?;
        self.activation = loader.string_or("activation", "Quick")?;
        self.deactivation = loader.string_or("deactivation", "None")?;
        self.active = CoreEffect::load(loader, "active")?;
        self.passive = CoreEffect::load(loader, "passive")?;
        self.counters = read_all(loader, "counters")?;
        self.tags = read_tags(loader, "tags")?;
        self.attachments = Attachments::load(loader)?;
        Ok(())
    }

    fn save(&self) -> RawRecord {
        let record = RawRecord::new()
            .with("name", self.name.as_str())
            .with("description", self.description.as_str())
            .with("use", self.usage.as_str())
            .with("activation", self.activation.as_str())
            .with("deactivation", self.deactivation.as_str())
            .with("counters", save_all(&self.counters))
            .with("tags", save_tags(&self.tags));
        let record = self.active.save_into(record, "active");
        let record = self.passive.save_into(record, "passive");
        self.attachments.save_into(record)
    }

    fn assoc_entries(&self) -> Vec<AnyEntry> {
        self.attachments.entries()
    }
}

// =============================================================================
// Frames
// =============================================================================

/// Base statistics of a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameStats {
    /// Size (may be fractional, e.g. 0.5).
    pub size: f64,
    /// Structure points.
    pub structure: i64,
    /// Reactor stress points.
    pub stress: i64,
    /// Armor.
    pub armor: i64,
    /// Hit points.
    pub hp: i64,
    /// Evasion.
    pub evasion: i64,
    /// Electronic defense.
    pub edef: i64,
    /// Heat capacity.
    pub heatcap: i64,
    /// Repair capacity.
    pub repcap: i64,
    /// Sensor range.
    pub sensor_range: i64,
    /// Tech attack bonus.
    pub tech_attack: i64,
    /// Save target.
    pub save: i64,
    /// Speed.
    pub speed: i64,
    /// System points.
    pub sp: i64,
}

impl Default for FrameStats {
    fn default() -> Self {
        Self {
            size: 1.0,
            structure: 4,
            stress: 4,
            armor: 0,
            hp: 8,
            evasion: 8,
            edef: 8,
            heatcap: 5,
            repcap: 5,
            sensor_range: 10,
            tech_attack: 0,
            save: 10,
            speed: 5,
            sp: 5,
        }
    }
}

impl FrameStats {
    fn load(loader: &Loader<'_>) -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            size: loader.number_or("size", d.size)?,
            structure: loader.int_or("structure", d.structure)?,
            stress: loader.int_or("stress", d.stress)?,
            armor: loader.int_or("armor", d.armor)?,
            hp: loader.int_or("hp", d.hp)?,
            evasion: loader.int_or("evasion", d.evasion)?,
            edef: loader.int_or("edef", d.edef)?,
            heatcap: loader.int_or("heatcap", d.heatcap)?,
            repcap: loader.int_or("repcap", d.repcap)?,
            sensor_range: loader.int_or("sensor_range", d.sensor_range)?,
            tech_attack: loader.int_or("tech_attack", d.tech_attack)?,
            save: loader.int_or("save", d.save)?,
            speed: loader.int_or("speed", d.speed)?,
            sp: loader.int_or("sp", d.sp)?,
        })
    }

    fn to_value(&self) -> Value {
        RawRecord::new()
            .with("size", number_value(self.size))
            .with("structure", self.structure)
            .with("stress", self.stress)
            .with("armor", self.armor)
            .with("hp", self.hp)
            .with("evasion", self.evasion)
            .with("edef", self.edef)
            .with("heatcap", self.heatcap)
            .with("repcap", self.repcap)
            .with("sensor_range", self.sensor_range)
            .with("tech_attack", self.tech_attack)
            .with("save", self.save)
            .with("speed", self.speed)
            .with("sp", self.sp)
            .into_value()
    }
}

/// A mech chassis.
#[derive(Debug, Default)]
pub struct Frame {
    /// Semantic id (`mf_lancaster`).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Lore text.
    pub description: String,
    /// Manufacturer (foreign).
    pub source: Option<Live<Manufacturer>>,
    /// License rank needed to field it.
    pub license_level: i64,
    /// Role descriptors (`BALANCED`, `SUPPORT`, ...).
    pub mechtype: Vec<String>,
    /// Mount sizes (`Main`, `Flex`, `Heavy`, ...).
    pub mounts: Vec<String>,
    /// Base statistics.
    pub stats: FrameStats,
    /// Owned frame traits, in order.
    pub traits: Vec<Live<FrameTrait>>,
    /// Owned core system.
    pub core_system: Option<Live<CoreSystem>>,
    /// Vertical offset for portrait cropping.
    pub y_pos: i64,
    /// Portrait URL.
    pub image_url: String,
    /// Extra art entries, kept verbatim.
    pub other_art: Vec<Value>,
}

impl Frame {
    /// Creates a frame, its traits, and its core system from its packed
    /// form. The `source` manufacturer is looked up by id.
    ///
    /// # Errors
    ///
    /// Shape errors, or a child or the frame failing to load.
    pub fn unpack(packed: &RawRecord, reg: &Registry, ctx: &OpCtx) -> Result<Live<Self>> {
        let mut traits = Vec::new();
        for t in unpack::records(packed, Self::KIND, "traits")? {
            traits.push(Value::from(FrameTrait::unpack(&t, reg, ctx)?.reg_ref()));
        }
        let core_system = match packed.get("core_system") {
            Some(Value::Map(map)) => {
                let core = RawRecord::from(map.clone());
                Value::from(CoreSystem::unpack(&core, reg, ctx)?.reg_ref())
            }
            _ => Value::Null,
        };
        let fields = packed
            .with("traits", traits)
            .with("core_system", core_system)
            .with("source", unpack::source(packed, Self::KIND, reg, ctx)?);
        reg.get_cat::<Self>().create_live(ctx, fields)
    }
}

impl RegEntry for Frame {
    const KIND: EntryType = EntryType::Frame;

    fn defaults() -> RawRecord {
        RawRecord::new()
            .with("name", "New Frame")
            .with("description", "")
            .with("license_level", 2)
            .with("mechtype", vec!["BALANCED"])
            .with("y_pos", 0)
            .with("image_url", "")
    }

    fn load(&mut self, loader: &Loader<'_>) -> Result<()> {
        self.id = loader.string_or("id", "")?;
        self.name = loader.string("name")?;
        self.description = loader.string_or("description", "")?;
        self.source = loader.foreign("source")?;
        self.license_level = loader.int_or("license_level", 2)?;
        self.mechtype = loader.string_list("mechtype")?;
        self.mounts = loader.string_list("mounts")?;
        self.stats = match loader.opt_record("stats")? {
            Some(stats) => FrameStats::load(&loader.nested(&stats))?,
            None => FrameStats::default(),
        };
        self.traits = loader.owned_many("traits")?;
        self.core_system = loader.owned("core_system")?;
        self.y_pos = loader.int_or("y_pos", 0)?;
        self.image_url = loader.string_or("image_url", "")?;
        self.other_art = loader.list("other_art")?;
        Ok(())
    }

    fn save(&self) -> RawRecord {
        let traits: Vec<Value> = self.traits.iter().map(|t| Value::from(t.reg_ref())).collect();
        RawRecord::new()
            .with("id", self.id.as_str())
            .with("name", self.name.as_str())
            .with("description", self.description.as_str())
            .with("source", self.source.as_ref().map(Live::reg_ref))
            .with("license_level", self.license_level)
            .with("mechtype", self.mechtype.clone())
            .with("mounts", self.mounts.clone())
            .with("stats", self.stats.to_value())
            .with("traits", traits)
            .with("core_system", self.core_system.as_ref().map(Live::reg_ref))
            .with("y_pos", self.y_pos)
            .with("image_url", self.image_url.as_str())
            .with("other_art", self.other_art.clone())
    }

    fn assoc_entries(&self) -> Vec<AnyEntry> {
        self.traits
            .iter()
            .map(Live::to_any)
            .chain(self.core_system.as_ref().map(Live::to_any))
            .collect()
    }
}
