//! Deployables: drones, turrets, shields, and other placed objects.

use machinemind_foundation::{EntryType, RawRecord, Result, Value};
use machinemind_registry::{AnyEntry, Live, Loader, OpCtx, RegEntry, Registry};

use crate::common::{Effects, number_value};
use crate::tag::{TagInstance, read_tags, save_tags};
use crate::unpack;

/// A deployable object granted by some piece of equipment.
///
/// Deployables never stand alone in content packs; they are always created
/// while unpacking their parent and owned by it.
#[derive(Debug, Default)]
pub struct Deployable {
    /// Display name.
    pub name: String,
    /// Category (`Drone`, `Deployable`, `Mine`, ...).
    pub kind: String,
    /// Rules text.
    pub detail: String,
    /// Action cost to deploy.
    pub activation: String,
    /// Action cost to remove.
    pub deactivation: String,
    /// Action cost to recall.
    pub recall: String,
    /// Action cost to redeploy.
    pub redeploy: String,
    /// Charges consumed per deployment.
    pub cost: i64,
    /// Size in mech-scale units.
    pub size: f64,
    /// Armor.
    pub armor: i64,
    /// Maximum HP.
    pub max_hp: i64,
    /// Current HP.
    pub current_hp: i64,
    /// Current overshield.
    pub overshield: i64,
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
    /// Actions, bonuses, synergies, counters.
    pub effects: Effects,
    /// Tags.
    pub tags: Vec<TagInstance>,
}

impl Deployable {
    /// Creates a deployable from its packed (inline) form.
    ///
    /// # Errors
    ///
    /// Shape errors in the packed record, or field validation errors.
    pub fn unpack(packed: &RawRecord, reg: &Registry, ctx: &OpCtx) -> Result<Live<Self>> {
        let hp = packed.int("hp").or_else(|| packed.int("max_hp")).unwrap_or(0);
        let fields = packed
            .without("hp")
            .with("max_hp", hp)
            .with("current_hp", hp)
            .with("tags", unpack::tags(packed, Self::KIND, "tags", reg, ctx)?);
        reg.get_cat::<Self>().create_live(ctx, fields)
    }
}

impl RegEntry for Deployable {
    const KIND: EntryType = EntryType::Deployable;
    const MMID_FIELD: Option<&'static str> = None;

    fn defaults() -> RawRecord {
        RawRecord::new()
            .with("name", "New Deployable")
            .with("type", "")
            .with("detail", "")
            .with("activation", "None")
            .with("deactivation", "None")
            .with("recall", "None")
            .with("redeploy", "None")
            .with("cost", 1)
    }

    fn load(&mut self, loader: &Loader<'_>) -> Result<()> {
        self.name = loader.string("name")?;
        self.kind = loader.string_or("type", "")?;
        self.detail = loader.string_or("detail", "")?;
        self.activation = loader.string_or("activation", "None")?;
        self.deactivation = loader.string_or("deactivation", "None")?;
        self.recall = loader.string_or("recall", "None")?;
        self.redeploy = loader.string_or("redeploy", "None")?;
        self.cost = loader.int_or("cost", 1)?;
        self.size = loader.number_or("size", 0.0)?;
        self.armor = loader.int_or("armor", 0)?;
        self.max_hp = loader.int_or("max_hp", 0)?;
        self.current_hp = loader.int_or("current_hp", self.max_hp)?;
        self.overshield = loader.int_or("overshield", 0)?;
        self.evasion = loader.int_or("evasion", 0)?;
        self.edef = loader.int_or("edef", 0)?;
        self.heatcap = loader.int_or("heatcap", 0)?;
        self.repcap = loader.int_or("repcap", 0)?;
        self.sensor_range = loader.int_or("sensor_range", 0)?;
        self.tech_attack = loader.int_or("tech_attack", 0)?;
        self.save = loader.int_or("save", 0)?;
        self.speed = loader.int_or("speed", 0)?;
        self.effects = Effects::load(loader)?;
        self.tags = read_tags(loader, "tags")?;
        Ok(())
    }

    fn save(&self) -> RawRecord {
        let record = RawRecord::new()
            .with("name", self.name.as_str())
            .with("type", self.kind.as_str())
            .with("detail", self.detail.as_str())
            .with("activation", self.activation.as_str())
            .with("deactivation", self.deactivation.as_str())
            .with("recall", self.recall.as_str())
            .with("redeploy", self.redeploy.as_str())
            .with("cost", self.cost)
            .with("size", number_value(self.size))
            .with("armor", self.armor)
            .with("max_hp", self.max_hp)
            .with("current_hp", self.current_hp)
            .with("overshield", self.overshield)
            .with("evasion", self.evasion)
            .with("edef", self.edef)
            .with("heatcap", self.heatcap)
            .with("repcap", self.repcap)
            .with("sensor_range", self.sensor_range)
            .with("tech_attack", self.tech_attack)
            .with("save", self.save)
            .with("speed", self.speed)
            .with("tags", save_tags(&self.tags));
        self.effects.save_into(record)
    }
}

/// The owned children most equipment carries: deployables it grants and
/// entries integrated into it.
#[derive(Debug, Default)]
pub struct Attachments {
    /// Granted deployables.
    pub deployables: Vec<Live<Deployable>>,
    /// Integrated entries of any kind (weapons, systems, ...).
    pub integrated: Vec<AnyEntry>,
}

impl Attachments {
    /// Resolves both lists strictly.
    ///
    /// # Errors
    ///
    /// Malformed lists, or children that fail to resolve.
    pub fn load(loader: &Loader<'_>) -> Result<Self> {
        Ok(Self {
            deployables: loader.owned_many("deployables")?,
            integrated: loader.owned_many_any("integrated")?,
        })
    }

    /// Writes both reference lists into `record`.
    #[must_use]
    pub fn save_into(&self, record: RawRecord) -> RawRecord {
        let deployables: Vec<Value> = self
            .deployables
            .iter()
            .map(|d| Value::from(d.reg_ref()))
            .collect();
        let integrated: Vec<Value> = self
            .integrated
            .iter()
            .map(|e| Value::from(e.reg_ref()))
            .collect();
        record
            .with("deployables", deployables)
            .with("integrated", integrated)
    }

    /// Every attached entry, deployables first.
    #[must_use]
    pub fn entries(&self) -> Vec<AnyEntry> {
        self.deployables
            .iter()
            .map(Live::to_any)
            .chain(self.integrated.iter().cloned())
            .collect()
    }
}
