//! Mechs: a pilot's configured frame and loadout.

use machinemind_foundation::{EntryType, RawRecord, Result, Value};
use machinemind_registry::{AnyEntry, Live, Loader, RegEntry};

use crate::frame::Frame;
use crate::pilot::Pilot;
use crate::system::MechSystem;
use crate::weapon::MechWeapon;

/// What a mech is built from and carries.
#[derive(Debug, Default)]
pub struct MechLoadout {
    /// The chassis (foreign; usually a catalog entry).
    pub frame: Option<Live<Frame>>,
    /// Mounted weapons (owned).
    pub weapons: Vec<Live<MechWeapon>>,
    /// Installed systems (owned).
    pub systems: Vec<Live<MechSystem>>,
}

impl MechLoadout {
    fn load(loader: &Loader<'_>) -> Result<Self> {
        let Some(raw) = loader.opt_record("loadout")? else {
            return Ok(Self::default());
        };
        let loadout = loader.nested(&raw);
        Ok(Self {
            frame: loadout.foreign("frame")?,
            weapons: loadout.owned_many("weapons")?,
            systems: loadout.owned_many("systems")?,
        })
    }

    fn to_value(&self) -> Value {
        let weapons: Vec<Value> = self.weapons.iter().map(|w| Value::from(w.reg_ref())).collect();
        let systems: Vec<Value> = self.systems.iter().map(|s| Value::from(s.reg_ref())).collect();
        RawRecord::new()
            .with("frame", self.frame.as_ref().map(Live::reg_ref))
            .with("weapons", weapons)
            .with("systems", systems)
            .into_value()
    }
}

/// A pilot's mech.
#[derive(Debug, Default)]
pub struct Mech {
    /// Semantic id, if the mech came from a save file.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Player notes.
    pub notes: String,
    /// Notes only the GM sees.
    pub gm_note: String,
    /// Local portrait image path.
    pub portrait: String,
    /// Hosted portrait image URL.
    pub cloud_portrait: String,
    /// The pilot (foreign; the pilot also lists this mech, forming a cycle).
    pub pilot: Option<Live<Pilot>>,
    /// Frame, weapons and systems.
    pub loadout: MechLoadout,
    /// Hit points left in the current structure.
    pub current_hp: i64,
    /// Heat taken.
    pub current_heat: i64,
    /// Reactor stress left.
    pub current_stress: i64,
    /// Structure left.
    pub current_structure: i64,
    /// Repairs left.
    pub current_repairs: i64,
    /// Overcharge track position.
    pub current_overcharge: i64,
    /// Core power charges left.
    pub current_core_energy: i64,
    /// Overshield points.
    pub overshield: i64,
    /// Burn taken each turn.
    pub burn: i64,
    /// Activations per round.
    pub activations: i64,
    /// Core power is active.
    pub core_active: bool,
    /// The pilot has ejected.
    pub ejected: bool,
    /// The reactor is going critical.
    pub meltdown_imminent: bool,
    /// Damage types resisted.
    pub resistances: Vec<String>,
    /// Reactions available.
    pub reactions: Vec<String>,
    /// Status and condition names applied.
    pub statuses_and_conditions: Vec<String>,
}

impl Mech {
    /// System points spent by the current loadout.
    #[must_use]
    pub fn sp_used(&self) -> i64 {
        let weapons: i64 = self.loadout.weapons.iter().map(|w| w.borrow().sp).sum();
        let systems: i64 = self.loadout.systems.iter().map(|s| s.borrow().sp).sum();
        weapons + systems
    }

    /// Restores every track to the frame's maximums and clears heat.
    pub fn full_repair(&mut self) {
        if let Some(frame) = &self.loadout.frame {
            let stats = frame.borrow().stats.clone();
            self.current_hp = stats.hp;
            self.current_structure = stats.structure;
            self.current_stress = stats.stress;
            self.current_repairs = stats.repcap;
        }
        self.current_heat = 0;
        self.current_overcharge = 0;
        self.current_core_energy = 1;
        self.burn = 0;
        self.overshield = 0;
        self.meltdown_imminent = false;
    }
}

impl RegEntry for Mech {
    const KIND: EntryType = EntryType::Mech;
    const INVENTORIED: bool = true;

    fn defaults() -> RawRecord {
        RawRecord::new()
            .with("name", "New Mech")
            .with("activations", 1)
            .with("current_core_energy", 1)
    }

    fn load(&mut self, loader: &Loader<'_>) -> Result<()> {
        self.id = loader.string_or("id", "")?;
        self.name = loader.string("name")?;
        self.notes = loader.string_or("notes", "")?;
        self.gm_note = loader.string_or("gm_note", "")?;
        self.portrait = loader.string_or("portrait", "")?;
        self.cloud_portrait = loader.string_or("cloud_portrait", "")?;
        self.pilot = loader.foreign("pilot")?;
        self.loadout = MechLoadout::load(loader)?;
        self.current_hp = loader.int_or("current_hp", 0)?;
        self.current_heat = loader.int_or("current_heat", 0)?;
        self.current_stress = loader.int_or("current_stress", 0)?;
        self.current_structure = loader.int_or("current_structure", 0)?;
        self.current_repairs = loader.int_or("current_repairs", 0)?;
        self.current_overcharge = loader.int_or("current_overcharge", 0)?;
        self.current_core_energy = loader.int_or("current_core_energy", 1)?;
        self.overshield = loader.int_or("overshield", 0)?;
        self.burn = loader.int_or("burn", 0)?;
        self.activations = loader.int_or("activations", 1)?;
        self.core_active = loader.bool_or("core_active", false)?;
        self.ejected = loader.bool_or("ejected", false)?;
        self.meltdown_imminent = loader.bool_or("meltdown_imminent", false)?;
        self.resistances = loader.string_list("resistances")?;
        self.reactions = loader.string_list("reactions")?;
        self.statuses_and_conditions = loader.string_list("statuses_and_conditions")?;
        Ok(())
    }

    fn save(&self) -> RawRecord {
        RawRecord::new()
            .with("id", self.id.as_str())
            .with("name", self.name.as_str())
            .with("notes", self.notes.as_str())
            .with("gm_note", self.gm_note.as_str())
            .with("portrait", self.portrait.as_str())
            .with("cloud_portrait", self.cloud_portrait.as_str())
            .with("pilot", self.pilot.as_ref().map(Live::reg_ref))
            .with("loadout", self.loadout.to_value())
            .with("current_hp", self.current_hp)
            .with("current_heat", self.current_heat)
            .with("current_stress", self.current_stress)
            .with("current_structure", self.current_structure)
            .with("current_repairs", self.current_repairs)
            .with("current_overcharge", self.current_overcharge)
            .with("current_core_energy", self.current_core_energy)
            .with("overshield", self.overshield)
            .with("burn", self.burn)
            .with("activations", self.activations)
            .with("core_active", self.core_active)
            .with("ejected", self.ejected)
            .with("meltdown_imminent", self.meltdown_imminent)
            .with("resistances", self.resistances.clone())
            .with("reactions", self.reactions.clone())
            .with("statuses_and_conditions", self.statuses_and_conditions.clone())
    }

    fn assoc_entries(&self) -> Vec<AnyEntry> {
        self.loadout
            .weapons
            .iter()
            .map(Live::to_any)
            .chain(self.loadout.systems.iter().map(Live::to_any))
            .collect()
    }
}
