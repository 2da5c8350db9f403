//! Pilots: player characters.
//!
//! A pilot owns a private inventory. Personal copies of pilot equipment
//! live there (usually insinuated from a catalog registry) and are listed
//! from it at load time rather than referenced by the pilot's record.

use machinemind_foundation::{EntryType, RawRecord, Result, Value};
use machinemind_registry::{AnyEntry, Live, Loader, RegEntry};

use crate::core_bonus::CoreBonus;
use crate::faction::Faction;
use crate::license::License;
use crate::mech::Mech;
use crate::pilot_equipment::{PilotArmor, PilotGear, PilotWeapon};

/// Pilot starting hit points before grit.
pub const BASE_PILOT_HP: i64 = 6;

/// Mech skill triggers: hull, agility, systems, engineering.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MechSkills {
    /// HULL.
    pub hull: i64,
    /// AGI.
    pub agility: i64,
    /// SYS.
    pub systems: i64,
    /// ENG.
    pub engineering: i64,
}

impl MechSkills {
    fn from_list(values: &[i64]) -> Self {
        let at = |i: usize| values.get(i).copied().unwrap_or(0);
        Self {
            hull: at(0),
            agility: at(1),
            systems: at(2),
            engineering: at(3),
        }
    }

    fn to_value(self) -> Value {
        Value::from(vec![self.hull, self.agility, self.systems, self.engineering])
    }
}

/// A player character.
#[derive(Debug, Default)]
pub struct Pilot {
    /// Semantic id.
    pub id: String,
    /// Legal name.
    pub name: String,
    /// Callsign.
    pub callsign: String,
    /// Player's name.
    pub player_name: String,
    /// Background name.
    pub background: String,
    /// Backstory.
    pub history: String,
    /// Free-form notes.
    pub notes: String,
    /// Appearance description.
    pub text_appearance: String,
    /// `Active`, `Retired`, `KIA`, ...
    pub status: String,
    /// License level.
    pub level: i64,
    /// Current hit points.
    pub current_hp: i64,
    /// Mech skill points.
    pub mech_skills: MechSkills,
    /// Faction affiliation (foreign).
    pub faction: Option<Live<Faction>>,
    /// Core bonuses taken (foreign).
    pub core_bonuses: Vec<Live<CoreBonus>>,
    /// Licenses held (foreign).
    pub licenses: Vec<Live<License>>,
    /// Mechs this pilot can field (foreign).
    pub mechs: Vec<Live<Mech>>,
    /// The mech currently in use (foreign).
    pub active_mech: Option<Live<Mech>>,
    /// Armor in the inventory.
    pub owned_armor: Vec<Live<PilotArmor>>,
    /// Gear in the inventory.
    pub owned_gear: Vec<Live<PilotGear>>,
    /// Weapons in the inventory.
    pub owned_weapons: Vec<Live<PilotWeapon>>,
}

impl Pilot {
    /// Half the license level, rounded up.
    #[must_use]
    pub fn grit(&self) -> i64 {
        (self.level + 1).div_euclid(2).max(0)
    }

    /// Maximum hit points: base, grit, and every owned armor's `pilot_hp`
    /// bonus.
    #[must_use]
    pub fn max_hp(&self) -> i64 {
        let armor: i64 = self
            .owned_armor
            .iter()
            .flat_map(|a| {
                a.borrow()
                    .item
                    .effects
                    .bonuses
                    .iter()
                    .filter(|b| b.id == "pilot_hp")
                    .filter_map(|b| b.val.as_int())
                    .collect::<Vec<_>>()
            })
            .sum();
        BASE_PILOT_HP + self.grit() + armor
    }

    /// Total license ranks held.
    #[must_use]
    pub fn license_ranks(&self) -> i64 {
        self.licenses.iter().map(|l| l.borrow().rank).sum()
    }
}

/// Links `mech` to `pilot` in both directions.
///
/// Neither entry is written back; the caller decides when to persist.
pub fn assign_mech(pilot: &Live<Pilot>, mech: &Live<Mech>) {
    {
        let mut p = pilot.borrow_mut();
        if !p.mechs.iter().any(|m| m.ptr_eq(mech)) {
            p.mechs.push(mech.clone());
        }
        if p.active_mech.is_none() {
            p.active_mech = Some(mech.clone());
        }
    }
    mech.borrow_mut().pilot = Some(pilot.clone());
}

impl RegEntry for Pilot {
    const KIND: EntryType = EntryType::Pilot;
    const INVENTORIED: bool = true;

    fn defaults() -> RawRecord {
        RawRecord::new()
            .with("name", "New Pilot")
            .with("callsign", "")
            .with("status", "Active")
            .with("level", 0)
            .with("current_hp", BASE_PILOT_HP)
            .with("mechSkills", vec![0_i64, 0, 0, 0])
    }

    fn load(&mut self, loader: &Loader<'_>) -> Result<()> {
        self.id = loader.string_or("id", "")?;
        self.name = loader.string("name")?;
        self.callsign = loader.string_or("callsign", "")?;
        self.player_name = loader.string_or("player_name", "")?;
        self.background = loader.string_or("background", "")?;
        self.history = loader.string_or("history", "")?;
        self.notes = loader.string_or("notes", "")?;
        self.text_appearance = loader.string_or("text_appearance", "")?;
        self.status = loader.string_or("status", "Active")?;
        self.level = loader.int_or("level", 0)?;
        self.current_hp = loader.int_or("current_hp", BASE_PILOT_HP)?;
        self.mech_skills = MechSkills::from_list(&loader.int_list("mechSkills")?);

        self.faction = loader.foreign("faction")?;
        self.core_bonuses = loader.foreign_many("core_bonuses")?;
        self.licenses = loader.foreign_many("licenses")?;
        self.mechs = loader.foreign_many("mechs")?;
        self.active_mech = loader.foreign("active_mech")?;

        let inventory = loader.inventory();
        self.owned_armor = inventory.get_cat::<PilotArmor>().list_live(loader.ctx())?;
        self.owned_gear = inventory.get_cat::<PilotGear>().list_live(loader.ctx())?;
        self.owned_weapons = inventory.get_cat::<PilotWeapon>().list_live(loader.ctx())?;
        Ok(())
    }

    fn save(&self) -> RawRecord {
        fn refs<T: RegEntry>(entries: &[Live<T>]) -> Vec<Value> {
            entries.iter().map(|e| Value::from(e.reg_ref())).collect()
        }
        RawRecord::new()
            .with("id", self.id.as_str())
            .with("name", self.name.as_str())
            .with("callsign", self.callsign.as_str())
            .with("player_name", self.player_name.as_str())
            .with("background", self.background.as_str())
            .with("history", self.history.as_str())
            .with("notes", self.notes.as_str())
            .with("text_appearance", self.text_appearance.as_str())
            .with("status", self.status.as_str())
            .with("level", self.level)
            .with("current_hp", self.current_hp)
            .with("mechSkills", self.mech_skills.to_value())
            .with("faction", self.faction.as_ref().map(Live::reg_ref))
            .with("core_bonuses", refs(&self.core_bonuses))
            .with("licenses", refs(&self.licenses))
            .with("mechs", refs(&self.mechs))
            .with("active_mech", self.active_mech.as_ref().map(Live::reg_ref))
    }

    fn assoc_entries(&self) -> Vec<AnyEntry> {
        self.owned_armor
            .iter()
            .map(Live::to_any)
            .chain(self.owned_gear.iter().map(Live::to_any))
            .chain(self.owned_weapons.iter().map(Live::to_any))
            .collect()
    }
}
