//! The closed set of entity kinds.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Kind tag for every entity the registry can store.
///
/// Each kind has its own category store in every registry and its own
/// field schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EntryType {
    /// A corporate manufacturer of frames and gear.
    Manufacturer,
    /// A political faction.
    Faction,
    /// A pilot core bonus.
    CoreBonus,
    /// A mech frame (chassis).
    Frame,
    /// A trait built into a frame.
    FrameTrait,
    /// A frame's core system.
    CoreSystem,
    /// A mech-scale weapon.
    MechWeapon,
    /// A mech-scale system.
    MechSystem,
    /// A modification applied to a mech weapon.
    WeaponMod,
    /// A deployable object (drone, turret, shield).
    Deployable,
    /// A license granting access to content.
    License,
    /// A tag template (e.g. "Heat X").
    TagTemplate,
    /// A player character.
    Pilot,
    /// A pilot's configured mech.
    Mech,
    /// Pilot-scale armor.
    PilotArmor,
    /// Pilot-scale gear.
    PilotGear,
    /// Pilot-scale weapon.
    PilotWeapon,
}

impl EntryType {
    /// Every entity kind, in declaration order.
    pub const ALL: [EntryType; 17] = [
        Self::Manufacturer,
        Self::Faction,
        Self::CoreBonus,
        Self::Frame,
        Self::FrameTrait,
        Self::CoreSystem,
        Self::MechWeapon,
        Self::MechSystem,
        Self::WeaponMod,
        Self::Deployable,
        Self::License,
        Self::TagTemplate,
        Self::Pilot,
        Self::Mech,
        Self::PilotArmor,
        Self::PilotGear,
        Self::PilotWeapon,
    ];

    /// Returns the stable snake_case name of this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manufacturer => "manufacturer",
            Self::Faction => "faction",
            Self::CoreBonus => "core_bonus",
            Self::Frame => "frame",
            Self::FrameTrait => "frame_trait",
            Self::CoreSystem => "core_system",
            Self::MechWeapon => "mech_weapon",
            Self::MechSystem => "mech_system",
            Self::WeaponMod => "weapon_mod",
            Self::Deployable => "deployable",
            Self::License => "license",
            Self::TagTemplate => "tag_template",
            Self::Pilot => "pilot",
            Self::Mech => "mech",
            Self::PilotArmor => "pilot_armor",
            Self::PilotGear => "pilot_gear",
            Self::PilotWeapon => "pilot_weapon",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::unknown_entry_type(s))
    }
}
