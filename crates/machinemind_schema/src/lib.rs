//! Entity kinds for machinemind.
//!
//! This crate provides:
//! - One [`RegEntry`](machinemind_registry::RegEntry) implementation per
//!   [`EntryType`]: field defaults, validated load, and save
//! - Value-level sub-structures shared across kinds ([`common`])
//! - `unpack` constructors that turn packed content records into stored
//!   entries, creating inline children and resolving ids to references
//! - [`standard_schemas`]: the schema table registering every kind
//!
//! # Example
//!
//! ```ignore
//! let env = standard_env(RegistryConfig::default())?;
//! let global = env.create_registry("global");
//! let ctx = OpCtx::new();
//!
//! let gms = Manufacturer::unpack(&packed_gms, &global, &ctx)?;
//! let everest = Frame::unpack(&packed_everest, &global, &ctx)?;
//! assert!(everest.borrow().source.as_ref().unwrap().ptr_eq(&gms));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod common;
pub mod core_bonus;
pub mod deployable;
pub mod faction;
pub mod frame;
pub mod license;
pub mod manufacturer;
pub mod mech;
pub mod pilot;
pub mod pilot_equipment;
pub mod system;
pub mod tag;
pub mod unpack;
pub mod weapon;
pub mod weapon_mod;

#[cfg(test)]
mod testing;

use machinemind_foundation::{EntryType, Result};
use machinemind_registry::{RegEnv, RegistryConfig, SchemaTable};

pub use common::{Action, Bonus, Counter, Damage, Effects, Range, SubValue, Synergy};
pub use core_bonus::CoreBonus;
pub use deployable::{Attachments, Deployable};
pub use faction::Faction;
pub use frame::{CoreEffect, CoreSystem, Frame, FrameStats, FrameTrait};
pub use license::License;
pub use manufacturer::Manufacturer;
pub use mech::{Mech, MechLoadout};
pub use pilot::{BASE_PILOT_HP, MechSkills, Pilot, assign_mech};
pub use pilot_equipment::{PilotArmor, PilotEquipment, PilotGear, PilotItem, PilotWeapon};
pub use system::MechSystem;
pub use tag::{TagInstance, TagTemplate};
pub use weapon::{MechWeapon, WeaponProfile};
pub use weapon_mod::WeaponMod;

/// Builds the schema table for every [`EntryType`].
///
/// # Errors
///
/// `DuplicateSchema` if two kinds claim the same tag, which would be a bug in
/// this crate.
pub fn standard_schemas() -> Result<SchemaTable> {
    let mut schemas = SchemaTable::new();
    schemas
        .register::<Manufacturer>()?
        .register::<Faction>()?
        .register::<CoreBonus>()?
        .register::<Frame>()?
        .register::<FrameTrait>()?
        .register::<CoreSystem>()?
        .register::<MechWeapon>()?
        .register::<MechSystem>()?
        .register::<WeaponMod>()?
        .register::<Deployable>()?
        .register::<License>()?
        .register::<TagTemplate>()?
        .register::<Pilot>()?
        .register::<Mech>()?
        .register::<PilotArmor>()?
        .register::<PilotGear>()?
        .register::<PilotWeapon>()?;
    debug_assert_eq!(schemas.len(), EntryType::ALL.len());
    Ok(schemas)
}

/// Creates an environment over [`standard_schemas`].
///
/// # Errors
///
/// See [`standard_schemas`].
pub fn standard_env(config: RegistryConfig) -> Result<RegEnv> {
    Ok(RegEnv::with_config(standard_schemas()?, config))
}
