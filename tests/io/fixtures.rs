//! A small content pack in its on-disk form.

use machinemind_registry::{RegEnv, RegistryConfig};

pub const MANIFEST: &str = r#"{
    "name": "Test Frames",
    "author": "Harrison Armory",
    "version": "1.0.0",
    "description": "Two frames and their gear."
}"#;

pub const MANUFACTURERS: &str = r#"[
    {"id": "HA", "name": "HARRISON ARMORY", "quote": "Superior by design."}
]"#;

pub const TAGS: &str = r#"[
    {"id": "tg_heat_self", "name": "Heat {VAL} (Self)"},
    {"id": "tg_unique", "name": "Unique"}
]"#;

pub const WEAPONS: &str = r#"[
    {
        "id": "mw_sherman_integrated",
        "name": "ZF4 SOLIDCORE",
        "source": "HA",
        "license": "SHERMAN",
        "license_level": 0,
        "mount": "Heavy",
        "type": "Cannon",
        "damage": [{"type": "Energy", "val": "4d6"}],
        "range": [{"type": "Line", "val": 20}],
        "tags": [{"id": "tg_heat_self", "val": 4}]
    },
    {
        "name": "Andromeda-Pattern Heavy Laser Rifle",
        "source": "HA",
        "license": "Sherman",
        "license_level": 2,
        "mount": "Heavy",
        "type": "Rifle",
        "damage": [{"type": "Energy", "val": "1d6+3"}]
    }
]"#;

pub const SYSTEMS: &str = r#"[
    {
        "id": "ms_reactor_stabilizer",
        "name": "Reactor Stabilizer",
        "source": "HA",
        "license": "SHERMAN",
        "license_level": 1,
        "sp": 2,
        "tags": [{"id": "tg_unique"}],
        "deployables": [{"name": "Coolant Drone", "type": "Drone", "hp": 5}]
    }
]"#;

pub const FRAMES: &str = r#"[
    {
        "id": "mf_sherman",
        "name": "SHERMAN",
        "source": "HA",
        "license_level": 2,
        "mounts": ["Main/Aux", "Heavy"],
        "stats": {"hp": 8, "structure": 4, "stress": 4, "repcap": 4, "sp": 6, "armor": 1},
        "traits": [{"name": "Superheated Reactor Feed", "description": "Reduce heat."}],
        "core_system": {
            "name": "ZF4 SOLIDCORE",
            "active_name": "Solidcore",
            "activation": "Protocol",
            "integrated": ["mw_sherman_integrated"]
        }
    }
]"#;

pub const PILOT_GEAR: &str = r#"[
    {"id": "pg_light_hardsuit", "name": "Light Hardsuit", "type": "Armor",
     "bonuses": [{"id": "pilot_hp", "val": 3}]},
    {"id": "pg_sidearm", "name": "Sidearm", "type": "Weapon",
     "damage": [{"type": "Kinetic", "val": 1}], "range": [{"type": "Threat", "val": 1}]},
    {"name": "Patch Kit", "type": "Gear"}
]"#;

/// Every file of the pack, manifest included.
pub fn files() -> Vec<(&'static str, &'static str)> {
    vec![
        ("lcp_manifest.json", MANIFEST),
        ("manufacturers.json", MANUFACTURERS),
        ("tags.json", TAGS),
        ("weapons.json", WEAPONS),
        ("systems.json", SYSTEMS),
        ("frames.json", FRAMES),
        ("pilot_gear.json", PILOT_GEAR),
    ]
}

pub fn env(seed: u64) -> RegEnv {
    machinemind_schema::standard_env(RegistryConfig::deterministic(seed)).unwrap()
}
