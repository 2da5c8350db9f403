//! Integration tests for insinuation: copying entries between registries

use std::cell::RefCell;
use std::rc::Rc;

use machinemind_foundation::{EntryType, RawRecord, Value};
use machinemind_registry::{AnyEntry, InsinuationLog, OpCtx, RegistryConfig};
use machinemind_schema::{CoreSystem, Frame, FrameTrait, MechSystem, MechWeapon};

use crate::fixtures::{sherman, two_registries};

// =============================================================================
// Owned Subtrees
// =============================================================================

#[test]
fn frame_brings_its_core_and_integrated_weapon() {
    let (_env, global, dest) = two_registries();
    let ctx = OpCtx::new();
    let fixture = sherman(&global, &ctx);

    let check = OpCtx::new();
    assert!(dest.get_cat::<Frame>().list_live(&check).unwrap().is_empty());
    assert!(dest.get_cat::<CoreSystem>().list_live(&check).unwrap().is_empty());
    assert!(dest.get_cat::<MechWeapon>().list_live(&check).unwrap().is_empty());

    let moved = fixture.frame.insinuate(&dest, None).unwrap();

    let check = OpCtx::new();
    assert_eq!(dest.get_cat::<Frame>().list_live(&check).unwrap().len(), 1);
    assert_eq!(dest.get_cat::<CoreSystem>().list_live(&check).unwrap().len(), 1);
    assert_eq!(dest.get_cat::<MechWeapon>().list_live(&check).unwrap().len(), 1);
    assert_eq!(dest.get_cat::<FrameTrait>().len(), 1);

    let frame = moved.borrow();
    let core = frame.core_system.as_ref().unwrap();
    assert!(core.registry().ptr_eq(&dest));
    let weapon = core.borrow().attachments.integrated[0].clone();
    assert!(weapon.registry().ptr_eq(&dest));
    assert_ne!(weapon.key(), fixture.cannon.key());
}

#[test]
fn a_child_alone_does_not_drag_its_parents() {
    let (_env, global, dest) = two_registries();
    let ctx = OpCtx::new();
    let fixture = sherman(&global, &ctx);

    let solidcore = global
        .get_cat::<MechWeapon>()
        .lookup_mmid(&OpCtx::new(), "mw_sherman_integrated")
        .unwrap()
        .unwrap();
    solidcore.insinuate(&dest, None).unwrap();

    assert_eq!(dest.count(EntryType::Frame), 0);
    assert_eq!(dest.count(EntryType::CoreSystem), 0);
    assert_eq!(dest.count(EntryType::MechWeapon), 1);
    assert_eq!(global.count(EntryType::MechWeapon), 1);
    assert!(fixture.frame.registry().ptr_eq(&global));
}

#[test]
fn foreign_refs_keep_pointing_at_the_source() {
    let (_env, global, dest) = two_registries();
    let ctx = OpCtx::new();
    let fixture = sherman(&global, &ctx);
    let moved = fixture.frame.insinuate(&dest, None).unwrap();

    assert_eq!(dest.count(EntryType::Manufacturer), 0);
    let source = moved.borrow().source.clone().unwrap();
    assert!(source.registry().ptr_eq(&global));
    assert_eq!(source.borrow().id, "HA");

    let raw = dest.get_raw(EntryType::Frame, moved.key()).unwrap();
    assert_eq!(raw.reference("source").unwrap().registry.as_deref(), Some("global"));
}

#[test]
fn source_records_are_untouched() {
    let (_env, global, dest) = two_registries();
    let ctx = OpCtx::new();
    let fixture = sherman(&global, &ctx);
    let before = global.get_raw(EntryType::Frame, fixture.frame.key()).unwrap();
    let counts: Vec<usize> = EntryType::ALL.iter().map(|k| global.count(*k)).collect();

    fixture.frame.insinuate(&dest, None).unwrap();

    assert_eq!(global.get_raw(EntryType::Frame, fixture.frame.key()), Some(before));
    let after: Vec<usize> = EntryType::ALL.iter().map(|k| global.count(*k)).collect();
    assert_eq!(after, counts);
}

#[test]
fn copies_share_nothing_with_the_original() {
    let (_env, global, dest) = two_registries();
    let ctx = OpCtx::new();
    let frame = sherman(&global, &ctx).frame;
    frame.set_flags("alpha");

    let moved_ctx = OpCtx::new();
    let moved = frame.insinuate(&dest, Some(&moved_ctx)).unwrap();

    assert_ne!(moved.flags(), Value::from("alpha"));
    assert!(!moved.ptr_eq(&frame));
    assert!(!moved.registry().ptr_eq(frame.registry()));
    assert_ne!(moved.key(), frame.key());
    assert!(moved.ctx().unwrap().ptr_eq(&moved_ctx));
    assert!(!moved_ctx.ptr_eq(&ctx));
}

#[test]
fn insinuating_twice_makes_two_copies() {
    let (_env, global, dest) = two_registries();
    let ctx = OpCtx::new();
    let system = global
        .create_live::<MechSystem>(&ctx, RawRecord::new().with("id", "ms_ns").with("name", "ns"))
        .unwrap();

    let a = system.insinuate(&dest, None).unwrap();
    let b = system.insinuate(&dest, None).unwrap();
    assert_ne!(a.key(), b.key());
    assert_eq!(dest.count(EntryType::MechSystem), 2);
}

// =============================================================================
// Hooks
// =============================================================================

#[test]
fn registry_hooks_see_every_copy() {
    let (_env, global, dest) = two_registries();
    let log = Rc::new(InsinuationLog::new());
    dest.set_insinuation_hook(log.clone());
    let ctx = OpCtx::new();
    let system = global
        .create_live::<MechSystem>(&ctx, RawRecord::new().with("name", "ns"))
        .unwrap();

    let copy = system.insinuate(&dest, None).unwrap();

    let records = log.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].kind, EntryType::MechSystem);
    assert_eq!(records[0].source, system.reg_ref());
    assert_eq!(records[0].dest, copy.reg_ref());

    dest.clear_insinuation_hook();
    system.insinuate(&dest, None).unwrap();
    assert_eq!(log.len(), 1);
}

#[test]
fn per_call_hooks_see_both_entries() {
    let (_env, global, dest) = two_registries();
    let ctx = OpCtx::new();
    let system = global
        .create_live::<MechSystem>(&ctx, RawRecord::new().with("name", "ns"))
        .unwrap();

    let seen = RefCell::new(Vec::new());
    let hook = |kind: EntryType, old: &AnyEntry, new: &AnyEntry| {
        let name = |e: &AnyEntry| e.downcast::<MechSystem>().unwrap().borrow().name.clone();
        seen.borrow_mut().push((kind, name(old), name(new)));
    };
    system.insinuate_with_hooks(&dest, None, &hook).unwrap();

    assert_eq!(
        seen.into_inner(),
        vec![(EntryType::MechSystem, "ns".to_string(), "ns".to_string())]
    );
}

#[test]
fn hooks_run_parents_first() {
    let (_env, global, dest) = two_registries();
    let log = Rc::new(InsinuationLog::new());
    dest.set_insinuation_hook(log.clone());
    let ctx = OpCtx::new();
    let frame = sherman(&global, &ctx).frame;

    frame.insinuate(&dest, None).unwrap();

    let kinds: Vec<EntryType> = log.records().iter().map(|r| r.kind).collect();
    assert_eq!(kinds[0], EntryType::Frame);
    assert_eq!(kinds.len(), 4);
    let core_at = kinds.iter().position(|k| *k == EntryType::CoreSystem).unwrap();
    let weapon_at = kinds.iter().position(|k| *k == EntryType::MechWeapon).unwrap();
    assert!(core_at < weapon_at);
}

// =============================================================================
// Failure
// =============================================================================

#[test]
fn a_failed_copy_is_rolled_back() {
    let config = RegistryConfig::deterministic(5).with_strict_foreign_refs(true);
    let env = machinemind_schema::standard_env(config).unwrap();
    let global = env.create_registry("global");
    let dest = env.create_registry("dest");
    let log = Rc::new(InsinuationLog::new());
    dest.set_insinuation_hook(log.clone());
    let ctx = OpCtx::new();
    let fixture = sherman(&global, &ctx);

    // The copy still names HA, which no longer exists.
    fixture.frame.borrow().source.as_ref().unwrap().destroy_entry();

    let dest_ctx = OpCtx::new();
    let err = fixture.frame.insinuate(&dest, Some(&dest_ctx)).unwrap_err();
    assert!(err.is_not_found());
    assert!(err.context.is_some());
    assert_eq!(dest.total_records(), 0);
    assert!(dest_ctx.is_empty());
    assert!(log.is_empty());
}
