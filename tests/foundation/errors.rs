//! Integration tests for error types

use machinemind_foundation::{EntryType, Error, ErrorContext, ErrorKind, StorageKey, ValueType};

#[test]
fn not_found_is_recognized() {
    let err = Error::entry_not_found(EntryType::Frame, &StorageKey::new("k"));
    assert!(err.is_not_found());
    assert!(err.to_string().contains("frame"));
}

#[test]
fn field_errors_name_kind_and_field() {
    let err = Error::missing_field(EntryType::MechWeapon, "name");
    assert!(matches!(err.kind, ErrorKind::MissingField { kind: EntryType::MechWeapon, .. }));

    let err = Error::type_mismatch(EntryType::Pilot, "level", ValueType::Int, ValueType::String);
    let msg = err.to_string();
    assert!(msg.contains("pilot.level"));
    assert!(msg.contains("int"));
}

#[test]
fn frames_stack_innermost_first() {
    let err = Error::internal("boom").with_frame("deployable:d1").with_frame("frame:f1");
    let ctx = err.context.unwrap();
    assert_eq!(ctx.stack, vec!["deployable:d1", "frame:f1"]);
}

#[test]
fn context_display_lists_frames() {
    let ctx = ErrorContext::new().with_registry("global").with_frame("pilot:p");
    let text = ctx.to_string();
    assert!(text.contains("in registry global"));
    assert!(text.contains("in pilot:p"));
}

#[test]
fn kind_mismatch_reports_both_kinds() {
    let err = Error::kind_mismatch(EntryType::Frame, EntryType::Mech);
    assert_eq!(err.to_string(), "kind mismatch: expected frame, got mech");
}
