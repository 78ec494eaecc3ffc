//! Accessor Guard Integration Tests
//!
//! Tests for the external get/set surface vs. the internal privilege token:
//! - gettable/settable enforcement
//! - validation on every write, atomic failure
//! - defaults for unset optional settings
//! - null writes as no-ops

mod common;

use common::{fixture_registry, sample_user};
use propbox::{props, schema, Error, ErrorKind, SchemaEntry, TypeDef, TypeDesc, Value};
use serde_json::json;

// =============================================================================
// Settable Flag
// =============================================================================

#[test]
fn test_external_write_to_unsettable_fails() {
    let registry = fixture_registry();
    let mut user = sample_user(&registry);

    let err = user.set("id", 8).unwrap_err();
    match err {
        Error::NotSettable { type_name, setting } => {
            assert_eq!(type_name, "User");
            assert_eq!(setting, "id");
        }
        other => panic!("expected NotSettable, got {other:?}"),
    }
    // The stored value is untouched
    assert_eq!(user.get("id").unwrap(), Value::Int(7));
}

#[test]
fn test_internal_write_to_unsettable_succeeds() {
    let registry = fixture_registry();
    let mut user = sample_user(&registry);

    user.internal().set("id", 8).unwrap();
    assert_eq!(user.get("id").unwrap(), Value::Int(8));
}

#[test]
fn test_internal_write_still_validates() {
    let registry = fixture_registry();
    let mut user = sample_user(&registry);

    let err = user.internal().set("id", "eight").unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }));
    assert_eq!(user.get("id").unwrap(), Value::Int(7));
}

// =============================================================================
// Gettable Flag
// =============================================================================

#[test]
fn test_external_read_of_ungettable_fails() {
    let registry = fixture_registry();
    let mut user = registry
        .instantiate("User", json!({"name": "Ann", "id": 7, "token": "s3cret"}))
        .unwrap();

    let err = user.get("token").unwrap_err();
    assert!(matches!(err, Error::NotGettable { ref setting, .. } if setting == "token"));

    // The owning type's own code can still read it
    assert_eq!(
        user.internal().get("token").unwrap().as_str(),
        Some("s3cret")
    );
}

// =============================================================================
// Write Validation
// =============================================================================

#[test]
fn test_every_write_is_validated() {
    let registry = fixture_registry();
    let mut user = sample_user(&registry);

    user.set("age", 30).unwrap();
    assert_eq!(user.get("age").unwrap(), Value::Int(30));

    let err = user.set("age", 2.5).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    // Failed write leaves the previous value observable
    assert_eq!(user.get("age").unwrap(), Value::Int(30));
}

#[test]
fn test_null_write_is_a_no_op() {
    let registry = fixture_registry();
    let mut user = sample_user(&registry);

    user.set("age", 30).unwrap();
    user.set("age", Value::Null).unwrap();
    assert_eq!(user.get("age").unwrap(), Value::Int(30));
    assert!(user.is_set("age"));

    // Null never unsets a required setting either
    user.internal().set("name", Value::Null).unwrap();
    assert_eq!(user.get("name").unwrap().as_str(), Some("Ann"));
}

#[test]
fn test_unknown_key_write_silently_dropped() {
    let registry = fixture_registry();
    let mut user = sample_user(&registry);

    user.set("shoe_size", 43).unwrap();
    assert!(!user.is_set("shoe_size"));
}

#[test]
fn test_write_converts_nested_mapping() {
    let registry = fixture_registry();
    let mut user = sample_user(&registry);

    user.set("home", json!({"street": "Main St 1", "city": "Oslo"}))
        .unwrap();
    let home = user.get("home").unwrap();
    assert_eq!(home.as_container().unwrap().type_name(), "Address");
}

// =============================================================================
// Reads of Unset Settings
// =============================================================================

#[test]
fn test_unset_optional_with_default_returns_default() {
    let registry = fixture_registry();
    let user = sample_user(&registry);
    assert_eq!(user.get("age").unwrap(), Value::Int(0));
}

#[test]
fn test_unset_optional_without_default_fails() {
    let registry = fixture_registry();
    let user = sample_user(&registry);

    let err = user.get("home").unwrap_err();
    assert!(matches!(err, Error::NoSuchSetting { ref setting, .. } if setting == "home"));
}

#[test]
fn test_named_default_is_converted_on_read() {
    let registry = fixture_registry();
    registry
        .register(TypeDef::new(
            "Profile",
            schema! {
                SchemaEntry::optional("home", TypeDesc::named("Address"))
                    .default_value(props! {"street" => "Main St 1", "city" => "Oslo"}),
            },
        ))
        .unwrap();

    let profile = registry.instantiate("Profile", props! {}).unwrap();
    let home = profile.get("home").unwrap();
    assert_eq!(home.as_container().unwrap().type_name(), "Address");
    // The converted default is derived state, not a stored setting
    assert!(!profile.is_set("home"));
}

#[test]
fn test_invalid_named_default_surfaces_on_read() {
    let registry = fixture_registry();
    // Registration only shallow-checks the default's kind; the missing
    // required settings surface when the default is actually read
    registry
        .register(TypeDef::new(
            "Profile",
            schema! {
                SchemaEntry::optional("home", TypeDesc::named("Address"))
                    .default_value(props! {"zip" => 1}),
            },
        ))
        .unwrap();

    let profile = registry.instantiate("Profile", props! {}).unwrap();
    let err = profile.get("home").unwrap_err();
    assert!(matches!(err, Error::MissingRequired { ref type_name, .. } if type_name == "Address"));
}

#[test]
fn test_undeclared_setting_fails() {
    let registry = fixture_registry();
    let user = sample_user(&registry);

    let err = user.get("nope").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn test_call_on_non_callback_setting_fails() {
    let registry = fixture_registry();
    let user = sample_user(&registry);

    let err = user.call("name", &[]).unwrap_err();
    assert!(matches!(err, Error::NotCallable { ref setting, .. } if setting == "name"));
    assert_eq!(err.kind(), ErrorKind::BadMethodCall);
}
