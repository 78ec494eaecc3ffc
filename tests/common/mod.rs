//! Common test utilities for propbox integration tests
//!
//! Provides a shared registry of container types exercised across the suites.

#![allow(dead_code)]

use propbox::{schema, Container, Registry, SchemaEntry, TypeDef, TypeDesc};
use serde_json::json;

// =============================================================================
// Fixture Types
// =============================================================================

/// Registry pre-loaded with the container types the suites share:
///
/// - `Address` - plain nested type (street, city, optional postcode)
/// - `OfficeAddress` - implements the `Address` capability, adds `floor`
/// - `User` - exercises defaults, visibility flags, nested types and lists
pub fn fixture_registry() -> Registry {
    // RUST_LOG=debug surfaces registration and lazy-cache traces
    let _ = env_logger::builder().is_test(true).try_init();

    let registry = Registry::new();

    registry
        .register(TypeDef::new(
            "Address",
            schema! {
                SchemaEntry::required("street", TypeDesc::str()),
                SchemaEntry::required("city", TypeDesc::str()),
                SchemaEntry::optional("postcode", TypeDesc::str()),
            },
        ))
        .unwrap();

    registry
        .register(
            TypeDef::new(
                "OfficeAddress",
                schema! {
                    SchemaEntry::required("street", TypeDesc::str()),
                    SchemaEntry::required("city", TypeDesc::str()),
                    SchemaEntry::optional("floor", TypeDesc::int()),
                },
            )
            .implements("Address"),
        )
        .unwrap();

    registry
        .register(TypeDef::new(
            "User",
            schema! {
                SchemaEntry::required("name", TypeDesc::str()),
                SchemaEntry::optional("age", TypeDesc::int()).default_value(0),
                SchemaEntry::required("id", TypeDesc::int()).settable(false),
                SchemaEntry::optional("token", TypeDesc::str()).gettable(false),
                SchemaEntry::optional("home", TypeDesc::named("Address")),
                SchemaEntry::optional("tags", TypeDesc::list()),
            },
        ))
        .unwrap();

    registry
}

/// A minimal valid `User` instance.
pub fn sample_user(registry: &Registry) -> Container {
    registry
        .instantiate("User", json!({"name": "Ann", "id": 7}))
        .unwrap()
}
