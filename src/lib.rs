//! # propbox - schema-declared property containers
//!
//! A generic, declaratively-configured property container: container types
//! are declared as data (a named schema of settings), instances are
//! constructed from an ordered mapping of raw values, validated against the
//! schema, and thereafter expose controlled read/write access plus a
//! recursive structural export with type tags for round-trip
//! reconstruction.
//!
//! ## Features
//!
//! - **Declarative schemas**: required/optional settings with scalar, named
//!   or callback type descriptors, visibility flags and defaults
//! - **Atomic validated construction**: missing required settings or
//!   mistyped values abort before any state is observable; unknown keys are
//!   silently dropped for forward compatibility
//! - **Accessor guard**: per-setting gettable/settable flags enforced on the
//!   external surface, bypassed by an explicit internal privilege token
//! - **Lazy getter settings**: callback-backed `<name>_getter` entries
//!   resolved on first read and cached exactly once
//! - **Structural export**: recursive flatten into plain ordered mappings,
//!   `$type`-tagged for reconstruction of nested container types
//!
//! ## Quick Start
//!
//! ```rust
//! use propbox::{schema, Registry, SchemaEntry, TypeDef, TypeDesc, Value};
//! use serde_json::json;
//!
//! let registry = Registry::new();
//! registry.register(TypeDef::new("User", schema! {
//!     SchemaEntry::required("name", TypeDesc::str()),
//!     SchemaEntry::optional("age", TypeDesc::int()).default_value(0),
//!     SchemaEntry::required("id", TypeDesc::int()).settable(false),
//! }))?;
//!
//! let mut user = registry.instantiate("User", json!({"name": "Ann", "id": 7}))?;
//!
//! assert_eq!(user.get("name")?.as_str(), Some("Ann"));
//! assert_eq!(user.get("age")?, Value::Int(0)); // unset, default returned
//!
//! // External writes honor the settable flag; the internal token bypasses it
//! assert!(user.set("id", 8).is_err());
//! user.internal().set("id", 8)?;
//!
//! let exported = user.export()?;
//! assert_eq!(serde_json::Value::Object(exported), json!({
//!     "name": "Ann",
//!     "age": 0,
//!     "id": 8,
//! }));
//! # Ok::<(), propbox::Error>(())
//! ```
//!
//! ## Lazy getter settings
//!
//! A callback-typed entry named `<name>_getter` backs a derived setting
//! `<name>`: plain reads resolve the callback once and cache the result;
//! explicit [`Container::call`] invocations always re-invoke. A `Null`
//! result means "no value yet" and is never cached, so later reads retry
//! the callback until it produces one.
//!
//! ```rust
//! use propbox::{props, schema, Callback, Registry, SchemaEntry, TypeDef, TypeDesc, Value};
//!
//! let registry = Registry::new();
//! registry.register(TypeDef::new("Game", schema! {
//!     SchemaEntry::required(
//!         "score_getter",
//!         TypeDesc::callback_returning(TypeDesc::int()),
//!     ),
//! }))?;
//!
//! let (callback, calls) = Callback::counted(|| Value::Int(5));
//! let game = registry.instantiate("Game", props! {
//!     "score_getter" => callback,
//! })?;
//!
//! assert_eq!(game.get("score")?, Value::Int(5));
//! assert_eq!(game.get("score")?, Value::Int(5));
//! assert_eq!(calls.get(), 1); // cached after the first read
//!
//! game.call("score", &[])?;
//! assert_eq!(calls.get(), 2); // explicit calls always re-invoke
//! # Ok::<(), propbox::Error>(())
//! ```
//!
//! ## Nested containers and round-trips
//!
//! A setting declared with a named type accepts either an instance of that
//! type or a plain mapping, which is converted through the registry - re-
//! entering full construction validation. Exports tag nested containers with
//! their concrete type under [`TYPE_TAG`] (elided when the declared type
//! already matches), so an export can be fed straight back into
//! [`Registry::instantiate`].
//!
//! ```rust
//! use propbox::{schema, Registry, SchemaEntry, TypeDef, TypeDesc};
//! use serde_json::json;
//!
//! let registry = Registry::new();
//! registry.register(TypeDef::new("Address", schema! {
//!     SchemaEntry::required("city", TypeDesc::str()),
//! }))?;
//! registry.register(TypeDef::new("User", schema! {
//!     SchemaEntry::required("name", TypeDesc::str()),
//!     SchemaEntry::optional("home", TypeDesc::named("Address")),
//! }))?;
//!
//! let user = registry.instantiate("User", json!({
//!     "name": "Ann",
//!     "home": {"city": "Oslo"},
//! }))?;
//!
//! let exported = user.export()?;
//! let restored = registry.instantiate("User", serde_json::Value::Object(exported.clone()))?;
//! assert_eq!(restored.export()?, exported);
//! # Ok::<(), propbox::Error>(())
//! ```
//!
//! ## Concurrency
//!
//! Deliberately single-threaded: values share callbacks and export-capable
//! objects through `Rc`, and each instance exclusively owns its settings map
//! and lazy cache. Wrap instances in your own lock if you need to cross
//! threads at a coarser granularity.

// Core modules
mod error;
mod schema;
mod value;

mod registry;
mod validate;

mod container;

// Re-exports from core
pub use container::{Container, Internal};
pub use error::{Error, ErrorKind, Result};
pub use registry::{Registry, TypeDef};
pub use schema::{GETTER_SUFFIX, ScalarKind, Schema, SchemaEntry, TypeDesc};
pub use value::{Callback, Export, ExportMap, Value, TYPE_TAG};

// The ordered map backing `Value::Map`, re-exported for construction input
// and the `props!` macro.
pub use indexmap::IndexMap;
