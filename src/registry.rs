//! Type registry: named container types and reconstruction by tag
//!
//! Every container type is registered once as a [`TypeDef`] (name + schema +
//! implemented capability names). The registry is what lets the validator
//! convert a plain mapping into a nested container: the declared type - or
//! the type named by a `$type` reconstruction tag - is looked up here and
//! instantiated through the full construction path.
//!
//! A [`Registry`] is a cheap clone-able handle; every container built from it
//! keeps a handle so later writes can still resolve named types.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::info;

use crate::container::Container;
use crate::error::{Error, Result};
use crate::schema::Schema;
use crate::value::Value;

/// Declaration of one container type: its name, schema and the capability
/// names it satisfies for [`TypeDesc::Named`](crate::TypeDesc::Named)
/// matching.
#[derive(Debug)]
pub struct TypeDef {
    name: String,
    schema: Schema,
    implements: Vec<String>,
}

impl TypeDef {
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            implements: Vec::new(),
        }
    }

    /// Declare that this type satisfies a capability name. A setting declared
    /// `TypeDesc::named("capability")` then accepts instances of this type.
    #[must_use]
    pub fn implements(mut self, capability: impl Into<String>) -> Self {
        self.implements.push(capability.into());
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Nominal match against a declared named type: the type's own name or
    /// any capability it implements.
    #[must_use]
    pub fn satisfies(&self, name: &str) -> bool {
        self.name == name || self.implements.iter().any(|c| c == name)
    }
}

/// Registry of container types.
///
/// ```rust
/// use propbox::{schema, Registry, SchemaEntry, TypeDef, TypeDesc};
/// use serde_json::json;
///
/// let registry = Registry::new();
/// registry.register(TypeDef::new("User", schema! {
///     SchemaEntry::required("name", TypeDesc::str()),
/// }))?;
///
/// let user = registry.instantiate("User", json!({"name": "Ann"}))?;
/// assert_eq!(user.get("name")?.as_str(), Some("Ann"));
/// # Ok::<(), propbox::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Registry {
    types: Rc<RefCell<HashMap<String, Rc<TypeDef>>>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a container type.
    ///
    /// Validates the schema declaration itself; a broken declaration is a
    /// programming error surfaced as a `Misconfigured`-kind error, as is
    /// registering the same name twice.
    pub fn register(&self, def: TypeDef) -> Result<()> {
        def.schema.validate(&def.name)?;

        let mut types = self.types.borrow_mut();
        if types.contains_key(&def.name) {
            return Err(Error::TypeAlreadyRegistered(def.name));
        }

        info!("Registered container type: {}", def.name);
        types.insert(def.name.clone(), Rc::new(def));
        Ok(())
    }

    /// Check if a type name is registered
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.types.borrow().contains_key(name)
    }

    /// List all registered type names
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.types.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<Rc<TypeDef>> {
        self.types.borrow().get(name).cloned()
    }

    /// Construct a validated instance of a registered type from a mapping.
    ///
    /// The input may be a [`Value::Map`] or anything convertible into one
    /// (notably a `serde_json` object). Construction is atomic: every
    /// required setting must be present and every supplied value must
    /// validate, or no instance is produced. Unknown keys are silently
    /// ignored.
    pub fn instantiate(&self, name: &str, values: impl Into<Value>) -> Result<Container> {
        let ty = self
            .lookup(name)
            .ok_or_else(|| Error::UnknownType(name.to_string()))?;

        match values.into() {
            Value::Map(map) => Container::from_parts(ty, self.clone(), map),
            other => Err(Error::NotAMapping {
                type_name: name.to_string(),
                actual: other.type_label(),
            }),
        }
    }
}
