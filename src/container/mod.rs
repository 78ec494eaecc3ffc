//! Validated property container instances
//!
//! A [`Container`] is an instance of a registered type: an ordered map of
//! stored, schema-validated setting values plus a lazy-result cache for
//! derived getter settings. Instances are built through
//! [`Registry::instantiate`](crate::Registry::instantiate) and afterwards
//! accessed through the guarded [`get`](Container::get) /
//! [`set`](Container::set) / [`call`](Container::call) surface or the
//! privileged [`Internal`] token.

mod access;
mod export;

pub use access::Internal;

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::ser::{Serialize, Serializer};

use crate::error::{Error, Result};
use crate::registry::{Registry, TypeDef};
use crate::schema::Schema;
use crate::value::{Export, ExportMap, Value};

/// A validated instance of a registered container type.
#[derive(Debug, Clone)]
pub struct Container {
    ty: Rc<TypeDef>,
    registry: Registry,
    /// Stored, validated settings in first-write order. Absence means
    /// "unset", never "null".
    values: IndexMap<String, Value>,
    /// Results of zero-argument lazy getter resolution, keyed by derived
    /// name. Populated at most once per name; a direct store under the same
    /// name evicts the cached result.
    lazy: RefCell<IndexMap<String, Value>>,
}

impl Container {
    /// Atomic two-pass construction: requiredness first, then every supplied
    /// key routed through the privileged write path in input order.
    pub(crate) fn from_parts(
        ty: Rc<TypeDef>,
        registry: Registry,
        input: IndexMap<String, Value>,
    ) -> Result<Self> {
        // A required key supplied as Null would pass the write path as a
        // no-op and leave the setting unset; treat it as missing up front.
        for entry in ty.schema().iter() {
            if !entry.is_required() {
                continue;
            }
            match input.get(entry.name()) {
                Some(value) if !value.is_null() => {}
                _ => {
                    return Err(Error::MissingRequired {
                        type_name: ty.name().to_string(),
                        setting: entry.name().to_string(),
                        expected: entry.ty().to_string(),
                    });
                }
            }
        }

        let mut container = Self {
            ty,
            registry,
            values: IndexMap::new(),
            lazy: RefCell::new(IndexMap::new()),
        };

        for (name, value) in input {
            container.write(&name, value, true)?;
        }

        Ok(container)
    }

    /// Name of this instance's concrete type.
    #[must_use]
    pub fn type_name(&self) -> &str {
        self.ty.name()
    }

    /// Schema this instance was validated against.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        self.ty.schema()
    }

    /// Nominal match against a type or capability name.
    #[must_use]
    pub fn satisfies(&self, name: &str) -> bool {
        self.ty.satisfies(name)
    }

    /// Whether a setting currently holds a stored value. Lazy-cache results
    /// and defaults do not count as stored.
    #[must_use]
    pub fn is_set(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Obtain the privilege token for internal access.
    ///
    /// The token bypasses the gettable/settable flags (writes are still
    /// validated). Types embedding a container keep the container private and
    /// call this from their own methods only; handing the token out would
    /// hand out unrestricted access.
    pub fn internal(&mut self) -> Internal<'_> {
        Internal::new(self)
    }

    pub(crate) fn type_def(&self) -> &Rc<TypeDef> {
        &self.ty
    }

    pub(crate) fn registry(&self) -> &Registry {
        &self.registry
    }

    pub(crate) fn stored(&self) -> &IndexMap<String, Value> {
        &self.values
    }

    pub(crate) fn stored_mut(&mut self) -> &mut IndexMap<String, Value> {
        &mut self.values
    }

    pub(crate) fn lazy_cache(&self) -> &RefCell<IndexMap<String, Value>> {
        &self.lazy
    }
}

/// Two containers are equal when they have the same type name and the same
/// stored settings; the lazy cache is derived state and not compared.
impl PartialEq for Container {
    fn eq(&self, other: &Self) -> bool {
        self.ty.name() == other.ty.name() && self.values == other.values
    }
}

impl Export for Container {
    fn type_name(&self) -> &str {
        Container::type_name(self)
    }

    fn export(&self) -> Result<ExportMap> {
        Container::export(self)
    }
}

impl Serialize for Container {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let map = self.export().map_err(serde::ser::Error::custom)?;
        serde_json::Value::Object(map).serialize(serializer)
    }
}
