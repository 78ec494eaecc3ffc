//! Schema declaration types
//!
//! # Overview
//!
//! A container type is declared as pure data: a [`Schema`] listing one
//! [`SchemaEntry`] per setting. Each entry carries:
//!
//! - a **required** flag (required settings must be present at construction)
//! - **visibility** flags: `gettable` / `settable` (default `true`) and
//!   `exportable` (default = `gettable`)
//! - a **type descriptor** ([`TypeDesc`]): scalar kind, named type, or
//!   "callback returning T"
//! - an optional **default** value, only consulted for optional settings
//!
//! Declaration order is preserved and drives export order.
//!
//! ```rust
//! use propbox::{schema, SchemaEntry, TypeDesc};
//!
//! let user = schema! {
//!     SchemaEntry::required("name", TypeDesc::str()),
//!     SchemaEntry::optional("age", TypeDesc::int()).default_value(0),
//!     SchemaEntry::required("id", TypeDesc::int()).settable(false),
//! };
//! assert_eq!(user.len(), 3);
//! ```
//!
//! # Lazy getter settings
//!
//! A callback-typed entry whose name ends in `_getter` declares a derived
//! setting: reading `score` on an instance with no stored `score` resolves
//! the callback stored under `score_getter` and caches the result.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::value::Value;

/// Suffix marking a callback entry as the backing store of a derived setting.
pub const GETTER_SUFFIX: &str = "_getter";

// =============================================================================
// Type descriptors
// =============================================================================

/// Runtime kind of a scalar setting value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    /// Boolean
    Bool,
    /// Signed integer
    Int,
    /// Floating point number
    Float,
    /// String
    Str,
    /// Ordered list of arbitrary values
    List,
    /// Plain ordered mapping
    Map,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarKind::Bool => "boolean",
            ScalarKind::Int => "integer",
            ScalarKind::Float => "float",
            ScalarKind::Str => "string",
            ScalarKind::List => "list",
            ScalarKind::Map => "mapping",
        };
        f.write_str(name)
    }
}

/// Declared type of a setting.
///
/// A tagged sum instead of a parsed type string: one variant per shape the
/// schema language supports, validated by a single dispatch in the validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeDesc {
    /// A scalar runtime kind, checked by strict kind equality.
    Scalar(ScalarKind),
    /// A registered container type or capability name. Plain mappings are
    /// recursively converted into instances of the named type.
    Named(String),
    /// An invokable value, optionally constrained to a return type that is
    /// checked when the callback is invoked, not at assignment.
    Callback(Option<Box<TypeDesc>>),
}

impl TypeDesc {
    pub fn bool() -> Self {
        TypeDesc::Scalar(ScalarKind::Bool)
    }

    pub fn int() -> Self {
        TypeDesc::Scalar(ScalarKind::Int)
    }

    pub fn float() -> Self {
        TypeDesc::Scalar(ScalarKind::Float)
    }

    pub fn str() -> Self {
        TypeDesc::Scalar(ScalarKind::Str)
    }

    pub fn list() -> Self {
        TypeDesc::Scalar(ScalarKind::List)
    }

    pub fn map() -> Self {
        TypeDesc::Scalar(ScalarKind::Map)
    }

    /// A registered container type or capability name.
    pub fn named(name: impl Into<String>) -> Self {
        TypeDesc::Named(name.into())
    }

    /// A callback with no return-type constraint.
    pub fn callback() -> Self {
        TypeDesc::Callback(None)
    }

    /// A callback whose result must satisfy `returns`.
    pub fn callback_returning(returns: TypeDesc) -> Self {
        TypeDesc::Callback(Some(Box::new(returns)))
    }

    /// Whether this descriptor declares a callback setting.
    #[must_use]
    pub fn is_callback(&self) -> bool {
        matches!(self, TypeDesc::Callback(_))
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDesc::Scalar(kind) => kind.fmt(f),
            TypeDesc::Named(name) => f.write_str(name),
            TypeDesc::Callback(None) => f.write_str("callback"),
            TypeDesc::Callback(Some(ret)) => write!(f, "callback {ret}"),
        }
    }
}

/// Runtime scalar kind of a value, if it has one.
pub(crate) fn scalar_kind_of(value: &Value) -> Option<ScalarKind> {
    match value {
        Value::Bool(_) => Some(ScalarKind::Bool),
        Value::Int(_) => Some(ScalarKind::Int),
        Value::Float(_) => Some(ScalarKind::Float),
        Value::Str(_) => Some(ScalarKind::Str),
        Value::List(_) => Some(ScalarKind::List),
        Value::Map(_) => Some(ScalarKind::Map),
        Value::Null | Value::Callback(_) | Value::Container(_) | Value::Object(_) => None,
    }
}

// =============================================================================
// Schema entries
// =============================================================================

/// Declaration of a single named setting.
///
/// Built with [`SchemaEntry::required`] / [`SchemaEntry::optional`] plus
/// chained flag setters:
///
/// ```rust
/// use propbox::{SchemaEntry, TypeDesc};
///
/// let id = SchemaEntry::required("id", TypeDesc::int())
///     .settable(false);
/// assert!(id.is_gettable() && !id.is_settable());
///
/// let token = SchemaEntry::optional("token", TypeDesc::str())
///     .gettable(false);
/// // exportable follows gettable unless set explicitly
/// assert!(!token.is_exportable());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaEntry {
    name: String,
    required: bool,
    gettable: bool,
    settable: bool,
    exportable: Option<bool>,
    ty: TypeDesc,
    default: Option<Value>,
}

impl SchemaEntry {
    fn new(name: impl Into<String>, required: bool, ty: TypeDesc) -> Self {
        Self {
            name: name.into(),
            required,
            gettable: true,
            settable: true,
            exportable: None,
            ty,
            default: None,
        }
    }

    /// Declare a setting that must be present at construction.
    pub fn required(name: impl Into<String>, ty: TypeDesc) -> Self {
        Self::new(name, true, ty)
    }

    /// Declare a setting that may be absent.
    pub fn optional(name: impl Into<String>, ty: TypeDesc) -> Self {
        Self::new(name, false, ty)
    }

    /// Allow or forbid external reads (default: allowed).
    #[must_use]
    pub fn gettable(mut self, gettable: bool) -> Self {
        self.gettable = gettable;
        self
    }

    /// Allow or forbid external writes (default: allowed).
    #[must_use]
    pub fn settable(mut self, settable: bool) -> Self {
        self.settable = settable;
        self
    }

    /// Include or exclude this setting from export (default: follows
    /// `gettable`).
    #[must_use]
    pub fn exportable(mut self, exportable: bool) -> Self {
        self.exportable = Some(exportable);
        self
    }

    /// Default value returned (and exported) while an optional setting is
    /// unset. Ignored for required settings.
    #[must_use]
    pub fn default_value(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    #[must_use]
    pub fn is_gettable(&self) -> bool {
        self.gettable
    }

    #[must_use]
    pub fn is_settable(&self) -> bool {
        self.settable
    }

    #[must_use]
    pub fn is_exportable(&self) -> bool {
        self.exportable.unwrap_or(self.gettable)
    }

    #[must_use]
    pub fn ty(&self) -> &TypeDesc {
        &self.ty
    }

    #[must_use]
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Whether this entry backs a derived lazy setting (`<name>_getter`).
    #[must_use]
    pub fn is_getter(&self) -> bool {
        self.name.len() > GETTER_SUFFIX.len() && self.name.ends_with(GETTER_SUFFIX)
    }

    /// The derived setting name a getter entry services, if any.
    #[must_use]
    pub fn derived_name(&self) -> Option<&str> {
        if self.is_getter() {
            Some(&self.name[..self.name.len() - GETTER_SUFFIX.len()])
        } else {
            None
        }
    }
}

// =============================================================================
// Schema
// =============================================================================

/// Ordered, immutable set of setting declarations for one container type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    entries: Vec<SchemaEntry>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry (builder style, mirrors declaration order).
    #[must_use]
    pub fn entry(mut self, entry: SchemaEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Look up an entry by exact name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SchemaEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Look up the getter entry backing a derived setting name.
    #[must_use]
    pub fn getter_for(&self, derived: &str) -> Option<&SchemaEntry> {
        self.entries
            .iter()
            .find(|e| e.ty.is_callback() && e.derived_name() == Some(derived))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SchemaEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Validate the declaration itself; run once at type registration.
    ///
    /// Rejects duplicate or empty names, `_getter` entries that are not
    /// callback-typed, and defaults that violate their own descriptor.
    /// A default on a required entry is allowed but ignored (logged).
    pub fn validate(&self, type_name: &str) -> Result<()> {
        for (idx, entry) in self.entries.iter().enumerate() {
            if entry.name.is_empty() {
                return Err(Error::InvalidSchema {
                    type_name: type_name.to_string(),
                    setting: format!("#{idx}"),
                    reason: "setting name is empty".into(),
                });
            }

            if self.entries[..idx].iter().any(|e| e.name == entry.name) {
                return Err(Error::DuplicateSetting {
                    type_name: type_name.to_string(),
                    setting: entry.name.clone(),
                });
            }

            if entry.is_getter() && !entry.ty.is_callback() {
                return Err(Error::InvalidSchema {
                    type_name: type_name.to_string(),
                    setting: entry.name.clone(),
                    reason: format!(
                        "getter-suffixed setting must be callback-typed, declared {}",
                        entry.ty
                    ),
                });
            }

            if let Some(default) = &entry.default {
                if entry.required {
                    log::warn!(
                        "Default on required setting '{}.{}' is never consulted",
                        type_name,
                        entry.name
                    );
                }
                Self::check_default(type_name, entry, default)?;
            }
        }
        Ok(())
    }

    // Shallow kind check only: named-type defaults given as mappings are
    // converted (and fully validated) the first time they are actually read.
    fn check_default(type_name: &str, entry: &SchemaEntry, default: &Value) -> Result<()> {
        let ok = match &entry.ty {
            TypeDesc::Scalar(kind) => {
                default.is_null() || scalar_kind_of(default) == Some(*kind)
            }
            TypeDesc::Callback(_) => {
                default.is_null() || matches!(default, Value::Callback(_))
            }
            TypeDesc::Named(_) => matches!(
                default,
                Value::Null | Value::Map(_) | Value::Container(_) | Value::Object(_)
            ),
        };
        if ok {
            Ok(())
        } else {
            Err(Error::InvalidSchema {
                type_name: type_name.to_string(),
                setting: entry.name.clone(),
                reason: format!(
                    "default value is {}, expected {}",
                    default.type_label(),
                    entry.ty
                ),
            })
        }
    }
}

impl FromIterator<SchemaEntry> for Schema {
    fn from_iter<I: IntoIterator<Item = SchemaEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Macro for declaring a [`Schema`] from a list of entries
///
/// # Example
/// ```rust
/// use propbox::{schema, SchemaEntry, TypeDesc};
///
/// let user = schema! {
///     SchemaEntry::required("name", TypeDesc::str()),
///     SchemaEntry::optional("age", TypeDesc::int()).default_value(0),
/// };
/// assert!(user.get("age").is_some());
/// ```
#[macro_export]
macro_rules! schema {
    ($($entry:expr),* $(,)?) => {{
        let mut schema = $crate::Schema::new();
        $(
            schema = schema.entry($entry);
        )*
        schema
    }};
}
