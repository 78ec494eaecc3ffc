//! Dynamic value model shared by schemas, containers and the exporter
//!
//! A [`Value`] is the currency of the whole library: raw construction input,
//! stored (validated) settings, callback results and defaults are all
//! `Value`s. The model is deliberately single-threaded - callbacks and
//! export-capable objects are shared through `Rc`, so a `Value` is `!Send`.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::container::Container;
use crate::error::Result;

/// Ordered plain-data mapping produced by [`Export::export`].
///
/// `serde_json` is built with `preserve_order`, so key order is retained.
pub type ExportMap = serde_json::Map<String, serde_json::Value>;

/// Reserved key recording the concrete type of an exported object.
///
/// Chosen with a sigil prefix so it is unlikely to collide with real setting
/// names. Stripped again whenever the declaring field's type already
/// disambiguates reconstruction.
pub const TYPE_TAG: &str = "$type";

// =============================================================================
// Export capability
// =============================================================================

/// Capability for values that know how to flatten themselves.
///
/// Only values implementing this trait participate in recursive structural
/// export; arbitrary objects are never blindly field-walked. [`Container`]
/// implements it, and embedding types can implement it to let their own
/// values ride along inside container settings.
pub trait Export {
    /// Concrete type name used for `$type` tagging and named-type matching.
    fn type_name(&self) -> &str;

    /// Produce the ordered plain-data form of this value.
    fn export(&self) -> Result<ExportMap>;
}

// =============================================================================
// Callback
// =============================================================================

/// A stored callback backing a lazy `<name>_getter` setting.
///
/// [`Callback::new`] wraps a zero-argument closure; [`Callback::with_args`]
/// wraps one that requires caller-supplied arguments. The distinction is
/// declared up front (instead of reflecting on arity at call time) so the
/// exporter knows which callbacks it can auto-resolve.
#[derive(Clone)]
pub struct Callback {
    func: Rc<dyn Fn(&[Value]) -> Value>,
    takes_args: bool,
}

impl Callback {
    /// Wrap a zero-argument closure.
    pub fn new<F>(func: F) -> Self
    where
        F: Fn() -> Value + 'static,
    {
        Self {
            func: Rc::new(move |_| func()),
            takes_args: false,
        }
    }

    /// Wrap a closure that requires caller-supplied arguments.
    pub fn with_args<F>(func: F) -> Self
    where
        F: Fn(&[Value]) -> Value + 'static,
    {
        Self {
            func: Rc::new(func),
            takes_args: true,
        }
    }

    /// Whether this callback requires arguments to be supplied.
    #[must_use]
    pub fn takes_args(&self) -> bool {
        self.takes_args
    }

    /// Invoke the callback. Zero-argument callbacks ignore `args`.
    #[must_use]
    pub fn invoke(&self, args: &[Value]) -> Value {
        (self.func)(args)
    }

    /// Shorthand for a callback that counts its invocations.
    ///
    /// Returns the callback plus a shared counter; mainly useful in tests
    /// asserting lazy-cache behavior.
    pub fn counted<F>(func: F) -> (Self, Rc<Cell<u64>>)
    where
        F: Fn() -> Value + 'static,
    {
        let count = Rc::new(Cell::new(0));
        let inner = Rc::clone(&count);
        let cb = Self::new(move || {
            inner.set(inner.get() + 1);
            func()
        });
        (cb, count)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("takes_args", &self.takes_args)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.func, &other.func)
    }
}

// =============================================================================
// Value
// =============================================================================

/// A dynamically-typed setting value.
#[derive(Clone)]
pub enum Value {
    /// Accepted on any write but never stored ("unset", not "null").
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Ordered list, flattened element-wise on export.
    List(Vec<Value>),
    /// Plain ordered mapping; converted to a nested [`Container`] when a
    /// setting declares a registered named type.
    Map(IndexMap<String, Value>),
    /// Callback backing a lazy getter setting.
    Callback(Callback),
    /// Nested container instance.
    Container(Container),
    /// Foreign value carrying the [`Export`] capability.
    Object(Rc<dyn Export>),
}

impl Value {
    /// Human-readable label of this value's runtime kind.
    ///
    /// Containers and objects report their concrete type name; everything
    /// else reports the scalar-kind name used in type descriptors.
    #[must_use]
    pub fn type_label(&self) -> String {
        match self {
            Value::Null => "null".into(),
            Value::Bool(_) => "boolean".into(),
            Value::Int(_) => "integer".into(),
            Value::Float(_) => "float".into(),
            Value::Str(_) => "string".into(),
            Value::List(_) => "list".into(),
            Value::Map(_) => "mapping".into(),
            Value::Callback(_) => "callback".into(),
            Value::Container(c) => c.type_name().to_string(),
            Value::Object(o) => o.type_name().to_string(),
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_container(&self) -> Option<&Container> {
        match self {
            Value::Container(c) => Some(c),
            _ => None,
        }
    }

    /// Convert plain data to JSON. Returns `None` if the value (or anything
    /// nested in it) is a callback, container or foreign object - those only
    /// leave the dynamic model through the exporter.
    #[must_use]
    pub fn to_json(&self) -> Option<serde_json::Value> {
        match self {
            Value::Null => Some(serde_json::Value::Null),
            Value::Bool(b) => Some(serde_json::Value::Bool(*b)),
            Value::Int(i) => Some(serde_json::Value::from(*i)),
            Value::Float(f) => serde_json::Number::from_f64(*f).map(serde_json::Value::Number),
            Value::Str(s) => Some(serde_json::Value::String(s.clone())),
            Value::List(items) => items
                .iter()
                .map(Value::to_json)
                .collect::<Option<Vec<_>>>()
                .map(serde_json::Value::Array),
            Value::Map(map) => map
                .iter()
                .map(|(k, v)| v.to_json().map(|j| (k.clone(), j)))
                .collect::<Option<ExportMap>>()
                .map(serde_json::Value::Object),
            Value::Callback(_) | Value::Container(_) | Value::Object(_) => None,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int(i) => write!(f, "Int({i})"),
            Value::Float(v) => write!(f, "Float({v})"),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::List(items) => f.debug_tuple("List").field(items).finish(),
            Value::Map(map) => {
                let entries: Vec<(&String, &Value)> = map.iter().collect();
                f.debug_tuple("Map").field(&entries).finish()
            }
            Value::Callback(cb) => cb.fmt(f),
            Value::Container(c) => write!(f, "Container({})", c.type_name()),
            Value::Object(o) => write!(f, "Object({})", o.type_name()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Callback(a), Value::Callback(b)) => a == b,
            (Value::Container(a), Value::Container(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(v: IndexMap<String, Value>) -> Self {
        Value::Map(v)
    }
}

impl From<Callback> for Value {
    fn from(v: Callback) -> Self {
        Value::Callback(v)
    }
}

impl From<Container> for Value {
    fn from(v: Container) -> Self {
        Value::Container(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

/// Macro for building a construction mapping more cleanly
///
/// Produces the ordered `IndexMap<String, Value>` that
/// [`Registry::instantiate`](crate::Registry::instantiate) accepts; values
/// are anything convertible into a [`Value`], so callbacks and nested
/// containers fit where JSON literals cannot.
///
/// # Example
/// ```rust
/// use propbox::{props, Callback, Value};
///
/// let input = props! {
///     "name" => "Ann",
///     "score_getter" => Callback::new(|| Value::Int(5)),
/// };
/// assert_eq!(input["name"], Value::from("Ann"));
/// ```
#[macro_export]
macro_rules! props {
    ($($key:expr => $value:expr),* $(,)?) => {{
        let mut map = $crate::IndexMap::new();
        $(
            map.insert($key.to_string(), $crate::Value::from($value));
        )*
        map
    }};
}
