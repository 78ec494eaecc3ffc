//! Recursive structural export
//!
//! Flattens an instance's exportable settings into a plain, ordered, nested
//! mapping. Nested containers (and foreign values carrying the
//! [`Export`](crate::Export) capability) are replaced by their own export,
//! tagged with their concrete type name under [`TYPE_TAG`] so the validator
//! can reconstruct the right type later. The tag is elided when the field's
//! declared type already names the produced type.

use std::rc::Rc;

use crate::container::Container;
use crate::error::{Error, Result};
use crate::schema::TypeDesc;
use crate::value::{ExportMap, Value, TYPE_TAG};

impl Container {
    /// Produce the ordered plain-data form of this instance.
    ///
    /// Walks the schema in declaration order. Non-exportable settings are
    /// skipped; unset settings fall back to their default or are omitted.
    /// Stored zero-argument callbacks are resolved (return type enforced,
    /// nothing cached) and exported under the derived name; callbacks that
    /// require arguments cannot be auto-resolved and are skipped. A callback
    /// anywhere below the top level is an unsupported shape and fails with a
    /// `Runtime`-kind error.
    pub fn export(&self) -> Result<ExportMap> {
        let ty = Rc::clone(self.type_def());
        let mut out = ExportMap::new();

        for entry in ty.schema().iter() {
            if !entry.is_exportable() {
                continue;
            }

            let Some(value) = self.stored().get(entry.name()).or_else(|| entry.default())
            else {
                continue;
            };

            if let Value::Callback(callback) = value {
                if callback.takes_args() {
                    continue;
                }
                let resolved = self.invoke_checked(entry, callback, &[])?;
                let declared = match entry.ty() {
                    TypeDesc::Callback(Some(returns)) => Some(&**returns),
                    _ => None,
                };
                let key = entry.derived_name().unwrap_or(entry.name());
                out.insert(
                    key.to_string(),
                    self.flatten(entry.name(), declared, &resolved)?,
                );
            } else {
                out.insert(
                    entry.name().to_string(),
                    self.flatten(entry.name(), Some(entry.ty()), value)?,
                );
            }
        }

        Ok(out)
    }

    fn flatten(
        &self,
        setting: &str,
        declared: Option<&TypeDesc>,
        value: &Value,
    ) -> Result<serde_json::Value> {
        match value {
            Value::Null => Ok(serde_json::Value::Null),
            Value::Bool(b) => Ok(serde_json::Value::Bool(*b)),
            Value::Int(i) => Ok(serde_json::Value::from(*i)),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .ok_or_else(|| self.unsupported(setting, "non-finite float")),
            Value::Str(s) => Ok(serde_json::Value::String(s.clone())),

            Value::List(items) => {
                let mut array = Vec::with_capacity(items.len());
                for item in items {
                    array.push(self.flatten(setting, None, item)?);
                }
                Ok(serde_json::Value::Array(array))
            }

            Value::Map(map) => {
                let mut object = ExportMap::new();
                for (key, item) in map {
                    object.insert(key.clone(), self.flatten(setting, None, item)?);
                }
                Ok(serde_json::Value::Object(object))
            }

            Value::Callback(_) => Err(self.unsupported(setting, "callback")),

            Value::Container(container) => {
                let exported = container.export()?;
                Ok(Self::tagged(declared, container.type_name(), exported))
            }

            Value::Object(object) => {
                let exported = object.export()?;
                Ok(Self::tagged(declared, object.type_name(), exported))
            }
        }
    }

    // The tag is redundant exactly when the declaring field's named type
    // matches the produced type; values nested in lists and maps have no
    // declared type and always keep it.
    fn tagged(declared: Option<&TypeDesc>, tag: &str, mut map: ExportMap) -> serde_json::Value {
        let redundant = matches!(declared, Some(TypeDesc::Named(name)) if name == tag);
        if !redundant {
            map.insert(
                TYPE_TAG.to_string(),
                serde_json::Value::String(tag.to_string()),
            );
        }
        serde_json::Value::Object(map)
    }

    fn unsupported(&self, setting: &str, actual: &str) -> Error {
        Error::UnsupportedExport {
            type_name: self.type_name().to_string(),
            setting: setting.to_string(),
            actual: actual.to_string(),
        }
    }
}
