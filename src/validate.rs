//! Value validation against type descriptors
//!
//! One dispatch for the whole schema language: scalar kinds checked by strict
//! runtime kind equality, callbacks checked for invokability (their return
//! type is checked lazily at invocation), and named types checked nominally -
//! with plain mappings recursively converted into container instances through
//! the registry.

use crate::error::{Error, Result};
use crate::registry::Registry;
use crate::schema::{scalar_kind_of, SchemaEntry, TypeDesc};
use crate::value::{Value, TYPE_TAG};

/// Validate a candidate value for a schema entry.
///
/// `Null` short-circuits as accepted-but-not-stored (`Ok(None)`); everything
/// else must satisfy the entry's descriptor and comes back possibly
/// converted (mappings become nested containers for named types).
pub(crate) fn validate_entry(
    registry: &Registry,
    owner: &str,
    entry: &SchemaEntry,
    value: Value,
) -> Result<Option<Value>> {
    if value.is_null() {
        return Ok(None);
    }
    check_type(
        registry,
        owner,
        entry.name(),
        entry.is_required(),
        entry.ty(),
        value,
    )
    .map(Some)
}

/// Check a (non-null) value against a type descriptor, converting compatible
/// plain mappings into nested containers.
pub(crate) fn check_type(
    registry: &Registry,
    owner: &str,
    setting: &str,
    required: bool,
    ty: &TypeDesc,
    value: Value,
) -> Result<Value> {
    match ty {
        TypeDesc::Scalar(kind) => {
            if scalar_kind_of(&value) == Some(*kind) {
                Ok(value)
            } else {
                Err(mismatch(owner, setting, required, ty, &value))
            }
        }

        // Only invokability is checked here; the declared return type is
        // enforced when the callback actually runs.
        TypeDesc::Callback(_) => {
            if matches!(value, Value::Callback(_)) {
                Ok(value)
            } else {
                Err(mismatch(owner, setting, required, ty, &value))
            }
        }

        TypeDesc::Named(name) => match value {
            Value::Container(container) => {
                if container.satisfies(name) {
                    Ok(Value::Container(container))
                } else {
                    Err(mismatch(
                        owner,
                        setting,
                        required,
                        ty,
                        &Value::Container(container),
                    ))
                }
            }
            Value::Object(object) => {
                if object.type_name() == name {
                    Ok(Value::Object(object))
                } else {
                    Err(mismatch(owner, setting, required, ty, &Value::Object(object)))
                }
            }
            Value::Map(mut map) => {
                // A reconstruction tag selects the concrete type; otherwise
                // the declared type itself is instantiated. Either way the
                // tag is stripped before construction.
                let target = match map.shift_remove(TYPE_TAG) {
                    Some(Value::Str(tag)) => tag,
                    Some(other) => {
                        return Err(Error::TypeMismatch {
                            type_name: owner.to_string(),
                            setting: setting.to_string(),
                            required,
                            expected: name.clone(),
                            actual: format!("mapping with {} tag of kind {}", TYPE_TAG, other.type_label()),
                        });
                    }
                    None => name.clone(),
                };

                let container = registry.instantiate(&target, Value::Map(map))?;
                if container.satisfies(name) {
                    Ok(Value::Container(container))
                } else {
                    Err(Error::TypeMismatch {
                        type_name: owner.to_string(),
                        setting: setting.to_string(),
                        required,
                        expected: name.clone(),
                        actual: target,
                    })
                }
            }
            other => Err(mismatch(owner, setting, required, ty, &other)),
        },
    }
}

fn mismatch(owner: &str, setting: &str, required: bool, ty: &TypeDesc, value: &Value) -> Error {
    Error::TypeMismatch {
        type_name: owner.to_string(),
        setting: setting.to_string(),
        required,
        expected: ty.to_string(),
        actual: value.type_label(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TypeDef;
    use crate::schema;
    use crate::value::Callback;
    use indexmap::IndexMap;

    fn registry_with_address() -> Registry {
        let registry = Registry::new();
        registry
            .register(TypeDef::new(
                "Address",
                schema! {
                    SchemaEntry::required("city", TypeDesc::str()),
                },
            ))
            .unwrap();
        registry
    }

    fn entry(name: &str, ty: TypeDesc) -> SchemaEntry {
        SchemaEntry::required(name, ty)
    }

    #[test]
    fn test_null_is_accepted_but_not_stored() {
        let registry = Registry::new();
        let e = entry("age", TypeDesc::int());
        let out = validate_entry(&registry, "User", &e, Value::Null).unwrap();
        assert_eq!(out, None);
    }

    #[test]
    fn test_scalar_kinds_are_strict() {
        let registry = Registry::new();
        let e = entry("age", TypeDesc::int());

        assert!(validate_entry(&registry, "User", &e, Value::Int(3)).is_ok());

        let err = validate_entry(&registry, "User", &e, Value::from("3")).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { ref actual, .. } if actual == "string"));

        // No integer-to-float coercion
        let e = entry("ratio", TypeDesc::float());
        assert!(validate_entry(&registry, "User", &e, Value::Int(1)).is_err());
    }

    #[test]
    fn test_callback_checked_for_invokability_only() {
        let registry = Registry::new();
        let e = entry("score_getter", TypeDesc::callback_returning(TypeDesc::int()));

        // Wrong eventual return type is fine at assignment time
        let cb = Callback::new(|| Value::from("not an int"));
        assert!(validate_entry(&registry, "User", &e, Value::Callback(cb)).is_ok());

        let err = validate_entry(&registry, "User", &e, Value::Int(5)).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn test_named_converts_plain_mapping() {
        let registry = registry_with_address();
        let e = entry("home", TypeDesc::named("Address"));

        let mut map = IndexMap::new();
        map.insert("city".to_string(), Value::from("Oslo"));

        let out = validate_entry(&registry, "User", &e, Value::Map(map))
            .unwrap()
            .unwrap();
        let container = out.as_container().unwrap();
        assert_eq!(container.type_name(), "Address");
        assert_eq!(container.get("city").unwrap().as_str(), Some("Oslo"));
    }

    #[test]
    fn test_named_conversion_honors_type_tag() {
        let registry = registry_with_address();
        registry
            .register(
                TypeDef::new(
                    "OfficeAddress",
                    schema! {
                        SchemaEntry::required("city", TypeDesc::str()),
                        SchemaEntry::optional("floor", TypeDesc::int()),
                    },
                )
                .implements("Address"),
            )
            .unwrap();

        let e = entry("home", TypeDesc::named("Address"));
        let mut map = IndexMap::new();
        map.insert(TYPE_TAG.to_string(), Value::from("OfficeAddress"));
        map.insert("city".to_string(), Value::from("Oslo"));
        map.insert("floor".to_string(), Value::Int(4));

        let out = validate_entry(&registry, "User", &e, Value::Map(map))
            .unwrap()
            .unwrap();
        let container = out.as_container().unwrap();
        assert_eq!(container.type_name(), "OfficeAddress");
        assert_eq!(container.get("floor").unwrap(), Value::Int(4));
    }

    #[test]
    fn test_tagged_type_must_satisfy_declared_type() {
        let registry = registry_with_address();
        registry
            .register(TypeDef::new(
                "Unrelated",
                schema! {
                    SchemaEntry::optional("city", TypeDesc::str()),
                },
            ))
            .unwrap();

        let e = entry("home", TypeDesc::named("Address"));
        let mut map = IndexMap::new();
        map.insert(TYPE_TAG.to_string(), Value::from("Unrelated"));
        map.insert("city".to_string(), Value::from("Oslo"));

        let err = validate_entry(&registry, "User", &e, Value::Map(map)).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { ref actual, .. } if actual == "Unrelated"));
    }

    #[test]
    fn test_unknown_tagged_type_fails() {
        let registry = registry_with_address();
        let e = entry("home", TypeDesc::named("Address"));

        let mut map = IndexMap::new();
        map.insert(TYPE_TAG.to_string(), Value::from("Ghost"));

        let err = validate_entry(&registry, "User", &e, Value::Map(map)).unwrap_err();
        assert!(matches!(err, Error::UnknownType(ref name) if name == "Ghost"));
    }

    #[test]
    fn test_capability_satisfaction_accepts_subtype_container() {
        let registry = registry_with_address();
        registry
            .register(
                TypeDef::new(
                    "OfficeAddress",
                    schema! {
                        SchemaEntry::required("city", TypeDesc::str()),
                    },
                )
                .implements("Address"),
            )
            .unwrap();

        let office = registry
            .instantiate("OfficeAddress", serde_json::json!({"city": "Oslo"}))
            .unwrap();

        let e = entry("home", TypeDesc::named("Address"));
        let out = validate_entry(&registry, "User", &e, Value::Container(office))
            .unwrap()
            .unwrap();
        assert_eq!(out.as_container().unwrap().type_name(), "OfficeAddress");
    }
}
