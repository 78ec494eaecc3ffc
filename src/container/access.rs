//! Accessor guard and lazy getter resolution
//!
//! Every read and write goes through one of two surfaces:
//!
//! - the **external** surface ([`Container::get`], [`Container::set`],
//!   [`Container::call`]), which enforces each setting's gettable/settable
//!   flags, and
//! - the **privileged** surface (construction, plus the [`Internal`] token),
//!   which bypasses the flags but never the type validation.
//!
//! Privilege is an explicit capability rather than anything inferred about
//! the caller: whoever holds an `Internal` token is internal.

use log::debug;
use std::rc::Rc;

use crate::container::Container;
use crate::error::{Error, Result};
use crate::schema::{SchemaEntry, TypeDesc};
use crate::validate::{check_type, validate_entry};
use crate::value::{Callback, Value};

impl Container {
    /// Read a setting externally, honoring its gettable flag.
    ///
    /// Resolution order: stored value, cached lazy result, lazy resolution
    /// through a declared `<name>_getter` callback (cached permanently),
    /// declared default. An undeclared name - or a declared one that is
    /// unset with no default - fails with an `InvalidArgument`-kind error.
    pub fn get(&self, name: &str) -> Result<Value> {
        self.read(name, false)
    }

    /// Write a setting externally, honoring its settable flag.
    ///
    /// The value is validated before anything is stored; a failed write
    /// leaves the previous value untouched. `Null` is accepted as a no-op.
    /// Writes to undeclared names are silently dropped.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        self.write(name, value.into(), false)
    }

    /// Invoke a callback setting with explicit arguments.
    ///
    /// `name` may be the callback setting itself or the derived name of a
    /// `<name>_getter` entry. Unlike plain reads, explicit invocation never
    /// caches the result and always re-invokes the callback.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value> {
        self.invoke(name, args, false)
    }

    pub(crate) fn read(&self, name: &str, privileged: bool) -> Result<Value> {
        let ty = Rc::clone(self.type_def());

        // Stored value
        if let Some(value) = self.stored().get(name) {
            if let Some(entry) = ty.schema().get(name) {
                self.check_gettable(entry, privileged)?;
            }
            return Ok(value.clone());
        }

        // Previously resolved lazy result
        let cached = self.lazy_cache().borrow().get(name).cloned();
        if let Some(value) = cached {
            if let Some(getter) = ty.schema().getter_for(name) {
                self.check_gettable(getter, privileged)?;
            }
            return Ok(value);
        }

        // Lazy resolution through a declared getter; the zero-argument form
        // caches its result for the lifetime of the instance.
        if let Some(getter) = ty.schema().getter_for(name) {
            self.check_gettable(getter, privileged)?;
            let result = self.resolve_getter(getter, &[])?;
            if !result.is_null() {
                debug!(
                    "Cached lazy setting '{}' of '{}'",
                    name,
                    self.type_name()
                );
                self.lazy_cache()
                    .borrow_mut()
                    .insert(name.to_string(), result.clone());
            }
            return Ok(result);
        }

        // Declared but unset: fall back to the default if one exists.
        // Registration only shallow-checks defaults, so the full validation
        // (including mapping-to-container conversion for named types) runs
        // here.
        if let Some(entry) = ty.schema().get(name) {
            self.check_gettable(entry, privileged)?;
            if let Some(default) = entry.default() {
                let validated = validate_entry(self.registry(), ty.name(), entry, default.clone())?;
                return Ok(validated.unwrap_or(Value::Null));
            }
        }

        Err(Error::NoSuchSetting {
            type_name: self.type_name().to_string(),
            setting: name.to_string(),
        })
    }

    pub(crate) fn write(&mut self, name: &str, value: Value, privileged: bool) -> Result<()> {
        let ty = Rc::clone(self.type_def());

        let Some(entry) = ty.schema().get(name) else {
            // Forward-compatible payloads: unknown keys are dropped, the one
            // designed-in silent recovery.
            debug!(
                "Ignoring unknown setting '{}' for '{}'",
                name,
                self.type_name()
            );
            return Ok(());
        };

        if !privileged && !entry.is_settable() {
            return Err(Error::NotSettable {
                type_name: self.type_name().to_string(),
                setting: name.to_string(),
            });
        }

        let registry = self.registry().clone();
        match validate_entry(&registry, ty.name(), entry, value)? {
            // Null: accepted, nothing stored, nothing removed
            None => Ok(()),
            Some(validated) => {
                self.stored_mut().insert(name.to_string(), validated);
                // A name lives in at most one of stored values / lazy cache
                self.lazy_cache().borrow_mut().shift_remove(name);
                Ok(())
            }
        }
    }

    pub(crate) fn invoke(&self, name: &str, args: &[Value], privileged: bool) -> Result<Value> {
        let ty = Rc::clone(self.type_def());

        // A derived name may also be a declared plain setting; the explicit
        // call surface targets the callback, so a `<name>_getter` entry wins
        // over a non-callback direct entry of the same name.
        let direct = ty.schema().get(name);
        let entry = match direct {
            Some(entry) if entry.ty().is_callback() => entry,
            _ => match ty.schema().getter_for(name) {
                Some(getter) => getter,
                None => direct.ok_or_else(|| Error::NoSuchSetting {
                    type_name: self.type_name().to_string(),
                    setting: name.to_string(),
                })?,
            },
        };

        self.check_gettable(entry, privileged)?;

        if !entry.ty().is_callback() {
            return Err(Error::NotCallable {
                type_name: self.type_name().to_string(),
                setting: entry.name().to_string(),
            });
        }

        self.resolve_getter(entry, args)
    }

    fn check_gettable(&self, entry: &SchemaEntry, privileged: bool) -> Result<()> {
        if privileged || entry.is_gettable() {
            Ok(())
        } else {
            Err(Error::NotGettable {
                type_name: self.type_name().to_string(),
                setting: entry.name().to_string(),
            })
        }
    }

    /// Resolve a callback entry against its stored callback.
    ///
    /// An absent callback yields `Null` for optional entries; required
    /// entries always hold one after construction, so an absence there is a
    /// `BadMethodCall`.
    pub(crate) fn resolve_getter(&self, entry: &SchemaEntry, args: &[Value]) -> Result<Value> {
        let callback = match self.stored().get(entry.name()) {
            Some(Value::Callback(callback)) => callback.clone(),
            Some(_) => {
                return Err(Error::NotCallable {
                    type_name: self.type_name().to_string(),
                    setting: entry.name().to_string(),
                });
            }
            None => {
                if entry.is_required() {
                    return Err(Error::MissingCallback {
                        type_name: self.type_name().to_string(),
                        accessor: entry.derived_name().unwrap_or(entry.name()).to_string(),
                        setting: entry.name().to_string(),
                    });
                }
                return Ok(Value::Null);
            }
        };

        self.invoke_checked(entry, &callback, args)
    }

    /// Invoke a callback and enforce the entry's declared return type.
    pub(crate) fn invoke_checked(
        &self,
        entry: &SchemaEntry,
        callback: &Callback,
        args: &[Value],
    ) -> Result<Value> {
        let result = callback.invoke(args);

        let TypeDesc::Callback(Some(returns)) = entry.ty() else {
            return Ok(result);
        };

        if result.is_null() {
            // An optional getter may always yield null; a required one with
            // a declared return type may not.
            if entry.is_required() {
                return Err(Error::CallbackReturnMismatch {
                    type_name: self.type_name().to_string(),
                    setting: entry.name().to_string(),
                    expected: returns.to_string(),
                    actual: "null".to_string(),
                });
            }
            return Ok(Value::Null);
        }

        check_type(
            self.registry(),
            self.type_name(),
            entry.name(),
            entry.is_required(),
            returns,
            result,
        )
        .map_err(|err| match err {
            Error::TypeMismatch {
                type_name,
                setting,
                expected,
                actual,
                ..
            } => Error::CallbackReturnMismatch {
                type_name,
                setting,
                expected,
                actual,
            },
            other => other,
        })
    }
}

// =============================================================================
// Privilege token
// =============================================================================

/// Privileged access handle for the owning type's own code.
///
/// Obtained through [`Container::internal`]; bypasses the gettable/settable
/// flags exactly like construction does. Type validation still applies to
/// every write, and unknown keys are still silently dropped.
pub struct Internal<'a> {
    container: &'a mut Container,
}

impl<'a> Internal<'a> {
    pub(crate) fn new(container: &'a mut Container) -> Self {
        Self { container }
    }

    /// Privileged read; ignores the gettable flag.
    pub fn get(&self, name: &str) -> Result<Value> {
        self.container.read(name, true)
    }

    /// Privileged write; ignores the settable flag, still validates.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        self.container.write(name, value.into(), true)
    }

    /// Privileged callback invocation; never caches.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value> {
        self.container.invoke(name, args, true)
    }
}
