//! Error types for the propbox library

use thiserror::Error;

/// Result type alias for propbox operations
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification of a failure.
///
/// Every [`Error`] variant belongs to exactly one kind; callers that only care
/// about the class of failure (schema author bug vs. caller bug vs. export
/// problem) can branch on [`Error::kind`] instead of individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The schema or registry itself is broken - a programming error in the
    /// type author's declaration, never recoverable at runtime.
    Misconfigured,
    /// Caller-supplied data or a caller-attempted access violates the schema.
    InvalidArgument,
    /// A derived accessor was invoked but its backing callback is missing,
    /// not callable, or returned the wrong type.
    BadMethodCall,
    /// An exportable value's shape is unsupported for structural flattening.
    Runtime,
}

/// Main error type for the propbox library
#[derive(Error, Debug)]
pub enum Error {
    // -------------------------------------------------------------------------
    // Schema / Registry Errors (Misconfigured)
    // -------------------------------------------------------------------------
    #[error("Schema for '{type_name}' declares setting '{setting}' more than once")]
    DuplicateSetting { type_name: String, setting: String },

    #[error("Schema for '{type_name}' is invalid at '{setting}': {reason}")]
    InvalidSchema {
        type_name: String,
        setting: String,
        reason: String,
    },

    #[error("Type '{0}' is already registered")]
    TypeAlreadyRegistered(String),

    // -------------------------------------------------------------------------
    // Construction / Access Errors (InvalidArgument)
    // -------------------------------------------------------------------------
    #[error("Type '{0}' is not registered")]
    UnknownType(String),

    #[error("'{type_name}' must be constructed from a mapping, got {actual}")]
    NotAMapping { type_name: String, actual: String },

    #[error("Missing required setting '{setting}' ({expected}) for '{type_name}'")]
    MissingRequired {
        type_name: String,
        setting: String,
        expected: String,
    },

    #[error(
        "Invalid value for {} setting '{setting}' of '{type_name}': expected {expected}, got {actual}",
        requiredness(.required)
    )]
    TypeMismatch {
        type_name: String,
        setting: String,
        required: bool,
        expected: String,
        actual: String,
    },

    #[error("Setting '{setting}' of '{type_name}' is not gettable")]
    NotGettable { type_name: String, setting: String },

    #[error("Setting '{setting}' of '{type_name}' is not settable")]
    NotSettable { type_name: String, setting: String },

    #[error("'{type_name}' has no setting '{setting}'")]
    NoSuchSetting { type_name: String, setting: String },

    // -------------------------------------------------------------------------
    // Derived Accessor Errors (BadMethodCall)
    // -------------------------------------------------------------------------
    #[error("Accessor '{accessor}' of '{type_name}' has no stored callback in '{setting}'")]
    MissingCallback {
        type_name: String,
        accessor: String,
        setting: String,
    },

    #[error("Setting '{setting}' of '{type_name}' is not callable")]
    NotCallable { type_name: String, setting: String },

    #[error("Callback for '{setting}' of '{type_name}' returned {actual}, expected {expected}")]
    CallbackReturnMismatch {
        type_name: String,
        setting: String,
        expected: String,
        actual: String,
    },

    // -------------------------------------------------------------------------
    // Export Errors (Runtime)
    // -------------------------------------------------------------------------
    #[error("Cannot export {actual} value reached through setting '{setting}' of '{type_name}'")]
    UnsupportedExport {
        type_name: String,
        setting: String,
        actual: String,
    },
}

impl Error {
    /// Classify this error into its failure kind.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::DuplicateSetting { .. }
            | Error::InvalidSchema { .. }
            | Error::TypeAlreadyRegistered(_) => ErrorKind::Misconfigured,

            Error::UnknownType(_)
            | Error::NotAMapping { .. }
            | Error::MissingRequired { .. }
            | Error::TypeMismatch { .. }
            | Error::NotGettable { .. }
            | Error::NotSettable { .. }
            | Error::NoSuchSetting { .. } => ErrorKind::InvalidArgument,

            Error::MissingCallback { .. }
            | Error::NotCallable { .. }
            | Error::CallbackReturnMismatch { .. } => ErrorKind::BadMethodCall,

            Error::UnsupportedExport { .. } => ErrorKind::Runtime,
        }
    }

    /// Check if this is a schema-author error (broken declaration)
    #[must_use]
    pub fn is_misconfigured(&self) -> bool {
        self.kind() == ErrorKind::Misconfigured
    }

    /// Check if this is a caller error (bad data or forbidden access)
    #[must_use]
    pub fn is_invalid_argument(&self) -> bool {
        self.kind() == ErrorKind::InvalidArgument
    }

    /// Check if this is a derived-accessor error
    #[must_use]
    pub fn is_bad_method_call(&self) -> bool {
        self.kind() == ErrorKind::BadMethodCall
    }
}

fn requiredness(required: &bool) -> &'static str {
    if *required { "required" } else { "optional" }
}
