//! Error types for flag storage, context resolution and definition loading.
//!
//! Flag storage failures ([`FlagError`]) are wrapped by [`ContextError`] so
//! that a whole invocation level can be built with a single `?` chain.

use thiserror::Error;

/// A raw string rejected by a [`ValueKind`](crate::ValueKind).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValueError(pub String);

/// Errors raised by the primitive flag storage ([`FlagSet`](crate::FlagSet)).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlagError {
    /// The name is not defined in this flag set.
    #[error("flag provided but not defined: {0}")]
    NotFound(String),

    /// A flag with this name was already defined in this flag set.
    #[error("flag redefined: {0}")]
    AlreadyDefined(String),

    /// The raw string was rejected by the flag's value kind.
    #[error("invalid value {value:?} for flag {name}: {reason}")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },

    /// The declared default does not parse as the flag's value kind.
    #[error("invalid default {value:?} for flag {name}: {reason}")]
    InvalidDefault {
        name: String,
        value: String,
        reason: String,
    },

    /// A non-boolean flag appeared last on the command line without a value.
    #[error("flag needs an argument: {0}")]
    MissingValue(String),

    /// A token looked like a flag but had no usable name (e.g. `---x`, `-=v`).
    #[error("bad flag syntax: {0}")]
    BadSyntax(String),
}

/// Errors raised while resolving flags across a context lineage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    /// No descriptor or flag set recognizes the name.
    #[error("unknown flag: {0}")]
    UnknownFlag(String),

    /// Two aliases of the same logical flag were given on the command line.
    #[error("Cannot use two forms of the same flag: {second} {first}")]
    ConflictingAliases { first: String, second: String },

    /// One or more required flags were never set under any alias.
    #[error(transparent)]
    MissingRequiredFlags(#[from] MissingFlags),

    /// Storage-level failure (re-parse during alias propagation, argv parsing).
    #[error(transparent)]
    Flag(#[from] FlagError),
}

/// Convenience alias for results with [`ContextError`].
pub type Result<T> = std::result::Result<T, ContextError>;

/// The full list of required flags missing from an invocation level.
///
/// # Examples
///
/// ```
/// use flagscope_core::MissingFlags;
///
/// let one = MissingFlags::new(vec!["output".into()]);
/// assert_eq!(one.to_string(), r#"Required flag "output" not set"#);
///
/// let two = MissingFlags::new(vec!["f".into(), "group".into()]);
/// assert_eq!(two.to_string(), r#"Required flags "f, group" not set"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Error)]
#[error("{}", missing_message(.0))]
pub struct MissingFlags(Vec<String>);

impl MissingFlags {
    pub fn new(names: Vec<String>) -> Self {
        Self(names)
    }

    /// Missing flag names in declaration-scan order.
    pub fn names(&self) -> &[String] {
        &self.0
    }
}

fn missing_message(names: &[String]) -> String {
    match names {
        [single] => format!("Required flag {single:?} not set"),
        names => format!("Required flags {:?} not set", names.join(", ")),
    }
}

/// Errors raised while loading or saving definition files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The file extension does not name a supported format.
    #[error("unsupported definition format: {0}")]
    UnsupportedFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_flags_message_wording() {
        let single = MissingFlags::new(vec!["output".to_string()]);
        assert_eq!(single.to_string(), "Required flag \"output\" not set");

        let many = MissingFlags::new(vec!["f".to_string(), "group".to_string()]);
        assert_eq!(many.to_string(), "Required flags \"f, group\" not set");
    }

    #[test]
    fn test_context_error_wraps_missing_flags_transparently() {
        let err = ContextError::from(MissingFlags::new(vec!["token".to_string()]));
        assert_eq!(err.to_string(), "Required flag \"token\" not set");
    }

    #[test]
    fn test_conflicting_aliases_message_names_both_forms() {
        let err = ContextError::ConflictingAliases {
            first: "v".to_string(),
            second: "value".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot use two forms of the same flag: value v"
        );
    }
}
