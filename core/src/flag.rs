//! Flag descriptors: declared metadata for one logical flag.
//!
//! A descriptor lists every alias of a flag, its value kind and default, and
//! whether the flag is required. Descriptors are applied to a [`FlagSet`]
//! to define one storage entry per alias; applying also consults the
//! descriptor's environment variables, which is how a flag can count as set
//! without appearing on the command line.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::FlagError;
use crate::flagset::FlagSet;
use crate::value::ValueKind;

/// Environment lookup used when applying descriptors.
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Reads variables from the process environment.
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Declared metadata for one logical flag.
///
/// # Examples
///
/// ```
/// use flagscope_core::{FlagDescriptor, ValueKind};
///
/// let output = FlagDescriptor::new(ValueKind::String, &["o", "output"])
///     .required()
///     .with_usage("Write results to FILE");
///
/// assert_eq!(output.canonical_name(), "output");
/// assert!(output.matches("o"));
/// assert!(output.is_required());
/// assert!(!output.is_set());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagDescriptor {
    /// Aliases in declaration order (e.g. `["o", "output"]`).
    pub names: Vec<String>,
    /// Kind of value every alias stores.
    #[serde(default)]
    pub kind: ValueKind,
    /// Default value in command-line syntax.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Must be set under some alias before the command runs.
    #[serde(default)]
    pub required: bool,
    /// Help text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
    /// Environment variables consulted, in order, when the flag is applied.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env_vars: Vec<String>,
    #[serde(skip)]
    has_been_set: bool,
}

impl FlagDescriptor {
    pub fn new(kind: ValueKind, names: &[&str]) -> Self {
        Self {
            names: names.iter().map(|n| n.to_string()).collect(),
            kind,
            default: None,
            required: false,
            usage: None,
            env_vars: Vec::new(),
            has_been_set: false,
        }
    }

    /// Marks the flag as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, default: &str) -> Self {
        self.default = Some(default.to_string());
        self
    }

    pub fn with_usage(mut self, usage: &str) -> Self {
        self.usage = Some(usage.to_string());
        self
    }

    /// Adds an environment variable source.
    pub fn with_env(mut self, var: &str) -> Self {
        self.env_vars.push(var.to_string());
        self
    }

    /// Aliases with surrounding whitespace removed.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|n| n.trim())
    }

    /// Returns `true` if `name` is one of this flag's aliases.
    pub fn matches(&self, name: &str) -> bool {
        self.names().any(|n| n == name)
    }

    /// Display name: the longest alias, the earliest one on ties.
    pub fn canonical_name(&self) -> &str {
        self.names()
            .fold("", |best, name| if name.len() > best.len() { name } else { best })
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Returns `true` if a source other than the command line supplied a
    /// value when the flag was applied.
    pub fn is_set(&self) -> bool {
        self.has_been_set
    }

    /// Records that a non command-line source supplied this flag.
    pub fn mark_set(&mut self) {
        self.has_been_set = true;
    }

    /// Defines every alias in `set` and applies the first non-empty
    /// environment variable to all of them.
    ///
    /// Environment values are stored quietly: they do not count as explicitly
    /// set in `set`, but they flip [`is_set`](Self::is_set).
    ///
    /// # Errors
    ///
    /// Propagates [`FlagError::AlreadyDefined`], [`FlagError::InvalidDefault`]
    /// and [`FlagError::InvalidValue`] (for a malformed environment value).
    pub fn apply(&mut self, set: &mut FlagSet, env: EnvLookup<'_>) -> Result<(), FlagError> {
        for name in self.names() {
            set.define(name, self.kind, self.default.as_deref())?;
        }

        let sourced = self
            .env_vars
            .iter()
            .find_map(|var| env(var.as_str()).filter(|v| !v.is_empty()).map(|v| (var, v)));
        if let Some((var, value)) = sourced {
            for name in self.names() {
                set.store(name, &value)?;
            }
            debug!(flag = self.canonical_name(), env = %var, "Flag value sourced from environment");
            self.mark_set();
        }
        Ok(())
    }
}

/// Builds a fresh [`FlagSet`] named `name` from `flags`.
pub fn build_flag_set(
    name: &str,
    flags: &mut [FlagDescriptor],
    env: EnvLookup<'_>,
) -> Result<FlagSet, FlagError> {
    let mut set = FlagSet::new(name);
    for flag in flags.iter_mut() {
        flag.apply(&mut set, env)?;
    }
    Ok(set)
}
