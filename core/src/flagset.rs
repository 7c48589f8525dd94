//! Primitive flag storage for one invocation level.
//!
//! A [`FlagSet`] holds one typed value per defined name (aliases of one
//! logical flag are separate entries) and remembers which names were set
//! explicitly, in the order they were set. The argv tokenizer in
//! [`FlagSet::parse`] follows the conventional single-dash/double-dash rules
//! and stops at the first positional argument, leaving the rest in
//! [`FlagSet::args`].

use std::collections::HashMap;

use tracing::trace;

use crate::error::FlagError;
use crate::value::{FlagValue, ValueKind};

#[derive(Debug, Clone)]
struct FlagEntry {
    name: String,
    value: FlagValue,
    /// Set once any explicit value replaced the default; slices append after.
    touched: bool,
}

/// Named, typed flag values with explicit-set tracking.
///
/// # Examples
///
/// ```
/// use flagscope_core::{FlagSet, FlagValue, ValueKind};
///
/// let mut set = FlagSet::new("serve");
/// set.define("port", ValueKind::Int, Some("8080")).unwrap();
/// set.define("verbose", ValueKind::Bool, None).unwrap();
///
/// set.parse(["--port=9000", "-verbose", "extra"]).unwrap();
///
/// assert_eq!(set.raw_value("port").unwrap(), &FlagValue::Int(9000));
/// assert!(set.is_set_explicitly("verbose"));
/// assert_eq!(set.explicitly_set_names(), ["port", "verbose"]);
/// assert_eq!(set.args(), ["extra"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FlagSet {
    name: String,
    flags: Vec<FlagEntry>,
    index: HashMap<String, usize>,
    visited: Vec<String>,
    args: Vec<String>,
}

impl FlagSet {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Defines `name` with its kind's zero value, or `default` when given.
    ///
    /// # Errors
    ///
    /// [`FlagError::AlreadyDefined`] if the name exists, or
    /// [`FlagError::InvalidDefault`] if `default` does not parse.
    pub fn define(
        &mut self,
        name: &str,
        kind: ValueKind,
        default: Option<&str>,
    ) -> Result<(), FlagError> {
        if self.index.contains_key(name) {
            return Err(FlagError::AlreadyDefined(name.to_string()));
        }
        let value = match default {
            Some(raw) => FlagValue::parse(kind, raw).map_err(|err| FlagError::InvalidDefault {
                name: name.to_string(),
                value: raw.to_string(),
                reason: err.to_string(),
            })?,
            None => FlagValue::zero(kind),
        };
        self.index.insert(name.to_string(), self.flags.len());
        self.flags.push(FlagEntry {
            name: name.to_string(),
            value,
            touched: false,
        });
        Ok(())
    }

    /// Returns `true` if `name` is defined, whether or not it was set.
    pub fn is_defined(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Current value of `name`, if defined.
    pub fn lookup(&self, name: &str) -> Option<&FlagValue> {
        self.entry(name).map(|entry| &entry.value)
    }

    /// Current value of `name`.
    ///
    /// # Errors
    ///
    /// [`FlagError::NotFound`] if the name is not defined here.
    pub fn raw_value(&self, name: &str) -> Result<&FlagValue, FlagError> {
        self.lookup(name)
            .ok_or_else(|| FlagError::NotFound(name.to_string()))
    }

    /// Returns `true` only if `name` was set explicitly, not merely defaulted.
    pub fn is_set_explicitly(&self, name: &str) -> bool {
        self.visited.iter().any(|n| n == name)
    }

    /// Names set explicitly, in the order they were first set.
    pub fn explicitly_set_names(&self) -> &[String] {
        &self.visited
    }

    /// Number of names set explicitly.
    pub fn num_set(&self) -> usize {
        self.visited.len()
    }

    /// Defined names in definition order.
    pub fn defined_names(&self) -> impl Iterator<Item = &str> {
        self.flags.iter().map(|entry| entry.name.as_str())
    }

    /// Positional arguments left over after [`parse`](Self::parse).
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Re-parses `raw` into `name` and records the name as explicitly set.
    ///
    /// The first explicit set of a slice flag replaces its default; later
    /// sets append.
    ///
    /// # Errors
    ///
    /// [`FlagError::NotFound`] for an undefined name, or
    /// [`FlagError::InvalidValue`] if the kind rejects `raw`.
    pub fn set(&mut self, name: &str, raw: &str) -> Result<(), FlagError> {
        let entry = self.entry_mut(name)?;
        let append = entry.touched;
        entry
            .value
            .set(raw, append)
            .map_err(|err| invalid_value(name, raw, err.to_string()))?;
        entry.touched = true;
        if !self.is_set_explicitly(name) {
            self.visited.push(name.to_string());
        }
        Ok(())
    }

    /// Replaces the value of `name` without recording it as explicitly set.
    ///
    /// Used for values from sources other than the command line, such as
    /// environment variables. A later [`set`](Self::set) still replaces a
    /// stored slice instead of appending to it.
    pub fn store(&mut self, name: &str, raw: &str) -> Result<(), FlagError> {
        let entry = self.entry_mut(name)?;
        entry
            .value
            .set(raw, false)
            .map_err(|err| invalid_value(name, raw, err.to_string()))
    }

    /// Parses argv tokens into this set.
    ///
    /// Accepts `-name`, `--name`, `-name=value`, `--name value`; boolean
    /// flags only take a value through `=`. Parsing stops at `--` or the first
    /// token that is not a flag; everything after is kept as positional
    /// arguments.
    ///
    /// # Errors
    ///
    /// [`FlagError::NotFound`] for an undefined flag, [`FlagError::MissingValue`]
    /// when a value is absent, [`FlagError::BadSyntax`] for malformed tokens and
    /// [`FlagError::InvalidValue`] when a value does not parse.
    pub fn parse<I, S>(&mut self, argv: I) -> Result<(), FlagError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tokens = argv.into_iter().map(|s| s.as_ref().to_string());
        while let Some(token) = tokens.next() {
            if token == "--" {
                break;
            }
            if token.len() < 2 || !token.starts_with('-') {
                self.args.push(token);
                break;
            }

            let stripped = token
                .strip_prefix("--")
                .or_else(|| token.strip_prefix('-'))
                .unwrap_or(&token);
            if stripped.is_empty() || stripped.starts_with('-') || stripped.starts_with('=') {
                return Err(FlagError::BadSyntax(token.clone()));
            }
            let (name, inline) = match stripped.split_once('=') {
                Some((name, value)) => (name, Some(value.to_string())),
                None => (stripped, None),
            };

            let kind = self
                .lookup(name)
                .map(FlagValue::kind)
                .ok_or_else(|| FlagError::NotFound(name.to_string()))?;
            let value = match inline {
                Some(value) => value,
                None if kind.is_bool() => "true".to_string(),
                None => tokens
                    .next()
                    .ok_or_else(|| FlagError::MissingValue(name.to_string()))?,
            };

            trace!(flag_set = %self.name, flag = name, value = %value, "Parsed flag");
            self.set(name, &value)?;
        }
        self.args.extend(tokens);
        Ok(())
    }

    fn entry(&self, name: &str) -> Option<&FlagEntry> {
        self.index.get(name).map(|&i| &self.flags[i])
    }

    fn entry_mut(&mut self, name: &str) -> Result<&mut FlagEntry, FlagError> {
        match self.index.get(name) {
            Some(&i) => Ok(&mut self.flags[i]),
            None => Err(FlagError::NotFound(name.to_string())),
        }
    }
}

fn invalid_value(name: &str, raw: &str, reason: String) -> FlagError {
    FlagError::InvalidValue {
        name: name.to_string(),
        value: raw.to_string(),
        reason,
    }
}
