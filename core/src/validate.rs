//! Definition validation.
//!
//! Validates the structural invariants of application and command
//! definitions before they are used to build contexts: every flag has at
//! least one usable alias, aliases are distinct within a flag and unique
//! across the flags of one scope, defaults parse as the declared kind, and
//! subcommand names do not collide.
//!
//! # Examples
//!
//! ```
//! use flagscope_core::*;
//!
//! let app = App::new("tool").with_flag(FlagDescriptor::new(ValueKind::Bool, &["v", "verbose"]));
//! assert!(validate_app(&app).is_empty());
//!
//! // Invalid: two flags of one scope share an alias
//! let bad = App::new("tool")
//!     .with_flag(FlagDescriptor::new(ValueKind::Bool, &["v", "verbose"]))
//!     .with_flag(FlagDescriptor::new(ValueKind::String, &["v", "version"]));
//! assert_eq!(validate_app(&bad), vec![ValidationError::DuplicateFlag("v".to_string())]);
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::command::{App, Command};
use crate::flag::FlagDescriptor;
use crate::value::FlagValue;

/// Definition validation errors.
///
/// Each variant describes a specific structural problem found during
/// validation. The `Display` impl provides a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Application name is empty or whitespace-only.
    #[error("application name cannot be empty")]
    EmptyAppName,
    /// Command name is empty or whitespace-only.
    #[error("command name cannot be empty")]
    EmptyCommandName,
    /// A flag declares no aliases at all.
    #[error("flag must declare at least one name")]
    MissingFlagName,
    /// An alias cannot be typed on a command line (empty, leading dash,
    /// embedded `=` or whitespace).
    #[error("invalid flag name: {0:?}")]
    InvalidFlagName(String),
    /// One flag lists the same alias twice.
    #[error("duplicate alias within flag: {0}")]
    DuplicateAlias(String),
    /// Two flags in the same scope share an alias.
    #[error("duplicate flag in scope: {0}")]
    DuplicateFlag(String),
    /// Two subcommands in the same scope share a name or alias.
    #[error("duplicate subcommand in scope: {0}")]
    DuplicateSubcommand(String),
    /// A default value does not parse as the flag's kind.
    #[error("invalid default for flag {flag}: {reason}")]
    InvalidDefault { flag: String, reason: String },
}

/// Validates an application definition and all of its commands.
pub fn validate_app(app: &App) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if app.name.trim().is_empty() {
        errors.push(ValidationError::EmptyAppName);
        return errors;
    }

    errors.extend(validate_flags(&app.flags));
    if !errors.is_empty() {
        return errors;
    }

    errors.extend(validate_commands(&app.commands));
    errors
}

/// Validates a command definition and its nested subcommands.
///
/// # Examples
///
/// ```
/// use flagscope_core::*;
///
/// let cmd = Command::new("remote")
///     .with_subcommand(Command::new("add"))
///     .with_subcommand(Command::new("rm").with_alias("add"));
/// assert_eq!(
///     validate_command(&cmd),
///     vec![ValidationError::DuplicateSubcommand("add".to_string())]
/// );
/// ```
pub fn validate_command(command: &Command) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if command.name.trim().is_empty() {
        errors.push(ValidationError::EmptyCommandName);
        return errors;
    }

    errors.extend(validate_flags(&command.flags));
    if !errors.is_empty() {
        return errors;
    }

    errors.extend(validate_commands(&command.subcommands));
    errors
}

fn validate_commands(commands: &[Command]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for command in commands {
        for name in std::iter::once(&command.name).chain(&command.aliases) {
            let name = name.trim();
            if !name.is_empty() && !seen.insert(name) {
                errors.push(ValidationError::DuplicateSubcommand(name.to_string()));
                return errors;
            }
        }

        errors.extend(validate_command(command));
        if !errors.is_empty() {
            return errors;
        }
    }

    errors
}

fn validate_flags(flags: &[FlagDescriptor]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for flag in flags {
        if flag.names.is_empty() {
            errors.push(ValidationError::MissingFlagName);
            return errors;
        }

        let mut own = HashSet::new();
        for name in flag.names() {
            if !is_valid_flag_name(name) {
                errors.push(ValidationError::InvalidFlagName(name.to_string()));
                return errors;
            }
            if !own.insert(name) {
                errors.push(ValidationError::DuplicateAlias(name.to_string()));
                return errors;
            }
            if !seen.insert(name) {
                errors.push(ValidationError::DuplicateFlag(name.to_string()));
                return errors;
            }
        }

        if let Some(default) = &flag.default {
            if let Err(err) = FlagValue::parse(flag.kind, default) {
                errors.push(ValidationError::InvalidDefault {
                    flag: flag.canonical_name().to_string(),
                    reason: err.to_string(),
                });
                return errors;
            }
        }
    }

    errors
}

fn is_valid_flag_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('-')
        && !name.contains('=')
        && !name.chars().any(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use crate::value::ValueKind;

    use super::*;

    #[test]
    fn test_validate_app_rejects_empty_name() {
        assert_eq!(
            validate_app(&App::new("  ")),
            vec![ValidationError::EmptyAppName]
        );
    }

    #[test]
    fn test_validate_flags_rejects_duplicate_alias_within_flag() {
        let app = App::new("tool")
            .with_flag(FlagDescriptor::new(ValueKind::Int, &["n", "count", " n "]));
        assert_eq!(
            validate_app(&app),
            vec![ValidationError::DuplicateAlias("n".to_string())]
        );
    }

    #[test]
    fn test_validate_flags_rejects_untypeable_names() {
        for bad in ["--verbose", "a=b", "two words", ""] {
            let app = App::new("tool").with_flag(FlagDescriptor::new(ValueKind::Bool, &[bad]));
            assert_eq!(
                validate_app(&app),
                vec![ValidationError::InvalidFlagName(bad.trim().to_string())]
            );
        }
    }

    #[test]
    fn test_validate_flags_rejects_missing_names() {
        let mut flag = FlagDescriptor::new(ValueKind::Bool, &["x"]);
        flag.names.clear();
        let app = App::new("tool").with_flag(flag);
        assert_eq!(validate_app(&app), vec![ValidationError::MissingFlagName]);
    }

    #[test]
    fn test_validate_flags_rejects_bad_default() {
        let app = App::new("tool").with_flag(
            FlagDescriptor::new(ValueKind::Duration, &["t", "timeout"]).with_default("soon"),
        );
        assert!(matches!(
            validate_app(&app).as_slice(),
            [ValidationError::InvalidDefault { flag, .. }] if flag == "timeout"
        ));
    }

    #[test]
    fn test_same_alias_in_different_scopes_is_allowed() {
        let app = App::new("tool")
            .with_flag(FlagDescriptor::new(ValueKind::Bool, &["v", "verbose"]))
            .with_command(
                Command::new("run")
                    .with_flag(FlagDescriptor::new(ValueKind::String, &["v", "version"])),
            );
        assert!(validate_app(&app).is_empty());
    }

    #[test]
    fn test_nested_command_errors_surface() {
        let app = App::new("tool").with_command(
            Command::new("remote").with_subcommand(Command::new("")),
        );
        assert_eq!(validate_app(&app), vec![ValidationError::EmptyCommandName]);
    }
}
