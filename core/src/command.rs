//! Command and application definitions.
//!
//! These are the descriptors the lineage resolver reads: each [`Command`]
//! carries its own ordered flag list and nested subcommands, and the root
//! [`App`] carries the application-wide flags that every level falls back
//! to. Both deserialize from definition files (see [`config`](crate::config)).

use serde::{Deserialize, Serialize};

use crate::flag::FlagDescriptor;

/// One (sub)command of an application.
///
/// # Examples
///
/// ```
/// use flagscope_core::{Command, FlagDescriptor, ValueKind};
///
/// let remote = Command::new("remote")
///     .with_flag(FlagDescriptor::new(ValueKind::Bool, &["v", "verbose"]))
///     .with_subcommand(Command::new("add").with_alias("a"));
///
/// assert!(remote.find_flag("verbose").is_some());
/// assert_eq!(remote.find_subcommand("a").unwrap().name, "add");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
    /// Flags in declaration order.
    #[serde(default)]
    pub flags: Vec<FlagDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcommands: Vec<Command>,
}

impl Command {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    pub fn with_usage(mut self, usage: &str) -> Self {
        self.usage = Some(usage.to_string());
        self
    }

    pub fn with_flag(mut self, flag: FlagDescriptor) -> Self {
        self.flags.push(flag);
        self
    }

    pub fn with_subcommand(mut self, sub: Command) -> Self {
        self.subcommands.push(sub);
        self
    }

    /// Returns `true` if `name` is this command's name or one of its aliases.
    pub fn has_name(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|a| a == name)
    }

    /// Finds a subcommand by name or alias.
    pub fn find_subcommand(&self, name: &str) -> Option<&Command> {
        self.subcommands.iter().find(|s| s.has_name(name))
    }

    /// Finds the flag declaring `name` among its aliases.
    pub fn find_flag(&self, name: &str) -> Option<&FlagDescriptor> {
        self.flags.iter().find(|f| f.matches(name))
    }
}

/// Root application definition.
///
/// # Examples
///
/// ```
/// use flagscope_core::{App, Command, FlagDescriptor, ValueKind};
///
/// let app = App::new("tool")
///     .with_flag(FlagDescriptor::new(ValueKind::String, &["c", "config"]))
///     .with_command(Command::new("run"));
///
/// assert!(app.find_flag("c").is_some());
/// assert!(app.find_command("run").is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct App {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
    /// Application-wide flags, consulted after every command in a lineage.
    #[serde(default)]
    pub flags: Vec<FlagDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<Command>,
}

impl App {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    pub fn with_flag(mut self, flag: FlagDescriptor) -> Self {
        self.flags.push(flag);
        self
    }

    pub fn with_command(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }

    /// Finds a top-level command by name or alias.
    pub fn find_command(&self, name: &str) -> Option<&Command> {
        self.commands.iter().find(|c| c.has_name(name))
    }

    /// Finds the application flag declaring `name` among its aliases.
    pub fn find_flag(&self, name: &str) -> Option<&FlagDescriptor> {
        self.flags.iter().find(|f| f.matches(name))
    }
}
