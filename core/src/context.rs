//! Context nodes: one level of the command invocation hierarchy.
//!
//! A [`Context`] owns the [`FlagSet`] parsed for its level and holds a shared
//! back-reference to its parent, so one parent may serve several children
//! (for instance when a level is re-entered for shell completion). Contexts
//! are assembled once per level and read afterwards; nothing here takes a
//! lock, so any concurrent mutation must be serialized by the caller.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use flagscope_core::*;
//!
//! let app = App::new("tool").with_flag(FlagDescriptor::new(ValueKind::Bool, &["d", "debug"]));
//! let serve = Command::new("serve")
//!     .with_flag(FlagDescriptor::new(ValueKind::Int, &["p", "port"]).with_default("80"));
//!
//! let root = Arc::new(Context::for_app(app, ["-d", "serve"], &|_: &str| None).unwrap());
//! let leaf = Context::for_command(Arc::clone(&root), serve, ["--p=8080"], &|_: &str| None).unwrap();
//!
//! assert!(leaf.is_set("debug"));
//! assert!(leaf.is_set("port"));
//! assert_eq!(leaf.int("port"), Some(8080));
//! assert_eq!(leaf.lineage().len(), 2);
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::command::{App, Command};
use crate::error::{ContextError, FlagError, Result};
use crate::flag::{EnvLookup, FlagDescriptor, build_flag_set};
use crate::flagset::FlagSet;
use crate::lineage::{find_descriptor, find_flag_set_owner};
use crate::normalize::normalize_flags;
use crate::required::check_required_flags;
use crate::value::FlagValue;

/// Execution-scoped key/value data carried from parent to child.
pub type Metadata = BTreeMap<String, String>;

/// One node in the invocation hierarchy.
#[derive(Debug, Clone, Default)]
pub struct Context {
    app: Option<Arc<App>>,
    command: Option<Arc<Command>>,
    flag_set: Option<FlagSet>,
    parent: Option<Arc<Context>>,
    shell_complete: bool,
    metadata: Arc<Metadata>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the root context: applies the application flags, parses `argv`
    /// and normalizes aliases.
    ///
    /// # Errors
    ///
    /// [`ContextError::Flag`] for definition or argv problems, and
    /// [`ContextError::ConflictingAliases`] when two forms of one flag are
    /// given.
    pub fn for_app<I, S>(mut app: App, argv: I, env: EnvLookup<'_>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = parse_level(&app.name, &mut app.flags, argv, env)?;
        Ok(Self::new().with_app(Arc::new(app)).with_flag_set(set))
    }

    /// Builds the context for `command` entered under `parent`.
    ///
    /// # Errors
    ///
    /// Same as [`for_app`](Self::for_app).
    pub fn for_command<I, S>(
        parent: Arc<Context>,
        mut command: Command,
        argv: I,
        env: EnvLookup<'_>,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set = parse_level(&command.name, &mut command.flags, argv, env)?;
        Ok(Self::new()
            .with_parent(parent)
            .with_command(Arc::new(command))
            .with_flag_set(set))
    }

    pub fn with_app(mut self, app: Arc<App>) -> Self {
        self.app = Some(app);
        self
    }

    pub fn with_command(mut self, command: Arc<Command>) -> Self {
        self.command = Some(command);
        self
    }

    pub fn with_flag_set(mut self, set: FlagSet) -> Self {
        self.flag_set = Some(set);
        self
    }

    /// Attaches `parent`, copying its shell-completion flag and metadata as
    /// they are at this moment.
    pub fn with_parent(mut self, parent: Arc<Context>) -> Self {
        self.shell_complete = parent.shell_complete;
        self.metadata = Arc::clone(&parent.metadata);
        self.parent = Some(parent);
        self
    }

    pub fn with_shell_complete(mut self, shell_complete: bool) -> Self {
        self.shell_complete = shell_complete;
        self
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        Arc::make_mut(&mut self.metadata).insert(key.to_string(), value.to_string());
        self
    }

    /// The application of this context or of its nearest ancestor.
    pub fn app(&self) -> Option<&App> {
        self.ancestors().find_map(|ctx| ctx.app.as_deref())
    }

    pub fn command(&self) -> Option<&Command> {
        self.command.as_deref()
    }

    pub fn parent(&self) -> Option<&Arc<Context>> {
        self.parent.as_ref()
    }

    pub fn shell_complete(&self) -> bool {
        self.shell_complete
    }

    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    pub fn flag_set(&self) -> Option<&FlagSet> {
        self.flag_set.as_ref()
    }

    /// This level's flag set, created empty on first use.
    pub fn flag_set_mut(&mut self) -> &mut FlagSet {
        let name = self.command.as_ref().map(|c| c.name.clone()).unwrap_or_default();
        self.flag_set.get_or_insert_with(|| FlagSet::new(&name))
    }

    /// Number of flags set explicitly at this level.
    pub fn num_flags(&self) -> usize {
        self.flag_set.as_ref().map_or(0, FlagSet::num_set)
    }

    /// Sets a flag of this level's flag set.
    ///
    /// # Errors
    ///
    /// [`ContextError::UnknownFlag`] if this level does not define `name`,
    /// [`ContextError::Flag`] if the value does not parse.
    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        let set = self
            .flag_set
            .as_mut()
            .ok_or_else(|| ContextError::UnknownFlag(name.to_string()))?;
        set.set(name, value).map_err(|err| match err {
            FlagError::NotFound(name) => ContextError::UnknownFlag(name),
            other => ContextError::Flag(other),
        })
    }

    /// Returns `true` if `name` was set explicitly at any level of the
    /// lineage, or if its descriptor reports a value from another source.
    pub fn is_set(&self, name: &str) -> bool {
        if find_flag_set_owner(name, self).is_none() {
            return false;
        }
        let explicit = self
            .ancestors()
            .filter_map(Context::flag_set)
            .any(|set| set.is_set_explicitly(name));
        explicit || find_descriptor(name, self).is_some_and(FlagDescriptor::is_set)
    }

    /// Names set explicitly at this level.
    pub fn local_flag_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        if let Some(set) = &self.flag_set {
            collect_flag_names(set, &mut names);
        }
        names
    }

    /// Names set explicitly across the lineage, nearest level first.
    /// A name set at several levels appears once per level.
    pub fn flag_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for set in self.ancestors().filter_map(Context::flag_set) {
            collect_flag_names(set, &mut names);
        }
        names
    }

    /// This context followed by its ancestors up to the root.
    pub fn lineage(&self) -> Vec<&Context> {
        self.ancestors().collect()
    }

    pub(crate) fn ancestors(&self) -> impl Iterator<Item = &Context> {
        std::iter::successors(Some(self), |ctx| ctx.parent.as_deref())
    }

    /// Value of `name` in this level's own flag set; ancestors are not
    /// consulted.
    ///
    /// # Errors
    ///
    /// [`ContextError::UnknownFlag`] if this level does not define `name`.
    pub fn value(&self, name: &str) -> Result<&FlagValue> {
        self.flag_set
            .as_ref()
            .and_then(|set| set.lookup(name))
            .ok_or_else(|| ContextError::UnknownFlag(name.to_string()))
    }

    /// Positional arguments left after this level's flags.
    pub fn args(&self) -> &[String] {
        self.flag_set
            .as_ref()
            .map(FlagSet::args)
            .unwrap_or_default()
    }

    pub fn n_arg(&self) -> usize {
        self.args().len()
    }

    /// Value of `name` from the nearest level that defines it.
    pub fn lookup(&self, name: &str) -> Option<&FlagValue> {
        find_flag_set_owner(name, self)?.lookup(name)
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        self.lookup(name)?.as_str()
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.lookup(name)?.as_int()
    }

    pub fn uint(&self, name: &str) -> Option<u64> {
        self.lookup(name)?.as_uint()
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        self.lookup(name)?.as_float()
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        self.lookup(name)?.as_bool()
    }

    pub fn duration(&self, name: &str) -> Option<std::time::Duration> {
        self.lookup(name)?.as_duration()
    }

    pub fn string_slice(&self, name: &str) -> Option<&[String]> {
        self.lookup(name)?.as_string_slice()
    }

    pub fn int_slice(&self, name: &str) -> Option<&[i64]> {
        self.lookup(name)?.as_int_slice()
    }

    pub fn float_slice(&self, name: &str) -> Option<&[f64]> {
        self.lookup(name)?.as_float_slice()
    }

    pub fn duration_slice(&self, name: &str) -> Option<&[std::time::Duration]> {
        self.lookup(name)?.as_duration_slice()
    }

    pub fn bool_slice(&self, name: &str) -> Option<&[bool]> {
        self.lookup(name)?.as_bool_slice()
    }

    /// Checks the required flags declared at this level: the command's flags,
    /// or the application's for a root context without a command.
    ///
    /// # Errors
    ///
    /// [`ContextError::MissingRequiredFlags`] listing every missing flag.
    pub fn check_required(&self) -> Result<()> {
        let flags: &[FlagDescriptor] = if let Some(command) = self.command.as_deref() {
            &command.flags
        } else if let Some(app) = self.app.as_deref() {
            &app.flags
        } else {
            &[]
        };
        check_required_flags(flags, self)?;
        Ok(())
    }
}

fn parse_level<I, S>(
    name: &str,
    flags: &mut [FlagDescriptor],
    argv: I,
    env: EnvLookup<'_>,
) -> Result<FlagSet>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut set = build_flag_set(name, flags, env)?;
    set.parse(argv)?;
    normalize_flags(flags, &mut set)?;
    debug!(level = name, set = ?set.explicitly_set_names(), args = ?set.args(), "Parsed invocation level");
    Ok(set)
}

/// Appends the reported name of every explicitly set flag. A stored name
/// that is itself a comma-joined alias list reports its longest part.
fn collect_flag_names(set: &FlagSet, names: &mut Vec<String>) {
    for stored in set.explicitly_set_names() {
        let mut parts = stored.split(',').map(str::trim);
        let first = parts.next().unwrap_or("");
        let name = parts.fold(first, |best, part| {
            if part.len() > best.len() { part } else { best }
        });
        if !name.is_empty() {
            names.push(name.to_string());
        }
    }
}
