//! Name resolution across a context lineage.
//!
//! Two separate questions are answered here: which descriptor declares a
//! name, and which flag set stores it. Keeping them apart lets aliases and
//! flags inherited from parent commands resolve without flattening the
//! hierarchy into one namespace.

use crate::context::Context;
use crate::flag::FlagDescriptor;
use crate::flagset::FlagSet;

/// Finds the descriptor declaring `name`.
///
/// Commands are scanned from `ctx` up to the root, then the application's
/// own flags. The first descriptor listing `name` among its aliases wins.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use flagscope_core::*;
///
/// let app = App::new("tool").with_flag(FlagDescriptor::new(ValueKind::Bool, &["q", "quiet"]));
/// let root = Arc::new(Context::new().with_app(Arc::new(app)));
/// let cmd = Command::new("run").with_flag(FlagDescriptor::new(ValueKind::Int, &["n"]));
/// let leaf = Context::new().with_parent(root).with_command(Arc::new(cmd));
///
/// assert_eq!(find_descriptor("n", &leaf).unwrap().canonical_name(), "n");
/// assert_eq!(find_descriptor("q", &leaf).unwrap().canonical_name(), "quiet");
/// assert!(find_descriptor("x", &leaf).is_none());
/// ```
pub fn find_descriptor<'a>(name: &str, ctx: &'a Context) -> Option<&'a FlagDescriptor> {
    ctx.ancestors()
        .filter_map(Context::command)
        .flat_map(|command| command.flags.iter())
        .find(|flag| flag.matches(name))
        .or_else(|| ctx.app()?.find_flag(name))
}

/// Finds the nearest flag set in the lineage that defines `name`, whether or
/// not it was set.
pub fn find_flag_set_owner<'a>(name: &str, ctx: &'a Context) -> Option<&'a FlagSet> {
    ctx.ancestors()
        .filter_map(Context::flag_set)
        .find(|set| set.is_defined(name))
}
