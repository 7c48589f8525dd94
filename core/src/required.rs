//! Required-flag validation.

use tracing::debug;

use crate::context::Context;
use crate::error::MissingFlags;
use crate::flag::FlagDescriptor;

/// Returns the display name of every required flag in `flags` that `ctx`
/// does not report as set under any alias, in declaration order.
///
/// An empty list means every required flag is present.
pub fn missing_required_flags(flags: &[FlagDescriptor], ctx: &Context) -> Vec<String> {
    flags
        .iter()
        .filter(|flag| flag.is_required())
        .filter(|flag| !flag.names().any(|name| ctx.is_set(name)))
        .map(|flag| flag.canonical_name().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

/// Checks `flags` against `ctx`, reporting all missing required flags at
/// once.
///
/// # Examples
///
/// ```
/// use flagscope_core::*;
///
/// let flags = vec![
///     FlagDescriptor::new(ValueKind::Bool, &["f"]).required(),
///     FlagDescriptor::new(ValueKind::String, &["g", "group"]).required(),
/// ];
/// let ctx = Context::new().with_flag_set(
///     build_flag_set("app", &mut flags.clone(), &|_: &str| None).unwrap(),
/// );
///
/// let err = check_required_flags(&flags, &ctx).unwrap_err();
/// assert_eq!(err.names(), ["f", "group"]);
/// assert_eq!(err.to_string(), r#"Required flags "f, group" not set"#);
/// ```
pub fn check_required_flags(
    flags: &[FlagDescriptor],
    ctx: &Context,
) -> Result<(), MissingFlags> {
    let missing = missing_required_flags(flags, ctx);
    if missing.is_empty() {
        return Ok(());
    }
    debug!(missing = ?missing, "Required flags not set");
    Err(MissingFlags::new(missing))
}
