//! Alias normalization.
//!
//! After parsing, only the alias the user typed holds the value. Normalizing
//! copies that value to every sibling alias so a later lookup by any alias
//! sees it. Copies go through [`FlagSet::set`], so the siblings count as
//! explicitly set as well.

use std::collections::HashSet;

use tracing::debug;

use crate::error::{ContextError, Result};
use crate::flag::FlagDescriptor;
use crate::flagset::FlagSet;

/// Propagates each multi-alias flag's explicitly set value to its siblings.
///
/// Flags with a single alias, or with no alias set, are left untouched.
///
/// # Errors
///
/// [`ContextError::ConflictingAliases`] as soon as one flag was set under two
/// aliases, and [`ContextError::Flag`] if a sibling rejects the copied value.
///
/// # Examples
///
/// ```
/// use flagscope_core::*;
///
/// let flags = vec![FlagDescriptor::new(ValueKind::Int, &["v", "value"])];
/// let mut set = build_flag_set("app", &mut flags.clone(), &|_: &str| None).unwrap();
/// set.parse(["--v=5"]).unwrap();
///
/// normalize_flags(&flags, &mut set).unwrap();
/// assert_eq!(set.raw_value("value").unwrap(), &FlagValue::Int(5));
/// assert!(set.is_set_explicitly("value"));
/// ```
pub fn normalize_flags(flags: &[FlagDescriptor], set: &mut FlagSet) -> Result<()> {
    let visited: HashSet<String> = set.explicitly_set_names().iter().cloned().collect();

    for flag in flags {
        let names: Vec<&str> = flag.names().collect();
        if names.len() < 2 {
            continue;
        }

        let mut source: Option<&str> = None;
        for &name in &names {
            if !visited.contains(name) {
                continue;
            }
            if let Some(first) = source {
                debug!(first, second = name, "Conflicting aliases");
                return Err(ContextError::ConflictingAliases {
                    first: first.to_string(),
                    second: name.to_string(),
                });
            }
            source = Some(name);
        }
        let Some(source) = source else {
            continue;
        };

        let value = set.raw_value(source)?;
        let raw = value.serialized().unwrap_or_else(|| value.to_string());
        for &name in names.iter().filter(|&&name| name != source) {
            debug!(from = source, to = name, value = %raw, "Propagating alias value");
            set.set(name, &raw)?;
        }
    }
    Ok(())
}
