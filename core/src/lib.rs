//! Context-and-flag resolution core for command-line frameworks.
//!
//! This crate resolves already-parsed flag state across a chain of nested
//! execution contexts (application → command → subcommand):
//!
//! - [`FlagSet`]: per-level flag storage with explicit-set tracking.
//! - [`FlagDescriptor`]: declared metadata for one logical flag and all of
//!   its aliases.
//! - [`normalize_flags`]: copies the one alias the user typed to its
//!   siblings, rejecting two forms of the same flag.
//! - [`Context`]: one level of the hierarchy, linked to a shared parent;
//!   answers "is this flag set anywhere in scope" and "what is its value".
//! - [`find_descriptor`] / [`find_flag_set_owner`]: lineage lookups.
//! - [`check_required_flags`]: reports every missing required flag at once.
//!
//! Definitions ([`App`], [`Command`]) can be loaded from YAML or JSON
//! ([`load_app`]) and checked with [`validate_app`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use flagscope_core::*;
//!
//! let app = App::new("tool")
//!     .with_flag(FlagDescriptor::new(ValueKind::Int, &["v", "value"]))
//!     .with_flag(FlagDescriptor::new(ValueKind::String, &["o", "output"]).required());
//!
//! let ctx = Context::for_app(app, ["--v=5"], &process_env).unwrap();
//! assert!(ctx.is_set("value"));
//! assert_eq!(ctx.value("value").unwrap(), &FlagValue::Int(5));
//!
//! let err = ctx.check_required().unwrap_err();
//! assert_eq!(err.to_string(), r#"Required flag "output" not set"#);
//! ```

mod command;
mod config;
mod context;
mod error;
mod flag;
mod flagset;
mod lineage;
mod normalize;
mod required;
mod validate;
mod value;

pub use command::{App, Command};
pub use config::{DefinitionFormat, load_app, save_app};
pub use context::{Context, Metadata};
pub use error::{ConfigError, ContextError, FlagError, MissingFlags, Result, ValueError};
pub use flag::{EnvLookup, FlagDescriptor, build_flag_set, process_env};
pub use flagset::FlagSet;
pub use lineage::{find_descriptor, find_flag_set_owner};
pub use normalize::normalize_flags;
pub use required::{check_required_flags, missing_required_flags};
pub use validate::{ValidationError, validate_app, validate_command};
pub use value::{FlagValue, SERIALIZED_SLICE_PREFIX, ValueKind, format_duration, parse_duration};
