//! Loading and saving application definitions.
//!
//! Definitions are YAML or JSON documents describing an [`App`] with its
//! flags and nested commands. The format is chosen from the file extension.
//!
//! # Example YAML
//!
//! ```yaml
//! name: deploy-tool
//! version: "1.2.0"
//! flags:
//!   - names: [c, config]
//!     kind: string
//!     env_vars: [DEPLOY_CONFIG]
//! commands:
//!   - name: push
//!     aliases: [p]
//!     flags:
//!       - names: [t, target]
//!         kind: string
//!         required: true
//!       - names: [timeout]
//!         kind: duration
//!         default: 30s
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::command::App;
use crate::error::ConfigError;

/// Supported definition file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionFormat {
    Yaml,
    Json,
}

impl DefinitionFormat {
    /// Picks the format from a path's extension (`.yaml`, `.yml`, `.json`).
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnsupportedFormat`] for any other extension.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Ok(Self::Yaml)
            }
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Self::Json),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Loads an application definition from a YAML or JSON file.
///
/// # Errors
///
/// [`ConfigError::Io`] if the file cannot be read, [`ConfigError::Yaml`] or
/// [`ConfigError::Json`] if it does not parse, and
/// [`ConfigError::UnsupportedFormat`] for an unknown extension.
pub fn load_app(path: impl AsRef<Path>) -> Result<App, ConfigError> {
    let path = path.as_ref();
    let format = DefinitionFormat::from_path(path)?;
    let reader = BufReader::new(std::fs::File::open(path)?);
    let app = match format {
        DefinitionFormat::Yaml => serde_yaml::from_reader(reader)?,
        DefinitionFormat::Json => serde_json::from_reader(reader)?,
    };
    Ok(app)
}

/// Writes an application definition, choosing the format from the extension.
///
/// # Errors
///
/// Same as [`load_app`].
pub fn save_app(app: &App, path: impl AsRef<Path>) -> Result<(), ConfigError> {
    let path = path.as_ref();
    let format = DefinitionFormat::from_path(path)?;
    let writer = BufWriter::new(std::fs::File::create(path)?);
    match format {
        DefinitionFormat::Yaml => serde_yaml::to_writer(writer, app)?,
        DefinitionFormat::Json => serde_json::to_writer_pretty(writer, app)?,
    }
    Ok(())
}
