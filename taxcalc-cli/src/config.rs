//! Optional TOML configuration for the `taxcalc` binary.
//!
//! ```toml
//! tax_year = 2023
//! filing_status = "married"
//! state_method = "marginal"
//!
//! [source]
//! backend = "json"
//! location = "tables.json"
//!
//! [logging]
//! level = "debug"
//! file = "taxcalc.log"
//! ```
//!
//! Every key is optional. Command-line flags override the file, which
//! overrides the defaults below.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use taxcalc_core::calculations::StateTaxMethod;
use taxcalc_core::db::SourceConfig;
use taxcalc_core::FilingStatusCode;
use thiserror::Error;

pub const DEFAULT_TAX_YEAR: i32 = 2023;
pub const DEFAULT_BACKEND: &str = "bundled";
pub const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            file: None,
        }
    }
}

/// `[source]` table. Unlike [`SourceConfig`] on its own, a missing
/// `backend` here means the bundled tables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceSection {
    pub backend: String,
    pub location: String,
}

impl Default for SourceSection {
    fn default() -> Self {
        Self {
            backend: DEFAULT_BACKEND.to_string(),
            location: String::new(),
        }
    }
}

impl From<SourceSection> for SourceConfig {
    fn from(section: SourceSection) -> Self {
        SourceConfig {
            backend: section.backend,
            location: section.location,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub tax_year: i32,
    pub filing_status: FilingStatusCode,
    pub state_method: StateTaxMethod,
    pub source: SourceSection,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tax_year: DEFAULT_TAX_YEAR,
            filing_status: FilingStatusCode::Single,
            state_method: StateTaxMethod::default(),
            source: SourceSection::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_toml(
        text: &str,
        path: &Path,
    ) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads `path`, or returns the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text, path)
    }
}
