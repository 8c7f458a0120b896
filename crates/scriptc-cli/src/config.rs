//! Environment configuration for the `scriptc` binary.
//!
//! - `SCRIPTC_RENDERER`: graph renderer program (default: `dot`)
//! - `SCRIPTC_TAB_WIDTH`: tab stop width for diagnostic columns (default: 4)
//! - `SCRIPTC_LOG`: stderr log level (default: `warn`)
//!
//! Command-line flags take precedence over these values.

use std::path::PathBuf;

use scriptc_graph::render::DEFAULT_RENDERER;
use scriptc_session::pipeline::DEFAULT_TAB_WIDTH;
use tracing::Level;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {var} '{value}': expected a whole number of at least 1")]
    InvalidTabWidth { var: &'static str, value: String },

    #[error("invalid SCRIPTC_LOG '{0}': expected error, warn, info, debug or trace")]
    InvalidLogLevel(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub renderer: PathBuf,
    pub tab_width: u32,
    pub log_level: Level,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let renderer = lookup("SCRIPTC_RENDERER")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_RENDERER));

        let tab_width = match lookup("SCRIPTC_TAB_WIDTH") {
            Some(raw) => parse_tab_width("SCRIPTC_TAB_WIDTH", &raw)?,
            None => DEFAULT_TAB_WIDTH,
        };

        let log_level = match lookup("SCRIPTC_LOG") {
            Some(raw) => raw
                .trim()
                .parse::<Level>()
                .map_err(|_| ConfigError::InvalidLogLevel(raw))?,
            None => Level::WARN,
        };

        Ok(Config {
            renderer,
            tab_width,
            log_level,
        })
    }
}

pub fn parse_tab_width(var: &'static str, raw: &str) -> Result<u32, ConfigError> {
    match raw.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidTabWidth {
            var,
            value: raw.to_string(),
        }),
    }
}
