//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;

use tracing::warn;

use crate::backend::DEFAULT_MAX_ENTRIES;
use crate::registry::BinMode;

/// Name of the implicit bin in single-bin mode when none is configured.
pub const DEFAULT_BIN_NAME: &str = "default";

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Serve one implicit bin instead of path-named bins
    pub single_bin: bool,
    /// Name of the implicit bin in single-bin mode
    pub default_bin: String,
    /// Maximum number of entries per in-memory bin
    pub max_entries: usize,
    /// Background expiry sweep interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `BIN_MODE` - `multi` or `single` (default: multi)
    /// - `DEFAULT_BIN` - implicit bin name in single mode (default: "default")
    /// - `MAX_ENTRIES` - Maximum entries per bin (default: 10000)
    /// - `CLEANUP_INTERVAL` - Expiry sweep frequency in seconds (default: 1)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            single_bin: env::var("BIN_MODE")
                .map(|mode| parse_bin_mode(&mode))
                .unwrap_or(defaults.single_bin),
            default_bin: env::var("DEFAULT_BIN")
                .ok()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or(defaults.default_bin),
            max_entries: parse_var("MAX_ENTRIES").unwrap_or(defaults.max_entries),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
        }
    }

    /// Bin addressing mode described by this configuration.
    pub fn bin_mode(&self) -> BinMode {
        if self.single_bin {
            BinMode::Single(self.default_bin.clone())
        } else {
            BinMode::Multi
        }
    }
}

/// `true` for single-bin mode. Unknown values fall back to multi-bin.
fn parse_bin_mode(mode: &str) -> bool {
    let mode = mode.trim();
    if mode.eq_ignore_ascii_case("single") {
        true
    } else {
        if !mode.eq_ignore_ascii_case("multi") {
            warn!("Unrecognized BIN_MODE {:?}, using multi-bin mode", mode);
        }
        false
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            single_bin: false,
            default_bin: DEFAULT_BIN_NAME.to_string(),
            max_entries: DEFAULT_MAX_ENTRIES,
            cleanup_interval: 1,
        }
    }
}
