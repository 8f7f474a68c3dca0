//! Runtime configuration.
//!
//! Compiled-in defaults, overridable from the environment:
//!
//! | variable                      | default        |
//! |-------------------------------|----------------|
//! | `PLATFORM_ADVISOR_DATA_DIR`   | `data`         |
//! | `PLATFORM_ADVISOR_ASSIGNMENT` | `round_robin`  |
//! | `PLATFORM_ADVISOR_LISTEN`     | `0.0.0.0:3000` |
//!
//! Command-line flags take precedence over both.

use std::net::SocketAddr;
use std::path::PathBuf;

use tracing::warn;

use crate::queue::AssignmentPolicy;

pub const DATA_DIR_VAR: &str = "PLATFORM_ADVISOR_DATA_DIR";
pub const ASSIGNMENT_VAR: &str = "PLATFORM_ADVISOR_ASSIGNMENT";
pub const LISTEN_VAR: &str = "PLATFORM_ADVISOR_LISTEN";

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_LISTEN: ([u8; 4], u16) = ([0, 0, 0, 0], 3000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisorConfig {
    /// Directory holding `trains.json`, `platforms.json` and `overrides.json`.
    pub data_dir: PathBuf,

    /// How trains are placed onto platform queues.
    pub assignment: AssignmentPolicy,

    /// Bind address for `serve`.
    pub listen: SocketAddr,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AdvisorConfig {
    pub fn new() -> Self {
        AdvisorConfig {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            assignment: AssignmentPolicy::default(),
            listen: SocketAddr::from(DEFAULT_LISTEN),
        }
    }

    /// Reads overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads overrides through `lookup`. Unparseable values are logged and
    /// the default is kept.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new();

        if let Some(dir) = lookup(DATA_DIR_VAR).filter(|s| !s.is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }

        if let Some(raw) = lookup(ASSIGNMENT_VAR) {
            match raw.parse() {
                Ok(policy) => config.assignment = policy,
                Err(e) => warn!(var = ASSIGNMENT_VAR, error = %e, "Ignoring invalid value"),
            }
        }

        if let Some(raw) = lookup(LISTEN_VAR) {
            match raw.parse() {
                Ok(addr) => config.listen = addr,
                Err(e) => warn!(var = LISTEN_VAR, value = %raw, error = %e, "Ignoring invalid value"),
            }
        }

        config
    }
}
