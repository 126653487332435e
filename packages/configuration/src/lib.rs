//! Configuration for the tracker.
//!
//! The whole configuration is a closed record with defined defaults. It is
//! loaded by merging, in order of increasing priority:
//!
//! 1. the built-in defaults,
//! 2. an optional TOML file,
//! 3. environment variables prefixed with `PEERHUB_` (sections separated
//!    with `__`, e.g. `PEERHUB_CORE__SHARD_COUNT=32`).
//!
//! An invalid configuration aborts startup with a descriptive error.
pub mod v1;

pub use v1::{
    AnnouncePolicy, Configuration, Core, Error, HttpTracker, Network, TrackerPolicy, UdpTracker, MAX_SCRAPE_TORRENTS,
};

/// Environment variable prefix for configuration overrides.
pub const ENV_VAR_PREFIX: &str = "PEERHUB_";

/// Information required to load the configuration.
#[derive(Debug, Clone, Default)]
pub struct Info {
    /// Optional path to a TOML configuration file.
    pub config_toml_path: Option<String>,
}

impl Info {
    #[must_use]
    pub fn new(config_toml_path: Option<String>) -> Self {
        Self { config_toml_path }
    }
}
