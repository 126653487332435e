//! Version 1 of the configuration schema.
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Info, ENV_VAR_PREFIX};

/// Maximum number of infohashes accepted in a single scrape request.
pub const MAX_SCRAPE_TORRENTS: usize = 74;

/// The whole tracker configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// Core tracker policies shared by every front-end.
    #[serde(default)]
    pub core: Core,

    /// HTTP tracker instances to launch.
    #[serde(default = "Configuration::default_http_trackers")]
    pub http_trackers: Vec<HttpTracker>,

    /// UDP tracker instances to launch.
    #[serde(default = "Configuration::default_udp_trackers")]
    pub udp_trackers: Vec<UdpTracker>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            core: Core::default(),
            http_trackers: Self::default_http_trackers(),
            udp_trackers: Self::default_udp_trackers(),
        }
    }
}

impl Configuration {
    fn default_http_trackers() -> Vec<HttpTracker> {
        vec![HttpTracker::default()]
    }

    fn default_udp_trackers() -> Vec<UdpTracker> {
        vec![UdpTracker::default()]
    }

    /// Loads the configuration from the defaults, an optional TOML file and
    /// the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the sources cannot be parsed or if the resulting
    /// configuration violates an invariant (see [`Configuration::validate`]).
    pub fn load(info: &Info) -> Result<Configuration, Error> {
        let mut figment = Figment::from(Serialized::defaults(Configuration::default()));

        if let Some(config_toml_path) = &info.config_toml_path {
            figment = figment.merge(Toml::file(config_toml_path));
        }

        figment = figment.merge(Env::prefixed(ENV_VAR_PREFIX).split("__"));

        let config: Configuration = figment.extract()?;

        config.validate()?;

        Ok(config)
    }

    /// Checks the invariants that the type system cannot express.
    ///
    /// # Errors
    ///
    /// Returns an error when the shard count is not a power of two or when
    /// the minimum announce interval exceeds the announce interval.
    pub fn validate(&self) -> Result<(), Error> {
        if self.core.shard_count == 0 || !self.core.shard_count.is_power_of_two() {
            return Err(Error::InvalidShardCount {
                shard_count: self.core.shard_count,
            });
        }

        if self.core.announce_policy.interval_min > self.core.announce_policy.interval {
            return Err(Error::InvalidAnnouncePolicy {
                interval: self.core.announce_policy.interval,
                interval_min: self.core.announce_policy.interval_min,
            });
        }

        Ok(())
    }
}

/// Core tracker policies shared by the HTTP and UDP front-ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Core {
    /// Announce intervals handed back to clients.
    #[serde(default)]
    pub announce_policy: AnnouncePolicy,

    /// Peer and swarm retention.
    #[serde(default)]
    pub tracker_policy: TrackerPolicy,

    /// Network level options.
    #[serde(default)]
    pub net: Network,

    /// Seconds between garbage collection passes over the swarm registry.
    #[serde(default = "Core::default_gc_interval_secs")]
    pub gc_interval_secs: u64,

    /// Number of registry shards per address family. Must be a power of two.
    /// Fixed at startup.
    #[serde(default = "Core::default_shard_count")]
    pub shard_count: u8,

    /// Upper bound for the `numwant` announce parameter.
    #[serde(default = "Core::default_max_numwant")]
    pub max_numwant: u16,

    /// Run in private mode: announce and scrape require a passkey path.
    #[serde(default)]
    pub private: bool,

    /// Only accept announces for whitelisted torrents.
    #[serde(default)]
    pub listed: bool,
}

impl Default for Core {
    fn default() -> Self {
        Self {
            announce_policy: AnnouncePolicy::default(),
            tracker_policy: TrackerPolicy::default(),
            net: Network::default(),
            gc_interval_secs: Self::default_gc_interval_secs(),
            shard_count: Self::default_shard_count(),
            max_numwant: Self::default_max_numwant(),
            private: false,
            listed: false,
        }
    }
}

impl Core {
    fn default_gc_interval_secs() -> u64 {
        600
    }

    fn default_shard_count() -> u8 {
        16
    }

    fn default_max_numwant() -> u16 {
        50
    }

    #[must_use]
    pub fn gc_interval(&self) -> Duration {
        Duration::from_secs(self.gc_interval_secs)
    }
}

/// Announce intervals handed back to clients.
///
/// The returned interval is always greater than or equal to the minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnouncePolicy {
    /// Recommended seconds between announces.
    pub interval: u32,

    /// Clients must not announce more frequently than this.
    pub interval_min: u32,
}

impl Default for AnnouncePolicy {
    fn default() -> Self {
        Self {
            interval: 120,
            interval_min: 120,
        }
    }
}

/// Peer and swarm retention policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerPolicy {
    /// Seconds after which a peer that has not announced is collectable.
    pub peer_lifetime_secs: u64,
}

impl Default for TrackerPolicy {
    fn default() -> Self {
        Self { peer_lifetime_secs: 900 }
    }
}

impl TrackerPolicy {
    #[must_use]
    pub fn peer_lifetime(&self) -> Duration {
        Duration::from_secs(self.peer_lifetime_secs)
    }
}

/// Network level options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Network {
    /// The external IP of the tracker host. Used to rewrite loopback peer
    /// addresses so that local peers are announced with a routable IP.
    pub external_ip: Option<IpAddr>,

    /// Honor the IP the client declares in the request instead of the source
    /// address of the connection or datagram.
    pub allow_ip_spoofing: bool,

    /// The tracker runs behind a reverse proxy: resolve the client IP from
    /// the right-most `X-Forwarded-For` entry instead of the socket address.
    pub reverse_proxy: bool,
}

/// One HTTP tracker instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpTracker {
    /// The address the HTTP tracker binds to.
    pub bind_address: SocketAddr,

    /// Per-request timeout covering read, handling and write.
    #[serde(default = "HttpTracker::default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for HttpTracker {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:7070".parse().expect("hardcoded bind address is valid"),
            request_timeout_secs: Self::default_request_timeout_secs(),
        }
    }
}

impl HttpTracker {
    fn default_request_timeout_secs() -> u64 {
        5
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// One UDP tracker instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UdpTracker {
    /// The address the UDP tracker binds to.
    pub bind_address: SocketAddr,

    /// Seconds a connection-ID cookie stays valid. The cookie IV is rotated
    /// on this period; tokens from the previous period are still honored.
    #[serde(default = "UdpTracker::default_cookie_lifetime_secs")]
    pub cookie_lifetime_secs: u64,
}

impl Default for UdpTracker {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:6969".parse().expect("hardcoded bind address is valid"),
            cookie_lifetime_secs: Self::default_cookie_lifetime_secs(),
        }
    }
}

impl UdpTracker {
    fn default_cookie_lifetime_secs() -> u64 {
        120
    }

    #[must_use]
    pub fn cookie_lifetime(&self) -> Duration {
        Duration::from_secs(self.cookie_lifetime_secs)
    }
}

/// Errors raised while loading or validating the configuration.
#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration sources could not be loaded: {source}")]
    SourcesError {
        #[from]
        source: Box<figment::Error>,
    },

    #[error("shard_count must be a non-zero power of two, got {shard_count}")]
    InvalidShardCount { shard_count: u8 },

    #[error("interval_min ({interval_min}) must not exceed interval ({interval})")]
    InvalidAnnouncePolicy { interval: u32, interval_min: u32 },
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::SourcesError { source: Box::new(err) }
    }
}

#[cfg(test)]
mod tests {

    mod the_configuration {
        use figment::Jail;

        use crate::{Configuration, Info};

        #[test]
        fn it_should_have_default_values() {
            let config = Configuration::default();

            assert_eq!(config.core.announce_policy.interval, 120);
            assert_eq!(config.core.announce_policy.interval_min, 120);
            assert_eq!(config.core.tracker_policy.peer_lifetime_secs, 900);
            assert_eq!(config.core.gc_interval_secs, 600);
            assert_eq!(config.core.shard_count, 16);
            assert_eq!(config.core.max_numwant, 50);
            assert!(!config.core.private);
            assert!(!config.core.listed);
            assert!(!config.core.net.allow_ip_spoofing);
        }

        #[test]
        fn default_values_should_be_valid() {
            assert!(Configuration::default().validate().is_ok());
        }

        #[test]
        fn it_should_be_loadable_from_a_toml_file() {
            Jail::expect_with(|jail| {
                jail.create_file(
                    "tracker.toml",
                    r#"
                        [core]
                        shard_count = 8
                        max_numwant = 30

                        [core.announce_policy]
                        interval = 300
                        interval_min = 120

                        [[udp_trackers]]
                        bind_address = "0.0.0.0:6969"
                        cookie_lifetime_secs = 60
                    "#,
                )?;

                let config = Configuration::load(&Info::new(Some("tracker.toml".to_string()))).expect("valid config");

                assert_eq!(config.core.shard_count, 8);
                assert_eq!(config.core.max_numwant, 30);
                assert_eq!(config.core.announce_policy.interval, 300);
                assert_eq!(config.udp_trackers.len(), 1);
                assert_eq!(config.udp_trackers[0].cookie_lifetime_secs, 60);

                Ok(())
            });
        }

        #[test]
        fn it_should_allow_env_var_overrides() {
            Jail::expect_with(|jail| {
                jail.set_env("PEERHUB_CORE__SHARD_COUNT", "4");

                let config = Configuration::load(&Info::default()).expect("valid config");

                assert_eq!(config.core.shard_count, 4);

                Ok(())
            });
        }

        #[test]
        fn it_should_reject_a_shard_count_that_is_not_a_power_of_two() {
            let mut config = Configuration::default();
            config.core.shard_count = 3;

            assert!(config.validate().is_err());
        }

        #[test]
        fn it_should_reject_a_minimum_interval_larger_than_the_interval() {
            let mut config = Configuration::default();
            config.core.announce_policy.interval = 60;
            config.core.announce_policy.interval_min = 120;

            assert!(config.validate().is_err());
        }
    }
}
