use std::net::SocketAddr;
use std::str::FromStr;
use std::time;

use envconfig::Envconfig;

#[derive(Envconfig, Clone)]
pub struct Config {
    #[envconfig(default = "false")]
    pub print_collector: bool,
    #[envconfig(default = "127.0.0.1:3000")]
    pub address: SocketAddr,
    #[envconfig(default = "true")]
    pub export_prometheus: bool,
    #[envconfig(default = "262144")]
    pub max_body_bytes: usize,

    #[envconfig(nested = true)]
    pub tracker: TrackerConfig,
}

/// Options recognized by the tracker itself, independent of how it is hosted.
#[derive(Envconfig, Clone, Debug)]
pub struct TrackerConfig {
    /// Credential for the collector. Passed through as-is, an empty key is sent empty.
    #[envconfig(default = "")]
    pub api_key: String,

    /// Skill id registered with Voxalyze to receive debugger traffic.
    pub debug_skill_id: Option<String>,

    pub collector_url: String,

    #[envconfig(default = "5000")]
    pub request_timeout: EnvMsDuration,
}

impl TrackerConfig {
    /// The configured debug skill id, with an empty value counting as unset.
    pub fn debug_skill_id(&self) -> Option<&str> {
        self.debug_skill_id
            .as_deref()
            .filter(|skill_id| !skill_id.is_empty())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EnvMsDuration(pub time::Duration);

#[derive(Debug, PartialEq, Eq)]
pub struct ParseEnvMsDurationError;

impl FromStr for EnvMsDuration {
    type Err = ParseEnvMsDurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ms = s.parse::<u64>().map_err(|_| ParseEnvMsDurationError)?;

        Ok(EnvMsDuration(time::Duration::from_millis(ms)))
    }
}
