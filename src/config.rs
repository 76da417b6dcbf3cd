//! Process-wide configuration, read once from the environment at startup.

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";
pub const DEFAULT_GNEWS_BASE_URL: &str = "https://gnews.io/api/v4";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub coingecko_base_url: String,
    pub gnews_base_url: String,
    /// Server-held secret for the news upstream. Absence is reported per request.
    pub gnews_api_key: Option<String>,
    pub upstream_timeout: Duration,
    pub fallback_timeout: Duration,
    /// Pause before the single fallback attempt after a 403.
    pub fallback_delay: Duration,
}

#[derive(Debug, thiserror::Error)]
#[error("invalid value for {name}: {value:?}")]
pub struct ConfigError {
    pub name: &'static str,
    pub value: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            coingecko_base_url: DEFAULT_COINGECKO_BASE_URL.to_string(),
            gnews_base_url: DEFAULT_GNEWS_BASE_URL.to_string(),
            gnews_api_key: None,
            upstream_timeout: Duration::from_secs(15),
            fallback_timeout: Duration::from_secs(10),
            fallback_delay: Duration::from_millis(1000),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        Ok(Self {
            bind_addr: parse_var("BIND_ADDR")?.unwrap_or(defaults.bind_addr),
            coingecko_base_url: env::var("COINGECKO_BASE_URL")
                .unwrap_or(defaults.coingecko_base_url),
            gnews_base_url: env::var("GNEWS_BASE_URL").unwrap_or(defaults.gnews_base_url),
            gnews_api_key: env::var("GNEWS_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            upstream_timeout: parse_var("UPSTREAM_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.upstream_timeout),
            fallback_timeout: parse_var("FALLBACK_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.fallback_timeout),
            fallback_delay: parse_var("FALLBACK_DELAY_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.fallback_delay),
        })
    }
}

fn parse_var<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError { name, value }),
        Err(_) => Ok(None),
    }
}
