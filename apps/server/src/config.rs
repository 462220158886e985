use std::{net::SocketAddr, path::PathBuf, time::Duration};

use anyhow::Context;
use omie_connect::DEFAULT_API_BASE_URL;

const DEFAULT_API_TIMEOUT: Duration = Duration::from_secs(30);

/// Two full batches (direct, then proxied) plus a margin.
fn request_timeout_for(api_timeout: Duration) -> Duration {
    api_timeout * 2 + Duration::from_secs(5)
}

fn duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
}

pub struct Config {
    pub listen_addr: SocketAddr,
    pub store_path: PathBuf,
    /// Optional at-rest key for the settings file.
    pub store_key: Option<String>,
    pub api_base_url: String,
    pub cors_allow: Vec<String>,
    /// Per-call timeout for the Omie API.
    pub api_timeout: Duration,
    /// Inbound request timeout. Must leave room for a sync and its proxy retry.
    pub request_timeout: Duration,
    pub sync_on_start: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            store_path: PathBuf::from("./data/store.json"),
            store_key: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            cors_allow: vec!["*".to_string()],
            api_timeout: DEFAULT_API_TIMEOUT,
            request_timeout: request_timeout_for(DEFAULT_API_TIMEOUT),
            sync_on_start: true,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let listen_addr = match std::env::var("OMIE_LISTEN_ADDR") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("Invalid OMIE_LISTEN_ADDR: {}", raw))?,
            Err(_) => defaults.listen_addr,
        };
        let store_path = std::env::var("OMIE_STORE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.store_path);
        let store_key = std::env::var("OMIE_STORE_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());
        let api_base_url =
            std::env::var("OMIE_API_BASE_URL").unwrap_or(defaults.api_base_url);
        let cors_allow = std::env::var("OMIE_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let api_timeout = duration_ms("OMIE_API_TIMEOUT_MS").unwrap_or(defaults.api_timeout);
        let request_timeout = duration_ms("OMIE_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|| request_timeout_for(api_timeout));
        let sync_on_start = std::env::var("OMIE_SYNC_ON_START")
            .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off"))
            .unwrap_or(defaults.sync_on_start);

        Ok(Self {
            listen_addr,
            store_path,
            store_key,
            api_base_url,
            cors_allow,
            api_timeout,
            request_timeout,
            sync_on_start,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_request_timeout_covers_a_retried_sync() {
        let config = Config::default();
        assert!(config.request_timeout > config.api_timeout * 2);
    }
}
