use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use thiserror::Error;

pub const ENV_RPC_URLS: &str = "STAGING_RPC_URLS";
pub const ENV_RPC_URL_PREFIX: &str = "STAGING_RPC_URL_";
pub const ENV_BIND_ADDR: &str = "STAGING_BIND_ADDR";
pub const ENV_PORT: &str = "STAGING_PORT";
pub const ENV_RPC_TIMEOUT_MS: &str = "STAGING_RPC_TIMEOUT_MS";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {key}={value:?}: {reason}")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },
    #[error("no node endpoints configured; set STAGING_RPC_URLS or STAGING_RPC_URL_<chainId>")]
    NoChains,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
    /// Node endpoint per chain id.
    pub rpc_urls: BTreeMap<u64, String>,
    pub rpc_timeout_ms: u64,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3000,
            rpc_urls: BTreeMap::new(),
            rpc_timeout_ms: 10_000,
        }
    }
}

impl StagingConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    /// Build from `(name, value)` pairs. Per-chain `STAGING_RPC_URL_<id>`
    /// entries override the same chain in `STAGING_RPC_URLS`.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut cfg = Self::default();
        let mut overrides = BTreeMap::new();

        for (key, value) in vars {
            let (key, value) = (key.as_ref(), value.as_ref().trim());
            match key {
                ENV_RPC_URLS => {
                    for pair in value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                        let (chain, url) = pair
                            .split_once('=')
                            .ok_or_else(|| invalid(key, pair, "expected chainId=url"))?;
                        let chain_id = parse_chain_id(key, chain)?;
                        cfg.rpc_urls.insert(chain_id, parse_url(key, url)?);
                    }
                }
                ENV_BIND_ADDR => {
                    cfg.bind_addr = value
                        .parse()
                        .map_err(|e| invalid(key, value, &format!("{e}")))?;
                }
                ENV_PORT => {
                    cfg.port = value
                        .parse()
                        .map_err(|e| invalid(key, value, &format!("{e}")))?;
                }
                ENV_RPC_TIMEOUT_MS => {
                    cfg.rpc_timeout_ms = value
                        .parse()
                        .map_err(|e| invalid(key, value, &format!("{e}")))?;
                    if cfg.rpc_timeout_ms == 0 {
                        return Err(invalid(key, value, "timeout must be positive"));
                    }
                }
                _ => {
                    if let Some(chain) = key.strip_prefix(ENV_RPC_URL_PREFIX) {
                        let chain_id = parse_chain_id(key, chain)?;
                        overrides.insert(chain_id, parse_url(key, value)?);
                    }
                }
            }
        }

        cfg.rpc_urls.extend(overrides);
        if cfg.rpc_urls.is_empty() {
            return Err(ConfigError::NoChains);
        }
        Ok(cfg)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_millis(self.rpc_timeout_ms)
    }
}

fn invalid(key: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_owned(),
        value: value.to_owned(),
        reason: reason.to_owned(),
    }
}

fn parse_chain_id(key: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|e| invalid(key, raw, &format!("chain id: {e}")))
}

fn parse_url(key: &str, raw: &str) -> Result<String, ConfigError> {
    let url = reqwest::Url::parse(raw.trim())
        .map_err(|e| invalid(key, raw, &format!("node url: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(key, raw, "node url must be http(s)"));
    }
    Ok(raw.trim().to_owned())
}
