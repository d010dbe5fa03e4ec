use std::net::SocketAddr;

use crate::error::ConfigError;

pub const ADDR_VAR: &str = "TIMETABLE_ADDR";
pub const DEFAULT_ADDR: &str = "127.0.0.1:8080";

/// Server settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = lookup(ADDR_VAR).unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = raw
            .trim()
            .parse()
            .map_err(|source| ConfigError::InvalidAddress {
                addr: raw.clone(),
                source,
            })?;
        Ok(Self { addr })
    }
}
