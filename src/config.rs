//! Server configuration.
//!
//! All configuration is loaded from environment variables:
//!
//! - `HOST`: bind address (default `0.0.0.0`)
//! - `PORT`: port number (default `3000`)
//! - `ROOM_IDLE_TIMEOUT_SECS`: evict rooms with no accepted intent for this
//!   long (default and `0`: never)
//! - `CLEANUP_INTERVAL_SECS`: how often idle rooms are looked for
//!   (default `60`, only used with an idle timeout)

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ServerError;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default interval between idle-room sweeps.
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Configuration for the game server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// The host address to bind to.
    pub host: String,
    /// The TCP port to listen on.
    pub port: u16,
    /// Rooms idle longer than this are destroyed. `None` keeps rooms until
    /// both players leave. A zero timeout is read as `None`.
    pub room_idle_timeout: Option<Duration>,
    /// Period of the idle-room sweep.
    pub cleanup_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: DEFAULT_PORT,
            room_idle_timeout: None,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
        }
    }
}

impl ServerConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ServerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = lookup("HOST")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.host);
        let port = parse_var(&lookup, "PORT")?.unwrap_or(defaults.port);
        let room_idle_timeout = parse_var::<u64, _>(&lookup, "ROOM_IDLE_TIMEOUT_SECS")?
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);
        let cleanup_interval = parse_var::<u64, _>(&lookup, "CLEANUP_INTERVAL_SECS")?
            .filter(|secs| *secs > 0)
            .map_or(defaults.cleanup_interval, Duration::from_secs);

        Ok(Self {
            host,
            port,
            room_idle_timeout,
            cleanup_interval,
        })
    }

    /// Parse `host:port` into a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ServerError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ServerError::Bind(format!("invalid address: {e}")))
    }
}

fn parse_var<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ServerError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse()
                .map(Some)
                .map_err(|_| ServerError::Config { var, value: raw })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.port, 3000);
        assert!(config.room_idle_timeout.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("ROOM_IDLE_TIMEOUT_SECS", "600"),
            ("CLEANUP_INTERVAL_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.room_idle_timeout, Some(Duration::from_secs(600)));
        assert_eq!(config.cleanup_interval, Duration::from_secs(5));
        assert_eq!(
            config.socket_addr().unwrap(),
            "127.0.0.1:8080".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_zero_idle_timeout_disables_eviction() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("ROOM_IDLE_TIMEOUT_SECS", "0"),
            ("CLEANUP_INTERVAL_SECS", "0"),
        ]))
        .unwrap();
        assert!(config.room_idle_timeout.is_none());
        assert_eq!(config.cleanup_interval, DEFAULT_CLEANUP_INTERVAL);
    }

    #[test]
    fn test_invalid_port() {
        let err = ServerConfig::from_lookup(lookup_from(&[("PORT", "http")])).unwrap_err();
        assert!(matches!(err, ServerError::Config { var: "PORT", .. }));
    }

    #[test]
    fn test_invalid_host() {
        let config = ServerConfig::from_lookup(lookup_from(&[("HOST", "not a host")])).unwrap();
        assert!(config.socket_addr().is_err());
    }
}
