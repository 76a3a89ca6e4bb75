//! Server configuration from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::CacheConfig;
use crate::domain::{AirportCode, InvalidAirportCode};

const DEFAULT_AIRPORTS: &str = "data/airports.json";
const DEFAULT_FLIGHTS: &str = "data/connecting_flights.json,data/socal_direct_flights.json";
const DEFAULT_ALLOWED_ORIGINS: &str = "LAX,SAN,SNA";
const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// Error reading server configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}: {source}")]
    InvalidOrigin {
        var: &'static str,
        source: InvalidAirportCode,
    },

    #[error("{var}: invalid socket address {value:?}")]
    InvalidBind { var: &'static str, value: String },

    #[error("{var}: expected a whole number of seconds, got {value:?}")]
    InvalidTtl { var: &'static str, value: String },

    #[error("{var}: no files listed")]
    NoFiles { var: &'static str },
}

/// Configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Airport reference file
    pub airports_path: PathBuf,

    /// Flight files, loaded in order
    pub flight_paths: Vec<PathBuf>,

    /// Airports an itinerary may start from
    pub allowed_origins: Vec<AirportCode>,

    /// Address to listen on
    pub bind: SocketAddr,

    /// Itinerary cache settings
    pub cache: CacheConfig,
}

impl ServerConfig {
    /// Read configuration from the process environment.
    ///
    /// - `PLANNER_AIRPORTS`: airport file
    /// - `PLANNER_FLIGHTS`: comma-separated flight files
    /// - `PLANNER_ALLOWED_ORIGINS`: comma-separated airport codes
    /// - `PLANNER_BIND`: listen address
    /// - `PLANNER_CACHE_TTL_SECS`: itinerary cache TTL
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to
    /// its value if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str, default: &str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let airports_path = PathBuf::from(get("PLANNER_AIRPORTS", DEFAULT_AIRPORTS));

        let flight_paths: Vec<PathBuf> = split_list(&get("PLANNER_FLIGHTS", DEFAULT_FLIGHTS))
            .map(PathBuf::from)
            .collect();
        if flight_paths.is_empty() {
            return Err(ConfigError::NoFiles {
                var: "PLANNER_FLIGHTS",
            });
        }

        let allowed_origins = split_list(&get("PLANNER_ALLOWED_ORIGINS", DEFAULT_ALLOWED_ORIGINS))
            .map(AirportCode::parse_normalized)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| ConfigError::InvalidOrigin {
                var: "PLANNER_ALLOWED_ORIGINS",
                source,
            })?;

        let bind_value = get("PLANNER_BIND", DEFAULT_BIND);
        let bind = bind_value.parse().map_err(|_| ConfigError::InvalidBind {
            var: "PLANNER_BIND",
            value: bind_value.clone(),
        })?;

        let mut cache = CacheConfig::default();
        if let Some(value) = lookup("PLANNER_CACHE_TTL_SECS") {
            let secs: u64 = value.trim().parse().map_err(|_| ConfigError::InvalidTtl {
                var: "PLANNER_CACHE_TTL_SECS",
                value: value.clone(),
            })?;
            cache.ttl = Duration::from_secs(secs);
        }

        Ok(Self {
            airports_path,
            flight_paths,
            allowed_origins,
            bind,
            cache,
        })
    }
}

fn split_list(s: &str) -> impl Iterator<Item = &str> {
    s.split(',').map(str::trim).filter(|item| !item.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|var| vars.get(var).cloned())
    }

    fn code(s: &str) -> AirportCode {
        AirportCode::parse(s).unwrap()
    }

    #[test]
    fn defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.airports_path, PathBuf::from("data/airports.json"));
        assert_eq!(
            config.flight_paths,
            vec![
                PathBuf::from("data/connecting_flights.json"),
                PathBuf::from("data/socal_direct_flights.json"),
            ]
        );
        assert_eq!(
            config.allowed_origins,
            vec![code("LAX"), code("SAN"), code("SNA")]
        );
        assert_eq!(config.bind, "127.0.0.1:3000".parse().unwrap());
        assert_eq!(config.cache.ttl, CacheConfig::default().ttl);
    }

    #[test]
    fn overrides() {
        let config = config(&[
            ("PLANNER_AIRPORTS", "/srv/airports.json"),
            ("PLANNER_FLIGHTS", " a.json, ,b.json "),
            ("PLANNER_ALLOWED_ORIGINS", "ont, bur"),
            ("PLANNER_BIND", "0.0.0.0:8080"),
            ("PLANNER_CACHE_TTL_SECS", "30"),
        ])
        .unwrap();

        assert_eq!(config.airports_path, PathBuf::from("/srv/airports.json"));
        assert_eq!(
            config.flight_paths,
            vec![PathBuf::from("a.json"), PathBuf::from("b.json")]
        );
        assert_eq!(config.allowed_origins, vec![code("ONT"), code("BUR")]);
        assert_eq!(config.bind.port(), 8080);
        assert_eq!(config.cache.ttl, Duration::from_secs(30));
    }

    #[test]
    fn invalid_values_are_errors() {
        assert!(matches!(
            config(&[("PLANNER_ALLOWED_ORIGINS", "LAX,L@X")]),
            Err(ConfigError::InvalidOrigin { .. })
        ));
        assert!(matches!(
            config(&[("PLANNER_BIND", "localhost")]),
            Err(ConfigError::InvalidBind { .. })
        ));
        assert!(matches!(
            config(&[("PLANNER_CACHE_TTL_SECS", "-1")]),
            Err(ConfigError::InvalidTtl { .. })
        ));
        assert!(matches!(
            config(&[("PLANNER_FLIGHTS", " , ")]),
            Err(ConfigError::NoFiles { .. })
        ));
    }
}
