//! Process configuration from environment variables.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use crate::agent::AgentConfig;
use crate::catalog::CatalogConfig;
use crate::geocode::GeocoderConfig;
use crate::ranking::RankingConfig;
use crate::routing::{GoogleRoutesConfig, RouteClientConfig};

/// Default bind host.
const DEFAULT_HOST: &str = "127.0.0.1";

/// Default bind port.
const DEFAULT_PORT: u16 = 8000;

/// Default log filter.
const DEFAULT_LOG_LEVEL: &str = "info";

/// Default directory holding the shelter datasets.
const DEFAULT_DATA_DIR: &str = "simulation";

/// Errors from reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable is set but does not parse
    #[error("{name} must be {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },

    /// The host is neither `localhost` nor an IP address
    #[error("APP_HOST must parse to an IPv4 or IPv6 address")]
    InvalidHost(#[from] std::net::AddrParseError),
}

/// HTTP server binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }
        let ip: IpAddr = self.host.parse()?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Everything the binary needs, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub log_level: String,
    pub data_dir: PathBuf,
    /// Maps Platform key for routes and geocoding, if any
    pub maps_api_key: Option<String>,
    pub route: RouteClientConfig,
    pub ranking: RankingConfig,
    pub agent: AgentConfig,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, which returns a variable's value
    /// if it is set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let server = ServerConfig {
            host: var("APP_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_var(&var, "APP_PORT", "a port number")?.unwrap_or(DEFAULT_PORT),
        };

        let mut route = RouteClientConfig::new();
        if let Some(url) = var("EVACU_BACKEND_URL") {
            route = route.with_base_url(url);
        }
        if let Some(retries) = parse_var(&var, "ROUTE_RETRIES", "a non-negative integer")? {
            route = route.with_retries(retries);
        }
        if let Some(secs) = parse_var(&var, "ROUTE_TIMEOUT_SECS", "a whole number of seconds")? {
            route = route.with_timeout(secs);
        }

        let ranking = match parse_var(&var, "ROUTE_MAX_CONCURRENT", "a positive integer")? {
            Some(0) => {
                return Err(ConfigError::Invalid {
                    name: "ROUTE_MAX_CONCURRENT",
                    expected: "a positive integer",
                    value: "0".to_string(),
                });
            }
            Some(n) => RankingConfig::new(n),
            None => RankingConfig::default(),
        };

        let mut agent = AgentConfig::new();
        if let Some(model) = var("AGENT_MODEL") {
            agent = agent.with_model(model);
        }
        if let Some(key) = var("GOOGLE_API_KEY") {
            agent = agent.with_api_key(key);
        }

        Ok(Self {
            server,
            log_level: var("APP_LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            data_dir: var("SHELTER_DATA_DIR")
                .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string())
                .into(),
            maps_api_key: var("GOOGLE_MAPS_API_KEY").or_else(|| var("GOOGLE_MAPS_API")),
            route,
            ranking,
            agent,
        })
    }

    pub fn catalog(&self) -> CatalogConfig {
        CatalogConfig::in_dir(&self.data_dir)
    }

    /// Google Routes settings, if a key is configured.
    pub fn google_routes(&self) -> Option<GoogleRoutesConfig> {
        self.maps_api_key.as_deref().map(GoogleRoutesConfig::new)
    }

    /// Geocoder settings, if a key is configured.
    pub fn geocoder(&self) -> Option<GeocoderConfig> {
        self.maps_api_key.as_deref().map(GeocoderConfig::new)
    }
}

fn parse_var<T, F>(var: &F, name: &'static str, expected: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    var(name)
        .map(|value| {
            value.trim().parse().map_err(|_| ConfigError::Invalid {
                name,
                expected,
                value,
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let env: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| env.get(name).cloned())
    }

    #[test]
    fn defaults_when_env_missing() {
        let config = load(&[]).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.data_dir, PathBuf::from("simulation"));
        assert_eq!(config.route.base_url, "http://localhost:8000");
        assert_eq!(config.route.max_retries, 1);
        assert_eq!(config.route.timeout_secs, 6);
        assert_eq!(config.ranking.concurrency(), 4);
        assert!(config.maps_api_key.is_none());
        assert!(config.google_routes().is_none());
        assert!(config.agent.api_key.is_none());
    }

    #[test]
    fn reads_overrides() {
        let config = load(&[
            ("APP_HOST", "0.0.0.0"),
            ("APP_PORT", "9000"),
            ("EVACU_BACKEND_URL", "http://routes.internal:8080"),
            ("ROUTE_RETRIES", "3"),
            ("ROUTE_TIMEOUT_SECS", "2"),
            ("ROUTE_MAX_CONCURRENT", "8"),
            ("SHELTER_DATA_DIR", "/data"),
            ("AGENT_MODEL", "other-model"),
            ("GOOGLE_API_KEY", "agent-key"),
        ])
        .unwrap();

        assert_eq!(config.server.socket_addr().unwrap().to_string(), "0.0.0.0:9000");
        assert_eq!(config.route.base_url, "http://routes.internal:8080");
        assert_eq!(config.route.max_retries, 3);
        assert_eq!(config.route.timeout_secs, 2);
        assert_eq!(config.ranking.concurrency(), 8);
        assert_eq!(
            config.catalog().raw_path,
            PathBuf::from("/data/florida_shelters.json")
        );
        assert_eq!(config.agent.model, "other-model");
        assert_eq!(config.agent.api_key.as_deref(), Some("agent-key"));
    }

    #[test]
    fn maps_key_falls_back_to_legacy_name() {
        let config = load(&[("GOOGLE_MAPS_API", "legacy")]).unwrap();
        assert_eq!(config.maps_api_key.as_deref(), Some("legacy"));

        let config = load(&[("GOOGLE_MAPS_API_KEY", "primary"), ("GOOGLE_MAPS_API", "legacy")])
            .unwrap();
        assert_eq!(config.maps_api_key.as_deref(), Some("primary"));
        assert_eq!(config.geocoder().unwrap().api_key, "primary");
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = load(&[("GOOGLE_MAPS_API_KEY", " "), ("APP_PORT", "")]).unwrap();
        assert!(config.maps_api_key.is_none());
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn invalid_numbers_are_errors() {
        let err = load(&[("APP_PORT", "eighty")]).unwrap_err();
        assert_eq!(err.to_string(), "APP_PORT must be a port number, got \"eighty\"");

        assert!(load(&[("ROUTE_RETRIES", "-1")]).is_err());
        assert!(load(&[("ROUTE_MAX_CONCURRENT", "0")]).is_err());
    }

    #[test]
    fn localhost_resolves_to_loopback() {
        let server = ServerConfig {
            host: "localhost".into(),
            port: 3000,
        };
        assert_eq!(server.socket_addr().unwrap().to_string(), "127.0.0.1:3000");

        let server = ServerConfig {
            host: "not-an-ip".into(),
            port: 3000,
        };
        assert!(matches!(server.socket_addr(), Err(ConfigError::InvalidHost(_))));
    }
}
