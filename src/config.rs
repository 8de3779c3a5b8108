// Runtime configuration read from the environment (after `.env` is loaded)

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

pub const DEV_JWT_SECRET: &str = "dev-secret-key";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} has an invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// `None` runs the service on the in-memory store
    pub database: Option<DatabaseConfig>,
    pub jwt_secret: String,
    pub bind_addr: SocketAddr,
    pub cache_ttl: Duration,
    pub cache_max_entries: usize,
    pub cors_allow_any: bool,
    pub bcrypt_cost: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database = match lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()) {
            Some(url) => Some(DatabaseConfig {
                url,
                max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?,
            }),
            None => {
                tracing::warn!("DATABASE_URL not set, using the in-memory store");
                None
            }
        };

        let jwt_secret = match lookup("JWT_SECRET").filter(|secret| !secret.is_empty()) {
            Some(secret) => secret,
            None => {
                tracing::warn!("JWT_SECRET not set, using the development secret");
                DEV_JWT_SECRET.to_string()
            }
        };

        let bcrypt_cost = parse_or(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                name: "BCRYPT_COST",
                value: bcrypt_cost.to_string(),
                reason: "must be between 4 and 31".to_string(),
            });
        }

        Ok(Self {
            database,
            jwt_secret,
            bind_addr: parse_or(&lookup, "BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 3000)))?,
            cache_ttl: Duration::from_secs(parse_or(&lookup, "CACHE_TTL_SECS", 60)?),
            cache_max_entries: parse_or(&lookup, "CACHE_MAX_ENTRIES", 1000)?,
            cors_allow_any: parse_or(&lookup, "CORS_ALLOW_ANY", true)?,
            bcrypt_cost,
        })
    }

    /// In-memory configuration for tests and local experiments
    pub fn for_tests() -> Self {
        Self {
            database: None,
            jwt_secret: "test-secret".to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            cache_ttl: Duration::from_secs(60),
            cache_max_entries: 1000,
            cors_allow_any: true,
            bcrypt_cost: 4,
        }
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(value) => {
            let parsed = value.trim().parse::<T>();
            parsed.map_err(|e| ConfigError::Invalid {
                name,
                reason: e.to_string(),
                value,
            })
        }
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_without_variables() {
        let config = config(&[]).unwrap();
        assert_eq!(config.database, None);
        assert_eq!(config.jwt_secret, DEV_JWT_SECRET);
        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.cache_max_entries, 1000);
        assert!(config.cors_allow_any);
    }

    #[test]
    fn reads_database_settings() {
        let config = config(&[
            ("DATABASE_URL", "postgres://localhost/comptoir"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
        ])
        .unwrap();
        assert_eq!(
            config.database,
            Some(DatabaseConfig {
                url: "postgres://localhost/comptoir".to_string(),
                max_connections: 12,
            })
        );
    }

    #[test]
    fn invalid_number_is_an_error() {
        let error = config(&[("CACHE_TTL_SECS", "soon")]).unwrap_err();
        assert!(matches!(error, ConfigError::Invalid { name: "CACHE_TTL_SECS", .. }));
    }

    #[test]
    fn invalid_bind_address_is_an_error() {
        assert!(config(&[("BIND_ADDR", "localhost")]).is_err());
    }

    #[test]
    fn bcrypt_cost_is_bounded() {
        assert!(config(&[("BCRYPT_COST", "3")]).is_err());
        assert_eq!(config(&[("BCRYPT_COST", "4")]).unwrap().bcrypt_cost, 4);
    }
}
