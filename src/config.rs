use anyhow::{Context, Result, anyhow, bail};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

/// Which store backs the data gateway.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataBackend {
    MySql { database_url: String, run_migrations: bool },
    Rest { service_url: String, service_key: String },
    Memory,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    pub jwt_secret: String,
    pub data_backend: DataBackend,
    pub access_token_ttl: usize,
    pub refresh_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_refresh_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    pub log_dir: String,
    pub log_level: tracing::Level,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).ok_or_else(|| anyhow!("{key} must be set"));

        let data_backend = match lookup("DATA_BACKEND").as_deref().unwrap_or("mysql") {
            "mysql" => DataBackend::MySql {
                database_url: required("DATABASE_URL")?,
                run_migrations: parse_or(&lookup, "RUN_MIGRATIONS", true)?,
            },
            "rest" => DataBackend::Rest {
                service_url: required("DATA_SERVICE_URL")?
                    .trim_end_matches('/')
                    .to_string(),
                service_key: required("DATA_SERVICE_KEY")?,
            },
            "memory" => DataBackend::Memory,
            other => bail!("DATA_BACKEND must be one of mysql, rest, memory (got {other})"),
        };

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            jwt_secret: required("JWT_SECRET")?,
            data_backend,
            access_token_ttl: parse_or(&lookup, "ACCESS_TOKEN_TTL", 900)?, // default 15 min
            refresh_token_ttl: parse_or(&lookup, "REFRESH_TOKEN_TTL", 604_800)?, // default 7 days

            rate_login_per_min: parse_or(&lookup, "RATE_LOGIN_PER_MIN", 60)?,
            rate_refresh_per_min: parse_or(&lookup, "RATE_REFRESH_PER_MIN", 30)?,
            rate_protected_per_min: parse_or(&lookup, "RATE_PROTECTED_PER_MIN", 1000)?,

            api_prefix: lookup("API_PREFIX").unwrap_or_else(|| "/api".to_string()),

            log_dir: lookup("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
            log_level: parse_or(&lookup, "LOG_LEVEL", tracing::Level::DEBUG)?,
        })
    }
}

#[cfg(test)]
impl Config {
    /// In-memory backend with limits high enough to stay out of the way.
    pub fn for_tests() -> Self {
        Self {
            server_addr: "127.0.0.1:0".into(),
            jwt_secret: "test-secret".into(),
            data_backend: DataBackend::Memory,
            access_token_ttl: 900,
            refresh_token_ttl: 3600,
            rate_login_per_min: 10_000,
            rate_refresh_per_min: 10_000,
            rate_protected_per_min: 10_000,
            api_prefix: "/api".into(),
            log_dir: "logs".into(),
            log_level: tracing::Level::DEBUG,
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| anyhow!("{e}"))
            .with_context(|| format!("{key} has an invalid value {raw:?}")),
        None => Ok(default),
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
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_for_optional_keys() {
        let config = Config::from_lookup(lookup_from(&[
            ("SERVER_ADDR", "127.0.0.1:8080"),
            ("JWT_SECRET", "secret"),
            ("DATABASE_URL", "mysql://localhost/taskify"),
        ]))
        .unwrap();

        assert_eq!(config.access_token_ttl, 900);
        assert_eq!(config.refresh_token_ttl, 604_800);
        assert_eq!(config.api_prefix, "/api");
        assert_eq!(config.log_level, tracing::Level::DEBUG);
        assert_eq!(
            config.data_backend,
            DataBackend::MySql {
                database_url: "mysql://localhost/taskify".into(),
                run_migrations: true
            }
        );
    }

    #[test]
    fn rest_backend_needs_service_credentials() {
        let err = Config::from_lookup(lookup_from(&[
            ("SERVER_ADDR", "127.0.0.1:8080"),
            ("JWT_SECRET", "secret"),
            ("DATA_BACKEND", "rest"),
            ("DATA_SERVICE_URL", "https://project.example.co/"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("DATA_SERVICE_KEY"));

        let config = Config::from_lookup(lookup_from(&[
            ("SERVER_ADDR", "127.0.0.1:8080"),
            ("JWT_SECRET", "secret"),
            ("DATA_BACKEND", "rest"),
            ("DATA_SERVICE_URL", "https://project.example.co/"),
            ("DATA_SERVICE_KEY", "service-role"),
        ]))
        .unwrap();
        assert_eq!(
            config.data_backend,
            DataBackend::Rest {
                service_url: "https://project.example.co".into(),
                service_key: "service-role".into()
            }
        );
    }

    #[test]
    fn malformed_numbers_name_the_key() {
        let err = Config::from_lookup(lookup_from(&[
            ("SERVER_ADDR", "127.0.0.1:8080"),
            ("JWT_SECRET", "secret"),
            ("DATA_BACKEND", "memory"),
            ("ACCESS_TOKEN_TTL", "fifteen"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("ACCESS_TOKEN_TTL"));
    }
}
