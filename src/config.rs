use anyhow::{anyhow, Context, Result};
use std::env;

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8080";
const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";
const DEFAULT_POOL_SIZE: u32 = 10;

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// `None` runs the service on the in-memory store.
    pub database_url: Option<String>,
    pub bind_address: String,
    pub allowed_origin: String,
    pub pool_size: u32,
    /// Reject unparsable numeric path segments instead of reading them as 0.
    pub strict_path_params: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            bind_address: DEFAULT_BIND_ADDRESS.to_owned(),
            allowed_origin: DEFAULT_ALLOWED_ORIGIN.to_owned(),
            pool_size: DEFAULT_POOL_SIZE,
            strict_path_params: false,
        }
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(anyhow!("{} must be a boolean, got {:?}", name, value)),
    }
}

impl Config {
    /// Reads `.env` (if present) and then the process environment.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let pool_size = match non_empty("DATABASE_POOL_SIZE") {
            Some(v) => v
                .trim()
                .parse::<u32>()
                .with_context(|| format!("DATABASE_POOL_SIZE must be an integer, got {:?}", v))?,
            None => defaults.pool_size,
        };
        if pool_size == 0 {
            return Err(anyhow!("DATABASE_POOL_SIZE must be at least 1"));
        }
        let strict_path_params = match non_empty("STRICT_PATH_PARAMS") {
            Some(v) => parse_bool("STRICT_PATH_PARAMS", &v)?,
            None => defaults.strict_path_params,
        };

        Ok(Self {
            database_url: non_empty("DATABASE_URL"),
            bind_address: non_empty("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            allowed_origin: non_empty("ALLOWED_ORIGIN").unwrap_or(defaults.allowed_origin),
            pool_size,
            strict_path_params,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        assert_eq!(config_from(&[]).unwrap(), Config::default());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://localhost/articles"),
            ("BIND_ADDRESS", "0.0.0.0:9000"),
            ("ALLOWED_ORIGIN", "https://example.com"),
            ("DATABASE_POOL_SIZE", "4"),
            ("STRICT_PATH_PARAMS", "yes"),
        ])
        .unwrap();
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/articles")
        );
        assert_eq!(config.bind_address, "0.0.0.0:9000");
        assert_eq!(config.allowed_origin, "https://example.com");
        assert_eq!(config.pool_size, 4);
        assert!(config.strict_path_params);
    }

    #[test]
    fn test_blank_values_fall_back() {
        let config = config_from(&[("DATABASE_URL", "  "), ("BIND_ADDRESS", "")]).unwrap();
        assert!(config.database_url.is_none());
        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
    }

    #[test]
    fn test_invalid_values() {
        assert!(config_from(&[("DATABASE_POOL_SIZE", "many")]).is_err());
        assert!(config_from(&[("DATABASE_POOL_SIZE", "0")]).is_err());
        let err = config_from(&[("STRICT_PATH_PARAMS", "maybe")]).unwrap_err();
        assert!(err.to_string().contains("STRICT_PATH_PARAMS"));
    }
}
