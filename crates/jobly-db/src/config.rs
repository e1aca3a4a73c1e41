//! Database connection settings.

use crate::error::{JoblyError, JoblyResult};
use serde::Deserialize;

const DEFAULT_POOL_SIZE: usize = 16;

/// Connection settings for the jobly database.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DbConfig {
    /// Postgres connection URL.
    pub url: String,
    /// Maximum number of pooled connections.
    #[serde(default = "default_pool_size")]
    pub max_pool_size: usize,
}

fn default_pool_size() -> usize {
    DEFAULT_POOL_SIZE
}

impl DbConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_pool_size: DEFAULT_POOL_SIZE,
        }
    }

    /// Override the pool size.
    pub fn max_pool_size(mut self, size: usize) -> Self {
        self.max_pool_size = size;
        self
    }

    /// Read `DATABASE_URL` and the optional `DATABASE_POOL_SIZE`, loading a `.env` file first
    /// if one exists.
    pub fn from_env() -> JoblyResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> JoblyResult<Self> {
        let url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| JoblyError::Config("DATABASE_URL is not set".to_string()))?;

        let mut config = Self::new(url);
        if let Some(raw) = lookup("DATABASE_POOL_SIZE") {
            let size: usize = raw.trim().parse().map_err(|_| {
                JoblyError::Config(format!("DATABASE_POOL_SIZE must be a positive integer, got {raw:?}"))
            })?;
            config.max_pool_size = size;
        }
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pool cannot work with.
    pub fn validate(&self) -> JoblyResult<()> {
        if self.max_pool_size == 0 {
            return Err(JoblyError::Config(
                "max_pool_size must be at least 1".to_string(),
            ));
        }
        self.url
            .parse::<tokio_postgres::Config>()
            .map(|_| ())
            .map_err(|e| JoblyError::Config(format!("invalid DATABASE_URL: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn reads_url_and_default_pool_size() {
        let config =
            DbConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/jobly")]))
                .unwrap();
        assert_eq!(config.url, "postgres://localhost/jobly");
        assert_eq!(config.max_pool_size, 16);
    }

    #[test]
    fn reads_pool_size() {
        let config = DbConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/jobly"),
            ("DATABASE_POOL_SIZE", "4"),
        ]))
        .unwrap();
        assert_eq!(config.max_pool_size, 4);
    }

    #[test]
    fn missing_url_is_a_config_error() {
        let err = DbConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, JoblyError::Config(_)));
    }

    #[test]
    fn bad_pool_size_is_rejected() {
        for size in ["zero", "0"] {
            let err = DbConfig::from_lookup(lookup(&[
                ("DATABASE_URL", "postgres://localhost/jobly"),
                ("DATABASE_POOL_SIZE", size),
            ]))
            .unwrap_err();
            assert!(matches!(err, JoblyError::Config(_)));
        }
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: DbConfig =
            serde_json::from_str(r#"{"url": "postgres://localhost/jobly_test"}"#).unwrap();
        assert_eq!(config, DbConfig::new("postgres://localhost/jobly_test"));
    }
}
