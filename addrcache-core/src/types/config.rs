//! Cache configuration.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::TimeUnit;
use crate::constants::{
    DEFAULT_EXPIRY_WORKERS, DEFAULT_MAX_AGE, DEFAULT_TIME_UNIT, ENV_EXPIRY_WORKERS, ENV_MAX_AGE,
    ENV_TIME_UNIT,
};
use crate::error::{AddressCacheError, Result};

fn default_expiry_workers() -> usize {
    DEFAULT_EXPIRY_WORKERS
}

/// Address cache configuration.
///
/// An entry is removed no later than `max_age` `unit`s after it was added.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum age of an entry, in `unit`s
    pub max_age: u64,
    /// Unit of `max_age`
    pub unit: TimeUnit,
    /// Worker threads firing expiry timers
    #[serde(default = "default_expiry_workers")]
    pub expiry_workers: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_age: DEFAULT_MAX_AGE,
            unit: DEFAULT_TIME_UNIT,
            expiry_workers: DEFAULT_EXPIRY_WORKERS,
        }
    }
}

impl CacheConfig {
    /// Creates a configuration with the default worker pool size.
    pub fn new(max_age: u64, unit: TimeUnit) -> Self {
        Self {
            max_age,
            unit,
            ..Self::default()
        }
    }

    /// Sets the number of expiry worker threads.
    pub fn expiry_workers(mut self, workers: usize) -> Self {
        self.expiry_workers = workers;
        self
    }

    /// Returns the maximum age as a [`Duration`], validating it.
    pub fn ttl(&self) -> Result<Duration> {
        if self.max_age == 0 {
            return Err(AddressCacheError::InvalidConfiguration(
                "max age must be positive".into(),
            ));
        }
        self.unit.to_duration(self.max_age).ok_or_else(|| {
            AddressCacheError::InvalidConfiguration(format!(
                "max age of {} {} is too large",
                self.max_age, self.unit
            ))
        })
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        self.ttl()?;
        if self.expiry_workers == 0 {
            return Err(AddressCacheError::InvalidConfiguration(
                "expiry worker pool cannot be empty".into(),
            ));
        }
        Ok(())
    }

    /// Parses a configuration from JSON. Missing `expiry_workers` takes the default.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads the configuration from `ADDRCACHE_*` environment variables.
    ///
    /// Unset variables fall back to the defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            max_age: parse_or(&lookup, ENV_MAX_AGE, defaults.max_age)?,
            unit: parse_or(&lookup, ENV_TIME_UNIT, defaults.unit)?,
            expiry_workers: parse_or(&lookup, ENV_EXPIRY_WORKERS, defaults.expiry_workers)?,
        };
        config.validate()?;
        Ok(config)
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => value.trim().parse::<T>().map_err(|e| {
            AddressCacheError::ConfigError(format!("failed to parse `{key}` value `{value}`: {e}"))
        }),
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
    fn test_default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.max_age, DEFAULT_MAX_AGE);
        assert_eq!(config.unit, TimeUnit::Seconds);
        assert_eq!(config.expiry_workers, DEFAULT_EXPIRY_WORKERS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_max_age_rejected() {
        let err = CacheConfig::new(0, TimeUnit::Seconds).validate().unwrap_err();
        assert!(matches!(err, AddressCacheError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_overflowing_max_age_rejected() {
        let err = CacheConfig::new(u64::MAX, TimeUnit::Days).ttl().unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn test_empty_worker_pool_rejected() {
        let config = CacheConfig::new(5, TimeUnit::Seconds).expiry_workers(0);
        assert!(config.validate().unwrap_err().is_configuration_error());
    }

    #[test]
    fn test_ttl() {
        let config = CacheConfig::new(3, TimeUnit::Minutes);
        assert_eq!(config.ttl().unwrap(), Duration::from_secs(180));
    }

    #[test]
    fn test_from_json_defaults_workers() {
        let config = CacheConfig::from_json(r#"{"max_age": 500, "unit": "milliseconds"}"#).unwrap();
        assert_eq!(config.max_age, 500);
        assert_eq!(config.unit, TimeUnit::Milliseconds);
        assert_eq!(config.expiry_workers, DEFAULT_EXPIRY_WORKERS);
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(matches!(
            CacheConfig::from_json("not json"),
            Err(AddressCacheError::JsonError(_))
        ));
        assert!(matches!(
            CacheConfig::from_json(r#"{"max_age": 0, "unit": "seconds"}"#),
            Err(AddressCacheError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_from_lookup_all_set() {
        let config = CacheConfig::from_lookup(lookup_from(&[
            (ENV_MAX_AGE, "20"),
            (ENV_TIME_UNIT, "ms"),
            (ENV_EXPIRY_WORKERS, "2"),
        ]))
        .unwrap();
        assert_eq!(config, CacheConfig::new(20, TimeUnit::Milliseconds).expiry_workers(2));
    }

    #[test]
    fn test_from_lookup_unset_uses_defaults() {
        let config = CacheConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, CacheConfig::default());
    }

    #[test]
    fn test_from_lookup_malformed() {
        let err = CacheConfig::from_lookup(lookup_from(&[(ENV_MAX_AGE, "soon")])).unwrap_err();
        assert!(matches!(err, AddressCacheError::ConfigError(_)));
        assert!(err.to_string().contains(ENV_MAX_AGE));
    }
}
