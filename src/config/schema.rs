use serde::Deserialize;
use std::time::Duration;

use crate::credentials::ApiKey;
use crate::distance::cache::{DEFAULT_CAPACITY, DEFAULT_TTL};
use crate::distance::client::DISTANCE_MATRIX_URL;
use crate::distance::oracle::DEFAULT_ATTEMPT_TIMEOUT;
use crate::scoring::ScoringConfig;

/// Top-level config file. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub maps: MapsConfig,
    pub lookup: LookupConfig,
    pub cache: CacheConfig,
    pub scoring: ScoringConfig,
}

/// Distance lookup service settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapsConfig {
    pub endpoint: String,
    pub language: String,
    pub units: String,
    /// Per-attempt bound on one request
    #[serde(deserialize_with = "duration_str::deserialize")]
    pub timeout: Duration,
    /// Overridden by DISPATCH_MAPS_API_KEY when that is set
    pub api_key: Option<ApiKey>,
}

impl Default for MapsConfig {
    fn default() -> Self {
        Self {
            endpoint: DISTANCE_MATRIX_URL.to_string(),
            language: "fr".to_string(),
            units: "metric".to_string(),
            timeout: DEFAULT_ATTEMPT_TIMEOUT,
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LookupConfig {
    /// Extra attempts after the first, for timeouts and network errors only
    pub max_retries: u32,
    /// Wait before retry n is `backoff * n`
    #[serde(deserialize_with = "duration_str::deserialize")]
    pub backoff: Duration,
    pub max_concurrent: usize,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff: Duration::from_secs(1),
            max_concurrent: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    #[serde(deserialize_with = "duration_str::deserialize")]
    pub ttl: Duration,
    /// 0 disables caching
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Durations written the human way: "8s", "1h", "1m 30s"
mod duration_str {
    use serde::{de, Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(raw.trim())
            .map_err(|e| de::Error::custom(format!("invalid duration '{}': {}", raw, e)))
    }
}
