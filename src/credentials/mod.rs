use serde::{Deserialize, Deserializer};
use std::fmt;

/// Environment variable name for providing the maps API key without a config file
pub const ENV_KEY_VAR: &str = "DISPATCH_MAPS_API_KEY";

/// Opaque credential for the distance lookup service.
///
/// The raw value is only reachable through [`ApiKey::expose`]; `Debug` and
/// `Display` never print it, so the key can travel through structs that end
/// up in log output.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a raw key. Returns None for empty or whitespace-only input.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// The cleartext key, for building outgoing requests only
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(****)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("****")
    }
}

impl<'de> Deserialize<'de> for ApiKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ApiKey::new(raw).ok_or_else(|| serde::de::Error::custom("api_key must not be blank"))
    }
}

/// Check for an API key in the DISPATCH_MAPS_API_KEY environment variable.
/// Returns Some(key) if the env var is set and non-empty, None otherwise.
pub fn get_key_from_env() -> Option<ApiKey> {
    std::env::var(ENV_KEY_VAR).ok().and_then(ApiKey::new)
}

/// Resolve the key to use: the environment wins over the config file.
pub fn resolve_api_key(configured: Option<&ApiKey>) -> Option<ApiKey> {
    pick_key(get_key_from_env(), configured)
}

fn pick_key(from_env: Option<ApiKey>, configured: Option<&ApiKey>) -> Option<ApiKey> {
    from_env.or_else(|| configured.cloned())
}
