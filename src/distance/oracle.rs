use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_retry::RetryIf;
use tracing::{debug, warn};

use super::cache::DistanceCache;
use super::client::DistanceProvider;
use super::error::LookupError;
use super::retry::RetryPolicy;
use super::types::{Distance, DistanceQuery, DistanceResult};
use crate::credentials::ApiKey;

/// Default bound on a single provider call
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(8);

/// Cache-first distance lookups with bounded retries.
///
/// Successful answers are cached under the normalized ordered address pair.
/// Failures are returned as [`DistanceResult::Failed`] and never cached, so a
/// short outage does not stick for a whole TTL window. Dropping the future
/// returned by [`DistanceOracle::lookup`] abandons any in-flight call without
/// retrying or caching it.
pub struct DistanceOracle {
    provider: Arc<dyn DistanceProvider>,
    cache: DistanceCache,
    retry: RetryPolicy,
    attempt_timeout: Duration,
}

impl DistanceOracle {
    pub fn new(provider: Arc<dyn DistanceProvider>, cache: DistanceCache) -> Self {
        Self {
            provider,
            cache,
            retry: RetryPolicy::default(),
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub fn cache(&self) -> &DistanceCache {
        &self.cache
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Distance and duration from `origin` to `destination`.
    pub async fn lookup(&self, origin: &str, destination: &str, key: &ApiKey) -> DistanceResult {
        let query = DistanceQuery::new(origin, destination);

        if let Some(distance) = self.cache.get(&query) {
            debug!(origin, destination, "Distance cache hit");
            return DistanceResult::Found(distance);
        }

        let attempts = AtomicU32::new(0);
        let outcome = RetryIf::spawn(
            self.retry.delays(),
            || self.attempt(origin, destination, key, &attempts),
            |err: &LookupError| {
                let retry = err.is_transient();
                if retry {
                    debug!(
                        origin,
                        destination,
                        attempt = attempts.load(Ordering::Relaxed),
                        error = %err,
                        "Transient distance lookup failure"
                    );
                }
                retry
            },
        )
        .await;

        match outcome {
            Ok(distance) => {
                self.cache.insert(query, distance);
                DistanceResult::Found(distance)
            }
            Err(err) => {
                warn!(
                    origin,
                    destination,
                    attempts = attempts.load(Ordering::Relaxed),
                    error = %err,
                    "Distance lookup failed"
                );
                DistanceResult::Failed(err)
            }
        }
    }

    async fn attempt(
        &self,
        origin: &str,
        destination: &str,
        key: &ApiKey,
        attempts: &AtomicU32,
    ) -> Result<Distance, LookupError> {
        attempts.fetch_add(1, Ordering::Relaxed);
        match tokio::time::timeout(
            self.attempt_timeout,
            self.provider.fetch(origin, destination, key),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(LookupError::Timeout),
        }
    }
}
