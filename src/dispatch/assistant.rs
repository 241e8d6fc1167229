use anyhow::Result;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

use super::error::AssignmentError;
use super::ranker::Ranker;
use super::types::{Course, Driver};
use crate::config::Config;
use crate::credentials::ApiKey;
use crate::distance::{
    DistanceCache, DistanceMatrixClient, DistanceOracle, DistanceProvider, DistanceResult,
    RetryPolicy,
};
use crate::scoring::{validate_scoring, DriverScore, Scorer};

/// Entry point for "who should take this course?".
///
/// Checks credentials and input shape, then hands the pool to the [`Ranker`].
pub struct DispatchAssistant {
    ranker: Ranker,
}

impl DispatchAssistant {
    pub fn new(ranker: Ranker) -> Self {
        Self { ranker }
    }

    /// Wire the full stack (HTTP client, cache, retries, scoring) from config.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = DistanceMatrixClient::from_config(&config.maps)?;
        Ok(Self::with_provider(config, Arc::new(client))?)
    }

    /// Same as [`from_config`](Self::from_config) with a caller-supplied distance provider.
    ///
    /// Rejects a scoring config that fails [`validate_scoring`], so scores stay within 0-100.
    pub fn with_provider(
        config: &Config,
        provider: Arc<dyn DistanceProvider>,
    ) -> Result<Self, AssignmentError> {
        validate_scoring(&config.scoring).map_err(|errors| {
            AssignmentError::Configuration(format!(
                "invalid scoring config: {}",
                errors.join("; ")
            ))
        })?;

        let cache = DistanceCache::with_system_clock(config.cache.ttl, config.cache.capacity);
        let oracle = DistanceOracle::new(provider, cache)
            .with_retry_policy(RetryPolicy::new(
                config.lookup.max_retries,
                config.lookup.backoff,
            ))
            .with_attempt_timeout(config.maps.timeout);
        let scorer = Scorer::new(oracle, config.scoring.clone());
        Ok(Self::new(
            Ranker::new(scorer).with_max_concurrent(config.lookup.max_concurrent),
        ))
    }

    pub fn oracle(&self) -> &DistanceOracle {
        self.ranker.scorer().oracle()
    }

    /// Rank `drivers` for `course`, best first.
    ///
    /// Fails only on missing credentials or malformed input. Distance lookup
    /// problems are folded into the affected drivers' scores.
    pub async fn suggest_best_driver(
        &self,
        drivers: &[Driver],
        course: &Course,
        credentials: Option<&ApiKey>,
    ) -> Result<Vec<DriverScore>, AssignmentError> {
        let key = require_key(credentials)?;
        validate_course(course)?;
        validate_drivers(drivers)?;

        info!(
            drivers = drivers.len(),
            course = course.id.as_deref().unwrap_or("-"),
            "Ranking drivers"
        );

        let ranked = self.ranker.rank(drivers, course, key).await;

        if let Some(best) = ranked.first() {
            info!(driver = %best.driver_id, score = best.score, "Best candidate");
        }
        Ok(ranked)
    }

    /// Single origin to destination lookup, through the same cache and retry path.
    pub async fn distance(
        &self,
        origin: &str,
        destination: &str,
        credentials: Option<&ApiKey>,
    ) -> Result<DistanceResult, AssignmentError> {
        let key = require_key(credentials)?;
        Ok(self.oracle().lookup(origin, destination, key).await)
    }
}

fn require_key(credentials: Option<&ApiKey>) -> Result<&ApiKey, AssignmentError> {
    credentials.ok_or_else(|| {
        AssignmentError::Configuration(format!(
            "no maps API key: set {} or maps.api_key in the config file",
            crate::credentials::ENV_KEY_VAR
        ))
    })
}

/// A course needs a non-blank pickup address.
pub fn validate_course(course: &Course) -> Result<(), AssignmentError> {
    if course.pickup.trim().is_empty() {
        return Err(AssignmentError::InvalidCourse(
            "pickup address is empty".to_string(),
        ));
    }
    Ok(())
}

/// Every driver needs a non-blank id and name, and ids must be unique.
pub fn validate_drivers(drivers: &[Driver]) -> Result<(), AssignmentError> {
    let mut seen = HashSet::new();
    for (index, driver) in drivers.iter().enumerate() {
        let reason = if driver.id.trim().is_empty() {
            Some("id is empty".to_string())
        } else if driver.name.trim().is_empty() {
            Some(format!("driver {} has an empty name", driver.id))
        } else if !seen.insert(driver.id.as_str()) {
            Some(format!("duplicate id {}", driver.id))
        } else {
            None
        };

        if let Some(reason) = reason {
            return Err(AssignmentError::InvalidDriver { index, reason });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::LookupError;
    use crate::test_support::{km, test_key, Reply, ScriptedProvider};

    fn assistant_with(provider: Arc<ScriptedProvider>) -> DispatchAssistant {
        DispatchAssistant::with_provider(&Config::default(), provider).unwrap()
    }

    fn ids(scores: &[DriverScore]) -> Vec<&str> {
        scores.iter().map(|s| s.driver_id.as_str()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_driver_beats_busy_nearby_driver() {
        let provider = Arc::new(ScriptedProvider::always(Reply::Found(km(5.0))));
        let assistant = assistant_with(provider.clone());
        let drivers = vec![
            Driver::new("D2", "Laurence")
                .with_courses_today(5)
                .with_last_drop_off("10 Rue A"),
            Driver::new("D1", "Dunois").with_courses_today(1),
        ];

        let ranked = assistant
            .suggest_best_driver(&drivers, &Course::new("12 Rue A"), Some(&test_key()))
            .await
            .unwrap();

        assert_eq!(ids(&ranked), vec!["D1", "D2"]);
        assert_eq!(ranked[0].score, 85);
        assert_eq!(ranked[1].score, 80);
        assert_eq!(ranked[1].distance_km(), Some(5.0));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeouts_degrade_to_fallback() {
        let provider = Arc::new(ScriptedProvider::always(Reply::Hang));
        let assistant = assistant_with(provider.clone());
        let drivers = vec![Driver::new("D3", "Franck")
            .with_courses_today(3)
            .with_last_drop_off("Brou, France")];

        let ranked = assistant
            .suggest_best_driver(&drivers, &Course::new("Dangeau"), Some(&test_key()))
            .await
            .unwrap();

        assert_eq!(provider.calls(), 3);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].score, 20 + 20 + 30);
        assert!(ranked[0].details().starts_with("Distance: not computed (20 pts default)"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_pool() {
        let assistant = assistant_with(Arc::new(ScriptedProvider::always(Reply::Hang)));
        let ranked = assistant
            .suggest_best_driver(&[], &Course::new("Chartres"), Some(&test_key()))
            .await
            .unwrap();
        assert!(ranked.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_equal_scores_keep_input_order() {
        let provider = Arc::new(ScriptedProvider::always(Reply::Found(km(12.0))));
        let assistant = assistant_with(provider);
        // 30 + 20 + 30 for both
        let drivers = vec![
            Driver::new("first", "A")
                .with_courses_today(3)
                .with_last_drop_off("Brou"),
            Driver::new("second", "B")
                .with_courses_today(4)
                .with_last_drop_off("Bonneval"),
        ];

        let ranked = assistant
            .suggest_best_driver(&drivers, &Course::new("Chartres"), Some(&test_key()))
            .await
            .unwrap();

        assert_eq!(ranked[0].score, ranked[1].score);
        assert_eq!(ids(&ranked), vec!["first", "second"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_credentials_is_configuration_error() {
        let provider = Arc::new(ScriptedProvider::always(Reply::Found(km(1.0))));
        let assistant = assistant_with(provider.clone());
        let drivers = vec![Driver::new("1", "A").with_last_drop_off("Brou")];

        let err = assistant
            .suggest_best_driver(&drivers, &Course::new("Chartres"), None)
            .await
            .unwrap_err();

        assert!(err.is_configuration());
        assert!(err.to_string().contains("DISPATCH_MAPS_API_KEY"));
        assert_eq!(provider.calls(), 0);

        let err = assistant.distance("Brou", "Chartres", None).await.unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_out_of_range_scoring_config_rejected() {
        let mut config = Config::default();
        config.scoring.availability_points = 90;
        let provider = Arc::new(ScriptedProvider::always(Reply::Hang));

        let err = match DispatchAssistant::with_provider(&config, provider) {
            Ok(_) => panic!("scoring config above the caps was accepted"),
            Err(err) => err,
        };

        assert!(err.is_configuration());
        assert!(err.to_string().contains("scoring.availability_points"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_pickup_rejected() {
        let assistant = assistant_with(Arc::new(ScriptedProvider::always(Reply::Hang)));
        let err = assistant
            .suggest_best_driver(&[], &Course::new("  "), Some(&test_key()))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            AssignmentError::InvalidCourse("pickup address is empty".to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_driver_names_offending_record() {
        let assistant = assistant_with(Arc::new(ScriptedProvider::always(Reply::Hang)));
        let drivers = vec![Driver::new("1", "A"), Driver::new("2", " ")];

        let err = assistant
            .suggest_best_driver(&drivers, &Course::new("Chartres"), Some(&test_key()))
            .await
            .unwrap_err();

        assert!(matches!(err, AssignmentError::InvalidDriver { index: 1, .. }));
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_validate_drivers() {
        assert!(validate_drivers(&[]).is_ok());
        assert!(validate_drivers(&[Driver::new("1", "A"), Driver::new("2", "B")]).is_ok());

        let err = validate_drivers(&[Driver::new("", "A")]).unwrap_err();
        assert_eq!(
            err,
            AssignmentError::InvalidDriver {
                index: 0,
                reason: "id is empty".to_string()
            }
        );

        let err = validate_drivers(&[Driver::new("7", "A"), Driver::new("7", "B")]).unwrap_err();
        assert!(matches!(err, AssignmentError::InvalidDriver { index: 1, ref reason } if reason.contains("duplicate")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_distance_lookup_is_cached() {
        let provider = Arc::new(ScriptedProvider::sequence(
            vec![Reply::Found(km(7.5))],
            Reply::Fail(LookupError::RouteStatus("ZERO_RESULTS".into())),
        ));
        let assistant = assistant_with(provider.clone());

        let first = assistant
            .distance("Brou", "Chartres", Some(&test_key()))
            .await
            .unwrap();
        let second = assistant
            .distance("  BROU ", "chartres", Some(&test_key()))
            .await
            .unwrap();

        assert_eq!(first.distance(), Some(km(7.5)));
        assert_eq!(second, first);
        assert_eq!(provider.calls(), 1);
    }
}
