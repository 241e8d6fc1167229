use futures::stream::{self, StreamExt};
use tracing::debug;

use super::types::{Course, Driver};
use crate::credentials::ApiKey;
use crate::scoring::{DriverScore, Scorer};

/// Default number of drivers scored at the same time
pub const DEFAULT_MAX_CONCURRENT: usize = 4;

/// Scores a whole pool and orders it best-first.
pub struct Ranker {
    scorer: Scorer,
    max_concurrent: usize,
}

impl Ranker {
    pub fn new(scorer: Scorer) -> Self {
        Self {
            scorer,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }

    /// Bound on in-flight scorings (and so on concurrent distance lookups). 0 is treated as 1.
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    /// Score every driver independently and return all of them, best first.
    ///
    /// Drivers with equal scores keep their input order.
    pub async fn rank(&self, drivers: &[Driver], course: &Course, key: &ApiKey) -> Vec<DriverScore> {
        // `buffered` yields in input order regardless of completion order
        let scores: Vec<DriverScore> = stream::iter(drivers)
            .map(|driver| self.scorer.score(driver, course, key))
            .buffered(self.max_concurrent)
            .collect()
            .await;

        debug!(drivers = scores.len(), "Pool scored");
        sort_by_score(scores)
    }
}

/// Order by score descending. The sort is stable, so ties keep input order.
pub fn sort_by_score(mut scores: Vec<DriverScore>) -> Vec<DriverScore> {
    scores.sort_by(|a, b| b.score.cmp(&a.score));
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::{DistanceCache, DistanceOracle};
    use crate::scoring::ScoringConfig;
    use crate::test_support::{km, test_key, Reply, ScriptedProvider};
    use std::sync::Arc;
    use std::time::Duration;

    fn ranker_with(provider: Arc<ScriptedProvider>) -> Ranker {
        let cache = DistanceCache::with_system_clock(Duration::from_secs(3600), 64);
        let oracle = DistanceOracle::new(provider, cache);
        Ranker::new(Scorer::new(oracle, ScoringConfig::default()))
    }

    fn ids(scores: &[DriverScore]) -> Vec<&str> {
        scores.iter().map(|s| s.driver_id.as_str()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_pool() {
        let ranker = ranker_with(Arc::new(ScriptedProvider::always(Reply::Hang)));
        let ranked = ranker.rank(&[], &Course::new("Chartres"), &test_key()).await;
        assert!(ranked.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_orders_by_score_descending() {
        let provider = Arc::new(
            ScriptedProvider::always(Reply::Found(km(45.0)))
                .route("Brou, France", "Dangeau", Reply::Found(km(8.0))),
        );
        let ranker = ranker_with(provider);
        let drivers = vec![
            Driver::new("far", "Franck")
                .with_courses_today(6)
                .with_last_drop_off("Illiers-Combray, France"),
            Driver::new("near", "Laurence")
                .with_courses_today(4)
                .with_last_drop_off("Brou, France"),
            Driver::new("idle", "Dunois").with_courses_today(2),
        ];

        let ranked = ranker.rank(&drivers, &Course::new("Dangeau"), &test_key()).await;

        // idle: 25+30+30, near: 40+20+30, far: 10+10+30
        assert_eq!(ids(&ranked), vec!["near", "idle", "far"]);
        assert_eq!(
            ranked.iter().map(|s| s.score).collect::<Vec<_>>(),
            vec![90, 85, 50]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_ties_keep_input_order() {
        let ranker = ranker_with(Arc::new(ScriptedProvider::always(Reply::Hang)));
        let drivers = vec![
            Driver::new("b", "B").with_courses_today(1),
            Driver::new("a", "A").with_courses_today(0),
            Driver::new("c", "C").with_courses_today(2),
        ];

        let course = Course::new("Chartres");
        let first = ranker.rank(&drivers, &course, &test_key()).await;
        let second = ranker.rank(&drivers, &course, &test_key()).await;

        assert_eq!(ids(&first), vec!["b", "a", "c"]);
        assert_eq!(first, second);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookups_run_concurrently() {
        let ranker = ranker_with(Arc::new(ScriptedProvider::always(Reply::Hang)))
            .with_max_concurrent(4);
        let drivers: Vec<Driver> = (0..4)
            .map(|i| Driver::new(i.to_string(), "X").with_last_drop_off(format!("Depot {}", i)))
            .collect();

        let started = tokio::time::Instant::now();
        let ranked = ranker.rank(&drivers, &Course::new("Chartres"), &test_key()).await;

        assert_eq!(ranked.len(), 4);
        assert!(ranked.iter().all(|s| s.score == 20 + 30 + 30));
        // All four exhaust their retries side by side, not one after another
        assert!(started.elapsed() < Duration::from_secs(28));
    }

    #[test]
    fn test_sort_by_score_is_stable() {
        let make = |id: &str, score: u32| DriverScore {
            driver_id: id.to_string(),
            driver_name: id.to_string(),
            score,
            distance: None,
            courses_today: 0,
            available: true,
            breakdown: Default::default(),
        };
        let sorted = sort_by_score(vec![
            make("x", 70),
            make("y", 90),
            make("z", 70),
            make("w", 90),
        ]);
        assert_eq!(ids(&sorted), vec!["y", "w", "x", "z"]);
    }
}
