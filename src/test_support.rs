use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::credentials::ApiKey;
use crate::distance::{Distance, DistanceProvider, LookupError};

/// What a scripted provider does on one call.
#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Found(Distance),
    Fail(LookupError),
    /// Never answers, so the caller's timeout fires
    Hang,
}

/// Provider that replays canned replies and counts calls.
///
/// Per-route replies win over the queued script; the fallback answers
/// everything else.
pub(crate) struct ScriptedProvider {
    routes: HashMap<(String, String), Reply>,
    script: Mutex<VecDeque<Reply>>,
    fallback: Reply,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub(crate) fn always(reply: Reply) -> Self {
        Self {
            routes: HashMap::new(),
            script: Mutex::new(VecDeque::new()),
            fallback: reply,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn sequence(replies: Vec<Reply>, fallback: Reply) -> Self {
        let provider = Self::always(fallback);
        *provider.script.lock().unwrap() = replies.into();
        provider
    }

    pub(crate) fn route(mut self, origin: &str, destination: &str, reply: Reply) -> Self {
        self.routes
            .insert((origin.to_string(), destination.to_string()), reply);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DistanceProvider for ScriptedProvider {
    async fn fetch(
        &self,
        origin: &str,
        destination: &str,
        _key: &ApiKey,
    ) -> Result<Distance, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let reply = match self
            .routes
            .get(&(origin.to_string(), destination.to_string()))
        {
            Some(reply) => reply.clone(),
            None => self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| self.fallback.clone()),
        };

        match reply {
            Reply::Found(distance) => Ok(distance),
            Reply::Fail(err) => Err(err),
            Reply::Hang => std::future::pending().await,
        }
    }
}

pub(crate) fn test_key() -> ApiKey {
    ApiKey::new("test-key").unwrap()
}

/// A distance of `km` kilometers driven at roughly 60 km/h
pub(crate) fn km(km: f64) -> Distance {
    let meters = (km * 1000.0).round() as u64;
    Distance::new(meters, meters * 60 / 1000)
}
