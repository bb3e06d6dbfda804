//! Test doubles for the fetch seam and the clock.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tokio::sync::Notify;

use crate::clock::Clock;
use crate::error::FetchError;
use crate::fetch::{FetchRequest, FetchResponse, HttpFetch};

pub type Canned = Result<FetchResponse, FetchError>;

/// Programmable [`HttpFetch`] fake.
///
/// Each URL carries a queue of canned results; the last one repeats once
/// the queue is down to a single entry. Calls are recorded in order, and
/// a URL can be gated so a test controls when its response is released.
pub struct FakeFetch {
    routes: Mutex<HashMap<String, VecDeque<Canned>>>,
    calls: Mutex<Vec<String>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
}

impl FakeFetch {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            routes: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            gates: Mutex::new(HashMap::new()),
        })
    }

    /// Queue a canned result for `url`.
    pub fn respond(&self, url: &str, canned: Canned) {
        lock(&self.routes)
            .entry(url.to_string())
            .or_default()
            .push_back(canned);
    }

    /// Gate `url`: its fetches record the call, then block until the
    /// returned handle is notified.
    pub fn gate(&self, url: &str) -> Arc<Notify> {
        Arc::clone(
            lock(&self.gates)
                .entry(url.to_string())
                .or_insert_with(|| Arc::new(Notify::new())),
        )
    }

    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    pub fn calls_to(&self, url: &str) -> usize {
        lock(&self.calls).iter().filter(|c| *c == url).count()
    }

    pub fn total_calls(&self) -> usize {
        lock(&self.calls).len()
    }

    fn next_response(&self, url: &str) -> Canned {
        let mut routes = lock(&self.routes);
        match routes.get_mut(url) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_else(no_canned),
            Some(queue) => queue.front().cloned().unwrap_or_else(no_canned),
            None => no_canned(),
        }
    }
}

fn no_canned() -> Canned {
    Err(FetchError::Network("no canned response".to_string()))
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl HttpFetch for FakeFetch {
    fn fetch(
        &self,
        request: FetchRequest,
    ) -> impl Future<Output = Result<FetchResponse, FetchError>> + Send {
        // Record the call and pick the result before the future is
        // polled, so tests can observe in-flight calls while gated.
        lock(&self.calls).push(request.url.clone());
        let canned = self.next_response(&request.url);
        let gate = lock(&self.gates).get(&request.url).map(Arc::clone);
        async move {
            if let Some(gate) = gate {
                gate.notified().await;
            }
            canned
        }
    }
}

pub mod canned {
    use super::Canned;
    use crate::error::FetchError;
    use crate::fetch::FetchResponse;

    pub fn ok_json(value: serde_json::Value) -> Canned {
        Ok(FetchResponse {
            status: 200,
            content_type: Some("application/json".to_string()),
            content_disposition: None,
            body: value.to_string().into_bytes(),
        })
    }

    pub fn ok_body(content_type: &str, disposition: Option<&str>, body: &[u8]) -> Canned {
        Ok(FetchResponse {
            status: 200,
            content_type: Some(content_type.to_string()),
            content_disposition: disposition.map(str::to_string),
            body: body.to_vec(),
        })
    }

    pub fn body_with_status(status: u16, content_type: &str, body: &[u8]) -> Canned {
        Ok(FetchResponse {
            status,
            content_type: Some(content_type.to_string()),
            content_disposition: None,
            body: body.to_vec(),
        })
    }

    pub fn status(status: u16) -> Canned {
        Ok(FetchResponse {
            status,
            content_type: None,
            content_disposition: None,
            body: Vec::new(),
        })
    }

    pub fn timeout() -> Canned {
        Err(FetchError::Timeout)
    }

    pub fn network_error(message: &str) -> Canned {
        Err(FetchError::Network(message.to_string()))
    }
}

/// Clock whose time only moves when a test says so.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(Utc::now()),
        })
    }

    pub fn advance_secs(&self, secs: i64) {
        let mut now = lock(&self.now);
        *now += chrono::Duration::seconds(secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *lock(&self.now)
    }
}
