//! TTL-cached document list with single-flight refresh.
//!
//! The cache never fails a caller: a refresh falls back from the primary
//! list endpoint to a per-category fan-out, then to the last good
//! snapshot, then to fixture data. Every result carries a `ListSource`
//! marker so fallback substitution stays observable.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::config::Endpoints;
use crate::fetch::{FetchRequest, HttpFetch};
use crate::fixtures;
use crate::models::Category;

/// Cache validity window in seconds.
pub const DEFAULT_LIST_TTL_SECS: u64 = 300;

/// Per-request timeout for list fetches.
pub(crate) const LIST_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Where a list result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListSource {
    /// Fresh or cached response from the primary list endpoint.
    Backend,
    /// Assembled from per-category fetches after the primary failed.
    CategoryFanOut,
    /// Last good snapshot, older than the TTL.
    StaleCache,
    /// Built-in fixture data; the backend was unreachable.
    Fixture,
}

impl ListSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListSource::Backend => "backend",
            ListSource::CategoryFanOut => "category-fan-out",
            ListSource::StaleCache => "stale-cache",
            ListSource::Fixture => "fixture",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DocumentList {
    pub documents: Vec<Value>,
    pub source: ListSource,
}

#[derive(Debug)]
struct Snapshot {
    documents: Vec<Value>,
    fetched_at: DateTime<Utc>,
    source: ListSource,
}

/// In-process cache of the full document list.
///
/// One instance per process; there is no cross-instance coordination.
/// The in-flight flag and the snapshot are updated independently, so a
/// request racing a refresh may observe a just-replaced value. That is
/// accepted behavior.
pub struct DocumentCache<F, C> {
    fetch: F,
    clock: C,
    endpoints: Endpoints,
    ttl: chrono::Duration,
    snapshot: Mutex<Option<Snapshot>>,
    refresh_in_flight: AtomicBool,
}

impl<F: HttpFetch, C: Clock> DocumentCache<F, C> {
    pub fn new(fetch: F, clock: C, endpoints: Endpoints, ttl: Duration) -> Self {
        let ttl = chrono::Duration::from_std(ttl)
            .unwrap_or_else(|_| chrono::Duration::seconds(DEFAULT_LIST_TTL_SECS as i64));
        Self {
            fetch,
            clock,
            endpoints,
            ttl,
            snapshot: Mutex::new(None),
            refresh_in_flight: AtomicBool::new(false),
        }
    }

    /// Serve the document list. Never fails; see module docs for the
    /// fallback order.
    pub async fn get(&self) -> DocumentList {
        if let Some(list) = self.fresh() {
            return list;
        }

        // Single-flight: a concurrent refresh means this caller gets the
        // current snapshot (any age) or fixtures, without waiting.
        if self.refresh_in_flight.swap(true, Ordering::SeqCst) {
            debug!("document list refresh already in flight, serving current data");
            return self.stale_or_fixture();
        }

        // The guard releases the flag on drop. The refresh awaits inside
        // a handler future the server may drop on client disconnect, so
        // the flag must not depend on this function running to the end.
        let _guard = RefreshGuard {
            flag: &self.refresh_in_flight,
        };
        self.refresh().await
    }

    fn lock(&self) -> MutexGuard<'_, Option<Snapshot>> {
        self.snapshot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn fresh(&self) -> Option<DocumentList> {
        let guard = self.lock();
        let snapshot = guard.as_ref()?;
        if self.clock.now() - snapshot.fetched_at < self.ttl {
            Some(DocumentList {
                documents: snapshot.documents.clone(),
                source: snapshot.source,
            })
        } else {
            None
        }
    }

    fn stale_or_fixture(&self) -> DocumentList {
        let guard = self.lock();
        match guard.as_ref() {
            Some(snapshot) => DocumentList {
                documents: snapshot.documents.clone(),
                source: ListSource::StaleCache,
            },
            None => DocumentList {
                documents: fixtures::sample_documents_json(),
                source: ListSource::Fixture,
            },
        }
    }

    async fn refresh(&self) -> DocumentList {
        if let Some(documents) = self.fetch_primary().await {
            return self.store(documents, ListSource::Backend);
        }
        if let Some(documents) = self.fetch_by_categories().await {
            return self.store(documents, ListSource::CategoryFanOut);
        }
        warn!("document list refresh failed on every path, serving fallback");
        self.stale_or_fixture()
    }

    /// Replace the snapshot wholesale. Readers see the old or the new
    /// list, never a partial merge.
    fn store(&self, documents: Vec<Value>, source: ListSource) -> DocumentList {
        let mut guard = self.lock();
        *guard = Some(Snapshot {
            documents: documents.clone(),
            fetched_at: self.clock.now(),
            source,
        });
        DocumentList { documents, source }
    }

    async fn fetch_primary(&self) -> Option<Vec<Value>> {
        let request = FetchRequest::new(self.endpoints.documents().as_str(), LIST_FETCH_TIMEOUT)
            .with_accept("application/json");
        match self.fetch.fetch(request).await {
            Ok(response) if response.is_ok() => match parse_json_array(&response.body) {
                Some(documents) => Some(documents),
                None => {
                    warn!("document list endpoint returned a non-array payload");
                    None
                }
            },
            Ok(response) => {
                warn!(status = response.status, "document list endpoint failed");
                None
            }
            Err(error) => {
                warn!(error = %error, "document list fetch failed");
                None
            }
        }
    }

    /// Fallback strategy: list categories, fetch each category's documents
    /// in parallel, and concatenate. A failing category contributes an
    /// empty list rather than failing the whole call.
    async fn fetch_by_categories(&self) -> Option<Vec<Value>> {
        let request = FetchRequest::new(self.endpoints.categories().as_str(), LIST_FETCH_TIMEOUT);
        let response = match self.fetch.fetch(request).await {
            Ok(response) if response.is_ok() => response,
            Ok(response) => {
                warn!(status = response.status, "category list fetch failed");
                return None;
            }
            Err(error) => {
                warn!(error = %error, "category list fetch failed");
                return None;
            }
        };

        let categories: Vec<Category> = match serde_json::from_slice(&response.body) {
            Ok(categories) => categories,
            Err(error) => {
                warn!(error = %error, "failed to parse category list");
                return None;
            }
        };

        debug!(count = categories.len(), "fanning out document fetch per category");
        let fetches = categories
            .iter()
            .map(|category| self.fetch_category_documents(&category.id));
        let results = futures::future::join_all(fetches).await;
        Some(results.into_iter().flatten().collect())
    }

    async fn fetch_category_documents(&self, category_id: &str) -> Vec<Value> {
        let url = self.endpoints.category_documents(category_id);
        match self
            .fetch
            .fetch(FetchRequest::new(url.as_str(), LIST_FETCH_TIMEOUT))
            .await
        {
            Ok(response) if response.is_ok() => {
                parse_json_array(&response.body).unwrap_or_default()
            }
            Ok(response) => {
                warn!(category_id, status = response.status, "category documents fetch failed");
                Vec::new()
            }
            Err(error) => {
                warn!(category_id, error = %error, "category documents fetch failed");
                Vec::new()
            }
        }
    }
}

/// Clears the in-flight flag when the owning refresh future completes or
/// is dropped mid-await.
struct RefreshGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Accept only top-level JSON arrays; any other shape is rejected and the
/// caller falls through to its fallback strategy.
pub(crate) fn parse_json_array(body: &[u8]) -> Option<Vec<Value>> {
    match serde_json::from_slice::<Value>(body).ok()? {
        Value::Array(items) => Some(items),
        _ => None,
    }
}
