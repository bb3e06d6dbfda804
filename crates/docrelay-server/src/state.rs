use std::sync::Arc;

use docrelay_core::{
    BackendRelay, Config, DocumentCache, DocumentResolver, Endpoints, ReqwestFetcher, RetryPolicy,
    SystemClock,
};

/// Shared handles for the route handlers. Cloning is cheap; everything
/// heavy sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub endpoints: Endpoints,
    pub fetch: ReqwestFetcher,
    pub cache: Arc<DocumentCache<ReqwestFetcher, SystemClock>>,
    pub resolver: Arc<DocumentResolver<ReqwestFetcher>>,
    pub relay: Arc<BackendRelay<ReqwestFetcher>>,
    pub proxy_policy: RetryPolicy,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let endpoints = config.endpoints()?;
        let fetch = ReqwestFetcher::new()?;

        let cache = Arc::new(DocumentCache::new(
            fetch.clone(),
            SystemClock,
            endpoints.clone(),
            config.cache_ttl,
        ));
        let resolver = Arc::new(DocumentResolver::new(fetch.clone(), endpoints.clone()));
        let relay = Arc::new(BackendRelay::new(fetch.clone(), endpoints.clone()));

        Ok(Self {
            config: Arc::new(config),
            endpoints,
            fetch,
            cache,
            resolver,
            relay,
            proxy_policy: RetryPolicy::proxy(),
        })
    }
}
