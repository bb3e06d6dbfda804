//! Core logic for the document relay: a retrying, multi-source fetch
//! proxy in front of an unreliable REST backend.
//!
//! The pieces are a TTL-cached document list with single-flight refresh
//! ([`DocumentCache`]), an ordered-candidate document resolver
//! ([`DocumentResolver`]), a retrying binary passthrough
//! ([`proxy_fetch`]), and thin list/login relays ([`BackendRelay`]).
//! All backend I/O goes through the [`HttpFetch`] seam so behavior is
//! testable without a network.

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod fetch;
pub mod fixtures;
pub mod models;
pub mod proxy;
pub mod relay;
pub mod resolver;
pub mod retry;

#[cfg(test)]
mod test_util;

pub use cache::{DocumentCache, DocumentList, ListSource, DEFAULT_LIST_TTL_SECS};
pub use clock::{Clock, SystemClock};
pub use config::{Config, EndpointPaths, Endpoints};
pub use error::{FetchError, ProxyError, ResolveError};
pub use fetch::{FetchRequest, FetchResponse, HttpFetch, ReqwestFetcher};
pub use proxy::{proxy_fetch, PROXY_ACCEPT};
pub use relay::{BackendRelay, LoginOutcome, LoginRequest};
pub use resolver::{DocumentResolver, ResolvedDocument, ViewOptions};
pub use retry::RetryPolicy;
