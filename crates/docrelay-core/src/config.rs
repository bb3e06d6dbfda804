//! Service configuration.
//!
//! Everything is read from environment variables once at process start;
//! there is no runtime reconfiguration. `Endpoints` is the derived catalog
//! of backend URLs the cache, resolver and relay build requests from.

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use tracing::debug;
use url::Url;

use crate::cache::DEFAULT_LIST_TTL_SECS;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_BACKEND_URL: &str = "https://ijgapis.onrender.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub backend_url: String,
    /// Base URL this service is reachable at; the resolver's first
    /// candidate goes through our own view route.
    pub public_url: String,
    /// Base URL for the static storage fallback candidate.
    pub storage_url: String,
    pub cache_ttl: Duration,
    pub paths: EndpointPaths,
}

/// Per-endpoint path overrides on the backend.
#[derive(Debug, Clone)]
pub struct EndpointPaths {
    pub documents: String,
    pub categories: String,
    pub news: String,
    pub users: String,
    pub login: String,
}

impl Default for EndpointPaths {
    fn default() -> Self {
        Self {
            documents: "/api/documents".to_string(),
            categories: "/api/categories".to_string(),
            news: "/api/news".to_string(),
            users: "/api/users/all".to_string(),
            login: "/api/users/login".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let port = env_parse("DOCRELAY_PORT", DEFAULT_PORT)?;
        let backend_url = env_or("DOCRELAY_BACKEND_URL", DEFAULT_BACKEND_URL);
        let public_url = env::var("DOCRELAY_PUBLIC_URL")
            .unwrap_or_else(|_| format!("http://127.0.0.1:{port}"));
        let storage_url = env::var("DOCRELAY_STORAGE_URL").unwrap_or_else(|_| public_url.clone());
        let cache_ttl =
            Duration::from_secs(env_parse("DOCRELAY_CACHE_TTL_SECS", DEFAULT_LIST_TTL_SECS)?);

        let defaults = EndpointPaths::default();
        let paths = EndpointPaths {
            documents: env_or("DOCRELAY_ENDPOINT_DOCUMENTS", &defaults.documents),
            categories: env_or("DOCRELAY_ENDPOINT_CATEGORIES", &defaults.categories),
            news: env_or("DOCRELAY_ENDPOINT_NEWS", &defaults.news),
            users: env_or("DOCRELAY_ENDPOINT_USERS", &defaults.users),
            login: env_or("DOCRELAY_ENDPOINT_LOGIN", &defaults.login),
        };

        Ok(Self {
            port,
            backend_url,
            public_url,
            storage_url,
            cache_ttl,
            paths,
        })
    }

    pub fn endpoints(&self) -> Result<Endpoints> {
        Endpoints::new(
            &self.backend_url,
            &self.public_url,
            &self.storage_url,
            self.paths.clone(),
        )
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        debug!("{key} not set, using default: {default}");
        default.to_string()
    })
}

fn env_parse<T: FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| anyhow!("invalid value for {key}: {e}")),
        Err(_) => Ok(default),
    }
}

/// Catalog of resolved backend URLs. All URL validation happens once at
/// construction so request paths never have to handle parse failures.
#[derive(Debug, Clone)]
pub struct Endpoints {
    public: Url,
    storage: Url,
    documents: Url,
    categories: Url,
    news: Url,
    users: Url,
    login: Url,
}

impl Endpoints {
    pub fn new(
        backend: &str,
        public: &str,
        storage: &str,
        paths: EndpointPaths,
    ) -> Result<Self> {
        let backend = Url::parse(backend).context("invalid backend URL")?;
        let public = Url::parse(public).context("invalid public URL")?;
        let storage = Url::parse(storage).context("invalid storage URL")?;

        let join = |path: &str, what: &str| -> Result<Url> {
            backend
                .join(path)
                .with_context(|| format!("invalid {what} endpoint path: {path}"))
        };

        Ok(Self {
            public,
            storage,
            documents: join(&paths.documents, "documents")?,
            categories: join(&paths.categories, "categories")?,
            news: join(&paths.news, "news")?,
            users: join(&paths.users, "users")?,
            login: join(&paths.login, "login")?,
        })
    }

    pub fn documents(&self) -> &Url {
        &self.documents
    }

    pub fn categories(&self) -> &Url {
        &self.categories
    }

    pub fn news(&self) -> &Url {
        &self.news
    }

    pub fn users(&self) -> &Url {
        &self.users
    }

    pub fn login(&self) -> &Url {
        &self.login
    }

    pub fn category_documents(&self, category_id: &str) -> Url {
        push_segments(&self.documents, ["category", category_id])
    }

    pub fn backend_view(&self, file_name: &str) -> Url {
        push_segments(&self.documents, ["view", file_name])
    }

    pub fn backend_download(&self, id_or_file: &str) -> Url {
        push_segments(&self.documents, ["download", id_or_file])
    }

    pub fn local_view(&self, file_name: &str) -> Url {
        push_segments(&self.public, ["api", "documents", "view", file_name])
    }

    pub fn storage_document(&self, file_name: &str) -> Url {
        push_segments(&self.storage, ["storage", "documents", file_name])
    }

    /// Target for the catch-all proxy route. Each path segment is encoded
    /// individually so separators survive intact.
    pub fn proxy_target(&self, path: &str) -> Url {
        push_segments(&self.documents, path.split('/').filter(|s| !s.is_empty()))
    }

    /// Ordered candidate list for the document fetch resolver: local view
    /// route, backend view, backend download, storage path, and the input
    /// itself when it is already an absolute URL.
    pub fn view_candidates(&self, file_name: &str) -> Vec<String> {
        let mut candidates = vec![
            self.local_view(file_name).to_string(),
            self.backend_view(file_name).to_string(),
            self.backend_download(file_name).to_string(),
            self.storage_document(file_name).to_string(),
        ];
        if file_name.starts_with("http") {
            candidates.push(file_name.to_string());
        }
        candidates
    }
}

fn push_segments<'a>(base: &Url, segments: impl IntoIterator<Item = &'a str>) -> Url {
    let mut url = base.clone();
    if let Ok(mut parts) = url.path_segments_mut() {
        parts.pop_if_empty();
        for segment in segments {
            parts.push(segment);
        }
    }
    url
}
