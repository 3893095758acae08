//! The ISNI SRU API client.

use crate::cache::ResponseCache;
use crate::error::{ReconcileError, Result};
use reqwest::Client;
use std::time::Duration;

/// Default SRU endpoint of the ISNI public search.
const DEFAULT_BASE_URL: &str = "https://isni.oclc.nl/sru";

/// Async client for the ISNI SRU authority-record API.
///
/// # Example
///
/// ```no_run
/// # async fn example() {
/// let client = isni_reconcile::IsniClient::new();
/// let candidates = client.search("Mark Twain", "/isni/name").await;
/// for c in &candidates {
///     println!("{} ({})", c.name, c.id);
/// }
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct IsniClient {
    pub(crate) http: Client,
    pub(crate) base_url: String,
    pub(crate) cache: Option<ResponseCache>,
}

impl IsniClient {
    /// Create a new client against the public ISNI endpoint.
    pub fn new() -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            cache: None,
        }
    }

    /// Override the base URL (useful for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Install an in-memory response cache in front of the remote fetch.
    pub fn with_cache(mut self) -> Self {
        self.cache = Some(ResponseCache::new());
        self
    }

    /// Build the searchRetrieve URL for an index code and normalized query.
    ///
    /// ISNI requires spaces encoded as `%20`, never `+`, so the query string
    /// is assembled by hand rather than through a form serializer.
    pub(crate) fn query_url(&self, index: &str, query: &str) -> String {
        format!(
            "{}/?operation=searchRetrieve&recordSchema=isni-b&query={}+%3D+'{}'",
            self.base_url,
            index,
            urlencoding::encode(query)
        )
    }

    /// Fetch the raw SRU response for a query, going through the cache when
    /// one is installed.
    pub(crate) async fn fetch(&self, index: &str, query: &str) -> Result<String> {
        let url = self.query_url(index, query);
        tracing::debug!(%url, "ISNI SRU request");

        if let Some(cache) = &self.cache {
            if let Some(body) = cache.get(&url).await {
                return Ok(body);
            }
        }

        let response = self.http.get(&url).send().await?;
        let body = handle_response(response).await?;

        if let Some(cache) = &self.cache {
            cache.put(url, body.clone()).await;
        }
        Ok(body)
    }
}

impl Default for IsniClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle the HTTP response, mapping non-success statuses to errors.
async fn handle_response(response: reqwest::Response) -> Result<String> {
    let status = response.status().as_u16();

    match status {
        200..=299 => Ok(response.text().await?),
        _ => {
            let body = response.text().await.unwrap_or_default();
            Err(ReconcileError::Api {
                status,
                message: body,
            })
        }
    }
}
