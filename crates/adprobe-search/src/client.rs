//! Direct Requester: issues search requests the way the site's own
//! JavaScript does.
//!
//! Responses are returned untouched. Validate them separately with
//! [`validate_response`](crate::validate::validate_response).

use std::sync::Arc;
use std::time::Duration;

use adprobe_core::{AppConfig, MappingRegistry, UiSearchRequest};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, REFERER};
use reqwest::{Client, Response, Url};

use crate::codec::{build_url, endpoint_url};
use crate::error::SearchError;
use crate::translate::translate;

const ACCEPT_AJAX: &str = "application/json, text/javascript, */*; q=0.01";
const X_REQUESTED_WITH: HeaderName = HeaderName::from_static("x-requested-with");
const XHR_MARKER: &str = "XMLHttpRequest";

/// HTTP client for the backend search endpoint.
///
/// Keeps a cookie store so requests share one session, like the page that
/// would normally issue them.
pub struct SearchClient {
    client: Client,
    registry: Arc<MappingRegistry>,
    endpoint: Url,
    referer: String,
}

impl SearchClient {
    /// Creates a client from application config.
    ///
    /// # Errors
    ///
    /// - [`SearchError::InvalidUrl`] if the base URL and search path do not
    ///   form a valid URL.
    /// - [`SearchError::Http`] if the underlying `reqwest::Client` cannot be
    ///   constructed.
    pub fn from_config(
        config: &AppConfig,
        registry: Arc<MappingRegistry>,
    ) -> Result<Self, SearchError> {
        Self::new(
            &config.base_url,
            &config.search_path,
            config.request_timeout_secs,
            &config.user_agent,
            registry,
        )
    }

    /// Creates a client for `base_url` + `search_path` (point `base_url` at a
    /// mock server in tests).
    ///
    /// # Errors
    ///
    /// Same as [`SearchClient::from_config`].
    pub fn new(
        base_url: &str,
        search_path: &str,
        timeout_secs: u64,
        user_agent: &str,
        registry: Arc<MappingRegistry>,
    ) -> Result<Self, SearchError> {
        let endpoint = endpoint_url(base_url, search_path)?;
        let referer = format!("{}/", endpoint.origin().ascii_serialization());

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            registry,
            endpoint,
            referer,
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<MappingRegistry> {
        &self.registry
    }

    /// The URL [`SearchClient::search`] would request for `request`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::MappingNotFound`] for unmapped labels.
    pub fn search_url(&self, request: &UiSearchRequest) -> Result<Url, SearchError> {
        let translation = translate(&self.registry, request)?;
        Ok(build_url(&self.endpoint, &translation.params))
    }

    /// Issues the search as an in-page AJAX call and returns the raw response.
    ///
    /// Non-2xx statuses are not treated as errors here.
    ///
    /// # Errors
    ///
    /// - [`SearchError::MappingNotFound`] for unmapped labels.
    /// - [`SearchError::Http`] on network or TLS failure.
    pub async fn search(&self, request: &UiSearchRequest) -> Result<Response, SearchError> {
        let url = self.search_url(request)?;
        tracing::debug!(url = %url, "issuing direct search request");

        let response = self
            .client
            .get(url)
            .headers(self.ajax_headers())
            .send()
            .await?;

        tracing::debug!(
            status = response.status().as_u16(),
            url = %response.url(),
            "search endpoint responded"
        );
        Ok(response)
    }

    fn ajax_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_AJAX));
        headers.insert(X_REQUESTED_WITH, HeaderValue::from_static(XHR_MARKER));
        if let Ok(referer) = HeaderValue::from_str(&self.referer) {
            headers.insert(REFERER, referer);
        }
        headers
    }
}
