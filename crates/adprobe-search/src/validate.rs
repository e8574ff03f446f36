//! Parameter Validator / Differ.
//!
//! Both entry points decode the observed URL, translate the expected UI
//! search, and compare the two on [`ParamField::COMPARED`] only. A field the
//! expected side leaves unset is not checked.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use adprobe_core::{AppConfig, BackendParams, MappingRegistry, ParamField, UiSearchRequest};
use reqwest::Url;
use serde::Serialize;

use crate::codec::{decode_url, endpoint_url};
use crate::error::SearchError;
use crate::intercept::{InterceptState, Interceptor, RouteDriver, RoutePattern};
use crate::translate::translate;

/// Outcome of comparing an observed request against an expected search.
///
/// `differences` is non-empty exactly when `matched` is false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub url: String,
    pub matched: bool,
    pub actual: BackendParams,
    pub expected: BackendParams,
    pub differences: Vec<String>,
    /// Parts of the expected search that could not be checked.
    pub ignored: Vec<String>,
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.matched {
            write!(f, "search parameters matched for {}", self.url)?;
        } else {
            writeln!(f, "search parameters did not match for {}", self.url)?;
            for line in &self.differences {
                writeln!(f, "  - {line}")?;
            }
            writeln!(f, "expected: {}", self.expected)?;
            write!(f, "actual:   {}", self.actual)?;
        }
        for note in &self.ignored {
            write!(f, "\nnote: {note}")?;
        }
        Ok(())
    }
}

/// Field-by-field differences on the compared fields, one line each.
#[must_use]
pub fn diff_params(actual: &BackendParams, expected: &BackendParams) -> Vec<String> {
    ParamField::COMPARED
        .into_iter()
        .filter_map(|field| {
            let want = expected.get(field)?;
            match actual.get(field) {
                Some(got) if got == want => None,
                Some(got) => Some(format!("{field}: expected {want}, got {got}")),
                None => Some(format!("{field}: expected {want}, got <absent>")),
            }
        })
        .collect()
}

/// Validates an already-issued request URL against an expected UI search.
///
/// # Errors
///
/// - [`SearchError::MappingNotFound`] if `expected` uses an unmapped label.
/// - [`SearchError::ParameterMismatch`] if a constrained field differs.
pub fn validate_url(
    registry: &MappingRegistry,
    url: &Url,
    expected: &UiSearchRequest,
) -> Result<ValidationResult, SearchError> {
    let actual = decode_url(url);
    let translation = translate(registry, expected)?;
    let differences = diff_params(&actual, &translation.params);

    let result = ValidationResult {
        url: url.to_string(),
        matched: differences.is_empty(),
        actual,
        expected: translation.params,
        differences,
        ignored: translation.ignored.iter().map(ToString::to_string).collect(),
    };

    if !result.matched {
        tracing::debug!(url = %result.url, differences = result.differences.len(), "search parameter mismatch");
        return Err(SearchError::ParameterMismatch(Box::new(result)));
    }

    tracing::info!(url = %result.url, expected = %result.expected, "search parameters validated");
    Ok(result)
}

/// Validates a response from the search endpoint: the status must be a
/// success before the final URL is compared.
///
/// # Errors
///
/// - [`SearchError::ResponseNotOk`] on a non-2xx status.
/// - Any error from [`validate_url`].
pub fn validate_response(
    registry: &MappingRegistry,
    response: &reqwest::Response,
    expected: &UiSearchRequest,
) -> Result<ValidationResult, SearchError> {
    let status = response.status();
    if !status.is_success() {
        return Err(SearchError::ResponseNotOk {
            status: status.as_u16(),
            url: response.url().to_string(),
        });
    }
    validate_url(registry, response.url(), expected)
}

/// Wait bound used by [`SearchValidator::wait_for_request_default`] unless
/// configured otherwise.
pub const DEFAULT_INTERCEPT_TIMEOUT: Duration = Duration::from_secs(10);

/// Validator for a single page flow: owns its interception session and a
/// handle to the shared mapping registry.
pub struct SearchValidator<D> {
    registry: Arc<MappingRegistry>,
    interceptor: Interceptor<D>,
    intercept_timeout: Duration,
}

impl<D: RouteDriver> SearchValidator<D> {
    /// Creates a validator intercepting every request to `endpoint`.
    #[must_use]
    pub fn new(registry: Arc<MappingRegistry>, driver: D, endpoint: &Url) -> Self {
        Self {
            registry,
            interceptor: Interceptor::new(driver, RoutePattern::for_endpoint(endpoint)),
            intercept_timeout: DEFAULT_INTERCEPT_TIMEOUT,
        }
    }

    /// Creates a validator for the configured search endpoint, waiting at
    /// most `intercept_timeout_secs` for intercepted requests.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidUrl`] if the base URL and search path do
    /// not form a valid URL.
    pub fn from_config(
        config: &AppConfig,
        registry: Arc<MappingRegistry>,
        driver: D,
    ) -> Result<Self, SearchError> {
        let endpoint = endpoint_url(&config.base_url, &config.search_path)?;
        Ok(Self::new(registry, driver, &endpoint)
            .with_intercept_timeout(Duration::from_secs(config.intercept_timeout_secs)))
    }

    #[must_use]
    pub fn with_intercept_timeout(mut self, timeout: Duration) -> Self {
        self.intercept_timeout = timeout;
        self
    }

    #[must_use]
    pub fn intercept_timeout(&self) -> Duration {
        self.intercept_timeout
    }

    #[must_use]
    pub fn registry(&self) -> &MappingRegistry {
        &self.registry
    }

    #[must_use]
    pub fn interceptor(&self) -> &Interceptor<D> {
        &self.interceptor
    }

    #[must_use]
    pub fn interception_state(&self) -> InterceptState {
        self.interceptor.state()
    }

    /// Arms interception. Call before the UI action that issues the search.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Driver`] if the hook cannot be installed.
    pub async fn start_interception(&mut self) -> Result<(), SearchError> {
        self.interceptor.start().await
    }

    /// # Errors
    ///
    /// Returns [`SearchError::Driver`] if the hook cannot be removed.
    pub async fn stop_interception(&mut self) -> Result<(), SearchError> {
        self.interceptor.stop().await
    }

    /// # Errors
    ///
    /// See [`Interceptor::wait_for_request`].
    pub async fn wait_for_request(&self, timeout: Duration) -> Result<(), SearchError> {
        self.interceptor.wait_for_request(timeout).await
    }

    /// [`wait_for_request`](Self::wait_for_request) bounded by the
    /// validator's configured intercept timeout.
    ///
    /// # Errors
    ///
    /// See [`Interceptor::wait_for_request`].
    pub async fn wait_for_request_default(&self) -> Result<(), SearchError> {
        self.interceptor.wait_for_request(self.intercept_timeout).await
    }

    /// Validates the intercepted request and stops interception. A second
    /// call without a new `start_interception` fails.
    ///
    /// # Errors
    ///
    /// - [`SearchError::NoInterceptedRequest`] if nothing was captured.
    /// - [`SearchError::InvalidUrl`] if the captured URL is not absolute.
    /// - Any error from [`validate_url`].
    pub async fn validate_intercepted(
        &mut self,
        expected: &UiSearchRequest,
    ) -> Result<ValidationResult, SearchError> {
        let request = self.interceptor.take().await?;
        let url = request.parsed_url()?;
        validate_url(&self.registry, &url, expected)
    }

    /// # Errors
    ///
    /// See [`validate_response`].
    pub fn validate_response(
        &self,
        response: &reqwest::Response,
        expected: &UiSearchRequest,
    ) -> Result<ValidationResult, SearchError> {
        validate_response(&self.registry, response, expected)
    }
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod tests;
