use adprobe_core::MappingKind;
use thiserror::Error;

use crate::intercept::InterceptState;
use crate::validate::ValidationResult;

/// Errors returned while building, issuing, intercepting, or validating
/// search requests.
///
/// None of these are retried internally: each one is terminal for the
/// calling test step.
#[derive(Debug, Error)]
pub enum SearchError {
    /// A UI label has no backend mapping.
    #[error(
        "no {kind} mapping for label \"{label}\"; {}",
        registration_hint(.kind, .label, .mappings_source)
    )]
    MappingNotFound {
        kind: MappingKind,
        label: String,
        /// Where the registry was loaded from, i.e. the file to edit.
        mappings_source: String,
    },

    /// Validation was attempted with no captured request.
    #[error(
        "no intercepted search request to validate (interceptor is {state}); \
         start interception before the UI action that issues the search"
    )]
    NoInterceptedRequest { state: InterceptState },

    /// No matching request arrived within the wait bound.
    #[error("no request matching {pattern} was intercepted within {waited_ms} ms")]
    InterceptTimeout { pattern: String, waited_ms: u64 },

    /// The backend rejected the call.
    #[error("search endpoint responded with HTTP {status} for {url}")]
    ResponseNotOk { status: u16, url: String },

    /// The backend accepted the call but with the wrong parameters.
    #[error("{0}")]
    ParameterMismatch(Box<ValidationResult>),

    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The browser driver failed to install or remove a route hook.
    #[error("browser driver error: {0}")]
    Driver(String),

    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl SearchError {
    #[must_use]
    pub fn mapping_not_found(kind: MappingKind, label: &str, mappings_source: &str) -> Self {
        SearchError::MappingNotFound {
            kind,
            label: label.to_string(),
            mappings_source: mappings_source.to_string(),
        }
    }
}

/// Tells the reader exactly which entry to add and where.
#[allow(clippy::trivially_copy_pass_by_ref)]
fn registration_hint(kind: &MappingKind, label: &str, mappings_source: &str) -> String {
    format!(
        "add `{}` under `{}:` in {mappings_source}",
        kind.example_entry(label),
        kind.section()
    )
}
