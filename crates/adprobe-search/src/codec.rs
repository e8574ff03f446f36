//! Request Builder / URL Codec for the search endpoint.
//!
//! [`build_url`] merges caller parameters over [`BackendParams::defaults`]
//! and writes every set field in [`ParamField::ALL`] order, so the same input
//! always yields the same query string byte for byte. [`decode_url`] is its
//! inverse over the recognized fields.

use adprobe_core::{BackendParams, ParamField};
use reqwest::Url;

use crate::error::SearchError;

/// Joins the site origin and the search endpoint path.
///
/// # Errors
///
/// Returns [`SearchError::InvalidUrl`] if the result is not a valid URL.
pub fn endpoint_url(base_url: &str, search_path: &str) -> Result<Url, SearchError> {
    let joined = format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        search_path.trim_start_matches('/')
    );
    Url::parse(&joined).map_err(|e| SearchError::InvalidUrl {
        url: joined.clone(),
        reason: e.to_string(),
    })
}

/// Builds the request URL for `params` against `endpoint`.
///
/// Any query string already on `endpoint` is replaced.
#[must_use]
pub fn build_url(endpoint: &Url, params: &BackendParams) -> Url {
    let merged = params.merged_over(&BackendParams::defaults());
    let mut url = endpoint.clone();
    url.set_query(None);
    {
        let mut pairs = url.query_pairs_mut();
        for field in ParamField::ALL {
            if let Some(value) = merged.get(field) {
                pairs.append_pair(field.query_key(), &value.to_string());
            }
        }
    }
    url
}

/// Decodes the recognized query parameters of `url`.
///
/// Unrecognized parameters are ignored. Integer fields that do not parse
/// are left absent. When a parameter repeats, the first occurrence wins.
#[must_use]
pub fn decode_url(url: &Url) -> BackendParams {
    let mut params = BackendParams::default();
    let mut seen = Vec::with_capacity(ParamField::ALL.len());

    for (key, value) in url.query_pairs() {
        let Some(field) = ParamField::from_query_key(&key) else {
            continue;
        };
        if seen.contains(&field) {
            continue;
        }
        seen.push(field);
        if !params.set_raw(field, &value) {
            tracing::debug!(
                field = field.query_key(),
                value = %value,
                "non-numeric value for integer search parameter; treating as absent"
            );
        }
    }

    params
}

/// Parses `raw` as a URL and decodes its search parameters.
///
/// # Errors
///
/// Returns [`SearchError::InvalidUrl`] if `raw` is not an absolute URL.
pub fn parse_url(raw: &str) -> Result<BackendParams, SearchError> {
    let url = Url::parse(raw).map_err(|e| SearchError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    Ok(decode_url(&url))
}
