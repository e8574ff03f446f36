//! Command handlers for the CLI.
//!
//! Output goes to stdout as pretty-printed JSON; logs go to stderr. Each
//! `run_*` handler builds its report with a `*_report` function and prints it.

use std::path::Path;
use std::sync::Arc;

use adprobe_core::{AppConfig, MappingRegistry, UiSearchRequest};
use adprobe_search::{build_url, endpoint_url, parse_url, translate, SearchClient};
use serde_json::{json, Value};

/// Load the mapping registry from `path`, or the built-in table when `None`.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or validated.
pub(crate) fn load_registry(path: Option<&Path>) -> anyhow::Result<Arc<MappingRegistry>> {
    let registry = match path {
        Some(path) => adprobe_core::load_mappings(path)?,
        None => MappingRegistry::builtin()?,
    };
    Ok(Arc::new(registry))
}

pub(crate) fn run_mappings(registry: &MappingRegistry) -> anyhow::Result<()> {
    print_json(&mappings_report(registry))
}

pub(crate) fn mappings_report(registry: &MappingRegistry) -> Value {
    let categories: Vec<Value> = registry
        .categories()
        .map(|c| {
            json!({
                "label": c.label,
                "categoryId": c.category_id,
                "metaCode": c.meta_code,
            })
        })
        .collect();
    let locations: Vec<Value> = registry
        .locations()
        .map(|l| json!({ "label": l.label, "geoId": l.geo_id }))
        .collect();

    json!({
        "source": registry.source(),
        "categories": categories,
        "locations": locations,
    })
}

/// Print the backend parameters for `request` and, when the search endpoint
/// is configured, the exact URL that would be requested.
pub(crate) fn run_translate(
    registry: &MappingRegistry,
    request: &UiSearchRequest,
) -> anyhow::Result<()> {
    let config = match adprobe_core::load_app_config_from_env() {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::debug!(error = %e, "search endpoint not configured; omitting URL");
            None
        }
    };
    print_json(&translate_report(registry, request, config.as_ref())?)
}

pub(crate) fn translate_report(
    registry: &MappingRegistry,
    request: &UiSearchRequest,
    config: Option<&AppConfig>,
) -> anyhow::Result<Value> {
    let translation = translate(registry, request)?;

    let url = match config {
        Some(config) => {
            let endpoint = endpoint_url(&config.base_url, &config.search_path)?;
            Some(build_url(&endpoint, &translation.params).to_string())
        }
        None => None,
    };

    let ignored: Vec<String> = translation.ignored.iter().map(ToString::to_string).collect();
    Ok(json!({
        "params": translation.params,
        "url": url,
        "ignored": ignored,
    }))
}

pub(crate) fn run_decode(url: &str) -> anyhow::Result<()> {
    print_json(&decode_report(url)?)
}

pub(crate) fn decode_report(url: &str) -> anyhow::Result<Value> {
    Ok(serde_json::to_value(parse_url(url)?)?)
}

/// Issue `request` against the configured endpoint and validate what was sent.
///
/// # Errors
///
/// Returns an error on missing config, unmapped labels, transport failure,
/// a non-success status, or a parameter mismatch.
pub(crate) async fn run_check(
    registry: Arc<MappingRegistry>,
    request: &UiSearchRequest,
) -> anyhow::Result<()> {
    let config = adprobe_core::load_app_config_from_env()?;
    tracing::debug!(?config, "loaded config");
    print_json(&check_report(&config, registry, request).await?)
}

pub(crate) async fn check_report(
    config: &AppConfig,
    registry: Arc<MappingRegistry>,
    request: &UiSearchRequest,
) -> anyhow::Result<Value> {
    let client = SearchClient::from_config(config, registry)?;
    let name = adprobe_search::step_name(
        "Check search for category '{category}' in location '{location}'",
        &[
            ("category", &request.category.as_deref().unwrap_or("<any>")),
            ("location", &request.location.as_deref().unwrap_or("<any>")),
        ],
    );

    let result = adprobe_search::step(name, async {
        let response = client.search(request).await?;
        adprobe_search::validate_response(client.registry(), &response, request)
    })
    .await?;

    Ok(serde_json::to_value(&result)?)
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
