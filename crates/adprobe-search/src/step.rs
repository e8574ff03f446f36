//! Named test steps.
//!
//! A step is a unit of async work run inside an `info`-level `step` span,
//! with its start, outcome and duration logged. Names are rendered from a
//! template and the live argument values, e.g.
//! `step_name("Search '{category}' in '{location}'", &[("category", "Jobs"), ("location", "Leeds")])`.

use std::fmt::Display;
use std::future::Future;
use std::time::Instant;

use tracing::Instrument;

/// Renders a step name by substituting `{key}` placeholders.
///
/// Placeholders without a matching argument are left as written.
#[must_use]
pub fn step_name(template: &str, args: &[(&str, &dyn Display)]) -> String {
    let mut name = template.to_string();
    for (key, value) in args {
        name = name.replace(&format!("{{{key}}}"), &value.to_string());
    }
    name
}

/// Runs `work` as a named step.
///
/// # Errors
///
/// Returns whatever error `work` returns, after logging it.
pub async fn step<T, E, F>(name: impl Into<String>, work: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    let name = name.into();
    let span = tracing::info_span!("step", name = %name);
    let started = Instant::now();

    async move {
        tracing::info!("step started");
        let outcome = work.await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        match &outcome {
            Ok(_) => tracing::info!(elapsed_ms, "step passed"),
            Err(e) => tracing::error!(elapsed_ms, error = %e, "step failed"),
        }
        outcome
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_name_substitutes_placeholders() {
        let name = step_name(
            "Search '{category}' in '{location}'",
            &[("category", &"Jobs"), ("location", &"Leeds")],
        );
        assert_eq!(name, "Search 'Jobs' in 'Leeds'");
    }

    #[test]
    fn step_name_leaves_unknown_placeholders() {
        let name = step_name("Open ad {ad_id} ({page})", &[("ad_id", &42)]);
        assert_eq!(name, "Open ad 42 ({page})");
    }

    #[tokio::test]
    async fn step_passes_through_success() {
        let value = step("add", async { Ok::<_, String>(2 + 2) }).await;
        assert_eq!(value, Ok(4));
    }

    #[tokio::test]
    async fn step_passes_through_error() {
        let value: Result<(), String> = step("fail", async { Err("boom".to_string()) }).await;
        assert_eq!(value, Err("boom".to_string()));
    }
}
