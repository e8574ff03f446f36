use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let base_url = require("ADPROBE_BASE_URL")?;
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ConfigError::InvalidEnvVar {
            var: "ADPROBE_BASE_URL".to_string(),
            reason: format!("expected an http(s) origin, got '{base_url}'"),
        });
    }

    let search_path = or_default("ADPROBE_SEARCH_PATH", "/ajax/search");
    if !search_path.starts_with('/') {
        return Err(ConfigError::InvalidEnvVar {
            var: "ADPROBE_SEARCH_PATH".to_string(),
            reason: format!("path must start with '/', got '{search_path}'"),
        });
    }

    let request_timeout_secs = parse_u64("ADPROBE_REQUEST_TIMEOUT_SECS", "30")?;
    let intercept_timeout_secs = parse_u64("ADPROBE_INTERCEPT_TIMEOUT_SECS", "10")?;
    let user_agent = or_default("ADPROBE_USER_AGENT", "adprobe/0.1 (search-validation)");

    Ok(AppConfig {
        base_url: base_url.trim_end_matches('/').to_string(),
        search_path,
        request_timeout_secs,
        intercept_timeout_secs,
        user_agent,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
