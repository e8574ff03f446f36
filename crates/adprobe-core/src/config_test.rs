use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with all required env vars populated with valid defaults.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("ADPROBE_BASE_URL", "https://www.classifieds.test");
    m
}

#[test]
fn build_app_config_fails_without_base_url() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "ADPROBE_BASE_URL"),
        "expected MissingEnvVar(ADPROBE_BASE_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_blank_base_url() {
    let mut map = HashMap::new();
    map.insert("ADPROBE_BASE_URL", "   ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::MissingEnvVar(_))));
}

#[test]
fn build_app_config_rejects_non_http_base_url() {
    let mut map = HashMap::new();
    map.insert("ADPROBE_BASE_URL", "ftp://classifieds.test");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ADPROBE_BASE_URL"),
        "got: {result:?}"
    );
}

#[test]
fn build_app_config_succeeds_with_defaults() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).expect("config should build");
    assert_eq!(cfg.base_url, "https://www.classifieds.test");
    assert_eq!(cfg.search_path, "/ajax/search");
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.intercept_timeout_secs, 10);
    assert_eq!(cfg.user_agent, "adprobe/0.1 (search-validation)");
}

#[test]
fn build_app_config_strips_trailing_slash_from_base_url() {
    let mut map = full_env();
    map.insert("ADPROBE_BASE_URL", "https://www.classifieds.test/");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.base_url, "https://www.classifieds.test");
}

#[test]
fn build_app_config_reads_overrides() {
    let mut map = full_env();
    map.insert("ADPROBE_SEARCH_PATH", "/api/listings");
    map.insert("ADPROBE_REQUEST_TIMEOUT_SECS", "5");
    map.insert("ADPROBE_INTERCEPT_TIMEOUT_SECS", "2");
    map.insert("ADPROBE_USER_AGENT", "custom-agent/2.0");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.search_path, "/api/listings");
    assert_eq!(cfg.request_timeout_secs, 5);
    assert_eq!(cfg.intercept_timeout_secs, 2);
    assert_eq!(cfg.user_agent, "custom-agent/2.0");
}

#[test]
fn build_app_config_rejects_relative_search_path() {
    let mut map = full_env();
    map.insert("ADPROBE_SEARCH_PATH", "ajax/search");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ADPROBE_SEARCH_PATH"),
        "got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_invalid_timeout() {
    let mut map = full_env();
    map.insert("ADPROBE_INTERCEPT_TIMEOUT_SECS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ADPROBE_INTERCEPT_TIMEOUT_SECS"),
        "got: {result:?}"
    );
}
