#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Site origin. Requests are sent with this as the `Referer`.
    pub base_url: String,
    /// Path of the backend search endpoint, relative to `base_url`.
    pub search_path: String,
    pub request_timeout_secs: u64,
    /// Default bound for waiting on an intercepted search request.
    pub intercept_timeout_secs: u64,
    pub user_agent: String,
}
