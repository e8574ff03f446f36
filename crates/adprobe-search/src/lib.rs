//! Request construction and validation for the classifieds search endpoint.
//!
//! UI-level searches are translated into backend parameters through the
//! [`MappingRegistry`](adprobe_core::MappingRegistry), encoded into request
//! URLs, and compared against requests observed either directly
//! ([`SearchClient`]) or by interception during a browser-driven flow
//! ([`Interceptor`]).

pub mod client;
pub mod codec;
pub mod error;
pub mod fallback;
pub mod intercept;
pub mod page;
pub mod step;
pub mod translate;
pub mod validate;

pub use client::SearchClient;
pub use codec::{build_url, decode_url, endpoint_url, parse_url};
pub use error::SearchError;
pub use fallback::{run_fallbacks, FallbackOutcome, Strategy, StrategyOutcome};
pub use intercept::{
    InterceptState, InterceptedRequest, Interceptor, RouteAction, RouteDriver, RouteHook,
    RoutePattern,
};
pub use page::{open_page, Page, PageOpened};
pub use step::{step, step_name};
pub use translate::{translate, IgnoredInput, Translation};
pub use validate::{
    diff_params, validate_response, validate_url, SearchValidator, ValidationResult,
    DEFAULT_INTERCEPT_TIMEOUT,
};
