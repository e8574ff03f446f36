pub mod app_config;
pub mod config;
pub mod mappings;
pub mod types;

use thiserror::Error;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use mappings::{
    load_mappings, CategoryMapping, LocationMapping, MappingKind, MappingRegistry, MappingsFile,
};
pub use types::{BackendParams, ParamField, ParamValue, UiSearchRequest};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read mappings file {path}: {source}")]
    MappingsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse mappings file: {0}")]
    MappingsFileParse(#[from] serde_yaml::Error),

    #[error("mapping validation failed: {0}")]
    Validation(String),
}
