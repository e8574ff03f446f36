//! Mapping Registry: UI labels to backend search identifiers.
//!
//! The registry is loaded once (from `config/mappings.yaml`, compiled in, or
//! from a file named by `ADPROBE_MAPPINGS_PATH`) and is read-only afterwards.
//! Share it between validators as `Arc<MappingRegistry>`.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::ConfigError;

const BUILTIN_MAPPINGS: &str = include_str!("../../../config/mappings.yaml");
const BUILTIN_SOURCE: &str = "config/mappings.yaml (built-in)";

/// Label of the location entry meaning "no geographic filter".
pub const NO_LOCATION_LABEL: &str = "";
/// Backend geo id of the "no geographic filter" entry.
pub const NO_LOCATION_GEO_ID: i64 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingKind {
    Category,
    Location,
}

impl MappingKind {
    /// Top-level section of the mappings file holding this kind.
    #[must_use]
    pub fn section(self) -> &'static str {
        match self {
            MappingKind::Category => "categories",
            MappingKind::Location => "locations",
        }
    }

    /// A sample entry in mappings-file syntax, used in error guidance.
    #[must_use]
    pub fn example_entry(self, label: &str) -> String {
        match self {
            MappingKind::Category => format!("\"{label}\": {{ id: <cat_id>, code: <meta_code> }}"),
            MappingKind::Location => format!("\"{label}\": <geo_id>"),
        }
    }
}

impl fmt::Display for MappingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingKind::Category => write!(f, "category"),
            MappingKind::Location => write!(f, "location"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMapping {
    pub label: String,
    pub category_id: i64,
    pub meta_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationMapping {
    pub label: String,
    pub geo_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryEntry {
    pub id: i64,
    pub code: String,
}

/// On-disk shape of a mappings file.
#[derive(Debug, Default, Deserialize)]
pub struct MappingsFile {
    #[serde(default)]
    pub categories: BTreeMap<String, CategoryEntry>,
    #[serde(default)]
    pub locations: BTreeMap<String, i64>,
}

#[derive(Debug, Clone)]
pub struct MappingRegistry {
    categories: BTreeMap<String, CategoryMapping>,
    locations: BTreeMap<String, LocationMapping>,
    source: String,
}

impl MappingRegistry {
    /// The mapping table compiled into the binary.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the compiled-in table fails to parse or validate.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_yaml_str(BUILTIN_MAPPINGS, BUILTIN_SOURCE)
    }

    /// Parse and validate a mappings document. `source` names where it came
    /// from and is echoed in lookup-failure guidance.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the document cannot be parsed or fails validation.
    pub fn from_yaml_str(content: &str, source: &str) -> Result<Self, ConfigError> {
        let file: MappingsFile = serde_yaml::from_str(content)?;
        Self::from_file(file, source)
    }

    /// Build a registry from an already-parsed mappings file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` on empty labels, empty meta codes,
    /// or a non-zero id on the "no location" entry.
    pub fn from_file(file: MappingsFile, source: &str) -> Result<Self, ConfigError> {
        validate_mappings(&file)?;

        let categories = file
            .categories
            .into_iter()
            .map(|(label, entry)| {
                let mapping = CategoryMapping {
                    label: label.clone(),
                    category_id: entry.id,
                    meta_code: entry.code,
                };
                (label, mapping)
            })
            .collect();

        let mut locations: BTreeMap<String, LocationMapping> = file
            .locations
            .into_iter()
            .map(|(label, geo_id)| {
                let mapping = LocationMapping {
                    label: label.clone(),
                    geo_id,
                };
                (label, mapping)
            })
            .collect();

        locations
            .entry(NO_LOCATION_LABEL.to_string())
            .or_insert_with(|| LocationMapping {
                label: NO_LOCATION_LABEL.to_string(),
                geo_id: NO_LOCATION_GEO_ID,
            });

        Ok(Self {
            categories,
            locations,
            source: source.to_string(),
        })
    }

    #[must_use]
    pub fn lookup_category(&self, label: &str) -> Option<&CategoryMapping> {
        self.categories.get(label)
    }

    #[must_use]
    pub fn lookup_location(&self, label: &str) -> Option<&LocationMapping> {
        self.locations.get(label)
    }

    /// All category mappings, ordered by label.
    pub fn categories(&self) -> impl Iterator<Item = &CategoryMapping> {
        self.categories.values()
    }

    /// All location mappings, ordered by label.
    pub fn locations(&self) -> impl Iterator<Item = &LocationMapping> {
        self.locations.values()
    }

    /// Where the mappings were loaded from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Load and validate a mappings file from disk.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_mappings(path: &Path) -> Result<MappingRegistry, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::MappingsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let registry = MappingRegistry::from_yaml_str(&content, &path.display().to_string())?;
    tracing::debug!(
        path = %path.display(),
        categories = registry.categories.len(),
        locations = registry.locations.len(),
        "loaded search mappings"
    );
    Ok(registry)
}

fn validate_mappings(file: &MappingsFile) -> Result<(), ConfigError> {
    for (label, entry) in &file.categories {
        if label.trim().is_empty() {
            return Err(ConfigError::Validation(
                "category label must be non-empty".to_string(),
            ));
        }
        if entry.code.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "category '{label}' has an empty meta code"
            )));
        }
    }

    for (label, geo_id) in &file.locations {
        if label.is_empty() && *geo_id != NO_LOCATION_GEO_ID {
            return Err(ConfigError::Validation(format!(
                "the empty location label means \"no geographic filter\" and must map to {NO_LOCATION_GEO_ID}, got {geo_id}"
            )));
        }
        if !label.is_empty() && label.trim().is_empty() {
            return Err(ConfigError::Validation(
                "location label must not be whitespace only".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "mappings_test.rs"]
mod tests;
