//! Parameter Translator: UI-level searches to backend parameter sets.

use adprobe_core::{BackendParams, MappingKind, MappingRegistry, UiSearchRequest};

use crate::error::SearchError;

/// Parts of a UI search that the backend endpoint does not accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoredInput {
    /// The search endpoint has no keyword parameter.
    Keyword(String),
}

impl std::fmt::Display for IgnoredInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IgnoredInput::Keyword(k) => write!(
                f,
                "keyword \"{k}\" is not sent to the search endpoint and was not validated"
            ),
        }
    }
}

/// Result of translating a UI search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    /// Backend parameters. No defaults are merged here.
    pub params: BackendParams,
    /// Inputs that had no backend counterpart.
    pub ignored: Vec<IgnoredInput>,
}

/// Translates a UI search into backend parameters.
///
/// Absent fields stay absent. An empty `location` resolves to the
/// "no geographic filter" mapping. A keyword is reported in
/// [`Translation::ignored`] and logged, never encoded.
///
/// # Errors
///
/// Returns [`SearchError::MappingNotFound`] if the category or location
/// label is not in `registry`.
pub fn translate(
    registry: &MappingRegistry,
    request: &UiSearchRequest,
) -> Result<Translation, SearchError> {
    let mut params = BackendParams::default();
    let mut ignored = Vec::new();

    if let Some(label) = &request.category {
        let mapping = registry.lookup_category(label).ok_or_else(|| {
            SearchError::mapping_not_found(MappingKind::Category, label, registry.source())
        })?;
        params.category_id = Some(mapping.category_id);
        params.meta_code = Some(mapping.meta_code.clone());
    }

    if let Some(label) = &request.location {
        let mapping = registry.lookup_location(label).ok_or_else(|| {
            SearchError::mapping_not_found(MappingKind::Location, label, registry.source())
        })?;
        params.geo_id = Some(mapping.geo_id);
    }

    if let Some(keyword) = &request.keyword {
        tracing::warn!(
            keyword = %keyword,
            "search endpoint has no keyword parameter; keyword will not be validated"
        );
        ignored.push(IgnoredInput::Keyword(keyword.clone()));
    }

    Ok(Translation { params, ignored })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> MappingRegistry {
        MappingRegistry::builtin().expect("built-in mappings should load")
    }

    #[test]
    fn translates_known_category_and_location() {
        let request = UiSearchRequest::new()
            .with_category("Escorts and Massages")
            .with_location("London");
        let translation = translate(&registry(), &request).unwrap();
        assert_eq!(
            translation.params,
            BackendParams {
                category_id: Some(44),
                meta_code: Some("escorts_massages".to_string()),
                geo_id: Some(7),
                ..BackendParams::default()
            }
        );
        assert!(translation.ignored.is_empty());
    }

    #[test]
    fn unknown_category_names_the_label() {
        let request = UiSearchRequest::new().with_category("Nonexistent Category");
        let err = translate(&registry(), &request).unwrap_err();
        match &err {
            SearchError::MappingNotFound {
                kind,
                label,
                mappings_source,
            } => {
                assert_eq!(*kind, MappingKind::Category);
                assert_eq!(label, "Nonexistent Category");
                assert_eq!(mappings_source, registry().source());
            }
            other => panic!("expected MappingNotFound, got: {other:?}"),
        }
        let msg = err.to_string();
        assert!(msg.contains("Nonexistent Category"));
        assert!(msg.contains("categories:"), "guidance missing: {msg}");
        assert!(msg.contains("config/mappings.yaml"), "source missing: {msg}");
    }

    #[test]
    fn unknown_location_is_an_error() {
        let request = UiSearchRequest::new().with_location("Atlantis");
        let err = translate(&registry(), &request).unwrap_err();
        assert!(matches!(
            err,
            SearchError::MappingNotFound {
                kind: MappingKind::Location,
                ..
            }
        ));
    }

    #[test]
    fn empty_location_means_no_filter() {
        let request = UiSearchRequest::new().with_location("");
        let translation = translate(&registry(), &request).unwrap();
        assert_eq!(
            translation.params,
            BackendParams {
                geo_id: Some(0),
                ..BackendParams::default()
            }
        );
    }

    #[test]
    fn absent_fields_stay_absent() {
        let translation = translate(&registry(), &UiSearchRequest::new()).unwrap();
        assert!(translation.params.is_empty());
    }

    #[test]
    fn keyword_is_reported_as_ignored() {
        let request = UiSearchRequest::new()
            .with_category("Jobs")
            .with_keyword("barista");
        let translation = translate(&registry(), &request).unwrap();
        assert_eq!(
            translation.ignored,
            vec![IgnoredInput::Keyword("barista".to_string())]
        );
        assert_eq!(translation.params.category_id, Some(2553));
        assert!(translation.params.geo_id.is_none());
    }
}
