//! Search requests as the UI expresses them and as the backend receives them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// `summary` value sent with every search request.
pub const DEFAULT_RESULT_FORMAT: i64 = 1;
/// Country code sent as both `country` and `country_id`.
pub const DEFAULT_COUNTRY: &str = "GB";

/// A search as a user performs it on the page: human-readable labels only.
///
/// `None` means "do not constrain on this axis". For `location` this is not
/// the same as `Some("")`, which resolves to the explicit "no geographic
/// filter" mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiSearchRequest {
    pub category: Option<String>,
    pub location: Option<String>,
    pub keyword: Option<String>,
}

impl UiSearchRequest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_category(mut self, label: impl Into<String>) -> Self {
        self.category = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_location(mut self, label: impl Into<String>) -> Self {
        self.location = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }
}

/// One recognized query parameter of the backend search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamField {
    GeoId,
    CategoryId,
    MetaCode,
    ResultFormat,
    CountryCode,
    CountryId,
}

impl ParamField {
    /// Every recognized field, in wire order.
    pub const ALL: [ParamField; 6] = [
        ParamField::GeoId,
        ParamField::CategoryId,
        ParamField::MetaCode,
        ParamField::ResultFormat,
        ParamField::CountryCode,
        ParamField::CountryId,
    ];

    /// Fields that carry test signal. The rest are constants.
    pub const COMPARED: [ParamField; 3] = [
        ParamField::CategoryId,
        ParamField::GeoId,
        ParamField::MetaCode,
    ];

    /// Name of the query-string key on the wire.
    #[must_use]
    pub fn query_key(self) -> &'static str {
        match self {
            ParamField::GeoId => "geo_id",
            ParamField::CategoryId => "cat_id",
            ParamField::MetaCode => "meta_code",
            ParamField::ResultFormat => "summary",
            ParamField::CountryCode => "country",
            ParamField::CountryId => "country_id",
        }
    }

    /// Name used in diffs and JSON output.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ParamField::GeoId => "geoId",
            ParamField::CategoryId => "categoryId",
            ParamField::MetaCode => "metaCode",
            ParamField::ResultFormat => "resultFormat",
            ParamField::CountryCode => "countryCode",
            ParamField::CountryId => "countryId",
        }
    }

    #[must_use]
    pub fn from_query_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.query_key() == key)
    }

    fn is_integer(self) -> bool {
        matches!(
            self,
            ParamField::GeoId | ParamField::CategoryId | ParamField::ResultFormat
        )
    }
}

impl fmt::Display for ParamField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Int(i64),
    Text(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Text(v) => f.write_str(v),
        }
    }
}

/// The query parameters of a backend search request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_format: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_id: Option<String>,
}

impl BackendParams {
    /// Parameters merged into every outgoing request.
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            result_format: Some(DEFAULT_RESULT_FORMAT),
            country_code: Some(DEFAULT_COUNTRY.to_string()),
            country_id: Some(DEFAULT_COUNTRY.to_string()),
            ..Self::default()
        }
    }

    /// Returns `self` layered over `base`: every field set here wins, every
    /// field left unset falls back to `base`.
    #[must_use]
    pub fn merged_over(&self, base: &Self) -> Self {
        Self {
            geo_id: self.geo_id.or(base.geo_id),
            category_id: self.category_id.or(base.category_id),
            meta_code: self.meta_code.clone().or_else(|| base.meta_code.clone()),
            result_format: self.result_format.or(base.result_format),
            country_code: self
                .country_code
                .clone()
                .or_else(|| base.country_code.clone()),
            country_id: self.country_id.clone().or_else(|| base.country_id.clone()),
        }
    }

    #[must_use]
    pub fn get(&self, field: ParamField) -> Option<ParamValue> {
        match field {
            ParamField::GeoId => self.geo_id.map(ParamValue::Int),
            ParamField::CategoryId => self.category_id.map(ParamValue::Int),
            ParamField::MetaCode => self.meta_code.clone().map(ParamValue::Text),
            ParamField::ResultFormat => self.result_format.map(ParamValue::Int),
            ParamField::CountryCode => self.country_code.clone().map(ParamValue::Text),
            ParamField::CountryId => self.country_id.clone().map(ParamValue::Text),
        }
    }

    /// Sets `field` from its raw query-string form.
    ///
    /// Integer fields that do not parse are left absent. Returns whether the
    /// field ended up set.
    pub fn set_raw(&mut self, field: ParamField, raw: &str) -> bool {
        if field.is_integer() {
            let parsed = raw.trim().parse::<i64>().ok();
            match field {
                ParamField::GeoId => self.geo_id = parsed,
                ParamField::CategoryId => self.category_id = parsed,
                _ => self.result_format = parsed,
            }
            return parsed.is_some();
        }

        let value = Some(raw.to_string());
        match field {
            ParamField::MetaCode => self.meta_code = value,
            ParamField::CountryCode => self.country_code = value,
            _ => self.country_id = value,
        }
        true
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        ParamField::ALL.iter().all(|f| self.get(*f).is_none())
    }
}

impl fmt::Display for BackendParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        let mut first = true;
        for field in ParamField::ALL {
            if let Some(value) = self.get(field) {
                if !first {
                    f.write_str(", ")?;
                }
                write!(f, "{field}: {value}")?;
                first = false;
            }
        }
        f.write_str("}")
    }
}
