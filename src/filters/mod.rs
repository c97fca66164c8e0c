pub mod query;

pub use query::{ListingsQuery, SortBy, SortOrder};

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

/// Filter values exactly as the UI holds them.
///
/// Every field is a string and the empty string means "unset", including the
/// numeric bounds. Nothing here is validated; [`FilterState::parse`] is the
/// only way these values reach a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub search: String,
    pub price_min: String,
    pub price_max: String,
    pub municipality: String,
    pub property_type: String,
    pub ad_type: String,
    pub rooms_min: String,
    pub rooms_max: String,
    pub size_min: String,
    pub size_max: String,
    pub deal_score_min: String,
    pub source: String,
}

impl FilterState {
    pub fn is_unset(&self) -> bool {
        *self == FilterState::default()
    }

    /// Validate the UI strings into typed request filters.
    ///
    /// Blank fields are dropped. Numeric fields that do not parse are dropped
    /// too, so a stray "abc" in the price box never turns into `NaN` or `0`
    /// on the wire.
    pub fn parse(&self) -> RequestFilters {
        RequestFilters {
            search: text(&self.search),
            municipality: text(&self.municipality),
            property_type: text(&self.property_type),
            ad_type: text(&self.ad_type),
            source: source_selector(&self.source),
            price_min: number("price_min", &self.price_min),
            price_max: number("price_max", &self.price_max),
            rooms_min: fraction("rooms_min", &self.rooms_min),
            rooms_max: fraction("rooms_max", &self.rooms_max),
            size_min: fraction("size_min", &self.size_min),
            size_max: fraction("size_max", &self.size_max),
            deal_score_min: number("deal_score_min", &self.deal_score_min),
        }
    }
}

/// Typed filters ready for the listings endpoint; `None` means "omit"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestFilters {
    pub search: Option<String>,
    pub municipality: Option<String>,
    pub property_type: Option<String>,
    pub ad_type: Option<String>,
    pub source: Option<SourceSelector>,
    pub price_min: Option<i64>,
    pub price_max: Option<i64>,
    pub rooms_min: Option<f64>,
    pub rooms_max: Option<f64>,
    pub size_min: Option<f64>,
    pub size_max: Option<f64>,
    pub deal_score_min: Option<i64>,
}

impl RequestFilters {
    /// Present fields as query parameters, in a stable order
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        let mut push = |key: &'static str, value: Option<String>| {
            if let Some(value) = value {
                params.push((key, value));
            }
        };

        push("price_min", self.price_min.map(|v| v.to_string()));
        push("price_max", self.price_max.map(|v| v.to_string()));
        push("municipality", self.municipality.clone());
        push("property_type", self.property_type.clone());
        push("ad_type", self.ad_type.clone());
        push("rooms_min", self.rooms_min.map(|v| v.to_string()));
        push("rooms_max", self.rooms_max.map(|v| v.to_string()));
        push("size_min", self.size_min.map(|v| v.to_string()));
        push("size_max", self.size_max.map(|v| v.to_string()));
        push("deal_score_min", self.deal_score_min.map(|v| v.to_string()));
        push("search", self.search.clone());
        push("source", self.source.map(|s| s.as_str().to_string()));

        params
    }
}

/// Which source table the backend should query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceSelector {
    All,
    Olx,
    Nekretnine,
}

impl SourceSelector {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceSelector::All => "all",
            SourceSelector::Olx => "olx",
            SourceSelector::Nekretnine => "nekretnine",
        }
    }
}

impl FromStr for SourceSelector {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(SourceSelector::All),
            "olx" => Ok(SourceSelector::Olx),
            "nekretnine" => Ok(SourceSelector::Nekretnine),
            other => Err(format!("unknown source selector '{other}'")),
        }
    }
}

fn text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn source_selector(raw: &str) -> Option<SourceSelector> {
    let raw = text(raw)?;
    match raw.parse() {
        Ok(selector) => Some(selector),
        Err(reason) => {
            warn!("Dropping source filter: {}", reason);
            None
        }
    }
}

fn number(field: &str, raw: &str) -> Option<i64> {
    let raw = text(raw)?;
    match raw.parse::<i64>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Dropping {} filter: '{}' is not a whole number", field, raw);
            None
        }
    }
}

fn fraction(field: &str, raw: &str) -> Option<f64> {
    let raw = text(raw)?;
    match raw.replace(',', ".").parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => {
            warn!("Dropping {} filter: '{}' is not a number", field, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_filters_produce_no_params() {
        let filters = FilterState::default();
        assert!(filters.is_unset());
        assert!(filters.parse().to_params().is_empty());
    }

    #[test]
    fn whitespace_counts_as_unset() {
        let filters = FilterState {
            search: "   ".into(),
            municipality: "\t".into(),
            price_min: " ".into(),
            ..Default::default()
        };
        assert!(filters.parse().to_params().is_empty());
    }

    #[test]
    fn non_numeric_bounds_are_omitted() {
        let filters = FilterState {
            price_min: "abc".into(),
            price_max: "1e400".into(),
            rooms_min: "NaN".into(),
            size_max: "inf".into(),
            deal_score_min: "70".into(),
            ..Default::default()
        };
        let parsed = filters.parse();
        assert_eq!(parsed.price_min, None);
        assert_eq!(parsed.price_max, None);
        assert_eq!(parsed.rooms_min, None);
        assert_eq!(parsed.size_max, None);
        assert_eq!(parsed.to_params(), vec![("deal_score_min", "70".to_string())]);
    }

    #[test]
    fn decimal_comma_is_accepted_for_fractional_bounds() {
        let filters = FilterState {
            rooms_min: "2,5".into(),
            size_min: "40.5".into(),
            ..Default::default()
        };
        let parsed = filters.parse();
        assert_eq!(parsed.rooms_min, Some(2.5));
        assert_eq!(parsed.size_min, Some(40.5));
    }

    #[test]
    fn unknown_source_selector_is_dropped() {
        let bad = FilterState {
            source: "zillow".into(),
            ..Default::default()
        };
        assert_eq!(bad.parse().source, None);

        let good = FilterState {
            source: "OLX".into(),
            ..Default::default()
        };
        assert_eq!(good.parse().source, Some(SourceSelector::Olx));
    }

    #[test]
    fn present_fields_keep_their_values() {
        let filters = FilterState {
            price_min: "50000".into(),
            price_max: "".into(),
            municipality: " Centar ".into(),
            ..Default::default()
        };
        assert_eq!(
            filters.parse().to_params(),
            vec![
                ("price_min", "50000".to_string()),
                ("municipality", "Centar".to_string()),
            ]
        );
    }

    #[test]
    fn equality_is_field_by_field() {
        let a = FilterState {
            municipality: "Centar".into(),
            ..Default::default()
        };
        let b = a.clone();
        let c = FilterState {
            municipality: "Ilidža".into(),
            ..Default::default()
        };
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
