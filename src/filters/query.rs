use super::RequestFilters;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Sort column accepted by the listings endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    DealScore,
    Price,
    Date,
    Size,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::DealScore => "deal_score",
            SortBy::Price => "price",
            SortBy::Date => "date",
            SortBy::Size => "size",
        }
    }
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "deal_score" => Ok(SortBy::DealScore),
            "price" => Ok(SortBy::Price),
            "date" => Ok(SortBy::Date),
            "size" => Ok(SortBy::Size),
            other => Err(format!("expected deal_score, price, date or size, got '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("expected asc or desc, got '{other}'")),
        }
    }
}

/// One page request against the listings endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct ListingsQuery {
    pub limit: usize,
    pub offset: usize,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
    pub filters: RequestFilters,
}

impl ListingsQuery {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("limit", self.limit.to_string()),
            ("offset", self.offset.to_string()),
            ("sort_by", self.sort_by.as_str().to_string()),
            ("sort_order", self.sort_order.as_str().to_string()),
        ];
        params.extend(self.filters.to_params());
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::FilterState;

    fn has(params: &[(&'static str, String)], key: &str, value: &str) -> bool {
        params.iter().any(|(k, v)| *k == key && v == value)
    }

    #[test]
    fn first_page_params_for_partial_filters() {
        let filters = FilterState {
            price_min: "50000".into(),
            price_max: "".into(),
            municipality: "Centar".into(),
            ..Default::default()
        };
        let query = ListingsQuery {
            limit: 50,
            offset: 0,
            sort_by: SortBy::default(),
            sort_order: SortOrder::default(),
            filters: filters.parse(),
        };
        let params = query.to_params();

        assert!(has(&params, "price_min", "50000"));
        assert!(has(&params, "municipality", "Centar"));
        assert!(has(&params, "limit", "50"));
        assert!(has(&params, "offset", "0"));
        assert!(has(&params, "sort_by", "deal_score"));
        assert!(has(&params, "sort_order", "desc"));
        for absent in ["price_max", "property_type", "ad_type", "rooms_min", "search", "source"] {
            assert!(params.iter().all(|(k, _)| *k != absent), "{absent} should be omitted");
        }
    }

    #[test]
    fn sort_values_parse_from_backend_names() {
        assert_eq!("price".parse::<SortBy>().unwrap(), SortBy::Price);
        assert_eq!("asc".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert!("newest".parse::<SortBy>().is_err());
    }
}
