use crate::error::ApiError;
use crate::models::Listing;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// One normalized page from the listings endpoint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingsPage {
    /// Rows that decoded; undecodable rows are dropped here
    pub listings: Vec<Listing>,
    /// Rows the backend sent, decodable or not. Pagination advances by this.
    pub returned: usize,
    /// Total matching rows, when the backend reported one
    pub total: Option<usize>,
}

/// Normalize a listings response body.
///
/// The backend has answered with three shapes over time: a bare array,
/// `{ data, total }`, and `{ success, data, count }`. `count` is the length
/// of this page, so it is never used as the total. A body of any other shape
/// yields an empty page; only an explicit `success: false` is an error.
pub fn parse_listings_page(body: Value) -> Result<ListingsPage, ApiError> {
    match body {
        Value::Array(items) => Ok(ListingsPage {
            returned: items.len(),
            listings: decode_items(items),
            total: None,
        }),
        Value::Object(mut obj) => {
            check_success(&obj)?;

            let total = obj
                .get("total")
                .and_then(Value::as_u64)
                .map(|t| t as usize);
            let (listings, returned) = match obj.remove("data") {
                Some(Value::Array(items)) => {
                    let returned = items.len();
                    (decode_items(items), returned)
                }
                Some(other) => {
                    warn!("Listings response 'data' is not an array: {}", kind(&other));
                    (Vec::new(), 0)
                }
                None => {
                    warn!("Listings response has no 'data' field");
                    (Vec::new(), 0)
                }
            };

            Ok(ListingsPage {
                listings,
                returned,
                total,
            })
        }
        other => {
            warn!("Unexpected listings response: {}", kind(&other));
            Ok(ListingsPage::default())
        }
    }
}

/// Normalize a favorites response body (`{ success, data }` or a bare array)
pub fn parse_favorites(body: Value) -> Result<Vec<Listing>, ApiError> {
    parse_listings_page(body).map(|page| page.listings)
}

/// Unwrap `{ success, data }` around a single listing
pub fn parse_single_listing(body: Value) -> Result<Listing, ApiError> {
    let data = match body {
        Value::Object(mut obj) if obj.contains_key("data") => {
            check_success(&obj)?;
            obj.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    };
    Ok(serde_json::from_value(data)?)
}

/// Pull a human-readable message out of an error body
pub fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["detail", "message", "error"]
        .iter()
        .filter_map(|key| value.get(*key))
        .find_map(|v| v.as_str().map(str::to_string))
}

/// Body for `POST`/`DELETE /api/v2/favorites`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FavoriteRequest {
    pub listing_id: i64,
    pub source: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FavoriteCheck {
    #[serde(default)]
    pub is_favorite: bool,
}

/// Input features for the price model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionRequest {
    pub longitude: f64,
    pub latitude: f64,
    pub condition: String,
    pub ad_type: String,
    pub property_type: String,
    pub rooms: u32,
    pub square_m2: f64,
    pub equipment: String,
    pub level: i32,
    pub heating: String,
}

impl PredictionRequest {
    /// Same bounds the prediction endpoint enforces
    pub fn validate(&self) -> Result<(), ApiError> {
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ApiError::Invalid("longitude must be within -180..180".into()));
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ApiError::Invalid("latitude must be within -90..90".into()));
        }
        if self.rooms == 0 {
            return Err(ApiError::Invalid("rooms must be greater than zero".into()));
        }
        if !(self.square_m2.is_finite() && self.square_m2 > 0.0) {
            return Err(ApiError::Invalid("square_m2 must be greater than zero".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PredictionResponse {
    pub predicted_price: f64,
}

fn check_success(obj: &serde_json::Map<String, Value>) -> Result<(), ApiError> {
    if obj.get("success").and_then(Value::as_bool) == Some(false) {
        let message = ["message", "detail", "error"]
            .iter()
            .find_map(|key| obj.get(*key).and_then(Value::as_str))
            .unwrap_or("The server could not complete the request")
            .to_string();
        return Err(ApiError::Rejected(message));
    }
    Ok(())
}

fn decode_items(items: Vec<Value>) -> Vec<Listing> {
    let received = items.len();
    let listings: Vec<Listing> = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<Listing>(item) {
            Ok(listing) => Some(listing),
            Err(e) => {
                debug!("Skipping undecodable listing: {}", e);
                None
            }
        })
        .collect();

    if listings.len() < received {
        warn!("Skipped {} of {} listings that failed to decode", received - listings.len(), received);
    }
    listings
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
