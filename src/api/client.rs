use crate::api::traits::{AuthProvider, FavoritesApi, ListingsApi};
use crate::api::types::{
    error_message, parse_favorites, parse_listings_page, parse_single_listing, FavoriteCheck,
    FavoriteRequest, ListingsPage, PredictionRequest, PredictionResponse,
};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::filters::ListingsQuery;
use crate::models::{Listing, ListingKey};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// reqwest-backed client for the listings backend
pub struct HttpClient {
    client: Client,
    base_url: String,
    auth: Arc<dyn AuthProvider>,
}

impl HttpClient {
    pub fn new(config: &ClientConfig, auth: Arc<dyn AuthProvider>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ApiError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn authorized(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let header = self.auth.auth_header().await.ok_or(ApiError::Auth)?;
        Ok(self
            .client
            .request(method, self.url(path))
            .header(AUTHORIZATION, header))
    }

    /// Send and decode a JSON body, mapping non-2xx statuses to `ApiError::Status`
    async fn send_json(&self, request: RequestBuilder, what: &str) -> Result<Value, ApiError> {
        let response = request.send().await?;
        let response = check_status(response, what).await?;
        let body = response.text().await?;

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// Ask the price model for an estimate
    pub async fn predict_price(&self, request: &PredictionRequest) -> Result<f64, ApiError> {
        request.validate()?;

        debug!(
            property_type = %request.property_type,
            rooms = request.rooms,
            square_m2 = request.square_m2,
            "Requesting price prediction"
        );
        let body = self
            .send_json(self.client.post(self.url("/predict")).json(request), "prediction")
            .await?;
        let response: PredictionResponse = serde_json::from_value(body)?;

        info!("Predicted price: {:.0}", response.predicted_price);
        Ok(response.predicted_price)
    }
}

async fn check_status(response: Response, what: &str) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    warn!("{} request returned status: {}", what, status);
    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body)
        .unwrap_or_else(|| format!("Failed to load {what} (HTTP {})", status.as_u16()));

    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl ListingsApi for HttpClient {
    async fn fetch_listings(&self, query: &ListingsQuery) -> Result<ListingsPage, ApiError> {
        let params = query.to_params();
        debug!("Fetching listings with {:?}", params);

        let request = self.client.get(self.url("/api/v2/listings")).query(&params);
        let body = self.send_json(request, "listings").await?;
        let page = parse_listings_page(body)?;

        debug!(
            "Received {} listings (total: {:?})",
            page.listings.len(),
            page.total
        );
        Ok(page)
    }

    async fn fetch_listing(&self, key: ListingKey) -> Result<Listing, ApiError> {
        let path = format!("/api/v2/listings/{}/{}", key.source, key.id);
        let body = self.send_json(self.client.get(self.url(&path)), "listing").await?;
        parse_single_listing(body)
    }
}

#[async_trait]
impl FavoritesApi for HttpClient {
    async fn list_favorites(&self) -> Result<Vec<Listing>, ApiError> {
        let request = self.authorized(Method::GET, "/api/v2/favorites").await?;
        let body = self.send_json(request, "favorites").await?;
        parse_favorites(body)
    }

    async fn add_favorite(&self, key: ListingKey) -> Result<(), ApiError> {
        let request = self
            .authorized(Method::POST, "/api/v2/favorites")
            .await?
            .json(&favorite_body(key));
        self.send_json(request, "favorite").await?;
        debug!("Added favorite {}", key);
        Ok(())
    }

    async fn remove_favorite(&self, key: ListingKey) -> Result<(), ApiError> {
        let request = self
            .authorized(Method::DELETE, "/api/v2/favorites")
            .await?
            .json(&favorite_body(key));
        self.send_json(request, "favorite").await?;
        debug!("Removed favorite {}", key);
        Ok(())
    }

    async fn is_favorite(&self, key: ListingKey) -> Result<bool, ApiError> {
        let path = format!("/api/v2/favorites/check/{}/{}", key.source, key.id);
        let request = self.authorized(Method::GET, &path).await?;
        let body = self.send_json(request, "favorite status").await?;
        let check: FavoriteCheck = serde_json::from_value(body)?;
        Ok(check.is_favorite)
    }
}

fn favorite_body(key: ListingKey) -> FavoriteRequest {
    FavoriteRequest {
        listing_id: key.id,
        source: key.source.as_str().to_string(),
    }
}
