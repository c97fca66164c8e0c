use crate::error::ApiError;
use crate::filters::ListingsQuery;
use crate::models::{Listing, ListingKey};
use async_trait::async_trait;

use super::types::ListingsPage;

/// Read side of the listings backend.
/// The engines only talk to this trait, so tests can swap in a scripted fake.
#[async_trait]
pub trait ListingsApi: Send + Sync {
    /// Fetch one page of listings
    async fn fetch_listings(&self, query: &ListingsQuery) -> Result<ListingsPage, ApiError>;

    /// Fetch a single listing by its composite key
    async fn fetch_listing(&self, key: ListingKey) -> Result<Listing, ApiError>;
}

/// The signed-in user's favorites
#[async_trait]
pub trait FavoritesApi: Send + Sync {
    async fn list_favorites(&self) -> Result<Vec<Listing>, ApiError>;

    async fn add_favorite(&self, key: ListingKey) -> Result<(), ApiError>;

    async fn remove_favorite(&self, key: ListingKey) -> Result<(), ApiError>;

    /// Server-side membership check for a single listing
    async fn is_favorite(&self, key: ListingKey) -> Result<bool, ApiError>;
}

/// Source of the `Authorization` header value
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// `None` when no user is signed in
    async fn auth_header(&self) -> Option<String>;
}

/// Never attaches a token
pub struct Anonymous;

#[async_trait]
impl AuthProvider for Anonymous {
    async fn auth_header(&self) -> Option<String> {
        None
    }
}

/// A fixed bearer token, e.g. read from config
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl AuthProvider for StaticToken {
    async fn auth_header(&self) -> Option<String> {
        Some(format!("Bearer {}", self.0))
    }
}
