pub mod client;
pub mod traits;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use client::HttpClient;
pub use traits::{Anonymous, AuthProvider, FavoritesApi, ListingsApi, StaticToken};
pub use types::{FavoriteRequest, ListingsPage, PredictionRequest};
