//! Listing feed client core: filter state, paginated listing retrieval and
//! optimistic favorites against the property listings backend.

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod filters;
pub mod format;
pub mod models;

pub use config::ClientConfig;
pub use engine::{FavoritesEngine, FetchOutcome, ListingsEngine, ToggleOutcome};
pub use error::{ApiError, ConfigError};
pub use filters::FilterState;
pub use models::{Listing, ListingKey, Source};
