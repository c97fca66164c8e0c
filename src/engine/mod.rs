pub mod favorites;
pub mod listings;
pub mod optimistic;

pub use favorites::{FavoriteSet, FavoritesEngine, FavoritesSnapshot, ToggleOutcome};
pub use listings::{FetchOutcome, ListingsEngine, ListingsSnapshot};
pub use optimistic::{run_optimistic, Mutation, Optimistic};
