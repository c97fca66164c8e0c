use crate::api::FavoritesApi;
use crate::engine::optimistic::{run_optimistic, Mutation, Optimistic};
use crate::error::ApiError;
use crate::models::{Listing, ListingKey};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Favorited listings plus their key index.
///
/// The list and the key set only change together, through the methods
/// below, so a key never exists without its listing or the reverse.
#[derive(Debug, Clone, Default)]
pub struct FavoriteSet {
    listings: Vec<Listing>,
    keys: HashSet<ListingKey>,
}

impl FavoriteSet {
    pub fn from_listings(listings: Vec<Listing>) -> Self {
        let mut set = Self::default();
        for listing in listings {
            let at = set.len();
            set.insert(listing, at);
        }
        set
    }

    pub fn contains(&self, key: &ListingKey) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    fn get(&self, key: &ListingKey) -> Option<&Listing> {
        if !self.keys.contains(key) {
            return None;
        }
        self.listings.iter().find(|l| l.key() == *key)
    }

    /// Insert at `at` (clamped); false if the key is already present
    fn insert(&mut self, listing: Listing, at: usize) -> bool {
        if !self.keys.insert(listing.key()) {
            return false;
        }
        let at = at.min(self.listings.len());
        self.listings.insert(at, listing);
        true
    }

    /// Remove by key, returning the listing and the index it sat at
    fn remove(&mut self, key: &ListingKey) -> Option<(Listing, usize)> {
        if !self.keys.remove(key) {
            return None;
        }
        let at = self.listings.iter().position(|l| l.key() == *key)?;
        Some((self.listings.remove(at), at))
    }

    #[cfg(test)]
    fn is_consistent(&self) -> bool {
        self.keys.len() == self.listings.len()
            && self.listings.iter().all(|l| self.keys.contains(&l.key()))
    }
}

/// A single optimistic change to the favorite set
#[derive(Debug, Clone)]
enum FavoriteChange {
    Insert { listing: Listing, at: usize },
    Remove(ListingKey),
}

impl Mutation<FavoritesState> for FavoriteChange {
    fn apply(self, state: &mut FavoritesState) -> Option<Self> {
        match self {
            FavoriteChange::Insert { listing, at } => {
                let key = listing.key();
                state
                    .set
                    .insert(listing, at)
                    .then_some(FavoriteChange::Remove(key))
            }
            FavoriteChange::Remove(key) => state
                .set
                .remove(&key)
                .map(|(listing, at)| FavoriteChange::Insert { listing, at }),
        }
    }
}

#[derive(Debug, Default)]
struct FavoritesState {
    set: FavoriteSet,
    in_flight: HashSet<ListingKey>,
    loading: bool,
    load_generation: u64,
    error: Option<ApiError>,
    loaded_at: Option<DateTime<Utc>>,
}

/// Owned copy of the favorites state for rendering
#[derive(Debug, Clone)]
pub struct FavoritesSnapshot {
    pub favorites: Vec<Listing>,
    pub loading: bool,
    pub error: Option<ApiError>,
    pub loaded_at: Option<DateTime<Utc>>,
    pub pending: usize,
}

/// Result of an add, remove or toggle that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
    /// Already in the requested state; nothing was sent
    Unchanged,
    /// Another change for this listing is still in flight; ignored
    Busy,
}

/// Favorites with optimistic add/remove and rollback on failure
#[derive(Clone)]
pub struct FavoritesEngine {
    api: Arc<dyn FavoritesApi>,
    state: Arc<Mutex<FavoritesState>>,
}

impl FavoritesEngine {
    pub fn new(api: Arc<dyn FavoritesApi>) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(FavoritesState::default())),
        }
    }

    /// Replace local favorites with the server's list.
    ///
    /// Listings with a change still in flight keep their optimistic state;
    /// the pending request settles them. Returns `Ok(None)` when a newer
    /// load started meanwhile and this response was discarded.
    pub async fn load(&self) -> Result<Option<usize>, ApiError> {
        let generation = {
            let mut state = self.state.lock();
            state.loading = true;
            state.load_generation += 1;
            state.load_generation
        };

        let result = self.api.list_favorites().await;

        let mut state = self.state.lock();
        if generation != state.load_generation {
            debug!("Discarding favorites load {} (current {})", generation, state.load_generation);
            return Ok(None);
        }
        state.loading = false;

        match result {
            Ok(favorites) => {
                let mut fresh = FavoriteSet::from_listings(favorites);
                for key in &state.in_flight {
                    match state.set.get(key) {
                        Some(listing) => {
                            fresh.insert(listing.clone(), 0);
                        }
                        None => {
                            fresh.remove(key);
                        }
                    }
                }
                state.set = fresh;
                state.error = None;
                state.loaded_at = Some(Utc::now());
                info!("Loaded {} favorites", state.set.len());
                Ok(Some(state.set.len()))
            }
            Err(err) => {
                warn!("Failed to load favorites: {}", err);
                state.error = Some(err.clone());
                Err(err)
            }
        }
    }

    pub fn is_favorite(&self, listing: &Listing) -> bool {
        self.state.lock().set.contains(&listing.key())
    }

    pub async fn toggle_favorite(&self, listing: &Listing) -> Result<ToggleOutcome, ApiError> {
        if self.is_favorite(listing) {
            self.remove_favorite(listing).await
        } else {
            self.add_favorite(listing).await
        }
    }

    pub async fn add_favorite(&self, listing: &Listing) -> Result<ToggleOutcome, ApiError> {
        let key = listing.key();
        let change = FavoriteChange::Insert {
            listing: listing.clone(),
            at: 0,
        };
        self.commit(key, change, ToggleOutcome::Added).await
    }

    pub async fn remove_favorite(&self, listing: &Listing) -> Result<ToggleOutcome, ApiError> {
        let key = listing.key();
        self.commit(key, FavoriteChange::Remove(key), ToggleOutcome::Removed)
            .await
    }

    /// Ask the server about one listing and align local state with its answer
    pub async fn sync_one(&self, listing: &Listing) -> Result<bool, ApiError> {
        let key = listing.key();
        let remote = self.api.is_favorite(key).await?;

        let mut state = self.state.lock();
        if state.in_flight.contains(&key) {
            // the pending change will settle it
            return Ok(remote);
        }
        let change = if remote {
            FavoriteChange::Insert {
                listing: listing.clone(),
                at: 0,
            }
        } else {
            FavoriteChange::Remove(key)
        };
        if change.apply(&mut *state).is_some() {
            debug!("Reconciled favorite {} to {}", key, remote);
        }
        Ok(remote)
    }

    async fn commit(
        &self,
        key: ListingKey,
        change: FavoriteChange,
        done: ToggleOutcome,
    ) -> Result<ToggleOutcome, ApiError> {
        {
            let mut state = self.state.lock();
            if !state.in_flight.insert(key) {
                debug!("Ignoring change to {}: request already in flight", key);
                return Ok(ToggleOutcome::Busy);
            }
        }

        let api = Arc::clone(&self.api);
        let outcome = run_optimistic(&*self.state, change, || async move {
            match done {
                ToggleOutcome::Added => api.add_favorite(key).await,
                _ => api.remove_favorite(key).await,
            }
        })
        .await;

        let mut state = self.state.lock();
        state.in_flight.remove(&key);
        match outcome {
            Optimistic::Noop => Ok(ToggleOutcome::Unchanged),
            Optimistic::Committed => {
                debug!("Favorite {} committed: {:?}", key, done);
                state.error = None;
                Ok(done)
            }
            Optimistic::RolledBack(err) => {
                warn!("Rolled back favorite {}: {}", key, err);
                state.error = Some(err.clone());
                Err(err)
            }
        }
    }

    pub fn snapshot(&self) -> FavoritesSnapshot {
        let state = self.state.lock();
        FavoritesSnapshot {
            favorites: state.set.listings().to_vec(),
            loading: state.loading,
            error: state.error.clone(),
            loaded_at: state.loaded_at,
            pending: state.in_flight.len(),
        }
    }
}
