//! Scripted in-memory backend for engine tests.
//!
//! Each call pops the next scripted reply. A reply can be gated on a oneshot
//! so a test decides exactly when an in-flight request completes.

use crate::api::traits::{FavoritesApi, ListingsApi};
use crate::api::types::ListingsPage;
use crate::error::ApiError;
use crate::filters::ListingsQuery;
use crate::models::{sample_listing, Listing, ListingKey, Source};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use tokio::sync::oneshot;

struct Reply<T> {
    result: Result<T, ApiError>,
    gate: Option<oneshot::Receiver<()>>,
    started: Option<oneshot::Sender<()>>,
}

/// Handles for a gated reply
pub struct Gate {
    /// Resolves once the request has been issued
    pub started: oneshot::Receiver<()>,
    /// Send to let the request complete
    pub release: oneshot::Sender<()>,
}

struct Script<T> {
    replies: Mutex<VecDeque<Reply<T>>>,
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
        }
    }
}

impl<T> Script<T> {
    fn push(&self, result: Result<T, ApiError>) {
        self.replies.lock().push_back(Reply {
            result,
            gate: None,
            started: None,
        });
    }

    fn push_gated(&self, result: Result<T, ApiError>) -> Gate {
        let (started_tx, started_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        self.replies.lock().push_back(Reply {
            result,
            gate: Some(release_rx),
            started: Some(started_tx),
        });
        Gate {
            started: started_rx,
            release: release_tx,
        }
    }

    async fn next(&self) -> Result<T, ApiError> {
        let reply = self.replies.lock().pop_front();
        let Some(reply) = reply else {
            return Err(ApiError::Transport("no scripted reply".into()));
        };
        if let Some(started) = reply.started {
            let _ = started.send(());
        }
        if let Some(gate) = reply.gate {
            let _ = gate.await;
        }
        reply.result
    }
}

#[derive(Default)]
pub struct ScriptedApi {
    pages: Script<ListingsPage>,
    favorites: Script<Vec<Listing>>,
    writes: Script<()>,
    pub queries: Mutex<Vec<ListingsQuery>>,
    pub write_log: Mutex<Vec<(&'static str, ListingKey)>>,
}

impl ScriptedApi {
    pub fn push_page(&self, page: ListingsPage) {
        self.pages.push(Ok(page));
    }

    pub fn push_page_gated(&self, page: ListingsPage) -> Gate {
        self.pages.push_gated(Ok(page))
    }

    pub fn push_page_error(&self, err: ApiError) {
        self.pages.push(Err(err));
    }

    pub fn push_favorites(&self, result: Result<Vec<Listing>, ApiError>) {
        self.favorites.push(result);
    }

    pub fn push_favorites_gated(&self, result: Result<Vec<Listing>, ApiError>) -> Gate {
        self.favorites.push_gated(result)
    }

    pub fn push_write(&self, result: Result<(), ApiError>) {
        self.writes.push(result);
    }

    pub fn push_write_gated(&self, result: Result<(), ApiError>) -> Gate {
        self.writes.push_gated(result)
    }

    pub fn last_query(&self) -> Option<ListingsQuery> {
        self.queries.lock().last().cloned()
    }
}

/// `count` olx listings with ids starting at `first_id`
pub fn listings(first_id: i64, count: usize) -> Vec<Listing> {
    (0..count as i64)
        .map(|i| sample_listing(Source::Olx, first_id + i))
        .collect()
}

pub fn page(first_id: i64, count: usize, total: Option<usize>) -> ListingsPage {
    ListingsPage {
        listings: listings(first_id, count),
        returned: count,
        total,
    }
}

#[async_trait]
impl ListingsApi for ScriptedApi {
    async fn fetch_listings(&self, query: &ListingsQuery) -> Result<ListingsPage, ApiError> {
        self.queries.lock().push(query.clone());
        self.pages.next().await
    }

    async fn fetch_listing(&self, key: ListingKey) -> Result<Listing, ApiError> {
        Ok(sample_listing(key.source, key.id))
    }
}

#[async_trait]
impl FavoritesApi for ScriptedApi {
    async fn list_favorites(&self) -> Result<Vec<Listing>, ApiError> {
        self.favorites.next().await
    }

    async fn add_favorite(&self, key: ListingKey) -> Result<(), ApiError> {
        self.write_log.lock().push(("add", key));
        self.writes.next().await
    }

    async fn remove_favorite(&self, key: ListingKey) -> Result<(), ApiError> {
        self.write_log.lock().push(("remove", key));
        self.writes.next().await
    }

    async fn is_favorite(&self, _key: ListingKey) -> Result<bool, ApiError> {
        Ok(false)
    }
}
