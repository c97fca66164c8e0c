use crate::api::ListingsApi;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::filters::{FilterState, ListingsQuery, SortBy, SortOrder};
use crate::models::Listing;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Mutable feed state. Only the engine writes to it.
#[derive(Debug, Default)]
struct ListingsState {
    listings: Vec<Listing>,
    loading: bool,
    loading_more: bool,
    error: Option<ApiError>,
    offset: usize,
    has_more: bool,
    /// `None` until the backend reports a total
    total: Option<usize>,
    filters: FilterState,
    /// Bumped by every reset; responses tagged with an older value are dropped
    generation: u64,
    last_loaded_at: Option<DateTime<Utc>>,
}

impl ListingsState {
    fn new() -> Self {
        Self {
            has_more: true,
            ..Default::default()
        }
    }
}

/// Owned copy of the feed state for rendering
#[derive(Debug, Clone)]
pub struct ListingsSnapshot {
    pub listings: Vec<Listing>,
    pub loading: bool,
    pub loading_more: bool,
    pub error: Option<ApiError>,
    pub offset: usize,
    pub has_more: bool,
    /// Reported total, or the accumulated length when none was reported
    pub total_count: usize,
    pub filters: FilterState,
    pub generation: u64,
    pub last_loaded_at: Option<DateTime<Utc>>,
}

/// What a fetch call ended up doing
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The response was applied to the feed; `received` counts rows the
    /// backend returned, including any that failed to decode
    Applied { received: usize },
    /// Nothing was requested (no more pages, a page already loading, or
    /// the filters did not change)
    Skipped,
    /// A newer reset superseded this request; its response was discarded
    Stale,
    Failed(ApiError),
}

/// What the engine needs to remember about a request while it is in flight
struct Ticket {
    generation: u64,
    reset: bool,
    query: ListingsQuery,
}

/// Paginated listing feed driven by the current filters.
///
/// Cloning gives another handle to the same feed. Every async path reads
/// filters, offset and generation from the shared state at call time and
/// checks the generation again when the response lands, so a slow reply to
/// an old filter set can never overwrite a newer one.
#[derive(Clone)]
pub struct ListingsEngine {
    api: Arc<dyn ListingsApi>,
    state: Arc<Mutex<ListingsState>>,
    page_size: usize,
    sort_by: SortBy,
    sort_order: SortOrder,
}

impl ListingsEngine {
    pub fn new(api: Arc<dyn ListingsApi>, config: &ClientConfig) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(ListingsState::new())),
            page_size: config.page_size.max(1),
            sort_by: config.sort_by,
            sort_order: config.sort_order,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Replace the filters wholesale and start over from the first page.
    /// Identical filters are a no-op; use [`refresh`](Self::refresh) to refetch.
    pub async fn set_filters(&self, filters: FilterState) -> FetchOutcome {
        {
            let mut state = self.state.lock();
            if state.filters == filters {
                debug!("Filters unchanged, skipping reset fetch");
                return FetchOutcome::Skipped;
            }
            state.filters = filters;
        }
        self.fetch(true).await
    }

    pub async fn clear_filters(&self) -> FetchOutcome {
        self.set_filters(FilterState::default()).await
    }

    pub async fn refresh(&self) -> FetchOutcome {
        self.fetch(true).await
    }

    pub async fn load_more(&self) -> FetchOutcome {
        self.fetch(false).await
    }

    /// Fetch the next page, or the first page again when `reset` is set
    pub async fn fetch(&self, reset: bool) -> FetchOutcome {
        let Some(ticket) = self.begin(reset) else {
            return FetchOutcome::Skipped;
        };

        debug!(
            generation = ticket.generation,
            offset = ticket.query.offset,
            reset,
            "Fetching listings page"
        );
        let result = self.api.fetch_listings(&ticket.query).await;

        self.finish(ticket, result)
    }

    /// Update flags and capture a ticket, or `None` if this fetch should not run
    fn begin(&self, reset: bool) -> Option<Ticket> {
        let mut state = self.state.lock();

        if reset {
            state.generation += 1;
            state.loading = true;
            // a page already in flight belongs to the old generation
            state.loading_more = false;
            state.offset = 0;
            state.has_more = true;
            state.error = None;
        } else {
            if !state.has_more || state.loading_more || state.loading {
                debug!(
                    has_more = state.has_more,
                    loading = state.loading,
                    loading_more = state.loading_more,
                    "Skipping load more"
                );
                return None;
            }
            state.loading_more = true;
        }

        Some(Ticket {
            generation: state.generation,
            reset,
            query: ListingsQuery {
                limit: self.page_size,
                offset: state.offset,
                sort_by: self.sort_by,
                sort_order: self.sort_order,
                filters: state.filters.parse(),
            },
        })
    }

    fn finish(
        &self,
        ticket: Ticket,
        result: Result<crate::api::ListingsPage, ApiError>,
    ) -> FetchOutcome {
        let mut state = self.state.lock();

        if ticket.generation != state.generation {
            debug!(
                stale = ticket.generation,
                current = state.generation,
                "Discarding response from superseded fetch"
            );
            return FetchOutcome::Stale;
        }

        if ticket.reset {
            state.loading = false;
        } else {
            state.loading_more = false;
        }

        match result {
            Ok(page) => {
                let received = page.returned;
                if page.listings.len() < received {
                    debug!(
                        "Page had {} undecodable rows; advancing offset past them",
                        received - page.listings.len()
                    );
                }
                if ticket.reset {
                    state.listings = page.listings;
                } else {
                    state.listings.extend(page.listings);
                }
                state.offset = ticket.query.offset + received;
                if page.total.is_some() {
                    state.total = page.total;
                }
                let offset = state.offset;
                state.has_more =
                    received == self.page_size && state.total.map_or(true, |total| offset < total);
                state.error = None;
                state.last_loaded_at = Some(Utc::now());

                info!(
                    "Loaded {} listings (offset {}, total {:?}, has_more {})",
                    received, state.offset, state.total, state.has_more
                );
                FetchOutcome::Applied { received }
            }
            Err(err) => {
                warn!("Failed to load listings: {}", err);
                if ticket.reset {
                    // offset was rewound but the old pages are still shown;
                    // appending from offset 0 would duplicate them
                    state.has_more = false;
                }
                state.error = Some(err.clone());
                FetchOutcome::Failed(err)
            }
        }
    }

    pub fn snapshot(&self) -> ListingsSnapshot {
        let state = self.state.lock();
        ListingsSnapshot {
            listings: state.listings.clone(),
            loading: state.loading,
            loading_more: state.loading_more,
            error: state.error.clone(),
            offset: state.offset,
            has_more: state.has_more,
            total_count: state.total.unwrap_or(state.listings.len()),
            filters: state.filters.clone(),
            generation: state.generation,
            last_loaded_at: state.last_loaded_at,
        }
    }

    pub fn filters(&self) -> FilterState {
        self.state.lock().filters.clone()
    }
}
