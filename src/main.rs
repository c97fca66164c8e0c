use anyhow::{Context, Result};
use listing_feed::api::{Anonymous, AuthProvider, HttpClient, StaticToken};
use listing_feed::format::{deal_label, format_price, format_rooms, format_size};
use listing_feed::{ClientConfig, FavoritesEngine, FetchOutcome, FilterState, ListingsEngine};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const EXTRA_PAGES: usize = 3;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🏠 Listing Feed");
    info!("===============");

    let config = ClientConfig::from_env().context("Invalid LISTINGS_* configuration")?;
    info!("Backend: {} (page size {})", config.base_url, config.page_size);

    let auth: Arc<dyn AuthProvider> = match &config.api_token {
        Some(token) => Arc::new(StaticToken::new(token.clone())),
        None => Arc::new(Anonymous),
    };
    let client = Arc::new(HttpClient::new(&config, auth).context("Failed to create HTTP client")?);

    let feed = ListingsEngine::new(client.clone(), &config);

    let search = std::env::args().nth(1).unwrap_or_default();
    let outcome = if search.is_empty() {
        feed.refresh().await
    } else {
        info!("Searching for '{}'", search);
        feed.set_filters(FilterState {
            search,
            ..Default::default()
        })
        .await
    };

    if let FetchOutcome::Failed(err) = outcome {
        anyhow::bail!("{}", err.user_message());
    }

    for _ in 0..EXTRA_PAGES {
        match feed.load_more().await {
            FetchOutcome::Applied { .. } => {}
            FetchOutcome::Failed(err) => {
                warn!("Stopped paging: {}", err);
                break;
            }
            _ => break,
        }
    }

    let snapshot = feed.snapshot();
    info!(
        "✅ Loaded {} of {} listings\n",
        snapshot.listings.len(),
        snapshot.total_count
    );

    for (i, listing) in snapshot.listings.iter().enumerate() {
        println!("{}. {} ({})", i + 1, listing.title, format_price(listing.price));
        println!(
            "   {} rooms, {}",
            format_rooms(listing.rooms),
            format_size(listing.square_m2)
        );
        if let Some(municipality) = &listing.municipality {
            println!("   Municipality: {}", municipality);
        }
        println!("   Deal: {}", deal_label(listing.deal_score));
        println!("   Key: {}", listing.key());
        println!();
    }

    if config.api_token.is_some() {
        let favorites = FavoritesEngine::new(client);
        match favorites.load().await {
            Ok(Some(count)) => info!("⭐ {} favorites saved", count),
            Ok(None) => {}
            Err(err) => warn!("Could not load favorites: {}", err.user_message()),
        }
    }

    Ok(())
}
