//! Command-line demo of the burger client.
//!
//! Loads the ingredient catalog and the public order feed through the store and
//! prints a summary.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin stellar-burgers
//!
//! # Against another deployment, with verbose logs
//! BURGER_API_URL=http://localhost:3000/api RUST_LOG=debug cargo run --bin stellar-burgers
//! ```

use std::time::Duration;
use stellar_burgers::slices::{CatalogAction, FeedAction};
use stellar_burgers::{
    AppAction, AppStore, BurgerEnvironment, ClientConfig, IngredientKind, OrderStatus, app_store,
    selectors,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

const REQUEST_WAIT: Duration = Duration::from_secs(30);
const BOARD_SIZE: usize = 10;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ClientConfig::from_env()?;
    info!(base_url = %config.base_url, "=== Stellar Burgers ===");

    let store = app_store(BurgerEnvironment::http(&config)?);

    run(&store, AppAction::Catalog(CatalogAction::Load)).await?;
    run(&store, AppAction::Feed(FeedAction::LoadFeed)).await?;

    store
        .state(|state| {
            match selectors::catalog_error(state) {
                Some(error) => println!("Catalog unavailable: {error}"),
                None => {
                    println!("Catalog: {} ingredients", selectors::ingredients(state).len());
                    for kind in [IngredientKind::Bun, IngredientKind::Sauce, IngredientKind::Main] {
                        let items = selectors::ingredients_of_kind(state, kind);
                        let cheapest = items.iter().map(|i| i.price).min().unwrap_or(0);
                        println!("  {kind:<6} {:>3} (from {cheapest})", items.len());
                    }
                },
            }

            match selectors::feed_error(state) {
                Some(error) => println!("Feed unavailable: {error}"),
                None => {
                    println!(
                        "Feed: {} orders total, {} today",
                        selectors::feed_total(state),
                        selectors::feed_total_today(state)
                    );
                    println!(
                        "  ready:       {:?}",
                        selectors::order_numbers_with_status(state, OrderStatus::Done, BOARD_SIZE)
                    );
                    println!(
                        "  in progress: {:?}",
                        selectors::order_numbers_with_status(state, OrderStatus::Pending, BOARD_SIZE)
                    );
                },
            }
        })
        .await;

    store.shutdown(Duration::from_secs(5)).await?;
    Ok(())
}

/// Send an action and wait until the request it started has been reduced
async fn run(store: &AppStore, action: AppAction) -> anyhow::Result<()> {
    let mut handle = store.send(action).await?;
    handle.wait_with_timeout(REQUEST_WAIT).await?;
    Ok(())
}
