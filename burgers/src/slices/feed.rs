//! Public order feed and lookup of a single order by number.
//!
//! The two requests have independent loading and error tracking.

use crate::environment::BurgerEnvironment;
use crate::types::{FeedSnapshot, Order, OrderNumber};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use stellar_burgers_core::effect::Effect;
use stellar_burgers_core::reducer::Reducer;
use stellar_burgers_core::request::RequestState;
use stellar_burgers_core::{SmallVec, request_effect, smallvec};

/// Feed and order lookup
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedState {
    /// Last fetched feed, replaced wholesale on every success
    pub feed: RequestState<FeedSnapshot>,
    /// Result of the last lookup by number
    pub lookup: RequestState<Order>,
}

impl FeedState {
    /// Orders of the last fetched feed
    #[must_use]
    pub fn orders(&self) -> &[Order] {
        self.feed
            .data()
            .map(|feed| feed.orders.as_slice())
            .unwrap_or_default()
    }

    /// Orders placed since the service started
    #[must_use]
    pub fn total(&self) -> u64 {
        self.feed.data().map_or(0, |feed| feed.total)
    }

    /// Orders placed today
    #[must_use]
    pub fn total_today(&self) -> u64 {
        self.feed.data().map_or(0, |feed| feed.total_today)
    }
}

/// Inputs of the feed
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FeedAction {
    /// Fetch the public feed
    LoadFeed,
    /// The feed arrived
    FeedLoaded {
        /// The new feed
        feed: FeedSnapshot,
    },
    /// The feed could not be fetched
    FeedFailed {
        /// Failure message
        error: String,
    },
    /// Look up an order by its public number
    LoadOrder {
        /// Number to look up
        number: OrderNumber,
    },
    /// The lookup returned
    OrderLoaded {
        /// Matching orders; only the first is kept
        orders: Vec<Order>,
    },
    /// The lookup failed
    OrderFailed {
        /// Failure message
        error: String,
    },
}

/// Reducer for the feed
#[derive(Clone, Debug, Default)]
pub struct FeedReducer;

impl FeedReducer {
    /// Creates a new feed reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for FeedReducer {
    type State = FeedState;
    type Action = FeedAction;
    type Environment = BurgerEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            FeedAction::LoadFeed => {
                if state.feed.is_loading {
                    tracing::debug!("Feed already loading, ignoring");
                    return SmallVec::new();
                }
                state.feed.start();

                let orders = Arc::clone(&env.orders);
                return smallvec![request_effect! {
                    request: orders.fetch_feed(),
                    on_success: |feed| FeedAction::FeedLoaded { feed },
                    on_error: |error| FeedAction::FeedFailed { error }
                }];
            },
            FeedAction::FeedLoaded { feed } => {
                tracing::debug!(orders = feed.orders.len(), total = feed.total, "Feed loaded");
                state.feed.succeed(feed);
            },
            FeedAction::FeedFailed { error } => {
                tracing::warn!(%error, "Feed request failed");
                state.feed.fail(error);
            },
            FeedAction::LoadOrder { number } => {
                state.lookup.start();

                let orders = Arc::clone(&env.orders);
                return smallvec![request_effect! {
                    request: orders.fetch_order_by_number(number),
                    on_success: |orders| FeedAction::OrderLoaded { orders },
                    on_error: |error| FeedAction::OrderFailed { error }
                }];
            },
            FeedAction::OrderLoaded { orders } => {
                if orders.len() > 1 {
                    tracing::debug!(count = orders.len(), "Lookup matched several orders, keeping the first");
                }
                state.lookup.resolve(orders.into_iter().next());
            },
            FeedAction::OrderFailed { error } => {
                tracing::warn!(%error, "Order lookup failed");
                state.lookup.fail(error);
            },
        }

        SmallVec::new()
    }
}
