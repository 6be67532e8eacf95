//! Application state container.
//!
//! [`AppState`] holds every slice. [`AppReducer`] routes slice actions to the
//! slice reducers and implements the two flows that span slices: placing an
//! order from the current draft, and dismissing the placed order.

use crate::environment::BurgerEnvironment;
use crate::slices::{
    CatalogAction, CatalogReducer, CatalogState, DraftAction, DraftReducer, DraftState,
    FeedAction, FeedReducer, FeedState, OrderAction, OrderReducer, OrderState, SessionAction,
    SessionReducer, SessionState,
};
use serde::{Deserialize, Serialize};
use stellar_burgers_core::SmallVec;
use stellar_burgers_core::composition::{ScopedReducer, scope_reducer};
use stellar_burgers_core::effect::Effect;
use stellar_burgers_core::reducer::Reducer;
use stellar_burgers_runtime::Store;

/// State of the whole client
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    /// Ingredient catalog
    pub catalog: CatalogState,
    /// Burger being assembled
    pub draft: DraftState,
    /// Current order submission
    pub order: OrderState,
    /// Public feed and order lookup
    pub feed: FeedState,
    /// Authentication and profile
    pub session: SessionState,
}

/// Every input of the client
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppAction {
    /// Catalog input
    Catalog(CatalogAction),
    /// Draft input
    Draft(DraftAction),
    /// Order submission input
    Order(OrderAction),
    /// Feed input
    Feed(FeedAction),
    /// Session input
    Session(SessionAction),
    /// Submit the current draft as an order
    PlaceOrder,
    /// Close the order confirmation: forget the order and empty the draft
    DismissOrder,
}

fn catalog(state: &mut AppState) -> &mut CatalogState {
    &mut state.catalog
}

fn draft(state: &mut AppState) -> &mut DraftState {
    &mut state.draft
}

fn order(state: &mut AppState) -> &mut OrderState {
    &mut state.order
}

fn feed(state: &mut AppState) -> &mut FeedState {
    &mut state.feed
}

fn session(state: &mut AppState) -> &mut SessionState {
    &mut state.session
}

/// Reducer for the whole client
#[derive(Clone)]
pub struct AppReducer {
    catalog: ScopedReducer<AppState, AppAction, CatalogReducer>,
    draft: ScopedReducer<AppState, AppAction, DraftReducer>,
    order: ScopedReducer<AppState, AppAction, OrderReducer>,
    feed: ScopedReducer<AppState, AppAction, FeedReducer>,
    session: ScopedReducer<AppState, AppAction, SessionReducer>,
}

impl AppReducer {
    /// Creates the application reducer out of the slice reducers
    #[must_use]
    pub fn new() -> Self {
        Self {
            catalog: scope_reducer(CatalogReducer::new(), catalog, AppAction::Catalog),
            draft: scope_reducer(DraftReducer::new(), draft, AppAction::Draft),
            order: scope_reducer(OrderReducer::new(), order, AppAction::Order),
            feed: scope_reducer(FeedReducer::new(), feed, AppAction::Feed),
            session: scope_reducer(SessionReducer::new(), session, AppAction::Session),
        }
    }
}

impl Default for AppReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl Reducer for AppReducer {
    type State = AppState;
    type Action = AppAction;
    type Environment = BurgerEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            AppAction::Catalog(action) => self.catalog.reduce(state, action, env),
            AppAction::Draft(action) => self.draft.reduce(state, action, env),
            AppAction::Order(action) => {
                let placed = matches!(action, OrderAction::Submitted { .. });
                let mut effects = self.order.reduce(state, action, env);
                if placed {
                    effects.extend(self.draft.reduce(state, DraftAction::Clear, env));
                }
                effects
            },
            AppAction::Feed(action) => self.feed.reduce(state, action, env),
            AppAction::Session(action) => self.session.reduce(state, action, env),
            AppAction::PlaceOrder => {
                let draft = state.draft.clone();
                self.order.reduce(state, OrderAction::Submit { draft }, env)
            },
            AppAction::DismissOrder => {
                let mut effects = self.order.reduce(state, OrderAction::Clear, env);
                effects.extend(self.draft.reduce(state, DraftAction::Clear, env));
                effects
            },
        }
    }
}

/// Store running the whole client
pub type AppStore = Store<AppState, AppAction, BurgerEnvironment, AppReducer>;

/// Create the application store; it lives for the rest of the process
#[must_use]
pub fn app_store(environment: BurgerEnvironment) -> AppStore {
    Store::new(AppState::default(), AppReducer::new(), environment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{FakeBurgerApi, bun, order as placed_order, sauce, test_environment};
    use crate::types::OrderStatus;
    use std::sync::Arc;
    use stellar_burgers_testing::{ReducerTest, assertions};

    fn add(ingredient: crate::types::Ingredient) -> AppAction {
        AppAction::Draft(DraftAction::AddIngredient { ingredient })
    }

    #[test]
    fn place_order_snapshots_the_draft() {
        let api = Arc::new(FakeBurgerApi::new());

        ReducerTest::new(AppReducer::new())
            .with_env(test_environment(&api))
            .given_state(AppState::default())
            .when_action(add(bun("B", 10)))
            .when_action(add(sauce("X", 5)))
            .when_action(AppAction::PlaceOrder)
            .then_state(|state| {
                assert!(state.order.submission.is_loading);
                assert_eq!(state.draft.fillings.len(), 1);
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn place_order_without_bun_does_nothing() {
        let api = Arc::new(FakeBurgerApi::new());

        ReducerTest::new(AppReducer::new())
            .with_env(test_environment(&api))
            .given_state(AppState::default())
            .when_action(add(sauce("X", 5)))
            .when_action(AppAction::PlaceOrder)
            .then_state(|state| assert!(!state.order.submission.is_loading))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn successful_submission_clears_the_draft() {
        let api = Arc::new(FakeBurgerApi::new());

        ReducerTest::new(AppReducer::new())
            .with_env(test_environment(&api))
            .given_state(AppState::default())
            .when_action(add(bun("B", 10)))
            .when_action(AppAction::PlaceOrder)
            .when_action(AppAction::Order(OrderAction::Submitted {
                order: placed_order(12, OrderStatus::Created, &["B", "B"]),
            }))
            .then_state(|state| {
                assert!(state.draft.is_empty());
                assert!(state.order.submission.data.is_some());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn failed_submission_keeps_the_draft() {
        let api = Arc::new(FakeBurgerApi::new());

        ReducerTest::new(AppReducer::new())
            .with_env(test_environment(&api))
            .given_state(AppState::default())
            .when_action(add(bun("B", 10)))
            .when_action(AppAction::PlaceOrder)
            .when_action(AppAction::Order(OrderAction::SubmitFailed {
                error: "jwt malformed".to_string(),
            }))
            .then_state(|state| {
                assert!(!state.draft.is_empty());
                assert_eq!(state.order.submission.error(), Some("jwt malformed"));
            })
            .run();
    }

    #[test]
    fn dismiss_order_clears_order_and_draft() {
        let api = Arc::new(FakeBurgerApi::new());
        let mut state = AppState::default();
        state
            .order
            .submission
            .succeed(placed_order(12, OrderStatus::Created, &["B", "B"]));

        ReducerTest::new(AppReducer::new())
            .with_env(test_environment(&api))
            .given_state(state)
            .when_action(add(bun("B", 10)))
            .when_action(AppAction::DismissOrder)
            .then_state(|state| {
                assert!(state.draft.is_empty());
                assert!(state.order.submission.data.is_none());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }
}
