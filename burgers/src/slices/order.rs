//! Order submission.
//!
//! `idle → pending → fulfilled | failed`, back to idle through [`OrderAction::Clear`].
//! A submit without a bun, or while another submission is pending, is ignored.

use crate::environment::BurgerEnvironment;
use crate::slices::draft::DraftState;
use crate::types::Order;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use stellar_burgers_core::effect::Effect;
use stellar_burgers_core::reducer::Reducer;
use stellar_burgers_core::request::RequestState;
use stellar_burgers_core::{SmallVec, request_effect, smallvec};

/// Lifecycle of the current order submission
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderState {
    /// The order returned by the service
    pub submission: RequestState<Order>,
}

/// Inputs of the order submission
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OrderAction {
    /// Submit a snapshot of the draft
    Submit {
        /// Draft at the moment of submission
        draft: DraftState,
    },
    /// The service accepted the order
    Submitted {
        /// The created order
        order: Order,
    },
    /// The order could not be placed
    SubmitFailed {
        /// Failure message
        error: String,
    },
    /// Forget the placed order (the confirmation was dismissed)
    Clear,
}

/// Reducer for order submission
#[derive(Clone, Debug, Default)]
pub struct OrderReducer;

impl OrderReducer {
    /// Creates a new order reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for OrderReducer {
    type State = OrderState;
    type Action = OrderAction;
    type Environment = BurgerEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            OrderAction::Submit { draft } => {
                if state.submission.is_loading {
                    tracing::debug!("Submission already pending, ignoring");
                    return SmallVec::new();
                }
                let Some(ingredients) = draft.payload() else {
                    tracing::debug!("Draft has no bun, ignoring submission");
                    return SmallVec::new();
                };

                tracing::info!(items = ingredients.len(), "Submitting order");
                state.submission.start();

                let orders = Arc::clone(&env.orders);
                smallvec![request_effect! {
                    request: orders.submit_order(ingredients),
                    on_success: |order| OrderAction::Submitted { order },
                    on_error: |error| OrderAction::SubmitFailed { error }
                }]
            },
            OrderAction::Submitted { order } => {
                tracing::info!(number = %order.number, "Order placed");
                state.submission.succeed(order);
                SmallVec::new()
            },
            OrderAction::SubmitFailed { error } => {
                tracing::warn!(%error, "Order submission failed");
                state.submission.fail(error);
                SmallVec::new()
            },
            OrderAction::Clear => {
                state.submission.discard();
                SmallVec::new()
            },
        }
    }
}
