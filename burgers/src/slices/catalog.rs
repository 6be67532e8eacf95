//! Ingredient catalog.

use crate::environment::BurgerEnvironment;
use crate::types::Ingredient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use stellar_burgers_core::effect::Effect;
use stellar_burgers_core::reducer::Reducer;
use stellar_burgers_core::request::RequestState;
use stellar_burgers_core::{SmallVec, request_effect, smallvec};

/// Purchasable ingredients, fetched from the catalog
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogState {
    /// Last fetched catalog
    pub ingredients: RequestState<Vec<Ingredient>>,
}

/// Inputs of the catalog
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CatalogAction {
    /// Fetch the catalog
    Load,
    /// The catalog arrived
    Loaded {
        /// Every purchasable ingredient
        ingredients: Vec<Ingredient>,
    },
    /// The catalog could not be fetched
    LoadFailed {
        /// Failure message
        error: String,
    },
}

/// Reducer for the ingredient catalog
#[derive(Clone, Debug, Default)]
pub struct CatalogReducer;

impl CatalogReducer {
    /// Creates a new catalog reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for CatalogReducer {
    type State = CatalogState;
    type Action = CatalogAction;
    type Environment = BurgerEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            CatalogAction::Load => {
                if state.ingredients.is_loading {
                    tracing::debug!("Catalog already loading, ignoring");
                    return SmallVec::new();
                }
                state.ingredients.start();

                let catalog = Arc::clone(&env.catalog);
                smallvec![request_effect! {
                    request: catalog.fetch_ingredients(),
                    on_success: |ingredients| CatalogAction::Loaded { ingredients },
                    on_error: |error| CatalogAction::LoadFailed { error }
                }]
            },
            CatalogAction::Loaded { ingredients } => {
                tracing::debug!(count = ingredients.len(), "Catalog loaded");
                state.ingredients.succeed(ingredients);
                SmallVec::new()
            },
            CatalogAction::LoadFailed { error } => {
                tracing::warn!(%error, "Catalog request failed");
                state.ingredients.fail(error);
                SmallVec::new()
            },
        }
    }
}
