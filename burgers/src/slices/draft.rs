//! Burger draft: the user's in-progress, unsubmitted burger.
//!
//! A draft has one bun slot and an ordered list of fillings. Adding a bun
//! replaces the current one; adding anything else appends a filling. Every
//! placement gets a fresh instance id from the environment so repeated
//! ingredients stay distinguishable.
//!
//! Moving a filling past either end of the list is a no-op, as is removing an
//! instance id that is not in the draft.

use crate::environment::BurgerEnvironment;
use crate::types::{DraftIngredient, Ingredient, IngredientId, InstanceId};
use serde::{Deserialize, Serialize};
use stellar_burgers_core::SmallVec;
use stellar_burgers_core::effect::Effect;
use stellar_burgers_core::reducer::Reducer;

/// The burger being assembled
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftState {
    /// Top and bottom bun
    pub bun: Option<DraftIngredient>,
    /// Fillings in build order; never contains a bun
    pub fillings: Vec<DraftIngredient>,
}

impl DraftState {
    /// Price of the burger: the bun counts twice, each filling once
    #[must_use]
    pub fn total_price(&self) -> u64 {
        let bun = self.bun.as_ref().map_or(0, |bun| bun.price() * 2);
        bun + self.fillings.iter().map(DraftIngredient::price).sum::<u64>()
    }

    /// Whether the draft has neither bun nor fillings
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bun.is_none() && self.fillings.is_empty()
    }

    /// How many times `id` appears in the burger; a bun counts for top and bottom
    #[must_use]
    pub fn count_of(&self, id: &IngredientId) -> usize {
        let bun = self.bun.as_ref().filter(|bun| bun.id() == id).map_or(0, |_| 2);
        bun + self.fillings.iter().filter(|f| f.id() == id).count()
    }

    /// Ingredient ids to submit: bun, fillings in order, bun again
    ///
    /// `None` when there is no bun; such a draft cannot be ordered.
    #[must_use]
    pub fn payload(&self) -> Option<Vec<IngredientId>> {
        let bun = self.bun.as_ref()?.id();

        let mut payload = Vec::with_capacity(self.fillings.len() + 2);
        payload.push(bun.clone());
        payload.extend(self.fillings.iter().map(|f| f.id().clone()));
        payload.push(bun.clone());
        Some(payload)
    }

    fn clear(&mut self) {
        self.bun = None;
        self.fillings.clear();
    }
}

/// Edits of the draft
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DraftAction {
    /// Place an ingredient: buns replace the bun slot, others are appended
    AddIngredient {
        /// Catalog record to place
        ingredient: Ingredient,
    },
    /// Swap the filling at `index` with the one before it
    MoveUp {
        /// Position in the filling list
        index: usize,
    },
    /// Swap the filling at `index` with the one after it
    MoveDown {
        /// Position in the filling list
        index: usize,
    },
    /// Remove the filling with this instance id
    RemoveIngredient {
        /// Placement to remove
        instance_id: InstanceId,
    },
    /// Empty the bun slot and the filling list
    Clear,
}

/// Reducer for the burger draft
#[derive(Clone, Debug, Default)]
pub struct DraftReducer;

impl DraftReducer {
    /// Creates a new draft reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for DraftReducer {
    type State = DraftState;
    type Action = DraftAction;
    type Environment = BurgerEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            DraftAction::AddIngredient { ingredient } => {
                let placed = DraftIngredient {
                    instance_id: InstanceId::new(env.ids.next_id()),
                    ingredient,
                };
                tracing::debug!(
                    id = %placed.id(),
                    instance = %placed.instance_id,
                    "Ingredient added to draft"
                );
                if placed.ingredient.is_bun() {
                    state.bun = Some(placed);
                } else {
                    state.fillings.push(placed);
                }
            },
            DraftAction::MoveUp { index } => {
                if index == 0 || index >= state.fillings.len() {
                    tracing::debug!(index, "Cannot move filling up, ignoring");
                } else {
                    state.fillings.swap(index - 1, index);
                }
            },
            DraftAction::MoveDown { index } => {
                if index.saturating_add(1) >= state.fillings.len() {
                    tracing::debug!(index, "Cannot move filling down, ignoring");
                } else {
                    state.fillings.swap(index, index + 1);
                }
            },
            DraftAction::RemoveIngredient { instance_id } => {
                state.fillings.retain(|f| f.instance_id != instance_id);
            },
            DraftAction::Clear => state.clear(),
        }

        SmallVec::new()
    }
}
