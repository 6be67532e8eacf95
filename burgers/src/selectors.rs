//! Read-only views over [`AppState`], one function per derived value.
//!
//! Evaluate them against a running store with
//! `store.state(selectors::total_price).await`, or inside a closure when the
//! result borrows from the state.

use crate::app::AppState;
use crate::slices::DraftState;
use crate::types::{Ingredient, IngredientId, IngredientKind, Order, OrderNumber, OrderStatus, User};

// Catalog

/// Every ingredient in the catalog
#[must_use]
pub fn ingredients(state: &AppState) -> &[Ingredient] {
    state
        .catalog
        .ingredients
        .data()
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Whether the catalog is being fetched
#[must_use]
pub const fn is_catalog_loading(state: &AppState) -> bool {
    state.catalog.ingredients.is_loading
}

/// Last catalog failure
#[must_use]
pub fn catalog_error(state: &AppState) -> Option<&str> {
    state.catalog.ingredients.error()
}

/// Ingredients of one category, in catalog order
#[must_use]
pub fn ingredients_of_kind(state: &AppState, kind: IngredientKind) -> Vec<&Ingredient> {
    ingredients(state).iter().filter(|i| i.kind == kind).collect()
}

/// Catalog record for `id`
#[must_use]
pub fn ingredient<'a>(state: &'a AppState, id: &IngredientId) -> Option<&'a Ingredient> {
    ingredients(state).iter().find(|i| &i.id == id)
}

/// Catalog records used by `order` with how often each appears, in first-use order
///
/// Ids missing from the catalog are skipped.
#[must_use]
pub fn order_ingredients<'a>(state: &'a AppState, order: &Order) -> Vec<(&'a Ingredient, usize)> {
    let mut resolved: Vec<(&Ingredient, usize)> = Vec::new();
    for id in &order.ingredients {
        if let Some(entry) = resolved.iter_mut().find(|(i, _)| &i.id == id) {
            entry.1 += 1;
        } else if let Some(ingredient) = ingredient(state, id) {
            resolved.push((ingredient, 1));
        }
    }
    resolved
}

/// Price of `order` at current catalog prices; every listed id is counted
#[must_use]
pub fn order_price(state: &AppState, order: &Order) -> u64 {
    order_ingredients(state, order)
        .iter()
        .map(|(ingredient, count)| ingredient.price * *count as u64)
        .sum()
}

// Draft

/// The burger being assembled
#[must_use]
pub const fn draft(state: &AppState) -> &DraftState {
    &state.draft
}

/// Price of the draft
#[must_use]
pub fn total_price(state: &AppState) -> u64 {
    state.draft.total_price()
}

/// How many times `id` is used in the draft (a bun counts 2)
#[must_use]
pub fn draft_count(state: &AppState, id: &IngredientId) -> usize {
    state.draft.count_of(id)
}

/// Whether the draft is empty
#[must_use]
pub fn is_draft_empty(state: &AppState) -> bool {
    state.draft.is_empty()
}

/// Ingredient ids that would be submitted for the draft
#[must_use]
pub fn order_payload(state: &AppState) -> Option<Vec<IngredientId>> {
    state.draft.payload()
}

// Order submission

/// Whether an order submission is pending
#[must_use]
pub const fn is_order_loading(state: &AppState) -> bool {
    state.order.submission.is_loading
}

/// The order placed by the last successful submission
#[must_use]
pub const fn placed_order(state: &AppState) -> Option<&Order> {
    state.order.submission.data()
}

/// Last submission failure
#[must_use]
pub fn order_error(state: &AppState) -> Option<&str> {
    state.order.submission.error()
}

// Feed

/// Orders of the public feed
#[must_use]
pub fn feed_orders(state: &AppState) -> &[Order] {
    state.feed.orders()
}

/// Orders placed since the service started
#[must_use]
pub fn feed_total(state: &AppState) -> u64 {
    state.feed.total()
}

/// Orders placed today
#[must_use]
pub fn feed_total_today(state: &AppState) -> u64 {
    state.feed.total_today()
}

/// Whether the feed is being fetched
#[must_use]
pub const fn is_feed_loading(state: &AppState) -> bool {
    state.feed.feed.is_loading
}

/// Last feed failure
#[must_use]
pub fn feed_error(state: &AppState) -> Option<&str> {
    state.feed.feed.error()
}

/// Numbers of feed orders with `status`, at most `limit` of them
///
/// Used for the "ready" and "in progress" boards.
#[must_use]
pub fn order_numbers_with_status(
    state: &AppState,
    status: OrderStatus,
    limit: usize,
) -> Vec<OrderNumber> {
    feed_orders(state)
        .iter()
        .filter(|order| order.status == status)
        .map(|order| order.number)
        .take(limit)
        .collect()
}

/// Result of the last lookup by number
#[must_use]
pub const fn looked_up_order(state: &AppState) -> Option<&Order> {
    state.feed.lookup.data()
}

/// Whether a lookup by number is in flight
#[must_use]
pub const fn is_order_lookup_loading(state: &AppState) -> bool {
    state.feed.lookup.is_loading
}

/// Last lookup failure
#[must_use]
pub fn order_lookup_error(state: &AppState) -> Option<&str> {
    state.feed.lookup.error()
}

// Session

/// Whether the user is signed in
#[must_use]
pub const fn is_authenticated(state: &AppState) -> bool {
    state.session.is_authenticated
}

/// Profile of the signed-in user
#[must_use]
pub const fn user(state: &AppState) -> Option<&User> {
    state.session.user.as_ref()
}

/// Name of the signed-in user
#[must_use]
pub fn user_name(state: &AppState) -> Option<&str> {
    state.session.user.as_ref().map(|u| u.name.as_str())
}

/// Email of the signed-in user
#[must_use]
pub fn user_email(state: &AppState) -> Option<&str> {
    state.session.user.as_ref().map(|u| u.email.as_str())
}

/// Whether a login, registration or profile request is in flight
#[must_use]
pub const fn is_session_request_pending(state: &AppState) -> bool {
    state.session.is_request_pending
}

/// The signed-in user's past orders
#[must_use]
pub fn order_history(state: &AppState) -> &[Order] {
    &state.session.orders
}

/// Whether the order history is being fetched
#[must_use]
pub const fn is_order_history_loading(state: &AppState) -> bool {
    state.session.is_orders_pending
}

/// Last session failure
#[must_use]
pub fn session_error(state: &AppState) -> Option<&str> {
    state.session.error.as_deref()
}
