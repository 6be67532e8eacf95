//! Remote collaborators consumed by the slices.
//!
//! The slices only see these traits. [`crate::http::HttpApi`] implements them
//! over HTTP; [`crate::mocks::FakeBurgerApi`] implements them in memory.

use crate::credentials::StorageError;
use crate::types::{
    AuthResponse, FeedSnapshot, Ingredient, IngredientId, LoginData, Order, OrderNumber,
    ProfileUpdate, RegisterData, User,
};
use futures::future::BoxFuture;
use thiserror::Error;

/// Future returned by every collaborator call
pub type ApiFuture<'a, T> = BoxFuture<'a, Result<T, ApiError>>;

/// Message the service sends when the access credential has expired
pub const TOKEN_EXPIRED: &str = "jwt expired";

/// A failed request
///
/// The `Display` text is what ends up in a slice's `error` slot.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The service answered with `{"success": false, "message": ...}`
    #[error("{0}")]
    Rejected(String),

    /// The request never produced a response
    #[error("Request failed: {0}")]
    Transport(String),

    /// The service answered with an error status and no message
    #[error("Unexpected response (status {status}): {message}")]
    UnexpectedResponse {
        /// HTTP status code
        status: u16,
        /// Raw response body
        message: String,
    },

    /// The response body did not have the expected shape
    #[error("Malformed response: {0}")]
    Decode(String),

    /// An authenticated call was attempted without credentials
    #[error("You should be authorised")]
    MissingCredential,

    /// Credentials could not be read or written
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// Whether the service rejected the call because the access credential expired
    #[must_use]
    pub fn is_token_expired(&self) -> bool {
        matches!(self, Self::Rejected(message) if message == TOKEN_EXPIRED)
    }
}

/// Ingredient catalog
pub trait CatalogApi: Send + Sync {
    /// Fetch every purchasable ingredient
    fn fetch_ingredients(&self) -> ApiFuture<'_, Vec<Ingredient>>;
}

/// Orders and the public feed
pub trait OrderApi: Send + Sync {
    /// Place an order; requires a signed-in user
    fn submit_order(&self, ingredients: Vec<IngredientId>) -> ApiFuture<'_, Order>;

    /// Look up orders by public number
    fn fetch_order_by_number(&self, number: OrderNumber) -> ApiFuture<'_, Vec<Order>>;

    /// Fetch the public order feed
    fn fetch_feed(&self) -> ApiFuture<'_, FeedSnapshot>;
}

/// Accounts and the signed-in user's data
pub trait AuthApi: Send + Sync {
    /// Create an account
    fn register(&self, data: RegisterData) -> ApiFuture<'_, AuthResponse>;

    /// Sign in
    fn login(&self, data: LoginData) -> ApiFuture<'_, AuthResponse>;

    /// Revoke the given refresh credential
    fn logout(&self, refresh_token: String) -> ApiFuture<'_, ()>;

    /// Fetch the signed-in user's profile
    fn fetch_profile(&self) -> ApiFuture<'_, User>;

    /// Change some profile fields and return the updated profile
    fn update_profile(&self, update: ProfileUpdate) -> ApiFuture<'_, User>;

    /// Fetch the signed-in user's past orders
    fn fetch_order_history(&self) -> ApiFuture<'_, Vec<Order>>;
}
