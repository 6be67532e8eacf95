//! # Stellar Burgers
//!
//! Client state machine for the Stellar Burgers ordering service: browse the
//! ingredient catalog, assemble a burger, place an order, follow the public
//! order feed and manage the signed-in session.
//!
//! The client is split into five slices (see [`slices`]), each a reducer over
//! its own state. [`app::AppReducer`] combines them and [`app::AppStore`] runs
//! them, executing requests against the collaborators in
//! [`environment::BurgerEnvironment`].
//!
//! ## Example
//!
//! ```ignore
//! use stellar_burgers::app::{app_store, AppAction};
//! use stellar_burgers::slices::CatalogAction;
//! use stellar_burgers::{selectors, BurgerEnvironment, ClientConfig};
//!
//! let store = app_store(BurgerEnvironment::http(&ClientConfig::from_env()?)?);
//! store
//!     .send(AppAction::Catalog(CatalogAction::Load))
//!     .await?
//!     .wait()
//!     .await;
//! let count = store.state(|s| selectors::ingredients(s).len()).await;
//! ```

pub mod api;
pub mod app;
pub mod config;
pub mod credentials;
pub mod environment;
pub mod http;
pub mod mocks;
pub mod selectors;
pub mod slices;
pub mod types;

pub use api::{ApiError, AuthApi, CatalogApi, OrderApi};
pub use app::{AppAction, AppReducer, AppState, AppStore, app_store};
pub use config::{ClientConfig, ConfigError};
pub use credentials::{Credentials, FileTokenStorage, MemoryTokenStorage, StorageError, TokenStorage};
pub use environment::BurgerEnvironment;
pub use http::HttpApi;
pub use types::{
    DraftIngredient, FeedSnapshot, Ingredient, IngredientId, IngredientKind, InstanceId, Order,
    OrderNumber, OrderStatus, User,
};
