//! The five independent slices of the client state.
//!
//! Each slice owns its state exclusively and is driven by its own reducer.
//! [`crate::app`] combines them into one application reducer.

pub mod catalog;
pub mod draft;
pub mod feed;
pub mod order;
pub mod session;

pub use catalog::{CatalogAction, CatalogReducer, CatalogState};
pub use draft::{DraftAction, DraftReducer, DraftState};
pub use feed::{FeedAction, FeedReducer, FeedState};
pub use order::{OrderAction, OrderReducer, OrderState};
pub use session::{SessionAction, SessionReducer, SessionState};
