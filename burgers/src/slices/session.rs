//! Session: authentication state, the signed-in user's profile and order history.
//!
//! All session requests share one `error` slot. Only `Login` and `Register`
//! clear it when they start; every other request leaves a previous error in
//! place until it is overwritten by a new failure or cleared with
//! [`SessionAction::ClearError`].
//!
//! `Logout` signs the user out immediately, before the service confirms. The
//! stored credentials are removed once the call completes, whatever its outcome.

use crate::api::ApiError;
use crate::environment::BurgerEnvironment;
use crate::types::{LoginData, Order, ProfileUpdate, RegisterData, User};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use stellar_burgers_core::effect::Effect;
use stellar_burgers_core::reducer::Reducer;
use stellar_burgers_core::{SmallVec, async_effect, request_effect, smallvec};

/// Authentication state
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Whether the service accepted the stored credentials
    pub is_authenticated: bool,
    /// Profile of the signed-in user
    pub user: Option<User>,
    /// A login, registration or profile request is in flight
    pub is_request_pending: bool,
    /// The signed-in user's past orders
    pub orders: Vec<Order>,
    /// An order history request is in flight
    pub is_orders_pending: bool,
    /// Message of the last failed session request
    pub error: Option<String>,
}

/// Inputs of the session
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionAction {
    /// Create an account and sign in
    Register {
        /// Registration form
        data: RegisterData,
    },
    /// Registration succeeded
    Registered {
        /// The new user
        user: User,
    },
    /// Registration failed
    RegisterFailed {
        /// Failure message
        error: String,
    },
    /// Sign in
    Login {
        /// Login form
        data: LoginData,
    },
    /// Sign-in succeeded
    LoggedIn {
        /// The signed-in user
        user: User,
    },
    /// Sign-in failed
    LoginFailed {
        /// Failure message
        error: String,
    },
    /// Sign out
    Logout,
    /// The sign-out call completed and the credentials were removed
    LogoutFinished {
        /// Failure message, if the call or the credential removal failed
        error: Option<String>,
    },
    /// Re-establish the session from stored credentials
    FetchProfile,
    /// The stored credentials are valid
    ProfileFetched {
        /// The signed-in user
        user: User,
    },
    /// The stored credentials were rejected or missing
    ProfileFetchFailed {
        /// Failure message
        error: String,
    },
    /// Change some profile fields
    UpdateProfile {
        /// Fields to change
        update: ProfileUpdate,
    },
    /// The profile was changed
    ProfileUpdated {
        /// Profile as returned by the service
        user: User,
    },
    /// The profile could not be changed
    ProfileUpdateFailed {
        /// Failure message
        error: String,
    },
    /// Fetch the signed-in user's past orders
    FetchOrderHistory,
    /// The order history arrived
    OrderHistoryFetched {
        /// Past orders
        orders: Vec<Order>,
    },
    /// The order history could not be fetched
    OrderHistoryFailed {
        /// Failure message
        error: String,
    },
    /// Forget the last error
    ClearError,
}

/// Reducer for the session
#[derive(Clone, Debug, Default)]
pub struct SessionReducer;

impl SessionReducer {
    /// Creates a new session reducer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn signed_in(state: &mut SessionState, user: User) {
        tracing::info!("Signed in");
        state.user = Some(user);
        state.is_request_pending = false;
        state.is_authenticated = true;
    }

    fn failed(state: &mut SessionState, error: String) {
        state.is_request_pending = false;
        state.error = Some(error);
    }
}

impl Reducer for SessionReducer {
    type State = SessionState;
    type Action = SessionAction;
    type Environment = BurgerEnvironment;

    #[allow(clippy::too_many_lines)] // One arm per session request outcome
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            SessionAction::Register { data } => {
                state.is_authenticated = false;
                state.is_request_pending = true;
                state.error = None;

                let auth = Arc::clone(&env.auth);
                let credentials = env.credentials.clone();
                return smallvec![request_effect! {
                    request: async move {
                        let response = auth.register(data).await?;
                        credentials.store(&response.tokens.access_token, &response.tokens.refresh_token)?;
                        Ok::<_, ApiError>(response.user)
                    },
                    on_success: |user| SessionAction::Registered { user },
                    on_error: |error| SessionAction::RegisterFailed { error }
                }];
            },
            SessionAction::Registered { user } | SessionAction::LoggedIn { user } => {
                Self::signed_in(state, user);
            },
            SessionAction::RegisterFailed { error } | SessionAction::LoginFailed { error } => {
                tracing::warn!(%error, "Sign-in failed");
                state.is_authenticated = false;
                Self::failed(state, error);
            },
            SessionAction::Login { data } => {
                state.is_request_pending = true;
                state.error = None;

                let auth = Arc::clone(&env.auth);
                let credentials = env.credentials.clone();
                return smallvec![request_effect! {
                    request: async move {
                        let response = auth.login(data).await?;
                        credentials.store(&response.tokens.access_token, &response.tokens.refresh_token)?;
                        Ok::<_, ApiError>(response.user)
                    },
                    on_success: |user| SessionAction::LoggedIn { user },
                    on_error: |error| SessionAction::LoginFailed { error }
                }];
            },
            SessionAction::Logout => {
                tracing::info!("Signing out");
                state.user = None;
                state.is_request_pending = false;
                state.is_authenticated = false;

                let auth = Arc::clone(&env.auth);
                let credentials = env.credentials.clone();
                return smallvec![async_effect! {
                    let (revoked, cleared) = match credentials.refresh_token() {
                        Ok(Some(token)) => {
                            let revoked = auth.logout(token.clone()).await;
                            // A sign-in that finished meanwhile owns the slots now
                            let cleared = credentials.clear_if_current(&token).map(|cleared| {
                                if !cleared {
                                    tracing::info!("Credentials replaced during sign-out, keeping them");
                                }
                            });
                            (revoked, cleared)
                        },
                        Ok(None) => (Err(ApiError::MissingCredential), credentials.clear()),
                        Err(error) => (Err(error.into()), credentials.clear()),
                    };
                    let error = revoked
                        .and(cleared.map_err(ApiError::from))
                        .err()
                        .map(|e| e.to_string());
                    Some(SessionAction::LogoutFinished { error })
                }];
            },
            SessionAction::LogoutFinished { error } => match error {
                Some(error) => tracing::warn!(%error, "Sign-out did not complete cleanly"),
                None => tracing::info!("Signed out"),
            },
            SessionAction::FetchProfile => {
                state.is_request_pending = true;

                let auth = Arc::clone(&env.auth);
                return smallvec![request_effect! {
                    request: auth.fetch_profile(),
                    on_success: |user| SessionAction::ProfileFetched { user },
                    on_error: |error| SessionAction::ProfileFetchFailed { error }
                }];
            },
            SessionAction::ProfileFetched { user } => Self::signed_in(state, user),
            SessionAction::ProfileFetchFailed { error } => {
                tracing::info!(%error, "No valid session");
                state.user = None;
                state.is_authenticated = false;
                Self::failed(state, error);
            },
            SessionAction::UpdateProfile { update } => {
                state.is_request_pending = true;

                let auth = Arc::clone(&env.auth);
                return smallvec![request_effect! {
                    request: auth.update_profile(update),
                    on_success: |user| SessionAction::ProfileUpdated { user },
                    on_error: |error| SessionAction::ProfileUpdateFailed { error }
                }];
            },
            SessionAction::ProfileUpdated { user } => {
                tracing::debug!("Profile updated");
                state.user = Some(user);
                state.is_request_pending = false;
            },
            SessionAction::ProfileUpdateFailed { error } => {
                tracing::warn!(%error, "Profile update failed");
                Self::failed(state, error);
            },
            SessionAction::FetchOrderHistory => {
                state.is_orders_pending = true;

                let auth = Arc::clone(&env.auth);
                return smallvec![request_effect! {
                    request: auth.fetch_order_history(),
                    on_success: |orders| SessionAction::OrderHistoryFetched { orders },
                    on_error: |error| SessionAction::OrderHistoryFailed { error }
                }];
            },
            SessionAction::OrderHistoryFetched { orders } => {
                tracing::debug!(count = orders.len(), "Order history loaded");
                state.orders = orders;
                state.is_orders_pending = false;
            },
            SessionAction::OrderHistoryFailed { error } => {
                tracing::warn!(%error, "Order history request failed");
                state.is_orders_pending = false;
                state.error = Some(error);
            },
            SessionAction::ClearError => state.error = None,
        }

        SmallVec::new()
    }
}
