//! In-memory collaborators and fixtures for tests.
//!
//! [`FakeBurgerApi`] implements every API trait, records each call and answers
//! with a programmable response. Order submissions and sign-outs can be held
//! in flight to exercise pending states and overlapping requests.

use crate::api::{ApiError, ApiFuture, AuthApi, CatalogApi, OrderApi};
use crate::credentials::Credentials;
use crate::environment::BurgerEnvironment;
use crate::types::{
    AuthResponse, AuthTokens, FeedSnapshot, Ingredient, IngredientId, IngredientKind, LoginData,
    Order, OrderNumber, OrderStatus, ProfileUpdate, RegisterData, User,
};
use std::sync::{Arc, Mutex, PoisonError};
use stellar_burgers_testing::{SequentialIds, test_time};
use tokio::sync::watch;

/// A call received by [`FakeBurgerApi`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiCall {
    /// `fetch_ingredients`
    FetchIngredients,
    /// `submit_order` with its payload
    SubmitOrder(Vec<IngredientId>),
    /// `fetch_order_by_number`
    FetchOrderByNumber(OrderNumber),
    /// `fetch_feed`
    FetchFeed,
    /// `register` with the email used
    Register(String),
    /// `login` with the email used
    Login(String),
    /// `logout` with the refresh credential sent
    Logout(String),
    /// `fetch_profile`
    FetchProfile,
    /// `update_profile`
    UpdateProfile(ProfileUpdate),
    /// `fetch_order_history`
    FetchOrderHistory,
}

struct Responses {
    ingredients: Result<Vec<Ingredient>, ApiError>,
    submit: Result<Order, ApiError>,
    lookup: Result<Vec<Order>, ApiError>,
    feed: Result<FeedSnapshot, ApiError>,
    auth: Result<AuthResponse, ApiError>,
    logout: Result<(), ApiError>,
    profile: Result<User, ApiError>,
    update: Option<Result<User, ApiError>>,
    history: Result<Vec<Order>, ApiError>,
}

impl Default for Responses {
    fn default() -> Self {
        Self {
            ingredients: Ok(vec![bun("B", 10), sauce("X", 5), patty("Y", 7)]),
            submit: Ok(order(4242, OrderStatus::Created, &["B", "X", "B"])),
            lookup: Ok(vec![order(4242, OrderStatus::Done, &["B", "X", "B"])]),
            feed: Ok(FeedSnapshot {
                orders: vec![order(4242, OrderStatus::Done, &["B", "X", "B"])],
                total: 1,
                total_today: 1,
            }),
            auth: Ok(auth_response()),
            logout: Ok(()),
            profile: Ok(user()),
            update: None,
            history: Ok(Vec::new()),
        }
    }
}

/// Call-recording fake of the burger service
pub struct FakeBurgerApi {
    calls: Mutex<Vec<ApiCall>>,
    responses: Mutex<Responses>,
    submissions_held: watch::Sender<bool>,
    logouts_held: watch::Sender<bool>,
}

impl FakeBurgerApi {
    /// A fake answering every call successfully with the fixtures below
    #[must_use]
    pub fn new() -> Self {
        let (submissions_held, _) = watch::channel(false);
        let (logouts_held, _) = watch::channel(false);
        Self {
            calls: Mutex::new(Vec::new()),
            responses: Mutex::new(Responses::default()),
            submissions_held,
            logouts_held,
        }
    }

    /// Every call received so far, in order
    #[must_use]
    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of calls matching `predicate`
    #[must_use]
    pub fn count(&self, predicate: impl Fn(&ApiCall) -> bool) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|call| predicate(call))
            .count()
    }

    /// Keep order submissions in flight until [`FakeBurgerApi::release_submissions`]
    pub fn hold_submissions(&self) {
        self.submissions_held.send_replace(true);
    }

    /// Let held and future order submissions complete
    pub fn release_submissions(&self) {
        self.submissions_held.send_replace(false);
    }

    /// Keep sign-outs in flight until [`FakeBurgerApi::release_logouts`]
    pub fn hold_logouts(&self) {
        self.logouts_held.send_replace(true);
    }

    /// Let held and future sign-outs complete
    pub fn release_logouts(&self) {
        self.logouts_held.send_replace(false);
    }

    /// Answer for `fetch_ingredients`
    pub fn set_ingredients(&self, response: Result<Vec<Ingredient>, ApiError>) {
        self.with_responses(|r| r.ingredients = response);
    }

    /// Answer for `submit_order`
    pub fn set_submit_order(&self, response: Result<Order, ApiError>) {
        self.with_responses(|r| r.submit = response);
    }

    /// Answer for `fetch_order_by_number`
    pub fn set_order_lookup(&self, response: Result<Vec<Order>, ApiError>) {
        self.with_responses(|r| r.lookup = response);
    }

    /// Answer for `fetch_feed`
    pub fn set_feed(&self, response: Result<FeedSnapshot, ApiError>) {
        self.with_responses(|r| r.feed = response);
    }

    /// Answer for `register` and `login`
    pub fn set_auth(&self, response: Result<AuthResponse, ApiError>) {
        self.with_responses(|r| r.auth = response);
    }

    /// Answer for `logout`
    pub fn set_logout(&self, response: Result<(), ApiError>) {
        self.with_responses(|r| r.logout = response);
    }

    /// Answer for `fetch_profile`
    pub fn set_profile(&self, response: Result<User, ApiError>) {
        self.with_responses(|r| r.profile = response);
    }

    /// Answer for `update_profile`; by default the update is applied to [`user`]
    pub fn set_profile_update(&self, response: Result<User, ApiError>) {
        self.with_responses(|r| r.update = Some(response));
    }

    /// Answer for `fetch_order_history`
    pub fn set_order_history(&self, response: Result<Vec<Order>, ApiError>) {
        self.with_responses(|r| r.history = response);
    }

    fn with_responses(&self, f: impl FnOnce(&mut Responses)) {
        f(&mut self.responses.lock().unwrap_or_else(PoisonError::into_inner));
    }

    fn record<T>(&self, call: ApiCall, response: impl FnOnce(&Responses) -> T) -> T {
        tracing::trace!(?call, "Fake API call");
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
        response(&self.responses.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Default for FakeBurgerApi {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogApi for FakeBurgerApi {
    fn fetch_ingredients(&self) -> ApiFuture<'_, Vec<Ingredient>> {
        let response = self.record(ApiCall::FetchIngredients, |r| r.ingredients.clone());
        Box::pin(async move { response })
    }
}

impl OrderApi for FakeBurgerApi {
    fn submit_order(&self, ingredients: Vec<IngredientId>) -> ApiFuture<'_, Order> {
        let response = self.record(ApiCall::SubmitOrder(ingredients), |r| r.submit.clone());
        let held = self.submissions_held.subscribe();
        Box::pin(async move {
            released(held).await;
            response
        })
    }

    fn fetch_order_by_number(&self, number: OrderNumber) -> ApiFuture<'_, Vec<Order>> {
        let response = self.record(ApiCall::FetchOrderByNumber(number), |r| r.lookup.clone());
        Box::pin(async move { response })
    }

    fn fetch_feed(&self) -> ApiFuture<'_, FeedSnapshot> {
        let response = self.record(ApiCall::FetchFeed, |r| r.feed.clone());
        Box::pin(async move { response })
    }
}

impl AuthApi for FakeBurgerApi {
    fn register(&self, data: RegisterData) -> ApiFuture<'_, AuthResponse> {
        let response = self.record(ApiCall::Register(data.email), |r| r.auth.clone());
        Box::pin(async move { response })
    }

    fn login(&self, data: LoginData) -> ApiFuture<'_, AuthResponse> {
        let response = self.record(ApiCall::Login(data.email), |r| r.auth.clone());
        Box::pin(async move { response })
    }

    fn logout(&self, refresh_token: String) -> ApiFuture<'_, ()> {
        let response = self.record(ApiCall::Logout(refresh_token), |r| r.logout.clone());
        let held = self.logouts_held.subscribe();
        Box::pin(async move {
            released(held).await;
            response
        })
    }

    fn fetch_profile(&self) -> ApiFuture<'_, User> {
        let response = self.record(ApiCall::FetchProfile, |r| r.profile.clone());
        Box::pin(async move { response })
    }

    fn update_profile(&self, update: ProfileUpdate) -> ApiFuture<'_, User> {
        let response = self.record(ApiCall::UpdateProfile(update.clone()), |r| {
            r.update.clone().unwrap_or_else(|| {
                let current = user();
                Ok(User {
                    email: update.email.unwrap_or(current.email),
                    name: update.name.unwrap_or(current.name),
                })
            })
        });
        Box::pin(async move { response })
    }

    fn fetch_order_history(&self) -> ApiFuture<'_, Vec<Order>> {
        let response = self.record(ApiCall::FetchOrderHistory, |r| r.history.clone());
        Box::pin(async move { response })
    }
}

async fn released(mut held: watch::Receiver<bool>) {
    loop {
        let is_held = *held.borrow_and_update();
        if !is_held || held.changed().await.is_err() {
            break;
        }
    }
}

/// Environment backed by `api`, in-memory credentials and sequential instance
/// ids (`item-1`, `item-2`, ...)
#[must_use]
pub fn test_environment(api: &Arc<FakeBurgerApi>) -> BurgerEnvironment {
    BurgerEnvironment::new(
        Arc::clone(api) as Arc<dyn CatalogApi>,
        Arc::clone(api) as Arc<dyn OrderApi>,
        Arc::clone(api) as Arc<dyn AuthApi>,
        Credentials::in_memory(),
        Arc::new(SequentialIds::new("item")),
    )
}

/// A bun
#[must_use]
pub fn bun(id: &str, price: u64) -> Ingredient {
    Ingredient::new(id, format!("Bun {id}"), IngredientKind::Bun, price)
}

/// A sauce
#[must_use]
pub fn sauce(id: &str, price: u64) -> Ingredient {
    Ingredient::new(id, format!("Sauce {id}"), IngredientKind::Sauce, price)
}

/// A main filling
#[must_use]
pub fn patty(id: &str, price: u64) -> Ingredient {
    Ingredient::new(id, format!("Patty {id}"), IngredientKind::Main, price)
}

/// An order created at the test epoch
#[must_use]
pub fn order(number: u64, status: OrderStatus, ingredients: &[&str]) -> Order {
    Order {
        id: format!("order-{number}"),
        status,
        name: "Space burger".to_string(),
        created_at: Some(test_time()),
        updated_at: Some(test_time()),
        number: OrderNumber::new(number),
        ingredients: ingredients.iter().copied().map(IngredientId::new).collect(),
    }
}

/// The signed-in user of the fixtures
#[must_use]
pub fn user() -> User {
    User {
        email: "cook@example.com".to_string(),
        name: "Cook".to_string(),
    }
}

/// Successful login of [`user`]
#[must_use]
pub fn auth_response() -> AuthResponse {
    AuthResponse {
        tokens: AuthTokens {
            access_token: "Bearer access-1".to_string(),
            refresh_token: "refresh-1".to_string(),
        },
        user: user(),
    }
}
