//! HTTP implementation of the collaborator traits

use crate::api::{ApiError, ApiFuture, AuthApi, CatalogApi, OrderApi};
use crate::config::ClientConfig;
use crate::credentials::Credentials;
use crate::types::{
    AuthResponse, AuthTokens, FeedSnapshot, Ingredient, IngredientId, LoginData, Order,
    OrderNumber, ProfileUpdate, RegisterData, User,
};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};

/// Every response carries this envelope; failures add a `message`.
#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct IngredientsResponse {
    data: Vec<Ingredient>,
}

#[derive(Deserialize)]
struct OrderResponse {
    order: Order,
}

#[derive(Deserialize)]
struct OrdersResponse {
    orders: Vec<Order>,
}

#[derive(Deserialize)]
struct UserResponse {
    user: User,
}

#[derive(Serialize)]
struct OrderRequest<'a> {
    ingredients: &'a [IngredientId],
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    token: &'a str,
}

/// Client for the burger service REST API
///
/// Authenticated calls read the access credential from [`Credentials`] and
/// renew it once with the refresh credential when it is missing or rejected
/// as expired.
#[derive(Clone, Debug)]
pub struct HttpApi {
    client: Client,
    base_url: String,
    credentials: Credentials,
}

impl HttpApi {
    /// Create a client for the configured service
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig, credentials: Credentials) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let result = decode(status, &body);
        if let Err(error) = &result {
            tracing::warn!(status = status.as_u16(), %error, "Request failed");
        }
        result
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        tracing::debug!(path, "GET");
        self.execute(self.client.get(self.url(path))).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        tracing::debug!(path, "POST");
        self.execute(self.client.post(self.url(path)).json(body)).await
    }

    /// Run an authenticated request, renewing the access credential at most once
    async fn authorized<T, F>(&self, build: F) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        F: Fn(&str) -> RequestBuilder,
    {
        let token = match self.credentials.access_token()? {
            Some(token) => token,
            None => self.renew().await?,
        };

        match self.execute(build(&token)).await {
            Err(error) if error.is_token_expired() => {
                let Ok(token) = self.renew().await else {
                    return Err(error);
                };
                self.execute(build(&token)).await
            },
            result => result,
        }
    }

    /// Exchange the refresh credential for a new pair and persist it
    async fn renew(&self) -> Result<String, ApiError> {
        let refresh_token = self
            .credentials
            .refresh_token()?
            .ok_or(ApiError::MissingCredential)?;

        tracing::info!("Renewing access credential");
        let tokens: AuthTokens = self
            .post("auth/token", &TokenRequest { token: &refresh_token })
            .await?;
        self.credentials
            .store(&tokens.access_token, &tokens.refresh_token)?;

        Ok(tokens.access_token)
    }
}

fn decode<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, ApiError> {
    let envelope = serde_json::from_str::<Envelope>(body).ok();

    if status.is_success() && envelope.as_ref().is_some_and(|e| e.success) {
        return serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()));
    }

    match envelope.and_then(|e| e.message) {
        Some(message) => Err(ApiError::Rejected(message)),
        None if status.is_success() => Err(ApiError::Decode(
            "response did not report success".to_string(),
        )),
        None => Err(ApiError::UnexpectedResponse {
            status: status.as_u16(),
            message: body.to_string(),
        }),
    }
}

impl CatalogApi for HttpApi {
    fn fetch_ingredients(&self) -> ApiFuture<'_, Vec<Ingredient>> {
        Box::pin(async move {
            let response: IngredientsResponse = self.get("ingredients").await?;
            Ok(response.data)
        })
    }
}

impl OrderApi for HttpApi {
    fn submit_order(&self, ingredients: Vec<IngredientId>) -> ApiFuture<'_, Order> {
        Box::pin(async move {
            tracing::debug!(items = ingredients.len(), "POST orders");
            let body = OrderRequest {
                ingredients: &ingredients,
            };
            let response: OrderResponse = self
                .authorized(|token| {
                    self.client
                        .post(self.url("orders"))
                        .header(AUTHORIZATION, token)
                        .json(&body)
                })
                .await?;
            Ok(response.order)
        })
    }

    fn fetch_order_by_number(&self, number: OrderNumber) -> ApiFuture<'_, Vec<Order>> {
        Box::pin(async move {
            let response: OrdersResponse = self.get(&format!("orders/{number}")).await?;
            Ok(response.orders)
        })
    }

    fn fetch_feed(&self) -> ApiFuture<'_, FeedSnapshot> {
        Box::pin(self.get("orders/all"))
    }
}

impl AuthApi for HttpApi {
    fn register(&self, data: RegisterData) -> ApiFuture<'_, AuthResponse> {
        Box::pin(async move { self.post("auth/register", &data).await })
    }

    fn login(&self, data: LoginData) -> ApiFuture<'_, AuthResponse> {
        Box::pin(async move { self.post("auth/login", &data).await })
    }

    fn logout(&self, refresh_token: String) -> ApiFuture<'_, ()> {
        Box::pin(async move {
            let _: IgnoredAny = self
                .post("auth/logout", &TokenRequest { token: &refresh_token })
                .await?;
            Ok(())
        })
    }

    fn fetch_profile(&self) -> ApiFuture<'_, User> {
        Box::pin(async move {
            tracing::debug!("GET auth/user");
            let response: UserResponse = self
                .authorized(|token| {
                    self.client
                        .get(self.url("auth/user"))
                        .header(AUTHORIZATION, token)
                })
                .await?;
            Ok(response.user)
        })
    }

    fn update_profile(&self, update: ProfileUpdate) -> ApiFuture<'_, User> {
        Box::pin(async move {
            tracing::debug!("PATCH auth/user");
            let response: UserResponse = self
                .authorized(|token| {
                    self.client
                        .patch(self.url("auth/user"))
                        .header(AUTHORIZATION, token)
                        .json(&update)
                })
                .await?;
            Ok(response.user)
        })
    }

    fn fetch_order_history(&self) -> ApiFuture<'_, Vec<Order>> {
        Box::pin(async move {
            tracing::debug!("GET orders");
            let response: OrdersResponse = self
                .authorized(|token| {
                    self.client
                        .get(self.url("orders"))
                        .header(AUTHORIZATION, token)
                })
                .await?;
            Ok(response.orders)
        })
    }
}
