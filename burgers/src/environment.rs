//! Injected collaborators shared by every slice

use crate::api::{ApiError, AuthApi, CatalogApi, OrderApi};
use crate::config::ClientConfig;
use crate::credentials::Credentials;
use crate::http::HttpApi;
use std::sync::Arc;
use stellar_burgers_core::environment::{IdGenerator, SystemClock, UuidGenerator};

/// Environment for the burger client containing dependencies
#[derive(Clone)]
pub struct BurgerEnvironment {
    /// Ingredient catalog
    pub catalog: Arc<dyn CatalogApi>,
    /// Order submission, lookup and feed
    pub orders: Arc<dyn OrderApi>,
    /// Accounts and profile
    pub auth: Arc<dyn AuthApi>,
    /// Persisted access and refresh credentials
    pub credentials: Credentials,
    /// Source of draft instance ids
    pub ids: Arc<dyn IdGenerator>,
}

impl BurgerEnvironment {
    /// Creates a new environment
    #[must_use]
    pub fn new(
        catalog: Arc<dyn CatalogApi>,
        orders: Arc<dyn OrderApi>,
        auth: Arc<dyn AuthApi>,
        credentials: Credentials,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            catalog,
            orders,
            auth,
            credentials,
            ids,
        }
    }

    /// Production environment talking to the configured service
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the HTTP client cannot be built.
    pub fn http(config: &ClientConfig) -> Result<Self, ApiError> {
        let credentials = Credentials::from_config(config, Arc::new(SystemClock));
        let api = Arc::new(HttpApi::new(config, credentials.clone())?);

        Ok(Self::new(
            Arc::clone(&api) as Arc<dyn CatalogApi>,
            Arc::clone(&api) as Arc<dyn OrderApi>,
            api,
            credentials,
            Arc::new(UuidGenerator),
        ))
    }
}

impl std::fmt::Debug for BurgerEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BurgerEnvironment")
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}
