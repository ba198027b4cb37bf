//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::AtlasConfig;
use crate::restcountries::{CountriesClient, CountriesError};
use crate::services::TokenService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the database pool, the country gateway client,
/// and the token service.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AtlasConfig,
    pool: SqlitePool,
    countries: CountriesClient,
    tokens: TokenService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the country gateway client cannot be constructed.
    pub fn new(config: AtlasConfig, pool: SqlitePool) -> Result<Self, CountriesError> {
        let countries = CountriesClient::new(&config.countries)?;
        let tokens = TokenService::new(&config.token_secret, config.token_ttl_hours);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                countries,
                tokens,
            }),
        })
    }

    /// Get a reference to the application configuration.
    #[must_use]
    pub fn config(&self) -> &AtlasConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    /// Get a reference to the country gateway client.
    #[must_use]
    pub fn countries(&self) -> &CountriesClient {
        &self.inner.countries
    }

    /// Get a reference to the bearer-token service.
    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }
}
