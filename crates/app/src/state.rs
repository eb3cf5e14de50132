//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::db::SessionStore;
use crate::shopify::ShopifyAdmin;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. The session store and Shopify
/// client are trait objects so tests can swap in fakes.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    sessions: Arc<dyn SessionStore>,
    shopify: Arc<dyn ShopifyAdmin>,
    pool: Option<PgPool>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - App configuration
    /// * `sessions` - Where sessions are persisted
    /// * `shopify` - Shopify Admin API access
    #[must_use]
    pub fn new(
        config: AppConfig,
        sessions: Arc<dyn SessionStore>,
        shopify: Arc<dyn ShopifyAdmin>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                sessions,
                shopify,
                pool: None,
            }),
        }
    }

    /// Create application state that also owns a database pool, so the
    /// readiness probe can check it.
    #[must_use]
    pub fn with_pool(
        config: AppConfig,
        pool: PgPool,
        sessions: Arc<dyn SessionStore>,
        shopify: Arc<dyn ShopifyAdmin>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                sessions,
                shopify,
                pool: Some(pool),
            }),
        }
    }

    /// Get a reference to the app configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get a reference to the session store.
    #[must_use]
    pub fn sessions(&self) -> &dyn SessionStore {
        self.inner.sessions.as_ref()
    }

    /// Get a reference to the Shopify Admin API client.
    #[must_use]
    pub fn shopify(&self) -> &dyn ShopifyAdmin {
        self.inner.shopify.as_ref()
    }

    /// Get the database pool, if the app runs against `PostgreSQL`.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }
}
