//! Session storage.
//!
//! The auth flow only needs three things from storage: load a session by id,
//! replace a session wholesale, and forget every session of an uninstalled
//! shop. [`SessionStore`] captures that so the flow can run against
//! `PostgreSQL` in production and an in-memory map in tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use shopify_embedded_core::{Session, SessionId, ShopDomain};
use sqlx::PgPool;
use tokio::sync::RwLock;

use super::RepositoryError;

/// Persistent session storage.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load a session by id.
    async fn load(&self, id: &SessionId) -> Result<Option<Session>, RepositoryError>;

    /// Insert or replace a session. The last write for an id wins.
    async fn store(&self, session: &Session) -> Result<(), RepositoryError>;

    /// Delete every session belonging to a shop, returning how many were removed.
    async fn delete_by_shop(&self, shop: &ShopDomain) -> Result<u64, RepositoryError>;

    /// List stored sessions, optionally for a single shop.
    async fn list(&self, shop: Option<&ShopDomain>) -> Result<Vec<Session>, RepositoryError>;
}

// =============================================================================
// PostgreSQL
// =============================================================================

/// Internal row type for `PostgreSQL` queries.
#[derive(sqlx::FromRow)]
struct SessionRow {
    id: String,
    shop: ShopDomain,
    state: String,
    is_online: bool,
    scope: Option<String>,
    expires: Option<DateTime<Utc>>,
    access_token: String,
}

impl TryFrom<SessionRow> for Session {
    type Error = RepositoryError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        if row.is_online && row.expires.is_none() {
            return Err(RepositoryError::DataCorruption(format!(
                "online session {} has no expiry",
                row.id
            )));
        }

        Ok(Self {
            id: SessionId::from_stored(row.id),
            shop: row.shop,
            state: row.state,
            is_online: row.is_online,
            scope: row.scope,
            expires: row.expires,
            access_token: SecretString::from(row.access_token),
        })
    }
}

/// `PostgreSQL`-backed session store.
#[derive(Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    /// Create a new session store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn load(&self, id: &SessionId) -> Result<Option<Session>, RepositoryError> {
        let row = sqlx::query_as::<_, SessionRow>(
            r"
            SELECT id, shop, state, is_online, scope, expires, access_token
            FROM sessions
            WHERE id = $1
            ",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Session::try_from).transpose()
    }

    async fn store(&self, session: &Session) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO sessions (id, shop, state, is_online, scope, expires, access_token)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                shop = EXCLUDED.shop,
                state = EXCLUDED.state,
                is_online = EXCLUDED.is_online,
                scope = EXCLUDED.scope,
                expires = EXCLUDED.expires,
                access_token = EXCLUDED.access_token,
                updated_at = (CURRENT_TIMESTAMP AT TIME ZONE 'utc')
            ",
        )
        .bind(session.id.as_str())
        .bind(&session.shop)
        .bind(&session.state)
        .bind(session.is_online)
        .bind(session.scope.as_deref())
        .bind(session.expires)
        .bind(session.access_token.expose_secret())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_by_shop(&self, shop: &ShopDomain) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM sessions WHERE shop = $1")
            .bind(shop)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn list(&self, shop: Option<&ShopDomain>) -> Result<Vec<Session>, RepositoryError> {
        let rows = sqlx::query_as::<_, SessionRow>(
            r"
            SELECT id, shop, state, is_online, scope, expires, access_token
            FROM sessions
            WHERE $1::TEXT IS NULL OR shop = $1
            ORDER BY shop, id
            ",
        )
        .bind(shop.map(ShopDomain::as_str))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Session::try_from).collect()
    }
}

// =============================================================================
// In-memory
// =============================================================================

/// Session store backed by a process-local map.
///
/// Sessions are lost on restart; meant for tests and local experiments.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionId, Session>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: &SessionId) -> Result<Option<Session>, RepositoryError> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn store(&self, session: &Session) -> Result<(), RepositoryError> {
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn delete_by_shop(&self, shop: &ShopDomain) -> Result<u64, RepositoryError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| &session.shop != shop);
        Ok((before - sessions.len()) as u64)
    }

    async fn list(&self, shop: Option<&ShopDomain>) -> Result<Vec<Session>, RepositoryError> {
        let mut sessions: Vec<Session> = self
            .sessions
            .read()
            .await
            .values()
            .filter(|session| shop.is_none_or(|shop| &session.shop == shop))
            .cloned()
            .collect();
        sessions.sort_by(|a, b| {
            (a.shop.as_str(), a.id.as_str()).cmp(&(b.shop.as_str(), b.id.as_str()))
        });
        Ok(sessions)
    }
}
