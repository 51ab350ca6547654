//! [`SessionStore`] backed by PostgreSQL.

use async_trait::async_trait;
use duet_core::scoring::{Answer, CombinedResult};
use duet_core::store::{NewSession, SessionRecord, SessionStore, StoreError};
use duet_core::types::SessionId;

use crate::repositories::QuizSessionRepo;
use crate::DbPool;

/// PostgreSQL unique-violation SQLSTATE.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone)]
pub struct PgSessionStore {
    pool: DbPool,
}

impl PgSessionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

/// Map a sqlx error onto the store taxonomy.
///
/// Unique violations become [`StoreError::Duplicate`]; everything else is
/// logged and reported as a backend failure.
fn store_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            let constraint = db_err.constraint().unwrap_or("unknown");
            return StoreError::Duplicate(format!("violates unique constraint {constraint}"));
        }
    }
    tracing::error!(error = %err, "Database error");
    StoreError::Backend(err.to_string())
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn insert(&self, session: NewSession) -> Result<SessionRecord, StoreError> {
        QuizSessionRepo::create(&self.pool, &session)
            .await
            .map(Into::into)
            .map_err(store_error)
    }

    async fn find_by_id(&self, id: SessionId) -> Result<Option<SessionRecord>, StoreError> {
        QuizSessionRepo::find_by_id(&self.pool, id)
            .await
            .map(|row| row.map(Into::into))
            .map_err(store_error)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<SessionRecord>, StoreError> {
        QuizSessionRepo::find_by_partner_token(&self.pool, token)
            .await
            .map(|row| row.map(Into::into))
            .map_err(store_error)
    }

    async fn mark_paid(&self, id: SessionId, payment_reference: &str) -> Result<bool, StoreError> {
        QuizSessionRepo::mark_paid(&self.pool, id, payment_reference)
            .await
            .map_err(store_error)
    }

    async fn complete_partner(
        &self,
        id: SessionId,
        answers: &[Answer],
        combined: &CombinedResult,
    ) -> Result<bool, StoreError> {
        QuizSessionRepo::complete_partner(&self.pool, id, answers, combined)
            .await
            .map_err(store_error)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await.map_err(store_error)
    }
}
