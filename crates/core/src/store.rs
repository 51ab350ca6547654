//! Record-store seam for sessions.
//!
//! The state machine in [`crate::session`] is written against
//! [`SessionStore`]; `duet-db` provides the PostgreSQL implementation and
//! [`MemorySessionStore`] serves tests and database-less development.
//!
//! Both write paths are conditional so that concurrent callers cannot
//! clobber each other: `mark_paid` only flips an unpaid session and
//! `complete_partner` only fills an empty, paid partner slot. Partner
//! answers and the combined result are always written together.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::CoreError;
use crate::scoring::{Answer, CombinedResult, IndividualResult};
use crate::types::{SessionId, Timestamp};

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A stored session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub id: SessionId,
    pub first_participant_name: String,
    pub second_participant_name: String,
    pub first_participant_answers: Vec<Answer>,
    pub first_participant_result: IndividualResult,
    pub partner_token: String,
    pub second_participant_answers: Option<Vec<Answer>>,
    pub combined_result: Option<CombinedResult>,
    pub paid: bool,
    pub payment_reference: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert DTO for a freshly created session.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub id: SessionId,
    pub first_participant_name: String,
    pub second_participant_name: String,
    pub first_participant_answers: Vec<Answer>,
    pub first_participant_result: IndividualResult,
    pub partner_token: String,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Duplicate key: {0}")]
    Duplicate(String),

    #[error("Record store failure: {0}")]
    Backend(String),
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(msg) => CoreError::Conflict(msg),
            StoreError::Backend(msg) => CoreError::Internal(msg),
        }
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a new, unpaid session.
    async fn insert(&self, session: NewSession) -> Result<SessionRecord, StoreError>;

    async fn find_by_id(&self, id: SessionId) -> Result<Option<SessionRecord>, StoreError>;

    async fn find_by_token(&self, token: &str) -> Result<Option<SessionRecord>, StoreError>;

    /// Set `paid` and record the reference, only if the session is
    /// currently unpaid. Returns `true` when this call made the change.
    async fn mark_paid(&self, id: SessionId, payment_reference: &str) -> Result<bool, StoreError>;

    /// Store the partner's answers together with the combined result, only
    /// if the session is paid and its partner slot is still empty. Returns
    /// `true` when this call made the change.
    async fn complete_partner(
        &self,
        id: SessionId,
        answers: &[Answer],
        combined: &CombinedResult,
    ) -> Result<bool, StoreError>;

    /// Cheap liveness probe.
    async fn health_check(&self) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// In-memory implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MemoryInner {
    sessions: HashMap<SessionId, SessionRecord>,
    by_token: HashMap<String, SessionId>,
}

/// Process-local store. Every conditional write happens under one write
/// lock, which makes it atomic with respect to other callers.
#[derive(Default)]
pub struct MemorySessionStore {
    inner: RwLock<MemoryInner>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions.
    pub async fn len(&self) -> usize {
        self.inner.read().await.sessions.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, session: NewSession) -> Result<SessionRecord, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.sessions.contains_key(&session.id) {
            return Err(StoreError::Duplicate(format!("session id {}", session.id)));
        }
        if inner.by_token.contains_key(&session.partner_token) {
            return Err(StoreError::Duplicate("partner token".into()));
        }

        let now = chrono::Utc::now();
        let record = SessionRecord {
            id: session.id,
            first_participant_name: session.first_participant_name,
            second_participant_name: session.second_participant_name,
            first_participant_answers: session.first_participant_answers,
            first_participant_result: session.first_participant_result,
            partner_token: session.partner_token,
            second_participant_answers: None,
            combined_result: None,
            paid: false,
            payment_reference: None,
            created_at: now,
            updated_at: now,
        };

        inner
            .by_token
            .insert(record.partner_token.clone(), record.id);
        inner.sessions.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: SessionId) -> Result<Option<SessionRecord>, StoreError> {
        Ok(self.inner.read().await.sessions.get(&id).cloned())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<SessionRecord>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_token
            .get(token)
            .and_then(|id| inner.sessions.get(id))
            .cloned())
    }

    async fn mark_paid(&self, id: SessionId, payment_reference: &str) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        match inner.sessions.get_mut(&id) {
            Some(record) if !record.paid => {
                record.paid = true;
                record.payment_reference = Some(payment_reference.to_string());
                record.updated_at = chrono::Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn complete_partner(
        &self,
        id: SessionId,
        answers: &[Answer],
        combined: &CombinedResult,
    ) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        match inner.sessions.get_mut(&id) {
            Some(record) if record.paid && record.second_participant_answers.is_none() => {
                record.second_participant_answers = Some(answers.to_vec());
                record.combined_result = Some(combined.clone());
                record.updated_at = chrono::Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{compute_combined, compute_individual};

    fn new_session(token: &str) -> NewSession {
        let answers = vec![Answer { question_id: 1, value: 4 }];
        NewSession {
            id: uuid::Uuid::new_v4(),
            first_participant_name: "Ada".into(),
            second_participant_name: "Grace".into(),
            first_participant_result: compute_individual(&answers),
            first_participant_answers: answers,
            partner_token: token.into(),
        }
    }

    #[tokio::test]
    async fn insert_then_find_by_id_and_token() {
        let store = MemorySessionStore::new();
        let created = store.insert(new_session("tok-a")).await.unwrap();

        assert!(!created.paid);
        assert!(created.combined_result.is_none());
        assert_eq!(store.find_by_id(created.id).await.unwrap(), Some(created.clone()));
        assert_eq!(store.find_by_token("tok-a").await.unwrap(), Some(created));
        assert_eq!(store.find_by_token("tok-b").await.unwrap(), None);
    }

    #[tokio::test]
    async fn duplicate_token_is_rejected() {
        let store = MemorySessionStore::new();
        store.insert(new_session("same")).await.unwrap();
        let err = store.insert(new_session("same")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn mark_paid_only_flips_once() {
        let store = MemorySessionStore::new();
        let created = store.insert(new_session("t")).await.unwrap();

        assert!(store.mark_paid(created.id, "cs_1").await.unwrap());
        assert!(!store.mark_paid(created.id, "cs_2").await.unwrap());

        let stored = store.find_by_id(created.id).await.unwrap().unwrap();
        assert!(stored.paid);
        assert_eq!(stored.payment_reference.as_deref(), Some("cs_1"));
    }

    #[tokio::test]
    async fn complete_partner_requires_payment_and_empty_slot() {
        let store = MemorySessionStore::new();
        let created = store.insert(new_session("t")).await.unwrap();
        let answers = vec![Answer { question_id: 2, value: 1 }];
        let combined = compute_combined(&created.first_participant_result, &answers);

        assert!(!store.complete_partner(created.id, &answers, &combined).await.unwrap());

        store.mark_paid(created.id, "cs_1").await.unwrap();
        assert!(store.complete_partner(created.id, &answers, &combined).await.unwrap());
        assert!(!store.complete_partner(created.id, &answers, &combined).await.unwrap());

        let stored = store.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(stored.second_participant_answers, Some(answers));
        assert_eq!(stored.combined_result, Some(combined));
    }

    #[tokio::test]
    async fn writes_to_unknown_ids_are_noops() {
        let store = MemorySessionStore::new();
        let id = uuid::Uuid::new_v4();
        assert!(!store.mark_paid(id, "cs").await.unwrap());
        assert!(store.is_empty().await);
    }
}
