//! Paired-session state machine.
//!
//! ```text
//! AwaitingPayment --mark_paid--> AwaitingPartner --submit_second--> Completed
//! ```
//!
//! A session is created by the first participant, unlocked by a payment
//! confirmation, and completed exactly once when the partner submits
//! through their access token. `Completed` is terminal. Every operation
//! is safe to retry: repeated payments and repeated partner submissions
//! are no-op successes that never touch the stored combined result.

use std::sync::Arc;

use serde::Serialize;

use crate::error::CoreError;
use crate::partner_token;
use crate::payment::PaymentOracle;
use crate::scoring::{compute_combined, compute_individual, Answer, CombinedResult, IndividualResult};
use crate::store::{NewSession, SessionRecord, SessionStore};
use crate::types::SessionId;

/// Maximum length of a participant name, in characters.
pub const MAX_NAME_LENGTH: usize = 100;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    AwaitingPayment,
    AwaitingPartner,
    Completed,
}

impl SessionRecord {
    pub fn state(&self) -> SessionState {
        if self.combined_result.is_some() {
            SessionState::Completed
        } else if self.paid {
            SessionState::AwaitingPartner
        } else {
            SessionState::AwaitingPayment
        }
    }
}

/// How a reader identifies the session to poll.
#[derive(Debug, Clone)]
pub enum SessionLookup {
    Id(SessionId),
    Token(String),
}

/// The read projection both participants poll.
///
/// Never exposes raw answers; partner completion is reported as a flag
/// alongside the fully computed combined result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: SessionId,
    pub person_a_name: String,
    pub person_b_name: String,
    pub person_a_results: IndividualResult,
    pub combined_results: Option<CombinedResult>,
    pub partner_token: String,
    pub partner_completed: bool,
    pub paid: bool,
    pub state: SessionState,
}

impl From<SessionRecord> for SessionView {
    fn from(record: SessionRecord) -> Self {
        let state = record.state();
        Self {
            session_id: record.id,
            person_a_name: record.first_participant_name,
            person_b_name: record.second_participant_name,
            person_a_results: record.first_participant_result,
            partner_completed: record.second_participant_answers.is_some(),
            combined_results: record.combined_result,
            partner_token: record.partner_token,
            paid: record.paid,
            state,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Trim and validate a participant name.
pub fn validate_name(field: &str, name: &str) -> Result<String, CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

fn validate_answers(answers: &[Answer]) -> Result<(), CoreError> {
    if answers.is_empty() {
        return Err(CoreError::Validation("answers must not be empty".into()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Drives session transitions against a [`SessionStore`].
///
/// Holds no state of its own; cloning is cheap.
#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn SessionStore>,
}

impl SessionService {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Create a session from the first participant's submission.
    pub async fn create(
        &self,
        first_participant_name: &str,
        second_participant_name: &str,
        answers: Vec<Answer>,
    ) -> Result<SessionRecord, CoreError> {
        let first = validate_name("personAName", first_participant_name)?;
        let second = validate_name("personBName", second_participant_name)?;
        validate_answers(&answers)?;

        let result = compute_individual(&answers);
        let record = self
            .store
            .insert(NewSession {
                id: uuid::Uuid::new_v4(),
                first_participant_name: first,
                second_participant_name: second,
                first_participant_answers: answers,
                first_participant_result: result,
                partner_token: partner_token::issue(),
            })
            .await?;

        tracing::info!(
            session_id = %record.id,
            token = %partner_token::fingerprint(&record.partner_token),
            "Session created",
        );

        Ok(record)
    }

    /// Record a confirmed payment. Returns `true` if this call unlocked the
    /// session, `false` if it was already paid.
    pub async fn mark_paid(
        &self,
        session_id: SessionId,
        payment_reference: &str,
    ) -> Result<bool, CoreError> {
        let reference = payment_reference.trim();
        if reference.is_empty() {
            return Err(CoreError::Validation(
                "payment reference must not be empty".into(),
            ));
        }

        if self.store.mark_paid(session_id, reference).await? {
            tracing::info!(session_id = %session_id, payment_reference = %reference, "Session marked paid");
            return Ok(true);
        }

        // Either already paid or unknown; only the latter is an error.
        self.load(session_id).await?;
        tracing::debug!(session_id = %session_id, "Duplicate payment confirmation ignored");
        Ok(false)
    }

    /// Accept the second participant's answers through their access token.
    ///
    /// Returns the session id. Once the partner slot is filled, later calls
    /// return the same id without recomputing anything.
    pub async fn submit_second(
        &self,
        token: &str,
        answers: Vec<Answer>,
    ) -> Result<SessionId, CoreError> {
        validate_answers(&answers)?;

        let record = self.load_by_token(token).await?;

        if !record.paid {
            return Err(CoreError::Forbidden(
                "This session has not been paid for yet".into(),
            ));
        }

        if record.second_participant_answers.is_some() {
            tracing::debug!(session_id = %record.id, "Partner already completed, replay ignored");
            return Ok(record.id);
        }

        let combined = compute_combined(&record.first_participant_result, &answers);

        if self
            .store
            .complete_partner(record.id, &answers, &combined)
            .await?
        {
            tracing::info!(
                session_id = %record.id,
                overall_score = combined.overall_score,
                "Partner completed session",
            );
        } else {
            tracing::debug!(
                session_id = %record.id,
                "Concurrent partner submission won, result discarded",
            );
        }

        Ok(record.id)
    }

    /// Side-effect-free projection used for polling.
    pub async fn read(&self, lookup: &SessionLookup) -> Result<SessionView, CoreError> {
        let record = match lookup {
            SessionLookup::Id(id) => self.load(*id).await?,
            SessionLookup::Token(token) => self.load_by_token(token).await?,
        };
        Ok(record.into())
    }

    /// Verify-on-read payment check.
    ///
    /// Returns `true` immediately for paid sessions; otherwise asks the
    /// oracle and marks the session paid if a completed payment exists.
    pub async fn verify_payment(
        &self,
        session_id: SessionId,
        oracle: &dyn PaymentOracle,
    ) -> Result<bool, CoreError> {
        let record = self.load(session_id).await?;
        if record.paid {
            return Ok(true);
        }

        match oracle.find_completed_payment(session_id).await? {
            Some(reference) => {
                self.mark_paid(session_id, &reference).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Start a hosted checkout for an unpaid session and return its URL.
    pub async fn begin_checkout(
        &self,
        session_id: SessionId,
        oracle: &dyn PaymentOracle,
    ) -> Result<String, CoreError> {
        let record = self.load(session_id).await?;
        if record.paid {
            return Err(CoreError::Conflict("This session is already paid".into()));
        }

        let url = oracle.create_checkout(session_id).await?;
        tracing::info!(session_id = %session_id, "Checkout started");
        Ok(url)
    }

    pub async fn health_check(&self) -> Result<(), CoreError> {
        Ok(self.store.health_check().await?)
    }

    async fn load(&self, id: SessionId) -> Result<SessionRecord, CoreError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::NotFound {
                entity: "Session",
                id: id.to_string(),
            })
    }

    async fn load_by_token(&self, token: &str) -> Result<SessionRecord, CoreError> {
        let not_found = || CoreError::NotFound {
            entity: "Partner token",
            id: partner_token::fingerprint(token),
        };
        if !partner_token::is_well_formed(token) {
            return Err(not_found());
        }
        self.store.find_by_token(token).await?.ok_or_else(not_found)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
