//! Resolution of external identifiers into documents.
//!
//! The getters return precise [`LookupError`]s. Callers that must fail closed
//! collapse them through [`fail_closed_absent`] or [`fail_closed_denied`],
//! which log whatever they swallow.

use thiserror::Error;

use crate::model::{
    db::{Group, Poll, Question, User},
    mongodb::Id,
};
use crate::store::{Collection, DocumentStore, StoreError};

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Malformed ID {0:?}")]
    Malformed(String),
    #[error("User {0} not found")]
    UserNotFound(Id),
    #[error("Group {0} not found")]
    GroupNotFound(Id),
    #[error("Poll {0} not found")]
    PollNotFound(Id),
    #[error("Question {0} not found")]
    QuestionNotFound(Id),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LookupError {
    /// Is this "no such document", as opposed to a malfunction?
    pub fn is_not_found(&self) -> bool {
        !matches!(self, Self::Store(_))
    }
}

/// Parse an external identifier.
pub fn parse_id(raw: &str) -> Result<Id, LookupError> {
    raw.parse::<Id>()
        .map_err(|_| LookupError::Malformed(raw.to_string()))
}

/// Check that `raw` names an existing document of `collection`, returning its ID.
///
/// Malformed identifiers and lookup failures are both "not found".
pub async fn validate_id(store: &dyn DocumentStore, collection: Collection, raw: &str) -> Option<Id> {
    let id = match parse_id(raw) {
        Ok(id) => id,
        Err(e) => {
            debug!("Rejecting {collection} lookup: {e}");
            return None;
        }
    };
    match store.exists(collection, id).await {
        Ok(true) => Some(id),
        Ok(false) => None,
        Err(e) => {
            warn!("Failed to look up {collection} {id}, treating as absent: {e}");
            None
        }
    }
}

pub async fn get_user_internal(store: &dyn DocumentStore, id: Id) -> Result<User, LookupError> {
    store
        .find_user(id)
        .await?
        .ok_or(LookupError::UserNotFound(id))
}

pub async fn get_group_internal(store: &dyn DocumentStore, id: Id) -> Result<Group, LookupError> {
    store
        .find_group(id)
        .await?
        .ok_or(LookupError::GroupNotFound(id))
}

pub async fn get_poll_internal(store: &dyn DocumentStore, id: Id) -> Result<Poll, LookupError> {
    store
        .find_poll(id)
        .await?
        .ok_or(LookupError::PollNotFound(id))
}

/// Find a question of a poll by linear scan.
pub async fn get_question_internal(
    store: &dyn DocumentStore,
    poll_id: Id,
    question_id: Id,
) -> Result<Question, LookupError> {
    let poll = get_poll_internal(store, poll_id).await?;
    poll.question(question_id)
        .cloned()
        .ok_or(LookupError::QuestionNotFound(question_id))
}

/// Collapse any lookup failure into "absent".
pub fn fail_closed_absent<T>(result: Result<T, LookupError>) -> Option<T> {
    match result {
        Ok(found) => Some(found),
        Err(e) => {
            log_swallowed(&e);
            None
        }
    }
}

/// Collapse any lookup failure into "not authorized".
pub fn fail_closed_denied(result: Result<bool, LookupError>) -> bool {
    fail_closed_absent(result).unwrap_or(false)
}

fn log_swallowed(e: &LookupError) {
    if e.is_not_found() {
        debug!("{e}");
    } else {
        warn!("Lookup failed, failing closed: {e}");
    }
}
