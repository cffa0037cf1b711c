use argon2::Error as Argon2Error;
use jsonwebtoken::errors::Error as JwtError;
use rocket::{http::Status, response::Responder, serde::json::serde_json::Error as JsonError};
use thiserror::Error;

use crate::lookup::LookupError;
use crate::model::api::{FieldErrors, Reply};
use crate::store::StoreError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{1}")]
    Status(Status, String),
    /// A predicate refused the request; its reply is sent as-is.
    #[error("Rejected with {}", .0.status)]
    Rejected(Reply),
    #[error("Invalid fields: {0:?}")]
    Invalid(FieldErrors),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Jwt(#[from] JwtError),
    #[error(transparent)]
    Argon2(#[from] Argon2Error),
    #[error(transparent)]
    Json(#[from] JsonError),
}

impl Error {
    pub fn not_found(what: &str) -> Self {
        Self::Status(Status::NotFound, format!("{what} not found"))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Status(Status::BadRequest, message.into())
    }

    /// The reply this error is rendered as.
    pub fn into_reply(self) -> Reply {
        match self {
            Self::Status(status, message) => Reply::failure(status, message),
            Self::Rejected(reply) => reply,
            Self::Invalid(errors) => errors.into_reply(),
            Self::Store(StoreError::Duplicate(message)) => Reply::failure(Status::Conflict, message),
            Self::Store(_) | Self::Json(_) => {
                Reply::failure(Status::InternalServerError, "Internal server error")
            }
            Self::Jwt(_) => Reply::failure(Status::Unauthorized, "Invalid session token"),
            Self::Argon2(_) => Reply::failure(Status::BadRequest, "Invalid password"),
        }
    }
}

impl From<LookupError> for Error {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::Malformed(raw) => {
                Self::Status(Status::NotFound, format!("Malformed ID {raw:?}"))
            }
            LookupError::UserNotFound(_) => Self::not_found("User"),
            LookupError::GroupNotFound(_) => Self::not_found("Group"),
            LookupError::PollNotFound(_) => Self::not_found("Poll"),
            LookupError::QuestionNotFound(_) => Self::not_found("Question"),
            LookupError::Store(err) => Self::Store(err),
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        match self {
            Self::Store(_) | Self::Json(_) => error!("{self}"),
            _ => debug!("{self}"),
        }
        self.into_reply().respond_to(req)
    }
}
