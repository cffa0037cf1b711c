//! API-facing types: request bodies, client views, and the reply envelope.
//!
//! IDs here are plain hex strings rather than `ObjectId`s.

mod envelope;
mod group;
mod poll;
mod projection;
mod user;
mod validation;

pub use envelope::{Envelope, Reply, ResultKind};
pub use group::{GroupSpec, GroupView, UserRef};
pub use poll::{NewPollRequest, PollEdit, PollView, QuestionSpec, QuestionView};
pub use projection::{create_model, is_empty_object};
pub use user::{LoginRequest, MemberView, RegisterRequest, UserEdit, UserView};
pub use validation::FieldErrors;
