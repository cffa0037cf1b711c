//! Authorization predicates and their combinators.
//!
//! A [`Predicate`] inspects a request [`Context`] and returns a [`Verdict`]:
//! either let the request through, or the exact reply to end it with. Since
//! the verdict is a value, a predicate can never both continue and respond,
//! nor do neither.

use rocket::http::Status;

use crate::config::Config;
use crate::model::{api::Reply, mongodb::Id};
use crate::store::DocumentStore;

mod authorizer;
mod combinators;
pub mod ownership;
mod predicates;

pub use authorizer::Authorizer;
pub use combinators::{and, or, NO_CONDITIONS_PASSED};
pub use predicates::{
    is_development_mode, is_group_admin, is_group_member, is_logged_in, is_poll_admin,
    is_poll_viewer, is_site_admin, is_user,
};

/// The outcome of a predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Let the request proceed.
    Continue,
    /// End the request with this reply.
    Respond(Reply),
}

impl Verdict {
    pub fn respond(status: Status, error: impl Into<String>) -> Self {
        Self::Respond(Reply::failure(status, error))
    }

    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue)
    }
}

/// What a predicate may look at.
pub struct Context<'a> {
    /// The logged-in user, if any.
    pub user: Option<Id>,
    pub store: &'a dyn DocumentStore,
    pub config: &'a Config,
}

/// A check guarding a route handler.
#[rocket::async_trait]
pub trait Predicate: Send + Sync {
    async fn check(&self, ctx: &Context<'_>) -> Verdict;
}

pub type BoxPredicate = Box<dyn Predicate>;
