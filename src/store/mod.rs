//! The document store the rest of the server talks to.
//!
//! Everything goes through [`DocumentStore`], so handlers and authorization
//! checks run unchanged against MongoDB in production and against
//! [`MemoryStore`] in tests.

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use mongodb::{bson, error::Error as DbError};
use thiserror::Error;

use crate::model::{
    db::{Group, NewGroup, NewPoll, NewUser, Poll, User},
    mongodb::Id,
};

#[cfg(test)]
mod failing;
mod memory;
mod mongo;

#[cfg(test)]
pub use failing::FailingStore;
pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// The managed store handle.
pub type Store = Arc<dyn DocumentStore>;

/// The named collections of the database.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum Collection {
    Users,
    Groups,
    Polls,
}

impl Collection {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Groups => "groups",
            Self::Polls => "polls",
        }
    }

    /// What one document of this collection is called in messages.
    pub const fn kind(self) -> &'static str {
        match self {
            Self::Users => "User",
            Self::Groups => "Group",
            Self::Polls => "Poll",
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Serialize(#[from] bson::ser::Error),
    #[error(transparent)]
    Deserialize(#[from] bson::de::Error),
    #[error("{0}")]
    Duplicate(String),
    #[error("Database did not return an inserted ID")]
    MissingId,
}

pub(crate) const DUPLICATE_USER: &str = "An account with that user name or email already exists";

/// Point reads and writes on users, groups and polls.
///
/// `replace_*` and `delete_*` return whether a document with that ID existed.
#[rocket::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Does a document with this ID exist in `collection`?
    async fn exists(&self, collection: Collection, id: Id) -> Result<bool, StoreError>;

    async fn find_user(&self, id: Id) -> Result<Option<User>, StoreError>;
    /// Find a user by user name or (case-insensitively) by email.
    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>, StoreError>;
    async fn all_users(&self) -> Result<Vec<User>, StoreError>;
    /// Fails with [`StoreError::Duplicate`] if the user name or email is taken.
    async fn insert_user(&self, user: &NewUser) -> Result<Id, StoreError>;
    async fn replace_user(&self, user: &User) -> Result<bool, StoreError>;
    async fn delete_user(&self, id: Id) -> Result<bool, StoreError>;

    async fn find_group(&self, id: Id) -> Result<Option<Group>, StoreError>;
    /// Groups the user administers or belongs to.
    async fn groups_for_user(&self, user: Id) -> Result<Vec<Group>, StoreError>;
    async fn insert_group(&self, group: &NewGroup) -> Result<Id, StoreError>;
    async fn replace_group(&self, group: &Group) -> Result<bool, StoreError>;
    async fn delete_group(&self, id: Id) -> Result<bool, StoreError>;

    async fn find_poll(&self, id: Id) -> Result<Option<Poll>, StoreError>;
    async fn polls_for_group(&self, group: Id) -> Result<Vec<Poll>, StoreError>;
    async fn polls_for_creator(&self, creator: Id) -> Result<Vec<Poll>, StoreError>;
    async fn insert_poll(&self, poll: &NewPoll) -> Result<Id, StoreError>;
    async fn replace_poll(&self, poll: &Poll) -> Result<bool, StoreError>;
    async fn delete_poll(&self, id: Id) -> Result<bool, StoreError>;
}
