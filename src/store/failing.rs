use super::{Collection, DocumentStore, StoreError};
use crate::model::{
    db::{Group, NewGroup, NewPoll, NewUser, Poll, User},
    mongodb::Id,
};

/// A [`DocumentStore`] whose every operation fails, standing in for a
/// database that has gone away.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingStore;

fn fault<T>() -> Result<T, StoreError> {
    Err(StoreError::MissingId)
}

#[rocket::async_trait]
impl DocumentStore for FailingStore {
    async fn exists(&self, _collection: Collection, _id: Id) -> Result<bool, StoreError> {
        fault()
    }

    async fn find_user(&self, _id: Id) -> Result<Option<User>, StoreError> {
        fault()
    }

    async fn find_user_by_login(&self, _login: &str) -> Result<Option<User>, StoreError> {
        fault()
    }

    async fn all_users(&self) -> Result<Vec<User>, StoreError> {
        fault()
    }

    async fn insert_user(&self, _user: &NewUser) -> Result<Id, StoreError> {
        fault()
    }

    async fn replace_user(&self, _user: &User) -> Result<bool, StoreError> {
        fault()
    }

    async fn delete_user(&self, _id: Id) -> Result<bool, StoreError> {
        fault()
    }

    async fn find_group(&self, _id: Id) -> Result<Option<Group>, StoreError> {
        fault()
    }

    async fn groups_for_user(&self, _user: Id) -> Result<Vec<Group>, StoreError> {
        fault()
    }

    async fn insert_group(&self, _group: &NewGroup) -> Result<Id, StoreError> {
        fault()
    }

    async fn replace_group(&self, _group: &Group) -> Result<bool, StoreError> {
        fault()
    }

    async fn delete_group(&self, _id: Id) -> Result<bool, StoreError> {
        fault()
    }

    async fn find_poll(&self, _id: Id) -> Result<Option<Poll>, StoreError> {
        fault()
    }

    async fn polls_for_group(&self, _group: Id) -> Result<Vec<Poll>, StoreError> {
        fault()
    }

    async fn polls_for_creator(&self, _creator: Id) -> Result<Vec<Poll>, StoreError> {
        fault()
    }

    async fn insert_poll(&self, _poll: &NewPoll) -> Result<Id, StoreError> {
        fault()
    }

    async fn replace_poll(&self, _poll: &Poll) -> Result<bool, StoreError> {
        fault()
    }

    async fn delete_poll(&self, _id: Id) -> Result<bool, StoreError> {
        fault()
    }
}
