use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use mongodb::bson::{from_document, to_document, Document};
use serde::{de::DeserializeOwned, Serialize};

use super::{Collection, DocumentStore, StoreError, DUPLICATE_USER};
use crate::model::{
    db::{Group, NewGroup, NewPoll, NewUser, Poll, User},
    mongodb::Id,
};

/// An in-process [`DocumentStore`].
///
/// Documents are kept as BSON, so everything written goes through the same
/// serialisation as it would for MongoDB. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<Collection, Vec<Document>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every document of `collection` that `filter` accepts, in insertion order.
    fn find_where<T, F>(&self, collection: Collection, filter: F) -> Result<Vec<T>, StoreError>
    where
        T: DeserializeOwned,
        F: Fn(&T) -> bool,
    {
        let collections = self.collections.read().unwrap_or_else(PoisonError::into_inner);
        let mut found = Vec::new();
        for doc in collections.get(&collection).into_iter().flatten() {
            let value: T = from_document(doc.clone())?;
            if filter(&value) {
                found.push(value);
            }
        }
        Ok(found)
    }

    fn find_by_id<T: DeserializeOwned>(
        &self,
        collection: Collection,
        id: Id,
    ) -> Result<Option<T>, StoreError> {
        let collections = self.collections.read().unwrap_or_else(PoisonError::into_inner);
        let found = collections
            .get(&collection)
            .into_iter()
            .flatten()
            .find(|doc| has_id(doc, id));
        match found {
            Some(doc) => Ok(Some(from_document(doc.clone())?)),
            None => Ok(None),
        }
    }

    fn insert<T: Serialize>(&self, collection: Collection, value: &T) -> Result<Id, StoreError> {
        let mut doc = to_document(value)?;
        let id = Id::new();
        doc.insert("_id", *id);
        let mut collections = self.collections.write().unwrap_or_else(PoisonError::into_inner);
        collections.entry(collection).or_default().push(doc);
        Ok(id)
    }

    fn replace<T: Serialize>(
        &self,
        collection: Collection,
        id: Id,
        value: &T,
    ) -> Result<bool, StoreError> {
        let doc = to_document(value)?;
        let mut collections = self.collections.write().unwrap_or_else(PoisonError::into_inner);
        let existing = collections
            .entry(collection)
            .or_default()
            .iter_mut()
            .find(|doc| has_id(doc, id));
        match existing {
            Some(existing) => {
                *existing = doc;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn remove(&self, collection: Collection, id: Id) -> bool {
        let mut collections = self.collections.write().unwrap_or_else(PoisonError::into_inner);
        let docs = collections.entry(collection).or_default();
        let before = docs.len();
        docs.retain(|doc| !has_id(doc, id));
        docs.len() != before
    }

    /// Would `user` clash with an existing user other than `except`?
    ///
    /// Emails are stored lowercased, so like the unique index this compares
    /// them exactly.
    fn user_taken(&self, user: &NewUser, except: Option<Id>) -> Result<bool, StoreError> {
        let clashes = self.find_where::<User, _>(Collection::Users, |existing| {
            Some(existing.id) != except
                && (existing.user_name == user.user_name || existing.email == user.email)
        })?;
        Ok(!clashes.is_empty())
    }
}

fn has_id(doc: &Document, id: Id) -> bool {
    doc.get_object_id("_id").map_or(false, |found| found == *id)
}

#[rocket::async_trait]
impl DocumentStore for MemoryStore {
    async fn exists(&self, collection: Collection, id: Id) -> Result<bool, StoreError> {
        let collections = self.collections.read().unwrap_or_else(PoisonError::into_inner);
        Ok(collections
            .get(&collection)
            .map_or(false, |docs| docs.iter().any(|doc| has_id(doc, id))))
    }

    async fn find_user(&self, id: Id) -> Result<Option<User>, StoreError> {
        self.find_by_id(Collection::Users, id)
    }

    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>, StoreError> {
        let email = login.to_lowercase();
        let found = self.find_where::<User, _>(Collection::Users, |user| {
            user.user_name == login || user.email == email
        })?;
        Ok(found.into_iter().next())
    }

    async fn all_users(&self) -> Result<Vec<User>, StoreError> {
        self.find_where(Collection::Users, |_: &User| true)
    }

    async fn insert_user(&self, user: &NewUser) -> Result<Id, StoreError> {
        if self.user_taken(user, None)? {
            return Err(StoreError::Duplicate(DUPLICATE_USER.to_string()));
        }
        self.insert(Collection::Users, user)
    }

    async fn replace_user(&self, user: &User) -> Result<bool, StoreError> {
        if self.user_taken(&user.user, Some(user.id))? {
            return Err(StoreError::Duplicate(DUPLICATE_USER.to_string()));
        }
        self.replace(Collection::Users, user.id, user)
    }

    async fn delete_user(&self, id: Id) -> Result<bool, StoreError> {
        Ok(self.remove(Collection::Users, id))
    }

    async fn find_group(&self, id: Id) -> Result<Option<Group>, StoreError> {
        self.find_by_id(Collection::Groups, id)
    }

    async fn groups_for_user(&self, user: Id) -> Result<Vec<Group>, StoreError> {
        self.find_where(Collection::Groups, |group: &Group| {
            group.has_admin(user) || group.has_member(user)
        })
    }

    async fn insert_group(&self, group: &NewGroup) -> Result<Id, StoreError> {
        self.insert(Collection::Groups, group)
    }

    async fn replace_group(&self, group: &Group) -> Result<bool, StoreError> {
        self.replace(Collection::Groups, group.id, group)
    }

    async fn delete_group(&self, id: Id) -> Result<bool, StoreError> {
        Ok(self.remove(Collection::Groups, id))
    }

    async fn find_poll(&self, id: Id) -> Result<Option<Poll>, StoreError> {
        self.find_by_id(Collection::Polls, id)
    }

    async fn polls_for_group(&self, group: Id) -> Result<Vec<Poll>, StoreError> {
        self.find_where(Collection::Polls, |poll: &Poll| poll.group == Some(group))
    }

    async fn polls_for_creator(&self, creator: Id) -> Result<Vec<Poll>, StoreError> {
        self.find_where(Collection::Polls, |poll: &Poll| poll.creator == Some(creator))
    }

    async fn insert_poll(&self, poll: &NewPoll) -> Result<Id, StoreError> {
        self.insert(Collection::Polls, poll)
    }

    async fn replace_poll(&self, poll: &Poll) -> Result<bool, StoreError> {
        self.replace(Collection::Polls, poll.id, poll)
    }

    async fn delete_poll(&self, id: Id) -> Result<bool, StoreError> {
        Ok(self.remove(Collection::Polls, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::db::{GroupCore, PollCore};

    #[rocket::async_test]
    async fn users_round_trip() {
        let store = MemoryStore::new();
        let new_user = NewUser::example();
        let id = store.insert_user(&new_user).await.unwrap();

        let user = store.find_user(id).await.unwrap().unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.user, new_user);
        assert!(store.exists(Collection::Users, id).await.unwrap());
        assert!(!store.exists(Collection::Groups, id).await.unwrap());

        let by_email = store.find_user_by_login("ADA@example.com").await.unwrap();
        assert_eq!(by_email.map(|user| user.id), Some(id));
    }

    #[rocket::async_test]
    async fn email_logins_fold_unicode_case() {
        let store = MemoryStore::new();
        let new_user = NewUser {
            user_name: "elodie".to_string(),
            email: "élodie@exemple.fr".to_string(),
            ..NewUser::example()
        };
        let id = store.insert_user(&new_user).await.unwrap();

        let found = store.find_user_by_login("ÉLODIE@EXEMPLE.FR").await.unwrap();
        assert_eq!(found.map(|user| user.id), Some(id));
        assert_eq!(store.find_user_by_login("ELODIE").await.unwrap(), None);
    }

    #[rocket::async_test]
    async fn duplicate_users_are_rejected() {
        let store = MemoryStore::new();
        store.insert_user(&NewUser::example()).await.unwrap();
        let result = store.insert_user(&NewUser::example()).await;
        assert!(matches!(result, Err(StoreError::Duplicate(_))));

        // Renaming onto a taken email is also a clash.
        let id = store.insert_user(&NewUser::example2()).await.unwrap();
        let mut user = store.find_user(id).await.unwrap().unwrap();
        user.email = NewUser::example().email;
        assert!(matches!(
            store.replace_user(&user).await,
            Err(StoreError::Duplicate(_))
        ));
    }

    #[rocket::async_test]
    async fn replace_and_delete() {
        let store = MemoryStore::new();
        let admin = Id::new();
        let id = store.insert_group(&GroupCore::example(admin)).await.unwrap();

        let mut group = store.find_group(id).await.unwrap().unwrap();
        group.users.push(Id::new());
        assert!(store.replace_group(&group).await.unwrap());
        assert_eq!(store.find_group(id).await.unwrap(), Some(group));

        assert!(store.delete_group(id).await.unwrap());
        assert!(!store.delete_group(id).await.unwrap());
        assert_eq!(store.find_group(id).await.unwrap(), None);
    }

    #[rocket::async_test]
    async fn owner_queries() {
        let store = MemoryStore::new();
        let admin = Id::new();
        let group = store.insert_group(&GroupCore::example(admin)).await.unwrap();
        store
            .insert_poll(&PollCore::example_for_group(group, admin))
            .await
            .unwrap();
        store
            .insert_poll(&PollCore::example_for_creator(admin))
            .await
            .unwrap();

        assert_eq!(store.polls_for_group(group).await.unwrap().len(), 1);
        assert_eq!(store.polls_for_creator(admin).await.unwrap().len(), 2);
        assert_eq!(store.groups_for_user(admin).await.unwrap().len(), 1);
        assert!(store.groups_for_user(Id::new()).await.unwrap().is_empty());
    }

    #[rocket::async_test]
    async fn clones_share_data() {
        let store = MemoryStore::new();
        let clone = store.clone();
        let id = clone.insert_user(&NewUser::example()).await.unwrap();
        assert!(store.exists(Collection::Users, id).await.unwrap());
    }
}
