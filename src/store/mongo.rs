use mongodb::{
    bson::{doc, Document},
    options::CountOptions,
    Database,
};
use rocket::futures::TryStreamExt;

use super::{Collection, DocumentStore, StoreError, DUPLICATE_USER};
use crate::model::{
    db::{Group, NewGroup, NewPoll, NewUser, Poll, User},
    mongodb::{is_duplicate_key_error, Coll, Id, MongoCollection},
};

/// A [`DocumentStore`] backed by a MongoDB database.
#[derive(Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn coll<T: MongoCollection>(&self) -> Coll<T> {
        Coll::from_db(&self.db)
    }

    async fn insert<T>(&self, value: &T) -> Result<Id, StoreError>
    where
        T: MongoCollection + serde::Serialize,
    {
        let id = self
            .coll::<T>()
            .insert_one(value, None)
            .await?
            .inserted_id
            .as_object_id()
            .ok_or(StoreError::MissingId)?;
        Ok(id.into())
    }

    async fn find_many<T>(&self, filter: Option<Document>) -> Result<Vec<T>, StoreError>
    where
        T: MongoCollection + serde::de::DeserializeOwned + Unpin + Send + Sync,
    {
        let found: Vec<T> = self.coll::<T>().find(filter, None).await?.try_collect().await?;
        Ok(found)
    }

    async fn delete<T: MongoCollection>(&self, id: Id) -> Result<bool, StoreError> {
        let result = self.coll::<T>().delete_one(id.as_doc(), None).await?;
        Ok(result.deleted_count > 0)
    }
}

#[rocket::async_trait]
impl DocumentStore for MongoStore {
    async fn exists(&self, collection: Collection, id: Id) -> Result<bool, StoreError> {
        let options = CountOptions::builder().limit(1).build();
        let count = self
            .db
            .collection::<Document>(collection.name())
            .count_documents(id.as_doc(), options)
            .await?;
        Ok(count > 0)
    }

    async fn find_user(&self, id: Id) -> Result<Option<User>, StoreError> {
        Ok(self.coll::<User>().find_one(id.as_doc(), None).await?)
    }

    async fn find_user_by_login(&self, login: &str) -> Result<Option<User>, StoreError> {
        let filter = doc! {
            "$or": [
                { "UserName": login },
                { "Email": login.to_lowercase() },
            ]
        };
        Ok(self.coll::<User>().find_one(filter, None).await?)
    }

    async fn all_users(&self) -> Result<Vec<User>, StoreError> {
        self.find_many(None).await
    }

    async fn insert_user(&self, user: &NewUser) -> Result<Id, StoreError> {
        match self.insert(user).await {
            Err(StoreError::Db(e)) if is_duplicate_key_error(&e) => {
                Err(StoreError::Duplicate(DUPLICATE_USER.to_string()))
            }
            result => result,
        }
    }

    async fn replace_user(&self, user: &User) -> Result<bool, StoreError> {
        match self.coll::<User>().replace_one(user.id.as_doc(), user, None).await {
            Ok(result) => Ok(result.matched_count > 0),
            Err(e) if is_duplicate_key_error(&e) => {
                Err(StoreError::Duplicate(DUPLICATE_USER.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_user(&self, id: Id) -> Result<bool, StoreError> {
        self.delete::<User>(id).await
    }

    async fn find_group(&self, id: Id) -> Result<Option<Group>, StoreError> {
        Ok(self.coll::<Group>().find_one(id.as_doc(), None).await?)
    }

    async fn groups_for_user(&self, user: Id) -> Result<Vec<Group>, StoreError> {
        let filter = doc! {
            "$or": [
                { "Admins": *user },
                { "Users": *user },
            ]
        };
        self.find_many(Some(filter)).await
    }

    async fn insert_group(&self, group: &NewGroup) -> Result<Id, StoreError> {
        self.insert(group).await
    }

    async fn replace_group(&self, group: &Group) -> Result<bool, StoreError> {
        let result = self
            .coll::<Group>()
            .replace_one(group.id.as_doc(), group, None)
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete_group(&self, id: Id) -> Result<bool, StoreError> {
        self.delete::<Group>(id).await
    }

    async fn find_poll(&self, id: Id) -> Result<Option<Poll>, StoreError> {
        Ok(self.coll::<Poll>().find_one(id.as_doc(), None).await?)
    }

    async fn polls_for_group(&self, group: Id) -> Result<Vec<Poll>, StoreError> {
        self.find_many(Some(doc! { "Group": *group })).await
    }

    async fn polls_for_creator(&self, creator: Id) -> Result<Vec<Poll>, StoreError> {
        self.find_many(Some(doc! { "Creator": *creator })).await
    }

    async fn insert_poll(&self, poll: &NewPoll) -> Result<Id, StoreError> {
        self.insert(poll).await
    }

    async fn replace_poll(&self, poll: &Poll) -> Result<bool, StoreError> {
        let result = self
            .coll::<Poll>()
            .replace_one(poll.id.as_doc(), poll, None)
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete_poll(&self, id: Id) -> Result<bool, StoreError> {
        self.delete::<Poll>(id).await
    }
}
