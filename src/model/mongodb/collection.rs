use std::ops::Deref;

use mongodb::{
    bson::doc, error::Error as DbError, options::IndexOptions, Collection as MongoHandle,
    Database, IndexModel,
};

use crate::model::db::{Group, NewGroup, NewPoll, NewUser, Poll, User};
use crate::store::Collection;

/// A type that can be directly inserted/read to/from the database.
pub trait MongoCollection {
    /// The collection holding documents of this type.
    const COLLECTION: Collection;
}

/// A database collection of the given type.
pub struct Coll<T>(MongoHandle<T>);

impl<T> Coll<T>
where
    T: MongoCollection,
{
    /// Get a handle on this collection in the given database.
    pub fn from_db(db: &Database) -> Self {
        Self(db.collection(T::COLLECTION.name()))
    }
}

// `Derive(Clone)` would only derive if `T: Clone`, but we don't need that bound.
impl<T> Clone for Coll<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Deref for Coll<T> {
    type Target = MongoHandle<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

// User collections
impl MongoCollection for User {
    const COLLECTION: Collection = Collection::Users;
}
impl MongoCollection for NewUser {
    const COLLECTION: Collection = Collection::Users;
}

// Group collections
impl MongoCollection for Group {
    const COLLECTION: Collection = Collection::Groups;
}
impl MongoCollection for NewGroup {
    const COLLECTION: Collection = Collection::Groups;
}

// Poll collections
impl MongoCollection for Poll {
    const COLLECTION: Collection = Collection::Polls;
}
impl MongoCollection for NewPoll {
    const COLLECTION: Collection = Collection::Polls;
}

/// Ensure that all the required indexes exist on the given database.
///
/// This operation is idempotent.
pub async fn ensure_indexes_exist(db: &Database) -> Result<(), DbError> {
    debug!("Ensuring collection indexes exist");

    let unique = IndexOptions::builder().unique(true).build();

    // User collection: both login names must be unique.
    let user_name_index = IndexModel::builder()
        .keys(doc! {"UserName": 1})
        .options(unique.clone())
        .build();
    let email_index = IndexModel::builder()
        .keys(doc! {"Email": 1})
        .options(unique.clone())
        .build();
    Coll::<User>::from_db(db)
        .create_indexes([user_name_index, email_index], None)
        .await?;

    // Poll collection, queried by owner.
    let poll_group_index = IndexModel::builder().keys(doc! {"Group": 1}).build();
    let poll_creator_index = IndexModel::builder().keys(doc! {"Creator": 1}).build();
    Coll::<Poll>::from_db(db)
        .create_indexes([poll_group_index, poll_creator_index], None)
        .await?;

    Ok(())
}
