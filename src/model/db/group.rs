use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use crate::model::mongodb::Id;

/// Core group data, as stored in the database.
///
/// Admin-ship and membership are independent: an admin need not appear in
/// `users`, and nothing keeps the two lists consistent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GroupCore {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub admins: Vec<Id>,
    #[serde(default)]
    pub users: Vec<Id>,
}

impl GroupCore {
    /// Create a group administered by `creator`, with no members.
    pub fn new(name: String, description: String, creator: Id) -> Self {
        Self {
            name,
            description,
            admins: vec![creator],
            users: Vec::new(),
        }
    }

    pub fn has_admin(&self, user: Id) -> bool {
        self.admins.contains(&user)
    }

    pub fn has_member(&self, user: Id) -> bool {
        self.users.contains(&user)
    }
}

/// A group without an ID.
pub type NewGroup = GroupCore;

/// A group from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub group: GroupCore,
}

impl Deref for Group {
    type Target = GroupCore;

    fn deref(&self) -> &Self::Target {
        &self.group
    }
}

impl DerefMut for Group {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.group
    }
}
