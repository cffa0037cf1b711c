use rocket::serde::json::{serde_json::Map, Value};
use serde::{Deserialize, Serialize};

use super::validation::{length_between, FieldErrors};
use crate::model::db::Group;

/// The editable description of a group, used both to create and to edit one.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl GroupSpec {
    /// The current values, used as the projection schema for edits.
    pub fn schema(group: &Group) -> Map<String, Value> {
        let mut schema = Map::new();
        schema.insert("name".to_string(), Value::String(group.name.clone()));
        schema.insert(
            "description".to_string(),
            Value::String(group.description.clone()),
        );
        schema
    }

    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors
            .check("name", length_between(self.name.trim(), 3, 256))
            .check("description", length_between(&self.description, 0, 1000));
        errors
    }

    pub fn apply(self, group: &mut Group) {
        group.name = self.name;
        group.description = self.description;
    }
}

/// A request naming another user.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub user_id: String,
}

/// A group as shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub admins: Vec<String>,
    pub users: Vec<String>,
}

impl From<&Group> for GroupView {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id.to_string(),
            name: group.name.clone(),
            description: group.description.clone(),
            admins: group.admins.iter().map(ToString::to_string).collect(),
            users: group.users.iter().map(ToString::to_string).collect(),
        }
    }
}

#[cfg(test)]
mod examples {
    use super::*;

    impl GroupSpec {
        pub fn example() -> Self {
            Self {
                name: "CSCI 4440".into(),
                description: "Software Design and Documentation".into(),
            }
        }
    }
}
