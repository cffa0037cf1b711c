use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use crate::model::mongodb::Id;

/// A single question of a poll. IDs are unique within the owning poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Question {
    #[serde(rename = "_id")]
    pub id: Id,
    pub text: String,
    #[serde(default)]
    pub choices: Vec<String>,
    #[serde(default = "one")]
    pub max_allowed_choices: u32,
}

fn one() -> u32 {
    1
}

/// Core poll data, as stored in the database.
///
/// A poll is owned either by its `group` (whose admins manage it) or, when
/// there is no group, by its `creator`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PollCore {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<Id>,
    /// Insertion order is display order.
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub open: bool,
}

impl PollCore {
    /// Find a question by ID.
    pub fn question(&self, id: Id) -> Option<&Question> {
        self.questions.iter().find(|question| question.id == id)
    }
}

/// A poll without an ID.
pub type NewPoll = PollCore;

/// A poll from the database, with its unique ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poll {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub poll: PollCore,
}

impl Deref for Poll {
    type Target = PollCore;

    fn deref(&self) -> &Self::Target {
        &self.poll
    }
}

impl DerefMut for Poll {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.poll
    }
}
