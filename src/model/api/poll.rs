use rocket::serde::json::{serde_json::Map, Value};
use serde::{Deserialize, Serialize};

use super::validation::{length_between, FieldErrors};
use crate::model::{
    db::{Poll, Question},
    mongodb::Id,
};

pub const MAX_CHOICES: usize = 64;

/// A request to create a poll, optionally inside a group.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPollRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub open: bool,
}

impl NewPollRequest {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors
            .check("title", length_between(self.title.trim(), 1, 256))
            .check("description", length_between(&self.description, 0, 1000));
        errors
    }
}

/// The fields of a poll its admins may change.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollEdit {
    pub title: String,
    pub description: String,
    pub open: bool,
}

impl PollEdit {
    /// The current values, used as the projection schema for edits.
    pub fn schema(poll: &Poll) -> Map<String, Value> {
        let mut schema = Map::new();
        schema.insert("title".to_string(), Value::String(poll.title.clone()));
        schema.insert(
            "description".to_string(),
            Value::String(poll.description.clone()),
        );
        schema.insert("open".to_string(), Value::Bool(poll.open));
        schema
    }

    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors
            .check("title", length_between(self.title.trim(), 1, 256))
            .check("description", length_between(&self.description, 0, 1000));
        errors
    }

    pub fn apply(self, poll: &mut Poll) {
        poll.title = self.title;
        poll.description = self.description;
        poll.open = self.open;
    }
}

/// A question to append to a poll.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSpec {
    pub text: String,
    pub choices: Vec<String>,
    #[serde(default = "one")]
    pub max_allowed_choices: u32,
}

fn one() -> u32 {
    1
}

impl QuestionSpec {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors
            .check("text", length_between(self.text.trim(), 1, 1000))
            .check(
                "choices",
                (1..=MAX_CHOICES).contains(&self.choices.len())
                    && self
                        .choices
                        .iter()
                        .all(|choice| length_between(choice.trim(), 1, 256)),
            )
            .check(
                "maxAllowedChoices",
                self.max_allowed_choices >= 1
                    && self.max_allowed_choices as usize <= self.choices.len().max(1),
            );
        errors
    }
}

impl From<QuestionSpec> for Question {
    fn from(spec: QuestionSpec) -> Self {
        Self {
            id: Id::new(),
            text: spec.text,
            choices: spec.choices,
            max_allowed_choices: spec.max_allowed_choices,
        }
    }
}

/// A question as shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub id: String,
    pub text: String,
    pub choices: Vec<String>,
    pub max_allowed_choices: u32,
}

impl From<&Question> for QuestionView {
    fn from(question: &Question) -> Self {
        Self {
            id: question.id.to_string(),
            text: question.text.clone(),
            choices: question.choices.clone(),
            max_allowed_choices: question.max_allowed_choices,
        }
    }
}

/// A poll as shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub group: Option<String>,
    pub creator: Option<String>,
    pub open: bool,
    pub questions: Vec<QuestionView>,
}

impl From<&Poll> for PollView {
    fn from(poll: &Poll) -> Self {
        Self {
            id: poll.id.to_string(),
            title: poll.title.clone(),
            description: poll.description.clone(),
            group: poll.group.map(|id| id.to_string()),
            creator: poll.creator.map(|id| id.to_string()),
            open: poll.open,
            questions: poll.questions.iter().map(QuestionView::from).collect(),
        }
    }
}
