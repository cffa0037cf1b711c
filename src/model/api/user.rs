use argon2::Config as Argon2Config;
use rand::Rng;
use rocket::serde::json::{serde_json::Map, Value};
use serde::{Deserialize, Serialize};

use super::validation::{length_between, looks_like_email, FieldErrors};
use crate::error::Error;
use crate::model::db::{NewUser, User};

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 256;

/// A registration form. The password is in plaintext and never stored.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub user_name: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors
            .check("userName", valid_user_name(&self.user_name))
            .check("email", looks_like_email(&self.email))
            .check("firstName", length_between(&self.first_name, 1, 256))
            .check("lastName", length_between(&self.last_name, 1, 256))
            .check(
                "password",
                length_between(&self.password, MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH),
            );
        errors
    }
}

/// User names are 3 to 32 characters of letters, digits, `_`, `-` and `.`.
fn valid_user_name(name: &str) -> bool {
    length_between(name, 3, 32)
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

impl TryFrom<RegisterRequest> for NewUser {
    type Error = Error;

    /// Convert a [`RegisterRequest`] into a [`NewUser`] by hashing the password.
    fn try_from(request: RegisterRequest) -> Result<Self, Self::Error> {
        // 16 bytes is recommended for password hashing:
        //  https://en.wikipedia.org/wiki/Argon2
        let mut salt = [0_u8; 16];
        rand::thread_rng().fill(&mut salt);
        let password_hash = argon2::hash_encoded(
            request.password.as_bytes(),
            &salt,
            &Argon2Config::default(),
        )?;
        Ok(Self {
            user_name: request.user_name,
            email: request.email.to_lowercase(),
            first_name: request.first_name,
            last_name: request.last_name,
            password_hash,
            site_admin: false,
        })
    }
}

/// Login credentials: either the user name or the email, plus the password.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_name_email: String,
    pub password: String,
}

/// The fields a user may change about themselves.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEdit {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl UserEdit {
    /// The current values, used as the projection schema for edits.
    pub fn schema(user: &User) -> Map<String, Value> {
        let mut schema = Map::new();
        schema.insert("email".to_string(), Value::String(user.email.clone()));
        schema.insert("firstName".to_string(), Value::String(user.first_name.clone()));
        schema.insert("lastName".to_string(), Value::String(user.last_name.clone()));
        schema
    }

    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors
            .check("email", looks_like_email(&self.email))
            .check("firstName", length_between(&self.first_name, 1, 256))
            .check("lastName", length_between(&self.last_name, 1, 256));
        errors
    }

    pub fn apply(self, user: &mut User) {
        user.email = self.email.to_lowercase();
        user.first_name = self.first_name;
        user.last_name = self.last_name;
    }
}

/// A user as shown to clients, without credentials.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub user_name: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub site_admin: bool,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            user_name: user.user_name.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            site_admin: user.site_admin,
        }
    }
}

/// Another user as shown to the members of a shared group.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    pub id: String,
    pub user_name: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&User> for MemberView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            user_name: user.user_name.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}
