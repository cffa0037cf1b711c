use chrono::{serde::ts_seconds, DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation};
use rocket::{
    http::{Cookie, SameSite},
    time::Duration,
};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::Error;
use crate::model::mongodb::Id;

pub const AUTH_TOKEN_COOKIE: &str = "auth_token";

/// Readable by page scripts, mirroring the client-side "loggedIn" flag.
pub const LOGGED_IN_COOKIE: &str = "loggedIn";

/// An authentication token naming the logged-in user.
///
/// Carries no privileges: site-admin status and ownership are
/// looked up fresh on every check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    pub id: Id,
}

impl AuthToken {
    pub fn new(id: Id) -> Self {
        Self { id }
    }

    /// Serialize this token into a cookie.
    pub fn into_cookie(self, config: &Config) -> Cookie<'static> {
        let token = self.sign(Utc::now() + config.auth_ttl(), config);
        Cookie::build(AUTH_TOKEN_COOKIE, token)
            .max_age(Duration::seconds(config.auth_ttl().num_seconds()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .finish()
    }

    #[allow(clippy::missing_panics_doc)]
    /// Sign this token as a JWT valid until `expire_at`.
    fn sign(self, expire_at: DateTime<Utc>, config: &Config) -> String {
        let claims = Claims {
            token: self,
            expire_at,
        };
        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret()),
        )
        .expect("JWT encoding is infallible with default settings")
    }

    /// Deserialize a token from a cookie.
    pub fn from_cookie(cookie: &Cookie<'static>, config: &Config) -> Result<Self, Error> {
        let token = jsonwebtoken::decode(
            cookie.value(),
            &DecodingKey::from_secret(config.jwt_secret()),
            &Validation::default(),
        )
        .map(|claims: TokenData<Claims>| claims.claims.token)?;
        Ok(token)
    }
}

/// Cookie claims: the token itself plus an expiry datetime.
#[derive(Serialize, Deserialize)]
struct Claims {
    #[serde(flatten)]
    token: AuthToken,
    #[serde(rename = "exp", with = "ts_seconds")]
    expire_at: DateTime<Utc>,
}

/// The client-visible login flag cookie.
pub fn logged_in_cookie(logged_in: bool, config: &Config) -> Cookie<'static> {
    Cookie::build(LOGGED_IN_COOKIE, logged_in.to_string())
        .max_age(Duration::seconds(config.auth_ttl().num_seconds()))
        .path("/")
        .same_site(SameSite::Strict)
        .finish()
}

#[cfg(test)]
impl AuthToken {
    /// A correctly signed cookie whose token expired an hour ago.
    pub fn expired_cookie(self, config: &Config) -> Cookie<'static> {
        let token = self.sign(Utc::now() - chrono::Duration::hours(1), config);
        Cookie::new(AUTH_TOKEN_COOKIE, token)
    }
}
