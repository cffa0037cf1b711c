use rocket::{
    outcome::try_outcome,
    request::{FromRequest, Outcome},
    Request, State,
};

use super::token::{AuthToken, AUTH_TOKEN_COOKIE};
use crate::config::Config;
use crate::model::mongodb::Id;

/// The session of the current request: the logged-in user, if any.
///
/// Never fails; a missing, expired or forged cookie is simply no session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Session(Option<Id>);

impl Session {
    pub fn new(user: Option<Id>) -> Self {
        Self(user)
    }

    pub fn user(&self) -> Option<Id> {
        self.0
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Session {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let config = try_outcome!(req.guard::<&State<Config>>().await);
        let user = req
            .cookies()
            .get(AUTH_TOKEN_COOKIE)
            .and_then(|cookie| match AuthToken::from_cookie(cookie, config) {
                Ok(token) => Some(token.id),
                Err(e) => {
                    debug!("Ignoring session cookie: {e}");
                    None
                }
            });
        Outcome::Success(Session(user))
    }
}
