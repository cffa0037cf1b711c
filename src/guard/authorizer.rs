use rocket::{
    http::Status,
    outcome::try_outcome,
    request::{FromRequest, Outcome},
    Request, State,
};

use super::{predicates::NOT_LOGGED_IN, BoxPredicate, Context, Verdict};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{auth::Session, mongodb::Id};
use crate::store::{DocumentStore, Store};

/// Request guard giving handlers the session, the store and the config, and
/// evaluating predicates against them.
///
/// A handler calls [`Authorizer::require`] before doing anything else; a
/// refusal becomes [`Error::Rejected`], so the refusing predicate's reply is
/// what the client sees and the rest of the handler never runs.
pub struct Authorizer<'r> {
    session: Session,
    store: &'r Store,
    config: &'r Config,
}

impl<'r> Authorizer<'r> {
    pub fn context(&self) -> Context<'r> {
        Context {
            user: self.session.user(),
            store: self.store.as_ref(),
            config: self.config,
        }
    }

    /// Evaluate `predicate` for this request.
    pub async fn require(&self, predicate: BoxPredicate) -> Result<()> {
        match predicate.check(&self.context()).await {
            Verdict::Continue => Ok(()),
            Verdict::Respond(reply) => {
                debug!("Request refused: {:?}", reply.body.error);
                Err(Error::Rejected(reply))
            }
        }
    }

    /// The logged-in user.
    pub fn user(&self) -> Result<Id> {
        self.session
            .user()
            .ok_or_else(|| Error::Status(Status::Unauthorized, NOT_LOGGED_IN.to_string()))
    }

    pub fn store(&self) -> &'r dyn DocumentStore {
        self.store.as_ref()
    }

    pub fn config(&self) -> &'r Config {
        self.config
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Authorizer<'r> {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let session = try_outcome!(req.guard::<Session>().await);
        let store = try_outcome!(req.guard::<&State<Store>>().await);
        let config = try_outcome!(req.guard::<&State<Config>>().await);
        Outcome::Success(Self {
            session,
            store: store.inner(),
            config: config.inner(),
        })
    }
}
