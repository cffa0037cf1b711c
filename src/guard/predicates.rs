use rocket::http::Status;

use super::{and, ownership, BoxPredicate, Context, Predicate, Verdict};
use crate::lookup::{
    fail_closed_absent, fail_closed_denied, get_poll_internal, get_user_internal, LookupError,
};
use crate::model::mongodb::Id;
use crate::store::DocumentStore;

pub const NOT_LOGGED_IN: &str = "User is not logged in";
pub const NOT_SITE_ADMIN: &str = "User is not a site admin.";
pub const NOT_DEVELOPMENT_MODE: &str = "App is not running in development mode.";
pub const NOT_SELF: &str = "User is not the requested user.";
pub const NOT_GROUP_ADMIN: &str = "User is not a group admin.";
pub const NOT_GROUP_MEMBER: &str = "User is not a group member.";
pub const NOT_POLL_ADMIN: &str = "User is not a poll admin.";
pub const CANNOT_VIEW_POLL: &str = "User cannot view this poll.";

/// Continue iff a user is logged in.
pub fn is_logged_in() -> BoxPredicate {
    Box::new(LoggedIn)
}

/// Continue iff the logged-in user has the site admin flag.
pub fn is_site_admin() -> BoxPredicate {
    and(vec![is_logged_in(), Box::new(SiteAdminFlag)])
}

/// Continue iff the server runs with `development_mode` set.
pub fn is_development_mode() -> BoxPredicate {
    Box::new(DevelopmentMode)
}

/// Continue iff the logged-in user is `user`.
pub fn is_user(user: Id) -> BoxPredicate {
    Box::new(IsUser(user))
}

/// Continue iff the logged-in user administers `group`.
pub fn is_group_admin(group: Id) -> BoxPredicate {
    Box::new(GroupAdmin(group))
}

/// Continue iff the logged-in user is a member of `group`.
pub fn is_group_member(group: Id) -> BoxPredicate {
    Box::new(GroupMember(group))
}

/// Continue iff the logged-in user may manage `poll`.
pub fn is_poll_admin(poll: Id) -> BoxPredicate {
    Box::new(PollAdmin(poll))
}

/// Continue iff the logged-in user may see `poll`: its admins always, anyone
/// else only while it is open and, for a group poll, only if they belong to
/// the group.
pub fn is_poll_viewer(poll: Id) -> BoxPredicate {
    Box::new(PollViewer(poll))
}

fn not_logged_in() -> Verdict {
    Verdict::respond(Status::Unauthorized, NOT_LOGGED_IN)
}

/// Turn an ownership answer into a verdict.
///
/// A missing group or poll is 404. Anything else that went wrong is logged
/// and counts as a refusal.
fn ownership_verdict(result: Result<bool, LookupError>, refusal: &str) -> Verdict {
    match result {
        Err(LookupError::GroupNotFound(_)) => Verdict::respond(Status::NotFound, "Group not found"),
        Err(LookupError::PollNotFound(_)) => Verdict::respond(Status::NotFound, "Poll not found"),
        result => {
            if fail_closed_denied(result) {
                Verdict::Continue
            } else {
                Verdict::respond(Status::Forbidden, refusal)
            }
        }
    }
}

struct LoggedIn;

#[rocket::async_trait]
impl Predicate for LoggedIn {
    async fn check(&self, ctx: &Context<'_>) -> Verdict {
        match ctx.user {
            Some(_) => Verdict::Continue,
            None => not_logged_in(),
        }
    }
}

struct SiteAdminFlag;

#[rocket::async_trait]
impl Predicate for SiteAdminFlag {
    async fn check(&self, ctx: &Context<'_>) -> Verdict {
        let user = match ctx.user {
            Some(id) => fail_closed_absent(get_user_internal(ctx.store, id).await),
            None => None,
        };
        match user {
            Some(user) if user.site_admin => Verdict::Continue,
            _ => Verdict::respond(Status::InternalServerError, NOT_SITE_ADMIN),
        }
    }
}

struct DevelopmentMode;

#[rocket::async_trait]
impl Predicate for DevelopmentMode {
    async fn check(&self, ctx: &Context<'_>) -> Verdict {
        if ctx.config.development_mode() {
            Verdict::Continue
        } else {
            Verdict::respond(Status::InternalServerError, NOT_DEVELOPMENT_MODE)
        }
    }
}

struct IsUser(Id);

#[rocket::async_trait]
impl Predicate for IsUser {
    async fn check(&self, ctx: &Context<'_>) -> Verdict {
        match ctx.user {
            Some(user) if user == self.0 => Verdict::Continue,
            Some(_) => Verdict::respond(Status::Forbidden, NOT_SELF),
            None => not_logged_in(),
        }
    }
}

struct GroupAdmin(Id);

#[rocket::async_trait]
impl Predicate for GroupAdmin {
    async fn check(&self, ctx: &Context<'_>) -> Verdict {
        let Some(user) = ctx.user else {
            return not_logged_in();
        };
        let result = ownership::is_group_admin(ctx.store, self.0, user).await;
        ownership_verdict(result, NOT_GROUP_ADMIN)
    }
}

struct GroupMember(Id);

#[rocket::async_trait]
impl Predicate for GroupMember {
    async fn check(&self, ctx: &Context<'_>) -> Verdict {
        let Some(user) = ctx.user else {
            return not_logged_in();
        };
        let result = ownership::is_group_member(ctx.store, self.0, user).await;
        ownership_verdict(result, NOT_GROUP_MEMBER)
    }
}

struct PollAdmin(Id);

#[rocket::async_trait]
impl Predicate for PollAdmin {
    async fn check(&self, ctx: &Context<'_>) -> Verdict {
        let Some(user) = ctx.user else {
            return not_logged_in();
        };
        let result = ownership::is_poll_admin(ctx.store, user, self.0).await;
        ownership_verdict(result, NOT_POLL_ADMIN)
    }
}

struct PollViewer(Id);

#[rocket::async_trait]
impl Predicate for PollViewer {
    async fn check(&self, ctx: &Context<'_>) -> Verdict {
        let Some(user) = ctx.user else {
            return not_logged_in();
        };
        let result = may_view_poll(ctx.store, user, self.0).await;
        ownership_verdict(result, CANNOT_VIEW_POLL)
    }
}

async fn may_view_poll(store: &dyn DocumentStore, user: Id, poll: Id) -> Result<bool, LookupError> {
    if ownership::is_poll_admin(store, user, poll).await? {
        return Ok(true);
    }
    let poll = get_poll_internal(store, poll).await?;
    if !poll.open {
        return Ok(false);
    }
    match poll.group {
        Some(group) => Ok(ownership::is_group_member(store, group, user).await?
            || ownership::is_group_admin(store, group, user).await?),
        None => Ok(true),
    }
}
