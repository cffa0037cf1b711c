//! Who owns or belongs to what.
//!
//! Each check reads the parent document fresh from the store. A missing
//! group or poll is reported as such rather than as a plain `false`, so the
//! caller decides how to answer it.

use crate::lookup::{get_group_internal, get_poll_internal, LookupError};
use crate::model::mongodb::Id;
use crate::store::DocumentStore;

/// Is `user` in the member list of `group`?
pub async fn is_group_member(
    store: &dyn DocumentStore,
    group: Id,
    user: Id,
) -> Result<bool, LookupError> {
    Ok(get_group_internal(store, group).await?.has_member(user))
}

/// Is `user` in the admin list of `group`?
pub async fn is_group_admin(
    store: &dyn DocumentStore,
    group: Id,
    user: Id,
) -> Result<bool, LookupError> {
    Ok(get_group_internal(store, group).await?.has_admin(user))
}

/// May `user` manage `poll`?
///
/// Group polls belong to the group's admins, other polls to their creator.
pub async fn is_poll_admin(
    store: &dyn DocumentStore,
    user: Id,
    poll: Id,
) -> Result<bool, LookupError> {
    let poll = get_poll_internal(store, poll).await?;
    match poll.group {
        Some(group) => is_group_admin(store, group, user).await,
        None => Ok(poll.creator == Some(user)),
    }
}
