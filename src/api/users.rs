use std::collections::HashSet;

use rocket::{
    http::{Cookie, CookieJar, Status},
    serde::json::{Json, Value},
    Route,
};

use super::{read_edit, resolve};
use crate::error::{Error, Result};
use crate::guard::{is_logged_in, is_site_admin, is_user, or, Authorizer};
use crate::lookup::get_user_internal;
use crate::model::{
    api::{Envelope, GroupView, LoginRequest, PollView, RegisterRequest, UserEdit, UserView},
    auth::{logged_in_cookie, AuthToken, AUTH_TOKEN_COOKIE},
    db::NewUser,
    mongodb::Id,
};
use crate::store::Collection;

pub fn routes() -> Vec<Route> {
    routes![
        register,
        login,
        logout,
        current_user,
        edit_current_user,
        current_user_groups,
        current_user_polls,
        get_user,
        get_users,
        delete_user,
    ]
}

/// Give the client a fresh session for `user`.
fn start_session(user: Id, auth: &Authorizer<'_>, cookies: &CookieJar<'_>) {
    cookies.add(AuthToken::new(user).into_cookie(auth.config()));
    cookies.add(logged_in_cookie(true, auth.config()));
}

#[post("/users/register", data = "<request>", format = "json")]
async fn register(
    request: Json<RegisterRequest>,
    auth: Authorizer<'_>,
    cookies: &CookieJar<'_>,
) -> Result<Envelope> {
    request.validate().into_result()?;
    let new_user: NewUser = request.0.try_into()?;
    let id = auth.store().insert_user(&new_user).await?;
    info!("Registered user {} ({id})", new_user.user_name);

    let user = get_user_internal(auth.store(), id).await?;
    start_session(id, &auth, cookies);
    Envelope::with_data(&UserView::from(&user))
}

#[post("/users/login", data = "<credentials>", format = "json")]
async fn login(
    credentials: Json<LoginRequest>,
    auth: Authorizer<'_>,
    cookies: &CookieJar<'_>,
) -> Result<Envelope> {
    let user = auth
        .store()
        .find_user_by_login(credentials.user_name_email.trim())
        .await?
        .filter(|user| user.verify_password(&credentials.password))
        .ok_or_else(|| {
            Error::Status(Status::Unauthorized, "Invalid login credentials".to_string())
        })?;

    start_session(user.id, &auth, cookies);
    Envelope::with_data(&UserView::from(&user))
}

#[get("/users/logout")]
async fn logout(auth: Authorizer<'_>, cookies: &CookieJar<'_>) -> Envelope {
    cookies.remove(Cookie::named(AUTH_TOKEN_COOKIE));
    cookies.add(logged_in_cookie(false, auth.config()));
    Envelope::success()
}

#[get("/users/me")]
async fn current_user(auth: Authorizer<'_>) -> Result<Envelope> {
    auth.require(is_logged_in()).await?;
    let user = get_user_internal(auth.store(), auth.user()?).await?;
    Envelope::with_data(&UserView::from(&user))
}

#[post("/users/me/edit", data = "<body>", format = "json")]
async fn edit_current_user(body: Json<Value>, auth: Authorizer<'_>) -> Result<Envelope> {
    auth.require(is_logged_in()).await?;
    let mut user = get_user_internal(auth.store(), auth.user()?).await?;

    let edit: UserEdit = read_edit(UserEdit::schema(&user), &body)?;
    edit.validate().into_result()?;
    edit.apply(&mut user);
    if !auth.store().replace_user(&user).await? {
        return Err(Error::not_found("User"));
    }
    Envelope::with_data(&UserView::from(&user))
}

#[get("/users/me/groups")]
async fn current_user_groups(auth: Authorizer<'_>) -> Result<Envelope> {
    auth.require(is_logged_in()).await?;
    let groups = auth.store().groups_for_user(auth.user()?).await?;
    let views: Vec<GroupView> = groups.iter().map(GroupView::from).collect();
    Envelope::with_data(&views)
}

/// Every poll the user manages: their own polls and those of groups they administer.
#[get("/users/me/polls")]
async fn current_user_polls(auth: Authorizer<'_>) -> Result<Envelope> {
    auth.require(is_logged_in()).await?;
    let user = auth.user()?;

    let mut polls = auth.store().polls_for_creator(user).await?;
    for group in auth.store().groups_for_user(user).await? {
        if group.has_admin(user) {
            polls.extend(auth.store().polls_for_group(group.id).await?);
        }
    }
    let mut seen = HashSet::new();
    polls.retain(|poll| seen.insert(poll.id));

    let views: Vec<PollView> = polls.iter().map(PollView::from).collect();
    Envelope::with_data(&views)
}

#[get("/users/<id>")]
async fn get_user(id: &str, auth: Authorizer<'_>) -> Result<Envelope> {
    auth.require(is_logged_in()).await?;
    let id = resolve(&auth, Collection::Users, id).await?;
    auth.require(or(vec![is_site_admin(), is_user(id)])).await?;

    let user = get_user_internal(auth.store(), id).await?;
    Envelope::with_data(&UserView::from(&user))
}

#[get("/users")]
async fn get_users(auth: Authorizer<'_>) -> Result<Envelope> {
    auth.require(is_site_admin()).await?;
    let users = auth.store().all_users().await?;
    let views: Vec<UserView> = users.iter().map(UserView::from).collect();
    Envelope::with_data(&views)
}

/// Delete a user and strike them from every group they were part of.
#[delete("/users/<id>")]
async fn delete_user(id: &str, auth: Authorizer<'_>) -> Result<Envelope> {
    auth.require(is_site_admin()).await?;
    let id = resolve(&auth, Collection::Users, id).await?;

    for mut group in auth.store().groups_for_user(id).await? {
        group.admins.retain(|admin| *admin != id);
        group.users.retain(|member| *member != id);
        auth.store().replace_group(&group).await?;
    }
    if !auth.store().delete_user(id).await? {
        return Err(Error::not_found("User"));
    }
    info!("Deleted user {id}");
    Ok(Envelope::success())
}
