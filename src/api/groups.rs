use rocket::{
    http::Status,
    serde::json::{Json, Value},
    Route,
};

use super::{read_edit, resolve};
use crate::error::{Error, Result};
use crate::guard::{
    is_group_admin, is_group_member, is_logged_in, is_site_admin, or, Authorizer,
};
use crate::lookup::{fail_closed_absent, get_group_internal, get_user_internal};
use crate::model::{
    api::{Envelope, GroupSpec, GroupView, MemberView, PollView, UserRef},
    db::{Group, GroupCore},
    mongodb::Id,
};
use crate::store::Collection;

pub fn routes() -> Vec<Route> {
    routes![
        create_group,
        get_group,
        edit_group,
        join_group,
        leave_group,
        group_members,
        group_admins,
        group_polls,
        promote_admin,
        delete_group,
    ]
}

/// Store a modified group, answering 404 if it vanished in the meantime.
async fn save(auth: &Authorizer<'_>, group: &Group) -> Result<()> {
    if auth.store().replace_group(group).await? {
        Ok(())
    } else {
        Err(Error::not_found("Group"))
    }
}

/// Look up the users behind `ids`, skipping any that no longer exist.
async fn members(auth: &Authorizer<'_>, ids: &[Id]) -> Vec<MemberView> {
    let mut views = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(user) = fail_closed_absent(get_user_internal(auth.store(), *id).await) {
            views.push(MemberView::from(&user));
        }
    }
    views
}

/// The creator becomes the group's only admin.
#[post("/groups/new", data = "<spec>", format = "json")]
async fn create_group(spec: Json<GroupSpec>, auth: Authorizer<'_>) -> Result<Envelope> {
    auth.require(is_logged_in()).await?;
    let creator = auth.user()?;
    spec.validate().into_result()?;

    let spec = spec.0;
    let group = GroupCore::new(spec.name.trim().to_string(), spec.description, creator);
    let id = auth.store().insert_group(&group).await?;
    info!("User {creator} created group {id}");

    let group = get_group_internal(auth.store(), id).await?;
    Envelope::with_data(&GroupView::from(&group))
}

#[get("/groups/<id>")]
async fn get_group(id: &str, auth: Authorizer<'_>) -> Result<Envelope> {
    auth.require(is_logged_in()).await?;
    let id = resolve(&auth, Collection::Groups, id).await?;
    auth.require(or(vec![
        is_group_member(id),
        is_group_admin(id),
        is_site_admin(),
    ]))
    .await?;

    let group = get_group_internal(auth.store(), id).await?;
    Envelope::with_data(&GroupView::from(&group))
}

#[post("/groups/<id>/edit", data = "<body>", format = "json")]
async fn edit_group(id: &str, body: Json<Value>, auth: Authorizer<'_>) -> Result<Envelope> {
    auth.require(is_logged_in()).await?;
    let id = resolve(&auth, Collection::Groups, id).await?;
    auth.require(is_group_admin(id)).await?;

    let mut group = get_group_internal(auth.store(), id).await?;
    let mut edit: GroupSpec = read_edit(GroupSpec::schema(&group), &body)?;
    edit.validate().into_result()?;
    edit.name = edit.name.trim().to_string();
    edit.apply(&mut group);
    save(&auth, &group).await?;
    Envelope::with_data(&GroupView::from(&group))
}

/// Joining twice is harmless.
#[post("/groups/<id>/join")]
async fn join_group(id: &str, auth: Authorizer<'_>) -> Result<Envelope> {
    auth.require(is_logged_in()).await?;
    let user = auth.user()?;
    let id = resolve(&auth, Collection::Groups, id).await?;

    let mut group = get_group_internal(auth.store(), id).await?;
    if !group.has_member(user) {
        group.users.push(user);
        save(&auth, &group).await?;
        info!("User {user} joined group {id}");
    }
    Envelope::with_data(&GroupView::from(&group))
}

#[post("/groups/<id>/leave")]
async fn leave_group(id: &str, auth: Authorizer<'_>) -> Result<Envelope> {
    auth.require(is_logged_in()).await?;
    let user = auth.user()?;
    let id = resolve(&auth, Collection::Groups, id).await?;
    auth.require(is_group_member(id)).await?;

    let mut group = get_group_internal(auth.store(), id).await?;
    group.users.retain(|member| *member != user);
    save(&auth, &group).await?;
    info!("User {user} left group {id}");
    Ok(Envelope::success())
}

#[get("/groups/<id>/members")]
async fn group_members(id: &str, auth: Authorizer<'_>) -> Result<Envelope> {
    auth.require(is_logged_in()).await?;
    let id = resolve(&auth, Collection::Groups, id).await?;
    auth.require(or(vec![is_group_member(id), is_group_admin(id)]))
        .await?;

    let group = get_group_internal(auth.store(), id).await?;
    Envelope::with_data(&members(&auth, &group.users).await)
}

#[get("/groups/<id>/admins")]
async fn group_admins(id: &str, auth: Authorizer<'_>) -> Result<Envelope> {
    auth.require(is_logged_in()).await?;
    let id = resolve(&auth, Collection::Groups, id).await?;
    auth.require(or(vec![is_group_member(id), is_group_admin(id)]))
        .await?;

    let group = get_group_internal(auth.store(), id).await?;
    Envelope::with_data(&members(&auth, &group.admins).await)
}

#[get("/groups/<id>/polls")]
async fn group_polls(id: &str, auth: Authorizer<'_>) -> Result<Envelope> {
    auth.require(is_logged_in()).await?;
    let id = resolve(&auth, Collection::Groups, id).await?;
    auth.require(or(vec![is_group_member(id), is_group_admin(id)]))
        .await?;

    let polls = auth.store().polls_for_group(id).await?;
    let views: Vec<PollView> = polls.iter().map(PollView::from).collect();
    Envelope::with_data(&views)
}

/// Make a member of the group one of its admins.
#[post("/groups/<id>/admins", data = "<target>", format = "json")]
async fn promote_admin(id: &str, target: Json<UserRef>, auth: Authorizer<'_>) -> Result<Envelope> {
    auth.require(is_logged_in()).await?;
    let id = resolve(&auth, Collection::Groups, id).await?;
    auth.require(is_group_admin(id)).await?;
    let user = resolve(&auth, Collection::Users, &target.user_id).await?;

    let mut group = get_group_internal(auth.store(), id).await?;
    if !group.has_member(user) {
        return Err(Error::Status(
            Status::BadRequest,
            "User is not a group member.".to_string(),
        ));
    }
    if !group.has_admin(user) {
        group.admins.push(user);
        save(&auth, &group).await?;
        info!("User {user} promoted to admin of group {id}");
    }
    Envelope::with_data(&GroupView::from(&group))
}

/// Delete a group together with its polls.
#[delete("/groups/<id>")]
async fn delete_group(id: &str, auth: Authorizer<'_>) -> Result<Envelope> {
    auth.require(is_logged_in()).await?;
    let id = resolve(&auth, Collection::Groups, id).await?;
    auth.require(or(vec![is_group_admin(id), is_site_admin()]))
        .await?;

    for poll in auth.store().polls_for_group(id).await? {
        auth.store().delete_poll(poll.id).await?;
    }
    if !auth.store().delete_group(id).await? {
        return Err(Error::not_found("Group"));
    }
    info!("Deleted group {id}");
    Ok(Envelope::success())
}

#[cfg(test)]
mod tests {
    use rocket::{
        local::asynchronous::Client,
        serde::json::{json, serde_json},
    };

    use super::*;
    use crate::api::test_utils::{data, error, get, post_json, str_field};
    use crate::guard::NO_CONDITIONS_PASSED;
    use crate::model::db::{NewUser, PollCore};
    use crate::store::{DocumentStore, MemoryStore};

    fn view(value: Value) -> GroupView {
        serde_json::from_value(value).unwrap()
    }

    async fn me(client: &Client) -> Id {
        str_field(&get(client, "/api/users/me").await, "id")
            .parse()
            .unwrap()
    }

    #[backend_test(user)]
    async fn creator_becomes_admin_only(client: Client) {
        let me = me(&client).await;
        let group = view(post_json(&client, "/api/groups/new", &GroupSpec::example()).await);
        assert_eq!(group.name, GroupSpec::example().name);
        assert_eq!(group.admins, vec![me.to_string()]);
        assert!(group.users.is_empty());

        // Admins can see their group without being members.
        let fetched = view(get(&client, &format!("/api/groups/{}", group.id)).await);
        assert_eq!(fetched, group);
    }

    #[backend_test(user)]
    async fn invalid_groups_are_rejected(client: Client) {
        let body = json!({"name": "  x  ", "description": ""});
        let response = client.post("/api/groups/new").json(&body).dispatch().await;
        let envelope = crate::api::test_utils::envelope(response, Status::BadRequest).await;
        assert_eq!(envelope.data, Some(json!({"name": true})));
    }

    #[backend_test]
    async fn groups_need_login(client: Client, store: MemoryStore) {
        let group = store.insert_group(&GroupCore::example(Id::new())).await.unwrap();
        let response = client.get(format!("/api/groups/{group}")).dispatch().await;
        assert_eq!(error(response, Status::Unauthorized).await, "User is not logged in");
    }

    #[backend_test(user)]
    async fn strangers_are_refused(client: Client, store: MemoryStore) {
        let group = store.insert_group(&GroupCore::example(Id::new())).await.unwrap();

        let response = client.get(format!("/api/groups/{group}")).dispatch().await;
        assert_eq!(error(response, Status::InternalServerError).await, NO_CONDITIONS_PASSED);

        let response = client
            .post(format!("/api/groups/{group}/edit"))
            .json(&json!({"name": "Hijacked"}))
            .dispatch()
            .await;
        assert_eq!(error(response, Status::Forbidden).await, "User is not a group admin.");

        let response = client.post(format!("/api/groups/{group}/leave")).dispatch().await;
        assert_eq!(error(response, Status::Forbidden).await, "User is not a group member.");

        let response = client.delete(format!("/api/groups/{group}")).dispatch().await;
        error(response, Status::InternalServerError).await;
        assert!(store.find_group(group).await.unwrap().is_some());
    }

    #[backend_test(user)]
    async fn unknown_groups_are_not_found(client: Client) {
        for uri in [
            format!("/api/groups/{}", Id::new()),
            "/api/groups/garbage".to_string(),
        ] {
            let response = client.get(uri).dispatch().await;
            assert_eq!(error(response, Status::NotFound).await, "Group not found");
        }
    }

    #[backend_test(user)]
    async fn join_and_leave(client: Client, store: MemoryStore) {
        let me = me(&client).await;
        let group = store.insert_group(&GroupCore::example(Id::new())).await.unwrap();

        data(client.post(format!("/api/groups/{group}/join")).dispatch().await).await;
        data(client.post(format!("/api/groups/{group}/join")).dispatch().await).await;
        let stored = store.find_group(group).await.unwrap().unwrap();
        assert_eq!(stored.users, vec![me]);

        // Members can now look around.
        let fetched = view(get(&client, &format!("/api/groups/{group}")).await);
        assert_eq!(fetched.users, vec![me.to_string()]);
        let members = get(&client, &format!("/api/groups/{group}/members")).await;
        assert_eq!(str_field(&members[0], "userName"), "ada_l");
        assert!(members[0].get("email").is_none());

        data(client.post(format!("/api/groups/{group}/leave")).dispatch().await).await;
        let stored = store.find_group(group).await.unwrap().unwrap();
        assert!(stored.users.is_empty());
    }

    #[backend_test(user)]
    async fn edit_keeps_membership(client: Client, store: MemoryStore) {
        let me = me(&client).await;
        let group = store.insert_group(&GroupCore::example(me)).await.unwrap();

        let body = json!({"description": "Renamed", "admins": [], "users": [Id::new().to_string()]});
        let edited = view(post_json(&client, &format!("/api/groups/{group}/edit"), &body).await);
        assert_eq!(edited.description, "Renamed");
        assert_eq!(edited.name, GroupSpec::example().name);
        assert_eq!(edited.admins, vec![me.to_string()]);
        assert!(edited.users.is_empty());
    }

    #[backend_test(user)]
    async fn promote_members_only(client: Client, store: MemoryStore) {
        let me = me(&client).await;
        let other = store.insert_user(&NewUser::example2()).await.unwrap();
        let group = store.insert_group(&GroupCore::example(me)).await.unwrap();
        let uri = format!("/api/groups/{group}/admins");
        let target = json!({"userId": other.to_string()});

        let response = client.post(uri.clone()).json(&target).dispatch().await;
        assert_eq!(error(response, Status::BadRequest).await, "User is not a group member.");

        let mut stored = store.find_group(group).await.unwrap().unwrap();
        stored.users.push(other);
        store.replace_group(&stored).await.unwrap();

        let promoted = view(post_json(&client, &uri, &target).await);
        assert_eq!(promoted.admins, vec![me.to_string(), other.to_string()]);
        let admins = get(&client, &uri).await;
        assert_eq!(admins.as_array().unwrap().len(), 2);

        let unknown = json!({"userId": Id::new().to_string()});
        let response = client.post(uri).json(&unknown).dispatch().await;
        assert_eq!(error(response, Status::NotFound).await, "User not found");
    }

    #[backend_test(user)]
    async fn delete_takes_polls_along(client: Client, store: MemoryStore) {
        let me = me(&client).await;
        let group = store.insert_group(&GroupCore::example(me)).await.unwrap();
        let poll = store
            .insert_poll(&PollCore::example_for_group(group, me))
            .await
            .unwrap();
        let standalone = store
            .insert_poll(&PollCore::example_for_creator(me))
            .await
            .unwrap();

        let polls = get(&client, &format!("/api/groups/{group}/polls")).await;
        assert_eq!(str_field(&polls[0], "id"), poll.to_string());

        data(client.delete(format!("/api/groups/{group}")).dispatch().await).await;
        assert_eq!(store.find_group(group).await.unwrap(), None);
        assert_eq!(store.find_poll(poll).await.unwrap(), None);
        assert!(store.find_poll(standalone).await.unwrap().is_some());
    }

    #[backend_test(admin)]
    async fn site_admins_can_see_and_delete(client: Client, store: MemoryStore) {
        let group = store.insert_group(&GroupCore::example(Id::new())).await.unwrap();

        let fetched = view(get(&client, &format!("/api/groups/{group}")).await);
        assert_eq!(fetched.id, group.to_string());

        // Listings are for the group itself, not for site admins.
        let response = client.get(format!("/api/groups/{group}/members")).dispatch().await;
        error(response, Status::InternalServerError).await;

        data(client.delete(format!("/api/groups/{group}")).dispatch().await).await;
        assert_eq!(store.find_group(group).await.unwrap(), None);
    }
}
