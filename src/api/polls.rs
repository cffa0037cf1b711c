use rocket::{
    serde::json::{Json, Value},
    Route,
};

use super::{read_edit, resolve};
use crate::error::{Error, Result};
use crate::guard::{is_group_admin, is_logged_in, is_poll_admin, is_poll_viewer, Authorizer};
use crate::lookup::{get_poll_internal, get_question_internal, parse_id};
use crate::model::{
    api::{Envelope, NewPollRequest, PollEdit, PollView, QuestionSpec, QuestionView},
    db::{NewPoll, Poll, Question},
};
use crate::store::Collection;

pub fn routes() -> Vec<Route> {
    routes![
        create_poll,
        get_poll,
        edit_poll,
        delete_poll,
        add_question,
        get_question,
        delete_question,
    ]
}

async fn save(auth: &Authorizer<'_>, poll: &Poll) -> Result<()> {
    if auth.store().replace_poll(poll).await? {
        Ok(())
    } else {
        Err(Error::not_found("Poll"))
    }
}

/// Create a poll. A poll inside a group may only be created by the group's
/// admins, who then manage it together.
#[post("/polls/new", data = "<request>", format = "json")]
async fn create_poll(request: Json<NewPollRequest>, auth: Authorizer<'_>) -> Result<Envelope> {
    auth.require(is_logged_in()).await?;
    let creator = auth.user()?;
    request.validate().into_result()?;

    let group = match &request.group {
        Some(raw) => {
            let group = resolve(&auth, Collection::Groups, raw).await?;
            auth.require(is_group_admin(group)).await?;
            Some(group)
        }
        None => None,
    };
    let request = request.0;
    let poll = NewPoll {
        title: request.title.trim().to_string(),
        description: request.description,
        group,
        creator: Some(creator),
        questions: Vec::new(),
        open: request.open,
    };
    let id = auth.store().insert_poll(&poll).await?;
    info!("User {creator} created poll {id}");

    let poll = get_poll_internal(auth.store(), id).await?;
    Envelope::with_data(&PollView::from(&poll))
}

#[get("/polls/<id>")]
async fn get_poll(id: &str, auth: Authorizer<'_>) -> Result<Envelope> {
    auth.require(is_logged_in()).await?;
    let id = resolve(&auth, Collection::Polls, id).await?;
    auth.require(is_poll_viewer(id)).await?;

    let poll = get_poll_internal(auth.store(), id).await?;
    Envelope::with_data(&PollView::from(&poll))
}

#[post("/polls/<id>/edit", data = "<body>", format = "json")]
async fn edit_poll(id: &str, body: Json<Value>, auth: Authorizer<'_>) -> Result<Envelope> {
    auth.require(is_logged_in()).await?;
    let id = resolve(&auth, Collection::Polls, id).await?;
    auth.require(is_poll_admin(id)).await?;

    let mut poll = get_poll_internal(auth.store(), id).await?;
    let mut edit: PollEdit = read_edit(PollEdit::schema(&poll), &body)?;
    edit.validate().into_result()?;
    edit.title = edit.title.trim().to_string();
    edit.apply(&mut poll);
    save(&auth, &poll).await?;
    Envelope::with_data(&PollView::from(&poll))
}

#[delete("/polls/<id>")]
async fn delete_poll(id: &str, auth: Authorizer<'_>) -> Result<Envelope> {
    auth.require(is_logged_in()).await?;
    let id = resolve(&auth, Collection::Polls, id).await?;
    auth.require(is_poll_admin(id)).await?;

    if !auth.store().delete_poll(id).await? {
        return Err(Error::not_found("Poll"));
    }
    info!("Deleted poll {id}");
    Ok(Envelope::success())
}

/// Append a question to a poll.
#[post("/polls/<id>/questions", data = "<spec>", format = "json")]
async fn add_question(id: &str, spec: Json<QuestionSpec>, auth: Authorizer<'_>) -> Result<Envelope> {
    auth.require(is_logged_in()).await?;
    let id = resolve(&auth, Collection::Polls, id).await?;
    auth.require(is_poll_admin(id)).await?;
    spec.validate().into_result()?;

    let mut poll = get_poll_internal(auth.store(), id).await?;
    let question = Question::from(spec.0);
    let view = QuestionView::from(&question);
    poll.questions.push(question);
    save(&auth, &poll).await?;
    Envelope::with_data(&view)
}

#[get("/polls/<id>/questions/<question>")]
async fn get_question(id: &str, question: &str, auth: Authorizer<'_>) -> Result<Envelope> {
    auth.require(is_logged_in()).await?;
    let id = resolve(&auth, Collection::Polls, id).await?;
    auth.require(is_poll_viewer(id)).await?;

    let question_id = parse_id(question).map_err(|_| Error::not_found("Question"))?;
    let question = get_question_internal(auth.store(), id, question_id).await?;
    Envelope::with_data(&QuestionView::from(&question))
}

#[delete("/polls/<id>/questions/<question>")]
async fn delete_question(id: &str, question: &str, auth: Authorizer<'_>) -> Result<Envelope> {
    auth.require(is_logged_in()).await?;
    let id = resolve(&auth, Collection::Polls, id).await?;
    auth.require(is_poll_admin(id)).await?;

    let question_id = parse_id(question).map_err(|_| Error::not_found("Question"))?;
    let mut poll = get_poll_internal(auth.store(), id).await?;
    let before = poll.questions.len();
    poll.questions.retain(|question| question.id != question_id);
    if poll.questions.len() == before {
        return Err(Error::not_found("Question"));
    }
    save(&auth, &poll).await?;
    Ok(Envelope::success())
}
