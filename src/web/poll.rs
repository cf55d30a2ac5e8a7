use super::thread::{comment_views, CommentView};
use super::{read_form, RawForm};
use crate::comments;
use crate::db::get_db_pool;
use crate::error::StoreError;
use crate::form::FormErrors;
use crate::middleware::ClientCtx;
use crate::orm::{poll_options, polls as poll_entity, threads};
use crate::polls::{self, PollForm, PollResults};
use crate::template::{confirm_delete, redirect, render_invalid, success};
use crate::threads as thread_store;
use actix_session::Session;
use actix_web::{error, get, post, web, Error, HttpResponse, Responder};
use askama_actix::{Template, TemplateToResponse};
use serde::Deserialize;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(create_poll_form)
        .service(create_poll)
        .service(update_poll_form)
        .service(update_poll)
        .service(delete_poll_confirm)
        .service(delete_poll)
        .service(view_poll_results)
        .service(vote_poll_form)
        .service(vote_poll);
}

#[derive(Template)]
#[template(path = "poll_form.html")]
pub struct PollFormTemplate {
    pub client: ClientCtx,
    pub heading: &'static str,
    pub action: String,
    /// Thread choices. Empty when editing, the thread is fixed then.
    pub threads: Vec<threads::Model>,
    pub form: PollForm,
    pub errors: FormErrors,
}

impl PollFormTemplate {
    pub fn is_thread_selected(&self, id: &i32) -> bool {
        self.form.thread_id() == Some(*id)
    }
}

#[derive(Template)]
#[template(path = "poll_results.html")]
pub struct PollResultsTemplate {
    pub client: ClientCtx,
    pub thread: threads::Model,
    pub results: PollResults,
    pub comments: Vec<CommentView>,
    pub can_edit: bool,
}

#[derive(Template)]
#[template(path = "vote_poll.html")]
pub struct VotePollTemplate {
    pub client: ClientCtx,
    pub poll: poll_entity::Model,
    pub options: Vec<poll_options::Model>,
}

/// The poll and its thread, refusing anyone but the thread's author.
async fn owned_poll(
    client: &ClientCtx,
    poll_id: i32,
) -> Result<(poll_entity::Model, threads::Model), Error> {
    let db = get_db_pool();
    let poll = polls::get_poll(db, poll_id).await?;
    let thread = thread_store::get_thread(db, poll.thread_id).await?;
    client.require_ownership(thread.author_id)?;
    Ok((poll, thread))
}

fn results_url(poll_id: i32) -> String {
    format!("/poll-results/{}/", poll_id)
}

#[get("/create-poll/")]
pub async fn create_poll_form(client: ClientCtx) -> Result<impl Responder, Error> {
    client.require_login()?;
    let threads = thread_store::list_threads(get_db_pool())
        .await
        .map_err(StoreError::from)?;

    Ok(PollFormTemplate {
        client,
        heading: "Create poll",
        action: "/create-poll/".to_owned(),
        threads,
        form: PollForm::default(),
        errors: FormErrors::new(),
    }
    .to_response())
}

#[post("/create-poll/")]
pub async fn create_poll(
    client: ClientCtx,
    session: Session,
    form: RawForm,
) -> Result<HttpResponse, Error> {
    client.require_login()?;
    let form = PollForm::from_data(&read_form(&session, form)?);
    let db = get_db_pool();

    match polls::create_poll(db, &form).await {
        Ok(poll) => Ok(redirect(results_url(poll.id))),
        Err(StoreError::Invalid(errors)) => Ok(render_invalid(&PollFormTemplate {
            client,
            heading: "Create poll",
            action: "/create-poll/".to_owned(),
            threads: thread_store::list_threads(db)
                .await
                .map_err(StoreError::from)?,
            form,
            errors,
        })),
        Err(err) => Err(err.into()),
    }
}

#[get("/update-poll/{id}/")]
pub async fn update_poll_form(
    client: ClientCtx,
    path: web::Path<i32>,
) -> Result<impl Responder, Error> {
    let (poll, _) = owned_poll(&client, path.into_inner()).await?;
    let options = polls::get_options(get_db_pool(), poll.id)
        .await
        .map_err(StoreError::from)?;

    Ok(PollFormTemplate {
        client,
        heading: "Update poll",
        action: format!("/update-poll/{}/", poll.id),
        threads: Vec::new(),
        form: PollForm::from_poll(&poll, &options),
        errors: FormErrors::new(),
    }
    .to_response())
}

#[post("/update-poll/{id}/")]
pub async fn update_poll(
    client: ClientCtx,
    session: Session,
    path: web::Path<i32>,
    form: RawForm,
) -> Result<HttpResponse, Error> {
    let (poll, _) = owned_poll(&client, path.into_inner()).await?;
    let form = PollForm::from_data(&read_form(&session, form)?);

    match polls::update_poll(get_db_pool(), poll.id, &form).await {
        Ok(poll) => Ok(redirect(results_url(poll.id))),
        Err(StoreError::Invalid(errors)) => Ok(render_invalid(&PollFormTemplate {
            client,
            heading: "Update poll",
            action: format!("/update-poll/{}/", poll.id),
            threads: Vec::new(),
            form,
            errors,
        })),
        Err(err) => Err(err.into()),
    }
}

#[get("/delete-poll/{id}/")]
pub async fn delete_poll_confirm(
    client: ClientCtx,
    path: web::Path<i32>,
) -> Result<impl Responder, Error> {
    let (poll, _) = owned_poll(&client, path.into_inner()).await?;

    Ok(confirm_delete(
        client,
        "poll",
        poll.question,
        format!("/delete-poll/{}/", poll.id),
        results_url(poll.id),
    ))
}

#[post("/delete-poll/{id}/")]
pub async fn delete_poll(
    client: ClientCtx,
    session: Session,
    path: web::Path<i32>,
    form: RawForm,
) -> Result<impl Responder, Error> {
    let (poll, _) = owned_poll(&client, path.into_inner()).await?;
    read_form(&session, form)?;

    polls::delete_poll(get_db_pool(), poll.id).await?;
    Ok(success(client, "Poll deleted successfully!"))
}

#[get("/poll-results/{id}/")]
pub async fn view_poll_results(
    client: ClientCtx,
    path: web::Path<i32>,
) -> Result<impl Responder, Error> {
    let db = get_db_pool();
    let results = polls::get_results(db, path.into_inner()).await?;
    let thread = thread_store::get_thread(db, results.poll.thread_id).await?;
    let comments = comments::get_poll_comments(db, results.poll.id)
        .await
        .map_err(StoreError::from)?;

    Ok(PollResultsTemplate {
        comments: comment_views(db, &client, comments).await?,
        can_edit: client.owns(thread.author_id),
        client,
        thread,
        results,
    }
    .to_response())
}

#[derive(Deserialize)]
pub struct VotePollQuery {
    pub poll: Option<String>,
}

#[get("/vote-poll/")]
pub async fn vote_poll_form(
    client: ClientCtx,
    query: web::Query<VotePollQuery>,
) -> Result<impl Responder, Error> {
    client.require_login()?;
    let poll_id = query
        .poll
        .as_deref()
        .and_then(|raw| raw.trim().parse::<i32>().ok())
        .ok_or_else(|| error::ErrorBadRequest("Choose a poll to vote on."))?;

    let db = get_db_pool();
    let poll = polls::get_poll(db, poll_id).await?;
    let options = polls::get_options(db, poll.id)
        .await
        .map_err(StoreError::from)?;

    Ok(VotePollTemplate {
        client,
        poll,
        options,
    }
    .to_response())
}

#[post("/vote-poll/")]
pub async fn vote_poll(
    client: ClientCtx,
    session: Session,
    form: RawForm,
) -> Result<impl Responder, Error> {
    let user_id = client.require_login()?;
    let data = read_form(&session, form)?;

    let parse = |field: &str| data.get(field).and_then(|raw| raw.trim().parse::<i32>().ok());
    let (poll_id, option_id) = match (parse("poll_id"), parse("option_id")) {
        (Some(poll_id), Some(option_id)) => (poll_id, option_id),
        _ => return Err(error::ErrorBadRequest("Choose an option to vote for.")),
    };

    polls::vote(get_db_pool(), user_id, poll_id, option_id).await?;
    Ok(redirect(results_url(poll_id)))
}
