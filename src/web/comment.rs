use super::thread::{history_entries, HistoryTemplate};
use super::{read_form, RawForm};
use crate::comments::{self, CommentForm};
use crate::db::get_db_pool;
use crate::error::StoreError;
use crate::form::FormErrors;
use crate::middleware::ClientCtx;
use crate::orm::{comments as comment_entity, polls as poll_entity, threads};
use crate::polls;
use crate::template::{confirm_delete, redirect, render_invalid};
use crate::threads as thread_store;
use crate::votes;
use actix_session::Session;
use actix_web::{get, post, web, Error, HttpResponse, Responder};
use askama_actix::{Template, TemplateToResponse};

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(create_comment_form)
        .service(create_comment)
        .service(edit_comment_form)
        .service(edit_comment)
        .service(view_comment_history)
        .service(vote_comment)
        .service(delete_comment_confirm)
        .service(delete_comment);
}

#[derive(Template)]
#[template(path = "comment_form.html")]
pub struct CommentFormTemplate {
    pub client: ClientCtx,
    pub threads: Vec<threads::Model>,
    pub polls: Vec<poll_entity::Model>,
    pub form: CommentForm,
    pub errors: FormErrors,
}

impl CommentFormTemplate {
    async fn new(client: ClientCtx, form: CommentForm, errors: FormErrors) -> Result<Self, Error> {
        let db = get_db_pool();
        Ok(Self {
            client,
            threads: thread_store::list_threads(db)
                .await
                .map_err(StoreError::from)?,
            polls: polls::list_polls(db).await.map_err(StoreError::from)?,
            form,
            errors,
        })
    }

    pub fn is_thread_selected(&self, id: &i32) -> bool {
        self.form.thread == id.to_string()
    }

    pub fn is_poll_selected(&self, id: &i32) -> bool {
        self.form.poll == id.to_string()
    }
}

#[derive(Template)]
#[template(path = "comment_edit.html")]
pub struct CommentEditTemplate {
    pub client: ClientCtx,
    pub action: String,
    pub cancel_url: String,
    pub content: String,
    pub errors: FormErrors,
}

/// Where a comment is shown: its thread, or its poll's results page.
pub fn comment_url(comment: &comment_entity::Model) -> String {
    match (comment.thread_id, comment.poll_id) {
        (Some(thread_id), _) => format!("/thread/{}/#comment-{}", thread_id, comment.id),
        (None, Some(poll_id)) => format!("/poll-results/{}/#comment-{}", poll_id, comment.id),
        (None, None) => "/recent/".to_owned(),
    }
}

#[get("/create-comment/")]
pub async fn create_comment_form(client: ClientCtx) -> Result<impl Responder, Error> {
    client.require_login()?;
    let template =
        CommentFormTemplate::new(client, CommentForm::default(), FormErrors::new()).await?;
    Ok(template.to_response())
}

#[post("/create-comment/")]
pub async fn create_comment(
    client: ClientCtx,
    session: Session,
    form: RawForm,
) -> Result<HttpResponse, Error> {
    let user_id = client.require_login()?;
    let form = CommentForm::from_data(&read_form(&session, form)?);

    match comments::create_comment(get_db_pool(), user_id, &form).await {
        Ok(comment) => Ok(redirect(comment_url(&comment))),
        Err(StoreError::Invalid(errors)) => {
            let template = CommentFormTemplate::new(client, form, errors).await?;
            Ok(render_invalid(&template))
        }
        Err(err) => Err(err.into()),
    }
}

#[get("/comment/{id}/edit/")]
pub async fn edit_comment_form(
    client: ClientCtx,
    path: web::Path<i32>,
) -> Result<impl Responder, Error> {
    let comment = comments::get_visible_comment(get_db_pool(), path.into_inner()).await?;
    client.require_ownership(comment.author_id)?;

    Ok(CommentEditTemplate {
        client,
        action: format!("/comment/{}/edit/", comment.id),
        cancel_url: comment_url(&comment),
        content: comment.content,
        errors: FormErrors::new(),
    }
    .to_response())
}

#[post("/comment/{id}/edit/")]
pub async fn edit_comment(
    client: ClientCtx,
    session: Session,
    path: web::Path<i32>,
    form: RawForm,
) -> Result<HttpResponse, Error> {
    let db = get_db_pool();
    let comment = comments::get_visible_comment(db, path.into_inner()).await?;
    let user_id = client.require_ownership(comment.author_id)?;
    let content = read_form(&session, form)?.text("content");

    match comments::update_comment(db, comment.id, user_id, &content).await {
        Ok(comment) => Ok(redirect(comment_url(&comment))),
        Err(StoreError::Invalid(errors)) => Ok(render_invalid(&CommentEditTemplate {
            client,
            action: format!("/comment/{}/edit/", comment.id),
            cancel_url: comment_url(&comment),
            content,
            errors,
        })),
        Err(err) => Err(err.into()),
    }
}

#[get("/comment/{id}/history/")]
pub async fn view_comment_history(
    client: ClientCtx,
    path: web::Path<i32>,
) -> Result<impl Responder, Error> {
    let db = get_db_pool();
    let comment = comments::get_visible_comment(db, path.into_inner()).await?;
    let rows = comments::get_comment_history(db, comment.id)
        .await
        .map_err(StoreError::from)?
        .into_iter()
        .map(|edit| (edit.user_id, edit.old_content, edit.new_content, edit.edited_at))
        .collect();

    Ok(HistoryTemplate {
        client,
        heading: format!("Edit history of comment #{}", comment.id),
        back_url: comment_url(&comment),
        entries: history_entries(db, rows).await?,
    }
    .to_response())
}

#[post("/comment/{id}/vote/")]
pub async fn vote_comment(
    client: ClientCtx,
    session: Session,
    path: web::Path<i32>,
    form: RawForm,
) -> Result<impl Responder, Error> {
    let user_id = client.require_login()?;
    let data = read_form(&session, form)?;
    let db = get_db_pool();
    let comment = comments::get_visible_comment(db, path.into_inner()).await?;

    let vote = votes::parse_vote(&data.text("vote_type"))?;
    votes::vote_comment(db, user_id, comment.id, vote).await?;
    Ok(redirect(comment_url(&comment)))
}

#[get("/comment/{id}/delete/")]
pub async fn delete_comment_confirm(
    client: ClientCtx,
    path: web::Path<i32>,
) -> Result<impl Responder, Error> {
    let comment = comments::get_visible_comment(get_db_pool(), path.into_inner()).await?;
    client.require_ownership(comment.author_id)?;

    Ok(confirm_delete(
        client,
        "comment",
        format!("comment #{}", comment.id),
        format!("/comment/{}/delete/", comment.id),
        comment_url(&comment),
    ))
}

#[post("/comment/{id}/delete/")]
pub async fn delete_comment(
    client: ClientCtx,
    session: Session,
    path: web::Path<i32>,
    form: RawForm,
) -> Result<impl Responder, Error> {
    let db = get_db_pool();
    let comment = comments::get_visible_comment(db, path.into_inner()).await?;
    client.require_ownership(comment.author_id)?;
    read_form(&session, form)?;

    let comment = comments::delete_comment(db, comment.id).await?;
    Ok(redirect(comment_url(&comment)))
}
