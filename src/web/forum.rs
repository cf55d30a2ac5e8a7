use super::thread::{summarize_threads, ThreadSummary};
use super::{read_form, RawForm};
use crate::db::get_db_pool;
use crate::error::StoreError;
use crate::forums::{self, ForumDetail, ForumForm};
use crate::form::FormErrors;
use crate::middleware::ClientCtx;
use crate::orm::{categories, forums as forum_entity, tags};
use crate::taxonomy;
use crate::template::{confirm_delete, render_invalid, success};
use actix_session::Session;
use actix_web::{get, post, web, Error, HttpResponse, Responder};
use askama_actix::{Template, TemplateToResponse};

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_forums)
        .service(view_forum)
        .service(create_forum_form)
        .service(create_forum)
        .service(update_forum_form)
        .service(update_forum)
        .service(delete_forum_confirm)
        .service(delete_forum);
}

#[derive(Template)]
#[template(path = "forums.html")]
pub struct ForumIndexTemplate {
    pub client: ClientCtx,
    pub forums: Vec<forum_entity::Model>,
}

#[derive(Template)]
#[template(path = "forum.html")]
pub struct ForumTemplate {
    pub client: ClientCtx,
    pub detail: ForumDetail,
    pub threads: Vec<ThreadSummary>,
}

#[derive(Template)]
#[template(path = "forum_form.html")]
pub struct ForumFormTemplate {
    pub client: ClientCtx,
    pub heading: &'static str,
    pub action: String,
    pub categories: Vec<categories::Model>,
    pub tags: Vec<tags::Model>,
    pub form: ForumForm,
    pub errors: FormErrors,
}

impl ForumFormTemplate {
    async fn new(
        client: ClientCtx,
        heading: &'static str,
        action: String,
        form: ForumForm,
        errors: FormErrors,
    ) -> Result<Self, Error> {
        let db = get_db_pool();
        Ok(Self {
            client,
            heading,
            action,
            categories: taxonomy::list_categories(db)
                .await
                .map_err(StoreError::from)?,
            tags: taxonomy::list_tags(db).await.map_err(StoreError::from)?,
            form,
            errors,
        })
    }
}

#[get("/forums/")]
pub async fn view_forums(client: ClientCtx) -> Result<impl Responder, Error> {
    let forums = forums::list_forums(get_db_pool())
        .await
        .map_err(StoreError::from)?;
    Ok(ForumIndexTemplate { client, forums }.to_response())
}

#[get("/forum/{id}/")]
pub async fn view_forum(client: ClientCtx, path: web::Path<i32>) -> Result<impl Responder, Error> {
    let db = get_db_pool();
    let detail = forums::get_forum_detail(db, path.into_inner()).await?;
    let threads = forums::get_forum_threads(db, detail.forum.id)
        .await
        .map_err(StoreError::from)?;
    let threads = summarize_threads(db, threads).await?;

    Ok(ForumTemplate {
        client,
        detail,
        threads,
    }
    .to_response())
}

#[get("/create-forum/")]
pub async fn create_forum_form(client: ClientCtx) -> Result<impl Responder, Error> {
    client.require_login()?;
    let template = ForumFormTemplate::new(
        client,
        "Create forum",
        "/create-forum/".to_owned(),
        ForumForm::default(),
        FormErrors::new(),
    )
    .await?;
    Ok(template.to_response())
}

#[post("/create-forum/")]
pub async fn create_forum(
    client: ClientCtx,
    session: Session,
    form: RawForm,
) -> Result<HttpResponse, Error> {
    let user_id = client.require_login()?;
    let form = ForumForm::from_data(&read_form(&session, form)?);

    match forums::create_forum(get_db_pool(), user_id, &form).await {
        Ok(_) => Ok(success(client, "Forum created successfully!")),
        Err(StoreError::Invalid(errors)) => {
            let template = ForumFormTemplate::new(
                client,
                "Create forum",
                "/create-forum/".to_owned(),
                form,
                errors,
            )
            .await?;
            Ok(render_invalid(&template))
        }
        Err(err) => Err(err.into()),
    }
}

#[get("/update-forum/{id}/")]
pub async fn update_forum_form(
    client: ClientCtx,
    path: web::Path<i32>,
) -> Result<impl Responder, Error> {
    client.require_login()?;
    let detail = forums::get_forum_detail(get_db_pool(), path.into_inner()).await?;

    let template = ForumFormTemplate::new(
        client,
        "Update forum",
        format!("/update-forum/{}/", detail.forum.id),
        ForumForm::from_forum(&detail),
        FormErrors::new(),
    )
    .await?;
    Ok(template.to_response())
}

#[post("/update-forum/{id}/")]
pub async fn update_forum(
    client: ClientCtx,
    session: Session,
    path: web::Path<i32>,
    form: RawForm,
) -> Result<HttpResponse, Error> {
    client.require_login()?;
    let id = path.into_inner();
    let form = ForumForm::from_data(&read_form(&session, form)?);

    match forums::update_forum(get_db_pool(), id, &form).await {
        Ok(_) => Ok(success(client, "Forum updated successfully!")),
        Err(StoreError::Invalid(errors)) => {
            let template = ForumFormTemplate::new(
                client,
                "Update forum",
                format!("/update-forum/{}/", id),
                form,
                errors,
            )
            .await?;
            Ok(render_invalid(&template))
        }
        Err(err) => Err(err.into()),
    }
}

#[get("/delete-forum/{id}/")]
pub async fn delete_forum_confirm(
    client: ClientCtx,
    path: web::Path<i32>,
) -> Result<impl Responder, Error> {
    client.require_login()?;
    let forum = forums::get_forum(get_db_pool(), path.into_inner()).await?;

    Ok(confirm_delete(
        client,
        "forum",
        forum.name,
        format!("/delete-forum/{}/", forum.id),
        format!("/forum/{}/", forum.id),
    ))
}

#[post("/delete-forum/{id}/")]
pub async fn delete_forum(
    client: ClientCtx,
    session: Session,
    path: web::Path<i32>,
    form: RawForm,
) -> Result<impl Responder, Error> {
    client.require_login()?;
    read_form(&session, form)?;
    forums::delete_forum(get_db_pool(), path.into_inner()).await?;
    Ok(success(client, "Forum deleted successfully!"))
}
