use super::{read_form, RawForm};
use crate::db::get_db_pool;
use crate::error::StoreError;
use crate::form::FormErrors;
use crate::middleware::ClientCtx;
use crate::taxonomy::{self, CategoryForm, TagForm};
use crate::template::{confirm_delete, render_invalid, success};
use actix_session::Session;
use actix_web::{get, post, web, Error, HttpResponse, Responder};
use askama_actix::{Template, TemplateToResponse};

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(add_category_form)
        .service(add_category)
        .service(update_category_form)
        .service(update_category)
        .service(delete_category_confirm)
        .service(delete_category)
        .service(add_tag_form)
        .service(add_tag)
        .service(update_tag_form)
        .service(update_tag)
        .service(delete_tag_confirm)
        .service(delete_tag);
}

#[derive(Template)]
#[template(path = "category_form.html")]
pub struct CategoryFormTemplate {
    pub client: ClientCtx,
    pub heading: &'static str,
    pub action: String,
    pub form: CategoryForm,
    pub errors: FormErrors,
}

#[derive(Template)]
#[template(path = "tag_form.html")]
pub struct TagFormTemplate {
    pub client: ClientCtx,
    pub heading: &'static str,
    pub action: String,
    pub form: TagForm,
    pub errors: FormErrors,
}

#[get("/add-category/")]
pub async fn add_category_form(client: ClientCtx) -> Result<impl Responder, Error> {
    client.require_login()?;
    Ok(CategoryFormTemplate {
        client,
        heading: "Add category",
        action: "/add-category/".to_owned(),
        form: CategoryForm::default(),
        errors: FormErrors::new(),
    }
    .to_response())
}

#[post("/add-category/")]
pub async fn add_category(
    client: ClientCtx,
    session: Session,
    form: RawForm,
) -> Result<HttpResponse, Error> {
    client.require_login()?;
    let form = CategoryForm::from_data(&read_form(&session, form)?);

    match taxonomy::create_category(get_db_pool(), &form).await {
        Ok(_) => Ok(success(client, "Category added successfully!")),
        Err(StoreError::Invalid(errors)) => Ok(render_invalid(&CategoryFormTemplate {
            client,
            heading: "Add category",
            action: "/add-category/".to_owned(),
            form,
            errors,
        })),
        Err(err) => Err(err.into()),
    }
}

#[get("/update-category/{id}/")]
pub async fn update_category_form(
    client: ClientCtx,
    path: web::Path<i32>,
) -> Result<impl Responder, Error> {
    client.require_login()?;
    let category = taxonomy::get_category(get_db_pool(), path.into_inner()).await?;

    Ok(CategoryFormTemplate {
        client,
        heading: "Update category",
        action: format!("/update-category/{}/", category.id),
        form: CategoryForm::from_model(&category),
        errors: FormErrors::new(),
    }
    .to_response())
}

#[post("/update-category/{id}/")]
pub async fn update_category(
    client: ClientCtx,
    session: Session,
    path: web::Path<i32>,
    form: RawForm,
) -> Result<HttpResponse, Error> {
    client.require_login()?;
    let id = path.into_inner();
    let form = CategoryForm::from_data(&read_form(&session, form)?);

    match taxonomy::update_category(get_db_pool(), id, &form).await {
        Ok(_) => Ok(success(client, "Category updated successfully!")),
        Err(StoreError::Invalid(errors)) => Ok(render_invalid(&CategoryFormTemplate {
            client,
            heading: "Update category",
            action: format!("/update-category/{}/", id),
            form,
            errors,
        })),
        Err(err) => Err(err.into()),
    }
}

#[get("/delete-category/{id}/")]
pub async fn delete_category_confirm(
    client: ClientCtx,
    path: web::Path<i32>,
) -> Result<impl Responder, Error> {
    client.require_login()?;
    let category = taxonomy::get_category(get_db_pool(), path.into_inner()).await?;

    Ok(confirm_delete(
        client,
        "category",
        category.name,
        format!("/delete-category/{}/", category.id),
        "/forums/",
    ))
}

#[post("/delete-category/{id}/")]
pub async fn delete_category(
    client: ClientCtx,
    session: Session,
    path: web::Path<i32>,
    form: RawForm,
) -> Result<impl Responder, Error> {
    client.require_login()?;
    read_form(&session, form)?;
    taxonomy::delete_category(get_db_pool(), path.into_inner()).await?;
    Ok(success(client, "Category deleted successfully!"))
}

#[get("/add-tag/")]
pub async fn add_tag_form(client: ClientCtx) -> Result<impl Responder, Error> {
    client.require_login()?;
    Ok(TagFormTemplate {
        client,
        heading: "Add tag",
        action: "/add-tag/".to_owned(),
        form: TagForm::default(),
        errors: FormErrors::new(),
    }
    .to_response())
}

#[post("/add-tag/")]
pub async fn add_tag(
    client: ClientCtx,
    session: Session,
    form: RawForm,
) -> Result<HttpResponse, Error> {
    client.require_login()?;
    let form = TagForm::from_data(&read_form(&session, form)?);

    match taxonomy::create_tag(get_db_pool(), &form).await {
        Ok(_) => Ok(success(client, "Tag added successfully!")),
        Err(StoreError::Invalid(errors)) => Ok(render_invalid(&TagFormTemplate {
            client,
            heading: "Add tag",
            action: "/add-tag/".to_owned(),
            form,
            errors,
        })),
        Err(err) => Err(err.into()),
    }
}

#[get("/update-tag/{id}/")]
pub async fn update_tag_form(
    client: ClientCtx,
    path: web::Path<i32>,
) -> Result<impl Responder, Error> {
    client.require_login()?;
    let tag = taxonomy::get_tag(get_db_pool(), path.into_inner()).await?;

    Ok(TagFormTemplate {
        client,
        heading: "Update tag",
        action: format!("/update-tag/{}/", tag.id),
        form: TagForm::from_model(&tag),
        errors: FormErrors::new(),
    }
    .to_response())
}

#[post("/update-tag/{id}/")]
pub async fn update_tag(
    client: ClientCtx,
    session: Session,
    path: web::Path<i32>,
    form: RawForm,
) -> Result<HttpResponse, Error> {
    client.require_login()?;
    let id = path.into_inner();
    let form = TagForm::from_data(&read_form(&session, form)?);

    match taxonomy::update_tag(get_db_pool(), id, &form).await {
        Ok(_) => Ok(success(client, "Tag updated successfully!")),
        Err(StoreError::Invalid(errors)) => Ok(render_invalid(&TagFormTemplate {
            client,
            heading: "Update tag",
            action: format!("/update-tag/{}/", id),
            form,
            errors,
        })),
        Err(err) => Err(err.into()),
    }
}

#[get("/delete-tag/{id}/")]
pub async fn delete_tag_confirm(
    client: ClientCtx,
    path: web::Path<i32>,
) -> Result<impl Responder, Error> {
    client.require_login()?;
    let tag = taxonomy::get_tag(get_db_pool(), path.into_inner()).await?;

    Ok(confirm_delete(
        client,
        "tag",
        tag.name,
        format!("/delete-tag/{}/", tag.id),
        "/forums/",
    ))
}

#[post("/delete-tag/{id}/")]
pub async fn delete_tag(
    client: ClientCtx,
    session: Session,
    path: web::Path<i32>,
    form: RawForm,
) -> Result<impl Responder, Error> {
    client.require_login()?;
    read_form(&session, form)?;
    taxonomy::delete_tag(get_db_pool(), path.into_inner()).await?;
    Ok(success(client, "Tag deleted successfully!"))
}
