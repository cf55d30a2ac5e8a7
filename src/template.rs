//! Page templates shared by every web module, and response helpers.

use crate::middleware::ClientCtx;
use actix_web::http::{header, StatusCode};
use actix_web::HttpResponse;
use askama_actix::{Template, TemplateToResponse};

#[derive(Template)]
#[template(path = "success.html")]
pub struct SuccessTemplate {
    pub client: ClientCtx,
    pub message: String,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub client: ClientCtx,
    pub status: u16,
    pub message: String,
}

/// "Are you sure?" page in front of a delete.
#[derive(Template)]
#[template(path = "confirm_delete.html")]
pub struct ConfirmDeleteTemplate {
    pub client: ClientCtx,
    /// What is being deleted, e.g. "student".
    pub kind: &'static str,
    pub name: String,
    /// Form target that performs the delete.
    pub action: String,
    pub cancel_url: String,
}

pub fn redirect(location: impl AsRef<str>) -> HttpResponse {
    HttpResponse::Found()
        .append_header((header::LOCATION, location.as_ref()))
        .finish()
}

pub fn success(client: ClientCtx, message: impl Into<String>) -> HttpResponse {
    SuccessTemplate {
        client,
        message: message.into(),
    }
    .to_response()
}

/// Renders a template with a status other than 200.
pub fn with_status<T: TemplateToResponse>(template: &T, status: StatusCode) -> HttpResponse {
    let mut response = template.to_response();
    *response.status_mut() = status;
    response
}

/// Renders a form again with its field errors and a 422 status.
pub fn render_invalid<T: TemplateToResponse>(template: &T) -> HttpResponse {
    with_status(template, StatusCode::UNPROCESSABLE_ENTITY)
}

/// Confirmation page for deleting `name`.
pub fn confirm_delete(
    client: ClientCtx,
    kind: &'static str,
    name: impl Into<String>,
    action: impl Into<String>,
    cancel_url: impl Into<String>,
) -> HttpResponse {
    ConfirmDeleteTemplate {
        client,
        kind,
        name: name.into(),
        action: action.into(),
        cancel_url: cancel_url.into(),
    }
    .to_response()
}
