//! Renders error responses as HTML pages.
//!
//! Only responses carrying an `actix_web::Error` are rewritten. Handlers
//! that deliberately answer 422 with a re-rendered form pass through.

use crate::middleware::ClientCtx;
use crate::template::ErrorTemplate;
use actix_web::dev::ServiceResponse;
use actix_web::http::{header, StatusCode};
use actix_web::middleware::{ErrorHandlerResponse, ErrorHandlers};
use actix_web::{get, web, HttpMessage, HttpResponse, Responder, Result};
use askama_actix::Template;
use serde::Deserialize;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_error);
}

/// Error handler middleware covering every status the application emits.
pub fn error_handlers<B: 'static>() -> ErrorHandlers<B> {
    ErrorHandlers::new()
        .handler(StatusCode::BAD_REQUEST, render_error)
        .handler(StatusCode::UNAUTHORIZED, render_error)
        .handler(StatusCode::FORBIDDEN, render_error)
        .handler(StatusCode::NOT_FOUND, render_error)
        .handler(StatusCode::METHOD_NOT_ALLOWED, render_error)
        .handler(StatusCode::UNPROCESSABLE_ENTITY, render_error)
        .handler(StatusCode::INTERNAL_SERVER_ERROR, render_error)
}

/// Message shown for a failed response.
fn error_message(status: StatusCode, error: Option<String>) -> String {
    if status.is_server_error() {
        return "Something went wrong on our end. Please try again later.".to_owned();
    }

    match error {
        Some(message) if !message.is_empty() => message,
        _ => status
            .canonical_reason()
            .unwrap_or("Error")
            .to_owned(),
    }
}

pub fn render_error<B>(res: ServiceResponse<B>) -> Result<ErrorHandlerResponse<B>> {
    let status = res.status();
    let error = match res.response().error() {
        Some(error) => error.to_string(),
        // Not-found routes have no error attached, everything else is a
        // page rendered on purpose.
        None if status == StatusCode::NOT_FOUND || status == StatusCode::METHOD_NOT_ALLOWED => {
            String::new()
        }
        None => return Ok(ErrorHandlerResponse::Response(res.map_into_left_body())),
    };

    if status.is_server_error() {
        log::error!("{} {}: {}", status.as_u16(), res.request().path(), error);
    }

    let (req, _) = res.into_parts();
    let client = ClientCtx::get_or_default_from_extensions(&mut req.extensions_mut());
    let template = ErrorTemplate {
        client,
        status: status.as_u16(),
        message: error_message(status, Some(error)),
    };

    let response = match template.render() {
        Ok(body) => HttpResponse::build(status)
            .insert_header((header::CONTENT_TYPE, "text/html; charset=utf-8"))
            .body(body),
        Err(err) => {
            log::error!("Failed to render error page: {}", err);
            HttpResponse::build(status).finish()
        }
    };

    Ok(ErrorHandlerResponse::Response(
        ServiceResponse::new(req, response).map_into_right_body::<B>(),
    ))
}

#[derive(Deserialize)]
pub struct ErrorQuery {
    pub message: Option<String>,
}

/// Generic error page, for links that need to show a message.
#[get("/error/")]
pub async fn view_error(client: ClientCtx, query: web::Query<ErrorQuery>) -> impl Responder {
    crate::template::with_status(
        &ErrorTemplate {
            client,
            status: 400,
            message: query
                .message
                .to_owned()
                .unwrap_or_else(|| "An error occurred.".to_owned()),
        },
        StatusCode::BAD_REQUEST,
    )
}
