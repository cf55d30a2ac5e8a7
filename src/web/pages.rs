use crate::middleware::ClientCtx;
use crate::template::{redirect, success};
use actix_web::{get, web, Responder};
use serde::Deserialize;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_index).service(view_success);
}

#[get("/")]
pub async fn view_index() -> impl Responder {
    redirect("/forums/")
}

#[derive(Deserialize)]
pub struct SuccessQuery {
    pub message: Option<String>,
}

/// Generic confirmation page.
#[get("/success/")]
pub async fn view_success(client: ClientCtx, query: web::Query<SuccessQuery>) -> impl Responder {
    success(
        client,
        query
            .into_inner()
            .message
            .unwrap_or_else(|| "Operation completed successfully!".to_owned()),
    )
}
