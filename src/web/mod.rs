pub mod achievement;
pub mod comment;
pub mod diary;
pub mod error;
pub mod forum;
pub mod pages;
pub mod poll;
pub mod profile;
pub mod recent;
pub mod taxonomy;
pub mod thread;

use crate::form::FormData;
use actix_session::Session;
use actix_web::{web, Error};

/// Configures the web app by adding services from each web file.
///
/// @see https://docs.rs/actix-web/4.0.1/actix_web/struct.App.html#method.configure
pub fn configure(conf: &mut actix_web::web::ServiceConfig) {
    // Descending order. Order is important.
    // Route resolution will stop at the first match.
    pages::configure(conf);
    error::configure(conf);
    diary::configure(conf);
    forum::configure(conf);
    thread::configure(conf);
    comment::configure(conf);
    poll::configure(conf);
    taxonomy::configure(conf);
    recent::configure(conf);
    achievement::configure(conf);
    profile::configure(conf);
}

/// Raw body of a submitted form. Repeated keys are kept.
pub type RawForm = web::Form<Vec<(String, String)>>;

/// Checks the CSRF token and hands back the submitted fields.
pub fn read_form(session: &Session, form: RawForm) -> Result<FormData, Error> {
    let data = FormData::from(form.into_inner());
    crate::middleware::csrf::validate_csrf_token(session, data.csrf_token())?;
    Ok(data)
}
