//! Errors raised by the store modules.
//!
//! Handlers either match on [`StoreError::Invalid`] to re-render a form
//! with its field errors, or let `?` turn the error into a response which
//! the error-page middleware renders.

use crate::form::FormErrors;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use derive_more::Display;
use sea_orm::DbErr;

#[derive(Debug, Display)]
pub enum StoreError {
    #[display(fmt = "A database error occurred. Please try again later.")]
    Db(DbErr),
    #[display(fmt = "{}", _0)]
    Invalid(FormErrors),
    #[display(fmt = "{} not found.", _0)]
    NotFound(&'static str),
}

impl StoreError {
    /// Shorthand for a single-field validation failure.
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::Invalid(FormErrors::single(field, message))
    }
}

/// True when the database refused a row because of a unique constraint.
///
/// sea-orm only carries the driver's message, so this matches on the
/// PostgreSQL wording.
pub fn is_unique_violation(err: &DbErr) -> bool {
    err.to_string()
        .contains("duplicate key value violates unique constraint")
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        Self::Db(err)
    }
}

impl From<FormErrors> for StoreError {
    fn from(errors: FormErrors) -> Self {
        Self::Invalid(errors)
    }
}

impl ResponseError for StoreError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let Self::Db(err) = self {
            log::error!("database error: {}", err);
        }

        HttpResponse::build(self.status_code())
            .content_type("text/plain; charset=utf-8")
            .body(self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            StoreError::NotFound("Thread").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            StoreError::invalid("name", "This field is required.").status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            StoreError::Db(DbErr::Custom("boom".to_owned())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_unique_violation_detection() {
        let duplicate = DbErr::Query(
            "error returned from database: duplicate key value violates unique constraint \"categories_name_lower_idx\"".to_owned(),
        );
        assert!(is_unique_violation(&duplicate));
        assert!(!is_unique_violation(&DbErr::Query("connection reset".to_owned())));
    }

    #[test]
    fn test_database_details_are_not_displayed() {
        let err = StoreError::Db(DbErr::Custom("relation \"users\" missing".to_owned()));
        assert!(!err.to_string().contains("users"));
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(StoreError::NotFound("Poll").to_string(), "Poll not found.");
    }
}
