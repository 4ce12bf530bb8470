// server/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use carshare_core::{DomainError, WorkflowError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Forbidden: {0}")]
  Forbidden(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Conflict: {0}")]
  Conflict(String),

  #[error("Payment Processing Error: {0}")]
  Payment(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Migration Error: {0}")]
  Migrate(#[from] sqlx::migrate::MigrateError),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: WorkflowError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),

  /// A pipeline returned `Stopped` where the handler needed it to complete.
  #[error("Pipeline execution was halted by a handler.")]
  PipelineHaltedByHandler,
}

impl From<DomainError> for AppError {
  fn from(err: DomainError) -> Self {
    match err {
      DomainError::Overlap
      | DomainError::CarUnavailable { .. }
      | DomainError::AlreadyReviewed
      | DomainError::IllegalTransition { .. } => AppError::Conflict(err.to_string()),
      DomainError::EndBeforeStart
      | DomainError::StartInPast
      | DomainError::RatingOutOfRange { .. }
      | DomainError::NonPositiveAmount
      | DomainError::InsufficientBalance { .. }
      | DomainError::NothingOutstanding
      | DomainError::Invalid(_) => AppError::Validation(err.to_string()),
    }
  }
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<sqlx::Error>() {
      Ok(sqlx_err) => AppError::Sqlx(sqlx_err),
      Err(other) => AppError::Internal(other.to_string()),
    }
  }
}

impl AppError {
  /// Maps a unique-constraint violation to `Conflict(message)`, leaving other errors as `Sqlx`.
  pub fn conflict_on_unique(err: sqlx::Error, message: &str) -> Self {
    if let sqlx::Error::Database(db_err) = &err {
      if db_err.is_unique_violation() {
        return AppError::Conflict(message.to_string());
      }
    }
    AppError::Sqlx(err)
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::Forbidden(_) => StatusCode::FORBIDDEN,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Conflict(_) | AppError::PipelineHaltedByHandler => StatusCode::CONFLICT,
      AppError::Payment(_) => StatusCode::PAYMENT_REQUIRED,
      AppError::Config(_)
      | AppError::Sqlx(_)
      | AppError::Migrate(_)
      | AppError::Workflow { .. }
      | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::warn!(application_error = %self, status = status.as_u16(), "Responding with client error");
    }
    let body = match self {
      AppError::Validation(m)
      | AppError::Auth(m)
      | AppError::Forbidden(m)
      | AppError::NotFound(m)
      | AppError::Conflict(m)
      | AppError::Payment(m) => json!({ "error": m }),
      AppError::Config(m) => json!({ "error": "Configuration issue", "detail": m }),
      AppError::Sqlx(_) => json!({ "error": "Database operation failed" }),
      AppError::Migrate(_) => json!({ "error": "Database migration failed" }),
      AppError::Workflow { source } => {
        tracing::error!(workflow_error_source = ?source, "Workflow error details");
        json!({ "error": "Workflow processing error", "detail": source.to_string() })
      }
      AppError::Internal(m) => json!({ "error": "An internal error occurred", "detail": m }),
      AppError::PipelineHaltedByHandler => json!({ "error": "Process halted by business logic." }),
    };
    HttpResponse::build(status).json(body)
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;
  use carshare_core::BookingStatus;

  #[test]
  fn domain_errors_map_to_client_statuses() {
    let overlap: AppError = DomainError::Overlap.into();
    assert_eq!(overlap.status_code(), StatusCode::CONFLICT);

    let past: AppError = DomainError::StartInPast.into();
    assert_eq!(past.status_code(), StatusCode::BAD_REQUEST);
    assert!(matches!(past, AppError::Validation(m) if m == "Cannot book a date in the past."));

    let transition: AppError = DomainError::IllegalTransition {
      from: BookingStatus::Completed,
      to: BookingStatus::Active,
    }
    .into();
    assert_eq!(transition.status_code(), StatusCode::CONFLICT);

    let dup: AppError = DomainError::AlreadyReviewed.into();
    assert_eq!(dup.status_code(), StatusCode::CONFLICT);
  }

  #[test]
  fn each_variant_has_its_status() {
    assert_eq!(AppError::Auth("x".into()).status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(AppError::Forbidden("x".into()).status_code(), StatusCode::FORBIDDEN);
    assert_eq!(AppError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
    assert_eq!(AppError::Payment("x".into()).status_code(), StatusCode::PAYMENT_REQUIRED);
    assert_eq!(
      AppError::from(sqlx::Error::RowNotFound).status_code(),
      StatusCode::INTERNAL_SERVER_ERROR
    );
    let wf = AppError::from(WorkflowError::PipelineNotRegistered {
      context_type: "X".into(),
    });
    assert_eq!(wf.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
  }

  #[test]
  fn anyhow_unwraps_sqlx_errors() {
    let err = AppError::from(anyhow::Error::new(sqlx::Error::RowNotFound));
    assert!(matches!(err, AppError::Sqlx(sqlx::Error::RowNotFound)));
    let other = AppError::from(anyhow::anyhow!("boom"));
    assert!(matches!(other, AppError::Internal(m) if m == "boom"));
  }

  #[test]
  fn error_body_carries_the_message() {
    let resp = AppError::NotFound("Car not found.".into()).error_response();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }
}
