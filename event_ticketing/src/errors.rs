// event_ticketing/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;
use ticketflow::FlowError;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Not found: {0}")]
  NotFound(String),

  #[error("Registration for this event has closed.")]
  RegistrationClosed { event_id: i64 },

  #[error("You are already registered for this event.")]
  AlreadyRegistered { event_id: i64 },

  #[error("Forbidden: {0}")]
  Forbidden(String),

  #[error("Authentication failed: {0}")]
  Unauthorized(String),

  #[error("Validation error: {0}")]
  Validation(String),

  #[error("Payment not completed for this ticket.")]
  PaymentNotCompleted,

  #[error("Transport error: {0}")]
  Transport(String),

  #[error("Configuration error: {0}")]
  Config(String),

  #[error("Database error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Workflow error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("Internal server error: {0}")]
  Internal(String),
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<sqlx::Error>() {
      Ok(sqlx_err) => AppError::Sqlx(sqlx_err),
      Err(err) => AppError::Internal(err.to_string()),
    }
  }
}

impl AppError {
  /// Where a browser should go after a rejected registration attempt.
  pub fn redirect_target(&self) -> Option<String> {
    match self {
      AppError::RegistrationClosed { event_id } | AppError::AlreadyRegistered { event_id } => {
        Some(format!("/Event/Details/{}", event_id))
      }
      _ => None,
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::RegistrationClosed { .. } | AppError::AlreadyRegistered { .. } => StatusCode::CONFLICT,
      AppError::Forbidden(_) => StatusCode::FORBIDDEN,
      AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
      AppError::Validation(_) | AppError::PaymentNotCompleted => StatusCode::BAD_REQUEST,
      AppError::Transport(_) => StatusCode::BAD_GATEWAY,
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Workflow { .. } | AppError::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::warn!(application_error = %self, status = status.as_u16(), "Responding with error");
    }

    let body = match self {
      AppError::Sqlx(_) => json!({"error": "Database operation failed"}),
      AppError::Workflow { source } => {
        tracing::error!(flow_error = ?source, "Workflow error details");
        json!({"error": "Workflow processing error", "detail": source.to_string()})
      }
      AppError::Config(_) | AppError::Internal(_) => json!({"error": "An internal error occurred"}),
      other => match other.redirect_target() {
        Some(redirect) => json!({"error": other.to_string(), "redirect": redirect}),
        None => json!({"error": other.to_string()}),
      },
    };
    HttpResponse::build(status).json(body)
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn statuses_follow_error_kind() {
    assert_eq!(AppError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
    assert_eq!(AppError::RegistrationClosed { event_id: 1 }.status_code(), StatusCode::CONFLICT);
    assert_eq!(AppError::AlreadyRegistered { event_id: 1 }.status_code(), StatusCode::CONFLICT);
    assert_eq!(AppError::Forbidden("x".into()).status_code(), StatusCode::FORBIDDEN);
    assert_eq!(AppError::Unauthorized("x".into()).status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(AppError::PaymentNotCompleted.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(AppError::Transport("x".into()).status_code(), StatusCode::BAD_GATEWAY);
    assert_eq!(
      AppError::Workflow {
        source: FlowError::HandlerMissing { step_name: "s".into() }
      }
      .status_code(),
      StatusCode::INTERNAL_SERVER_ERROR
    );
  }

  #[test]
  fn rejected_registration_points_back_to_event() {
    assert_eq!(
      AppError::AlreadyRegistered { event_id: 7 }.redirect_target().as_deref(),
      Some("/Event/Details/7")
    );
    assert_eq!(AppError::Forbidden("x".into()).redirect_target(), None);
  }
}
