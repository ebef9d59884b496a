// event_ticketing/src/web/extractors.rs

use crate::auth::Caller;
use crate::errors::AppError;
use crate::state::AppState;
use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use tracing::warn;

/// The raw bearer token of the request, if one was sent.
pub fn bearer_token(req: &HttpRequest) -> Option<&str> {
  req
    .headers()
    .get(AUTHORIZATION)?
    .to_str()
    .ok()?
    .strip_prefix("Bearer ")
    .map(str::trim)
    .filter(|t| !t.is_empty())
}

fn resolve_caller(req: &HttpRequest) -> Result<(Caller, String), AppError> {
  let state = req
    .app_data::<web::Data<AppState>>()
    .ok_or_else(|| AppError::Internal("Application state is not configured.".to_string()))?;
  let token = bearer_token(req).ok_or_else(|| {
    warn!(path = %req.path(), "Request without bearer token.");
    AppError::Unauthorized("Sign in to continue.".to_string())
  })?;
  let caller = state.sessions.resolve(token).ok_or_else(|| {
    warn!(path = %req.path(), "Unknown or expired session token.");
    AppError::Unauthorized("Session expired or invalid. Sign in again.".to_string())
  })?;
  Ok((caller, token.to_string()))
}

/// A signed-in caller, resolved from `Authorization: Bearer <token>`.
#[derive(Debug, Clone)]
pub struct AuthenticatedCaller {
  pub caller: Caller,
  pub token: String,
}

impl FromRequest for AuthenticatedCaller {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    ready(resolve_caller(req).map(|(caller, token)| AuthenticatedCaller { caller, token }))
  }
}

/// A signed-in caller with the Admin role; anyone else gets `Forbidden`.
#[derive(Debug, Clone, Copy)]
pub struct AdminCaller(pub Caller);

impl FromRequest for AdminCaller {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let result = resolve_caller(req).and_then(|(caller, _)| {
      crate::auth::require_admin(&caller).map(|_| AdminCaller(caller)).map_err(|e| {
        warn!(user_id = %caller.user_id, path = %req.path(), "Non-admin request to admin route.");
        e
      })
    });
    ready(result)
  }
}
