// event_ticketing/src/web/handlers/account_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::pipelines;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedCaller;

#[derive(Deserialize, Debug)]
pub struct RegisterAccountPayload {
  pub name: String,
  pub email: String,
  #[serde(default)]
  pub phone: Option<String>,
  pub password: String,
}

#[derive(Deserialize, Debug)]
pub struct LoginPayload {
  /// Email address or phone number.
  pub login: String,
  pub password: String,
}

#[instrument(name = "handler::register_account", skip(app_state, payload), fields(email = %payload.email))]
pub async fn register_account_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<RegisterAccountPayload>,
) -> Result<HttpResponse, AppError> {
  let RegisterAccountPayload {
    name,
    email,
    phone,
    password,
  } = payload.into_inner();
  let user = pipelines::sign_up(&app_state, name, email, phone, password).await?;
  Ok(HttpResponse::Created().json(json!({
    "message": "Account created.",
    "user": user,
  })))
}

#[instrument(name = "handler::login", skip(app_state, payload), fields(login = %payload.login))]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<LoginPayload>,
) -> Result<HttpResponse, AppError> {
  let LoginPayload { login, password } = payload.into_inner();
  let (user, token) = pipelines::sign_in(&app_state, login, password).await?;
  Ok(HttpResponse::Ok().json(json!({
    "message": "Signed in.",
    "token": token,
    "user": user,
  })))
}

#[instrument(name = "handler::logout", skip_all, fields(user_id = %auth.caller.user_id))]
pub async fn logout_handler(app_state: web::Data<AppState>, auth: AuthenticatedCaller) -> Result<HttpResponse, AppError> {
  app_state.sessions.revoke(&auth.token);
  info!("Signed out.");
  Ok(HttpResponse::Ok().json(json!({ "message": "Signed out." })))
}
