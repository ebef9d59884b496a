// event_ticketing/src/web/handlers/event_handlers.rs

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde_json::json;
use tracing::instrument;

use crate::catalog;
use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedCaller;

#[instrument(name = "handler::list_events", skip_all)]
pub async fn list_events_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let events = catalog::list_events(&app_state).await?;
  Ok(HttpResponse::Ok().json(json!({ "events": events })))
}

#[instrument(name = "handler::event_details", skip(app_state, path), fields(event_id = %path.as_ref()))]
pub async fn event_details_handler(
  app_state: web::Data<AppState>,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let event = catalog::get_event(&app_state, path.into_inner()).await?;
  let registration_open = event.registration_open_at(Utc::now());
  Ok(HttpResponse::Ok().json(json!({
    "event": event,
    "price": event.price_display(),
    "registration_open": registration_open,
  })))
}

#[instrument(name = "handler::my_tickets", skip_all, fields(user_id = %auth.caller.user_id))]
pub async fn my_tickets_handler(app_state: web::Data<AppState>, auth: AuthenticatedCaller) -> Result<HttpResponse, AppError> {
  let tickets = catalog::list_user_tickets(&app_state, auth.caller).await?;
  Ok(HttpResponse::Ok().json(json!({ "tickets": tickets })))
}
