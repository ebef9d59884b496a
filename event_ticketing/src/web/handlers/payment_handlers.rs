// event_ticketing/src/web/handlers/payment_handlers.rs

//! Stub payment gateway pages.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use super::see_other;
use crate::catalog;
use crate::errors::AppError;
use crate::pipelines;
use crate::services::payment::{self, CURRENCY};
use crate::state::AppState;
use crate::web::extractors::AuthenticatedCaller;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProcessQuery {
  pub order_id: String,
  #[serde(default)]
  pub amount: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct CompletePayload {
  pub order_id: String,
}

#[instrument(name = "handler::payment_process", skip(app_state, auth), fields(order_id = %query.order_id))]
pub async fn process_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedCaller,
  query: web::Query<ProcessQuery>,
) -> Result<HttpResponse, AppError> {
  let registration_id = payment::parse_order_id(&query.order_id)?;
  let details = catalog::registration_details_for_owner(&app_state, auth.caller, registration_id).await?;
  let amount = query.amount.clone().unwrap_or_else(|| details.event.price_display());
  Ok(HttpResponse::Ok().json(json!({
    "order_id": query.order_id,
    "amount": amount,
    "currency": CURRENCY,
    "event": details.event,
    "payment_provider_key_id": app_state.config.payment_provider_key_id,
    "complete_url": "/Payment/Complete",
  })))
}

/// Completes a stub payment: generated transaction id plus a receipt email.
#[instrument(name = "handler::payment_complete", skip(app_state, auth), fields(order_id = %payload.order_id))]
pub async fn complete_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedCaller,
  payload: web::Json<CompletePayload>,
) -> Result<HttpResponse, AppError> {
  let registration_id = payment::parse_order_id(&payload.order_id)?;
  let registration = pipelines::complete_stub_payment(&app_state, auth.caller, registration_id).await?;
  Ok(see_other(
    "/Event/MyTickets",
    json!({
      "message": "Payment successful! A confirmation email has been sent.",
      "registration": registration,
    }),
  ))
}
