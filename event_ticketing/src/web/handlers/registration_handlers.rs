// event_ticketing/src/web/handlers/registration_handlers.rs

use actix_web::http::header::ContentDisposition;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use super::see_other;
use crate::catalog;
use crate::errors::AppError;
use crate::pipelines;
use crate::reports::{pdf, ticket};
use crate::state::AppState;
use crate::web::extractors::AuthenticatedCaller;

#[derive(Deserialize, Debug)]
pub struct ConfirmPaymentPayload {
  pub registration_id: i64,
  #[serde(default)]
  pub transaction_id: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DownloadTicketQuery {
  pub email_id: i64,
}

/// Preflight: the same checks as registering, without creating anything.
#[instrument(name = "handler::register_preflight", skip(app_state, auth, path), fields(event_id = %path.as_ref()))]
pub async fn register_preflight_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedCaller,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let event = pipelines::check_registration(&app_state, auth.caller, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({
    "event": event,
    "price": event.price_display(),
    "can_register": true,
  })))
}

#[instrument(name = "handler::register", skip(app_state, auth, path), fields(event_id = %path.as_ref()))]
pub async fn register_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedCaller,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let registration = pipelines::initiate_registration(&app_state, auth.caller, path.into_inner()).await?;
  Ok(see_other(
    format!("/Registration/Payment/{}", registration.id),
    json!({ "registration": registration }),
  ))
}

#[instrument(name = "handler::payment_page", skip(app_state, auth, path), fields(registration_id = %path.as_ref()))]
pub async fn payment_page_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedCaller,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let page = catalog::payment_page(&app_state, auth.caller, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(page))
}

#[instrument(name = "handler::confirm_payment", skip_all, fields(registration_id = payload.registration_id))]
pub async fn confirm_payment_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedCaller,
  payload: web::Json<ConfirmPaymentPayload>,
) -> Result<HttpResponse, AppError> {
  let ConfirmPaymentPayload {
    registration_id,
    transaction_id,
  } = payload.into_inner();
  let registration = pipelines::record_payment(&app_state, auth.caller, registration_id, transaction_id).await?;
  Ok(see_other(
    format!("/Registration/PaymentSuccess/{}", registration.id),
    json!({ "registration": registration }),
  ))
}

#[instrument(name = "handler::payment_success", skip(app_state, auth, path), fields(registration_id = %path.as_ref()))]
pub async fn payment_success_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedCaller,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let details = catalog::registration_details_for_owner(&app_state, auth.caller, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({
    "message": "Payment successful.",
    "registration": details.registration,
    "event": details.event,
  })))
}

#[instrument(name = "handler::send_confirmation", skip(app_state, auth, path), fields(registration_id = %path.as_ref()))]
pub async fn send_confirmation_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedCaller,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let email = pipelines::send_confirmation(&app_state, auth.caller, path.into_inner()).await?;
  Ok(see_other(
    "/Registration/EmailTickets",
    json!({ "message": "Confirmation email sent.", "ticket_email": email }),
  ))
}

#[instrument(name = "handler::email_tickets", skip_all, fields(user_id = %auth.caller.user_id))]
pub async fn email_tickets_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedCaller,
) -> Result<HttpResponse, AppError> {
  let emails = catalog::ticket_emails(&app_state, auth.caller).await?;
  Ok(HttpResponse::Ok().json(json!({ "emails": emails })))
}

/// A PDF ticket, or the HTML ticket when the PDF cannot be rendered.
#[instrument(name = "handler::download_ticket", skip(app_state, auth), fields(email_id = query.email_id))]
pub async fn download_ticket_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedCaller,
  query: web::Query<DownloadTicketQuery>,
) -> Result<HttpResponse, AppError> {
  let details = catalog::ticket_for_download(&app_state, auth.caller, query.email_id).await?;

  match pdf::render_ticket(&app_state.config, &details) {
    Ok(bytes) => {
      info!(registration_id = details.registration.id, size = bytes.len(), "Ticket PDF rendered.");
      Ok(
        HttpResponse::Ok()
          .content_type("application/pdf")
          .insert_header(ContentDisposition::attachment(pdf::ticket_file_name(&details)))
          .body(bytes),
      )
    }
    Err(e) => {
      warn!(error = %e, "Ticket PDF unavailable; serving HTML ticket.");
      Ok(
        HttpResponse::Ok()
          .content_type("text/html; charset=utf-8")
          .body(ticket::ticket_html(&details)),
      )
    }
  }
}
