// event_ticketing/src/web/handlers/admin_handlers.rs

use actix_web::http::header::ContentDisposition;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use super::see_other;
use crate::catalog;
use crate::errors::AppError;
use crate::models::EventInput;
use crate::reports::{pdf, xlsx, RegistrationReport};
use crate::state::AppState;
use crate::web::extractors::AdminCaller;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ExportQuery {
  pub event_id: i64,
  #[serde(default)]
  pub format: ExportFormat,
}

#[derive(Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
  #[default]
  Xlsx,
  Csv,
}

#[instrument(name = "handler::admin_index", skip_all)]
pub async fn admin_index_handler(app_state: web::Data<AppState>, _admin: AdminCaller) -> Result<HttpResponse, AppError> {
  let events = catalog::list_events(&app_state).await?;
  Ok(HttpResponse::Ok().json(json!({ "events": events })))
}

#[instrument(name = "handler::create_event", skip_all, fields(title = %payload.title))]
pub async fn create_event_handler(
  app_state: web::Data<AppState>,
  AdminCaller(caller): AdminCaller,
  payload: web::Json<EventInput>,
) -> Result<HttpResponse, AppError> {
  let event = catalog::create_event(&app_state, caller, payload.into_inner()).await?;
  Ok(see_other("/Admin", json!({ "event": event })))
}

#[instrument(name = "handler::edit_event_form", skip(app_state, _admin, path), fields(event_id = %path.as_ref()))]
pub async fn edit_event_form_handler(
  app_state: web::Data<AppState>,
  _admin: AdminCaller,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let event = catalog::get_event(&app_state, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "event": event })))
}

#[instrument(name = "handler::edit_event", skip(app_state, caller, path, payload), fields(event_id = %path.as_ref()))]
pub async fn edit_event_handler(
  app_state: web::Data<AppState>,
  AdminCaller(caller): AdminCaller,
  path: web::Path<i64>,
  payload: web::Json<EventInput>,
) -> Result<HttpResponse, AppError> {
  let event = catalog::update_event(&app_state, caller, path.into_inner(), payload.into_inner()).await?;
  Ok(see_other("/Admin", json!({ "event": event })))
}

/// Confirmation data shown before a delete.
#[instrument(name = "handler::delete_event_form", skip(app_state, _admin, path), fields(event_id = %path.as_ref()))]
pub async fn delete_event_form_handler(
  app_state: web::Data<AppState>,
  _admin: AdminCaller,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let event = catalog::get_event(&app_state, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({
    "event": event,
    "warning": "Deleting the event also deletes its registrations and ticket emails.",
  })))
}

#[instrument(name = "handler::delete_event", skip(app_state, caller, path), fields(event_id = %path.as_ref()))]
pub async fn delete_event_handler(
  app_state: web::Data<AppState>,
  AdminCaller(caller): AdminCaller,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let event_id = path.into_inner();
  catalog::delete_event(&app_state, caller, event_id).await?;
  Ok(see_other("/Admin", json!({ "message": "Event deleted.", "event_id": event_id })))
}

#[instrument(name = "handler::event_registrations", skip(app_state, caller, path), fields(event_id = %path.as_ref()))]
pub async fn event_registrations_handler(
  app_state: web::Data<AppState>,
  AdminCaller(caller): AdminCaller,
  path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let (event, registrations) = catalog::list_registrations_for_event(&app_state, caller, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({
    "event": event,
    "total": registrations.len(),
    "registrations": registrations,
  })))
}

async fn build_report(app_state: &AppState, caller: crate::auth::Caller, event_id: i64) -> Result<RegistrationReport, AppError> {
  let (event, attendees) = catalog::list_registrations_for_event(app_state, caller, event_id).await?;
  Ok(RegistrationReport::build(&event, &attendees))
}

#[instrument(name = "handler::export_pdf", skip(app_state, caller), fields(event_id = query.event_id))]
pub async fn export_pdf_handler(
  app_state: web::Data<AppState>,
  AdminCaller(caller): AdminCaller,
  query: web::Query<ExportQuery>,
) -> Result<HttpResponse, AppError> {
  let report = build_report(&app_state, caller, query.event_id).await?;
  let bytes = pdf::render_report(&app_state.config, &report)?;
  info!(rows = report.total, size = bytes.len(), "Registration PDF exported.");
  Ok(
    HttpResponse::Ok()
      .content_type("application/pdf")
      .insert_header(ContentDisposition::attachment(report.pdf_file_name()))
      .body(bytes),
  )
}

/// Spreadsheet export: xlsx unless `format=csv` is requested.
#[instrument(name = "handler::export_excel", skip(app_state, caller), fields(event_id = query.event_id, format = ?query.format))]
pub async fn export_excel_handler(
  app_state: web::Data<AppState>,
  AdminCaller(caller): AdminCaller,
  query: web::Query<ExportQuery>,
) -> Result<HttpResponse, AppError> {
  let report = build_report(&app_state, caller, query.event_id).await?;
  let (content_type, file_name, bytes) = match query.format {
    ExportFormat::Xlsx => (xlsx::CONTENT_TYPE, report.xlsx_file_name(), xlsx::render_report(&report)?),
    ExportFormat::Csv => ("text/csv; charset=utf-8", report.csv_file_name(), report.to_csv().into_bytes()),
  };
  info!(rows = report.total, size = bytes.len(), "Registration spreadsheet exported.");
  Ok(
    HttpResponse::Ok()
      .content_type(content_type)
      .insert_header(ContentDisposition::attachment(file_name))
      .body(bytes),
  )
}
