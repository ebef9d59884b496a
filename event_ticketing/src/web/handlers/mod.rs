// event_ticketing/src/web/handlers/mod.rs

pub mod account_handlers;
pub mod admin_handlers;
pub mod event_handlers;
pub mod payment_handlers;
pub mod registration_handlers;

use actix_web::http::header::LOCATION;
use actix_web::HttpResponse;
use serde_json::Value;

/// `303 See Other` to `location`, with a JSON body for API clients.
pub(crate) fn see_other(location: impl Into<String>, body: Value) -> HttpResponse {
  HttpResponse::SeeOther().insert_header((LOCATION, location.into())).json(body)
}
