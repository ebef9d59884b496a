// event_ticketing/src/pipelines/contexts.rs

//! Context data for each pipeline. Handlers receive these wrapped in
//! `ticketflow::ContextData`.

use crate::auth::Caller;
use crate::db::UnitOfWork;
use crate::models::{Event, Registration, RegistrationDetails, Role, TicketEmail, User};
use crate::services::email::SentEmail;
use crate::state::AppState;
use chrono::{DateTime, Utc};

pub struct InitiateRegistrationCtxData {
  pub app_state: AppState,
  pub uow: UnitOfWork,
  pub caller: Caller,
  pub event_id: i64,
  pub now: DateTime<Utc>,
  /// Run the checks only; `create_registration` is skipped.
  pub dry_run: bool,
  pub event: Option<Event>,
  pub registration: Option<Registration>,
}

pub struct RecordPaymentCtxData {
  pub app_state: AppState,
  pub uow: UnitOfWork,
  pub caller: Caller,
  pub registration_id: i64,
  /// Supplied by the client; generated when absent.
  pub transaction_id: Option<String>,
  pub send_receipt: bool,
  pub registration: Option<Registration>,
  pub receipt: Option<SentEmail>,
}

pub struct SendConfirmationCtxData {
  pub app_state: AppState,
  pub uow: UnitOfWork,
  pub caller: Caller,
  pub registration_id: i64,
  pub details: Option<RegistrationDetails>,
  pub subject: Option<String>,
  pub body_html: Option<String>,
  pub delivered: Option<SentEmail>,
  pub ticket_email: Option<TicketEmail>,
}

pub struct SignupCtxData {
  pub app_state: AppState,
  pub uow: UnitOfWork,
  pub name: String,
  pub email: String,
  pub phone: Option<String>,
  pub password: String,
  pub role: Role,
  /// Stop quietly instead of failing when the email is taken (admin seeding).
  pub existing_is_ok: bool,
  pub user: Option<User>,
  pub created: bool,
}

pub struct SigninCtxData {
  pub app_state: AppState,
  pub uow: UnitOfWork,
  /// Email address or phone number.
  pub login: String,
  pub password: String,
  pub user: Option<User>,
  pub session_token: Option<String>,
}
