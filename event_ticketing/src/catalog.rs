// event_ticketing/src/catalog.rs

//! Read models and admin event maintenance.
//!
//! These operations are single queries (or a query plus a check), so they run
//! directly against one unit of work instead of through a pipeline.

use crate::auth::{authorize_owner, require_admin, Caller};
use crate::db::UnitOfWork;
use crate::errors::{AppError, Result as AppResult};
use crate::models::{Attendee, Event, EventInput, RegistrationDetails, TicketEmailEntry, UserTicket};
use crate::services::payment::{self, CURRENCY};
use crate::state::AppState;
use serde::Serialize;
use tracing::{event, info, instrument, Level};

/// Data for the payment page of one pending registration.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentPage {
  pub registration_id: i64,
  pub event_id: i64,
  pub event_title: String,
  pub order_id: String,
  pub amount: String,
  pub amount_cents: i64,
  pub currency: &'static str,
  pub payment_link: String,
  /// `payment_link` resolved against the configured public base URL.
  pub payment_url: String,
  pub payment_provider_key_id: String,
  pub already_paid: bool,
}

/// Commits `result`'s unit of work on success and rolls it back otherwise.
async fn finish<R>(uow: UnitOfWork, result: AppResult<R>) -> AppResult<R> {
  match result {
    Ok(value) => {
      uow.commit().await?;
      Ok(value)
    }
    Err(err) => {
      if let Err(rollback_err) = uow.rollback().await {
        event!(Level::ERROR, error = %rollback_err, "Rollback failed.");
      }
      Err(err)
    }
  }
}

fn event_not_found(id: i64) -> AppError {
  AppError::NotFound(format!("Event {} not found.", id))
}

fn registration_not_found(id: i64) -> AppError {
  AppError::NotFound(format!("Registration {} not found.", id))
}

#[instrument(name = "catalog::list_events", skip_all, err(Display))]
pub async fn list_events(state: &AppState) -> AppResult<Vec<Event>> {
  let uow = UnitOfWork::begin(state.store.as_ref()).await?;
  let result = uow.lock().await.list_events().await;
  finish(uow, result).await
}

/// GetEvent.
#[instrument(name = "catalog::get_event", skip(state), err(Display))]
pub async fn get_event(state: &AppState, event_id: i64) -> AppResult<Event> {
  let uow = UnitOfWork::begin(state.store.as_ref()).await?;
  let result = uow.lock().await.find_event(event_id).await;
  finish(uow, result.and_then(|e| e.ok_or_else(|| event_not_found(event_id)))).await
}

#[instrument(name = "catalog::create_event", skip(state, input), fields(title = %input.title), err(Display))]
pub async fn create_event(state: &AppState, caller: Caller, input: EventInput) -> AppResult<Event> {
  require_admin(&caller)?;
  input.validate()?;
  let uow = UnitOfWork::begin(state.store.as_ref()).await?;
  let result = uow.lock().await.insert_event(&input).await;
  let created = finish(uow, result).await?;
  info!(event_id = created.id, "Event created.");
  Ok(created)
}

#[instrument(name = "catalog::update_event", skip(state, input), err(Display))]
pub async fn update_event(state: &AppState, caller: Caller, event_id: i64, input: EventInput) -> AppResult<Event> {
  require_admin(&caller)?;
  input.validate()?;
  let uow = UnitOfWork::begin(state.store.as_ref()).await?;
  let result = uow.lock().await.update_event(event_id, &input).await;
  let updated = finish(uow, result.and_then(|e| e.ok_or_else(|| event_not_found(event_id)))).await?;
  info!(event_id, "Event updated.");
  Ok(updated)
}

/// Deletes the event along with its registrations and their ticket emails.
#[instrument(name = "catalog::delete_event", skip(state), err(Display))]
pub async fn delete_event(state: &AppState, caller: Caller, event_id: i64) -> AppResult<()> {
  require_admin(&caller)?;
  let uow = UnitOfWork::begin(state.store.as_ref()).await?;
  let result = uow.lock().await.delete_event(event_id).await;
  let result = result.and_then(|deleted| if deleted { Ok(()) } else { Err(event_not_found(event_id)) });
  finish(uow, result).await?;
  info!(event_id, "Event deleted.");
  Ok(())
}

/// ListUserTickets: the caller's registrations in insertion order.
#[instrument(name = "catalog::user_tickets", skip(state), fields(user_id = %caller.user_id), err(Display))]
pub async fn list_user_tickets(state: &AppState, caller: Caller) -> AppResult<Vec<UserTicket>> {
  let uow = UnitOfWork::begin(state.store.as_ref()).await?;
  let result = uow.lock().await.tickets_for_user(caller.user_id).await;
  finish(uow, result).await
}

/// ListRegistrationsForEvent, together with the event itself.
#[instrument(name = "catalog::event_registrations", skip(state), err(Display))]
pub async fn list_registrations_for_event(
  state: &AppState,
  caller: Caller,
  event_id: i64,
) -> AppResult<(Event, Vec<Attendee>)> {
  require_admin(&caller)?;
  let uow = UnitOfWork::begin(state.store.as_ref()).await?;
  let result = {
    let mut tx = uow.lock().await;
    match tx.find_event(event_id).await {
      Ok(Some(found)) => tx.attendees_for_event(event_id).await.map(|rows| (found, rows)),
      Ok(None) => Err(event_not_found(event_id)),
      Err(e) => Err(e),
    }
  };
  finish(uow, result).await
}

/// A registration with its event and user, visible to its owner only.
#[instrument(name = "catalog::registration_details", skip(state), fields(user_id = %caller.user_id), err(Display))]
pub async fn registration_details_for_owner(
  state: &AppState,
  caller: Caller,
  registration_id: i64,
) -> AppResult<RegistrationDetails> {
  let uow = UnitOfWork::begin(state.store.as_ref()).await?;
  let result = uow.lock().await.registration_details(registration_id).await;
  let result = result
    .and_then(|d| d.ok_or_else(|| registration_not_found(registration_id)))
    .and_then(|d| authorize_owner(&caller, &d.registration).map(|_| d));
  finish(uow, result).await
}

#[instrument(name = "catalog::payment_page", skip(state), fields(user_id = %caller.user_id), err(Display))]
pub async fn payment_page(state: &AppState, caller: Caller, registration_id: i64) -> AppResult<PaymentPage> {
  let details = registration_details_for_owner(state, caller, registration_id).await?;
  let RegistrationDetails { registration, event, .. } = details;
  let payment_link = payment::payment_link(registration.id, event.price_cents);
  Ok(PaymentPage {
    registration_id: registration.id,
    event_id: event.id,
    event_title: event.title.clone(),
    order_id: payment::order_ref(registration.id),
    amount: event.price_display(),
    amount_cents: event.price_cents,
    currency: CURRENCY,
    payment_url: format!("{}{}", state.config.app_base_url.trim_end_matches('/'), payment_link),
    payment_link,
    payment_provider_key_id: state.config.payment_provider_key_id.clone(),
    already_paid: registration.is_paid(),
  })
}

/// The caller's ticket emails, newest first.
#[instrument(name = "catalog::ticket_emails", skip(state), fields(user_id = %caller.user_id), err(Display))]
pub async fn ticket_emails(state: &AppState, caller: Caller) -> AppResult<Vec<TicketEmailEntry>> {
  let uow = UnitOfWork::begin(state.store.as_ref()).await?;
  let result = uow.lock().await.ticket_emails_for_user(caller.user_id).await;
  finish(uow, result).await
}

/// The paid registration behind one of the caller's ticket emails.
///
/// `NotFound` when the email belongs to someone else, `PaymentNotCompleted`
/// while the registration is still pending.
#[instrument(name = "catalog::ticket_for_download", skip(state), fields(user_id = %caller.user_id), err(Display))]
pub async fn ticket_for_download(state: &AppState, caller: Caller, email_id: i64) -> AppResult<RegistrationDetails> {
  let uow = UnitOfWork::begin(state.store.as_ref()).await?;
  let result = {
    let mut tx = uow.lock().await;
    match tx.find_ticket_email_for_user(email_id, caller.user_id).await {
      Ok(Some(email)) => tx
        .registration_details(email.registration_id)
        .await
        .and_then(|d| d.ok_or_else(|| registration_not_found(email.registration_id))),
      Ok(None) => Err(AppError::NotFound(format!("Ticket email {} not found.", email_id))),
      Err(e) => Err(e),
    }
  };
  let details = finish(uow, result).await?;
  if !details.registration.is_paid() {
    info!(registration_id = details.registration.id, "Ticket requested before payment.");
    return Err(AppError::PaymentNotCompleted);
  }
  Ok(details)
}
