// event_ticketing/src/pipelines/confirmation_pipeline.rs

use super::contexts::SendConfirmationCtxData;
use super::{expect_completed, loaded, run_in_unit_of_work};
use crate::auth::{authorize_owner, Caller};
use crate::errors::{AppError, Result as AppResult};
use crate::models::{NewTicketEmail, TicketEmail};
use crate::services::messages::confirmation_message;
use crate::state::AppState;
use ticketflow::{ContextData, Pipeline, StepControl};
use tracing::{event, info, instrument, Level};

type Ctx = ContextData<SendConfirmationCtxData>;

pub(crate) fn build() -> AppResult<Pipeline<SendConfirmationCtxData, AppError>> {
  let mut p = Pipeline::<SendConfirmationCtxData, AppError>::with_steps(
    "send_confirmation",
    &[
      ("load_registration_details", false),
      ("authorize_recipient", false),
      ("compose_confirmation", false),
      ("dispatch_email", false),
      ("record_ticket_email", false),
    ],
  )?;

  p.on("load_registration_details", |ctx: Ctx| async move {
    let (uow, registration_id) = ctx.with(|c| (c.uow.clone(), c.registration_id));
    let details = uow
      .lock()
      .await
      .registration_details(registration_id)
      .await?
      .ok_or_else(|| AppError::NotFound(format!("Registration {} not found.", registration_id)))?;
    ctx.write().details = Some(details);
    Ok::<_, AppError>(StepControl::Continue)
  })?;

  p.on("authorize_recipient", |ctx: Ctx| async move {
    ctx.with(|c| {
      let details = loaded(&c.details, "the registration details")?;
      authorize_owner(&c.caller, &details.registration)
    })?;
    Ok::<_, AppError>(StepControl::Continue)
  })?;

  p.on("compose_confirmation", |ctx: Ctx| async move {
    ctx.update(|c| {
      let details = loaded(&c.details, "the registration details")?;
      let message = confirmation_message(&details.user, &details.event);
      c.subject = Some(message.subject);
      c.body_html = Some(message.body_html);
      Ok::<_, AppError>(())
    })?;
    Ok::<_, AppError>(StepControl::Continue)
  })?;

  p.on("dispatch_email", dispatch_email)?;
  p.on("record_ticket_email", record_ticket_email)?;

  Ok(p)
}

/// Transport failures are logged; the ticket email row is written regardless.
async fn dispatch_email(ctx: Ctx) -> AppResult<StepControl> {
  let (notifier, details, subject, body_html) = ctx.with(|c| {
    (
      c.app_state.notifier.clone(),
      loaded(&c.details, "the registration details"),
      loaded(&c.subject, "the subject"),
      loaded(&c.body_html, "the body"),
    )
  });
  let (details, subject, body_html) = (details?, subject?, body_html?);

  match notifier.send_email(&details.user.email, &subject, &body_html).await {
    Ok(sent) => {
      info!(message_id = %sent.message_id, to = %sent.to, "Confirmation email handed to transport.");
      ctx.write().delivered = Some(sent);
    }
    Err(e) => event!(
      Level::WARN,
      registration_id = details.registration.id,
      error = %e,
      "Confirmation email failed; recording it anyway."
    ),
  }
  Ok(StepControl::Continue)
}

async fn record_ticket_email(ctx: Ctx) -> AppResult<StepControl> {
  let (uow, details, subject, body_html) = ctx.with(|c| {
    (
      c.uow.clone(),
      loaded(&c.details, "the registration details"),
      loaded(&c.subject, "the subject"),
      loaded(&c.body_html, "the body"),
    )
  });
  let details = details?;
  let new_row = NewTicketEmail {
    user_id: details.registration.user_id,
    registration_id: details.registration.id,
    subject: subject?,
    body_html: body_html?,
  };
  let row = uow.lock().await.insert_ticket_email(new_row).await?;
  info!(ticket_email_id = row.id, registration_id = row.registration_id, "Ticket email recorded.");
  ctx.write().ticket_email = Some(row);
  Ok(StepControl::Continue)
}

/// SendConfirmation: emails the owner and appends one TicketEmail row.
#[instrument(name = "confirmation::send", skip(state), fields(user_id = %caller.user_id), err(Display))]
pub async fn send_confirmation(state: &AppState, caller: Caller, registration_id: i64) -> AppResult<TicketEmail> {
  let app_state = state.clone();
  run_in_unit_of_work(
    state,
    move |uow| SendConfirmationCtxData {
      app_state,
      uow,
      caller,
      registration_id,
      details: None,
      subject: None,
      body_html: None,
      delivered: None,
      ticket_email: None,
    },
    |outcome, data| {
      expect_completed(outcome, "Confirmation")?;
      loaded(&data.ticket_email, "the ticket email")
    },
  )
  .await
}
