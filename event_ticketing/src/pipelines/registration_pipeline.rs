// event_ticketing/src/pipelines/registration_pipeline.rs

use super::contexts::InitiateRegistrationCtxData;
use super::{expect_completed, loaded, run_in_unit_of_work};
use crate::auth::Caller;
use crate::errors::{AppError, Result as AppResult};
use crate::models::{Event, Registration};
use crate::state::AppState;
use chrono::Utc;
use ticketflow::{ContextData, Pipeline, StepControl};
use tracing::{info, instrument, warn};

type Ctx = ContextData<InitiateRegistrationCtxData>;

pub(crate) fn build() -> AppResult<Pipeline<InitiateRegistrationCtxData, AppError>> {
  let mut p = Pipeline::<InitiateRegistrationCtxData, AppError>::with_steps(
    "initiate_registration",
    &[
      ("load_event", false),
      ("check_registration_deadline", false),
      ("check_existing_registration", false),
      ("create_registration", false),
    ],
  )?;

  p.on("load_event", load_event)?;
  p.on("check_registration_deadline", check_registration_deadline)?;
  p.on("check_existing_registration", check_existing_registration)?;
  p.on("create_registration", create_registration)?;
  p.skip_step_if("create_registration", |data| data.dry_run)?;

  Ok(p)
}

async fn load_event(ctx: Ctx) -> AppResult<StepControl> {
  let (uow, event_id) = ctx.with(|c| (c.uow.clone(), c.event_id));
  let event = uow
    .lock()
    .await
    .find_event(event_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Event {} not found.", event_id)))?;
  ctx.write().event = Some(event);
  Ok(StepControl::Continue)
}

async fn check_registration_deadline(ctx: Ctx) -> AppResult<StepControl> {
  let (event, now) = ctx.with(|c| (loaded(&c.event, "the event"), c.now));
  let event = event?;
  if !event.registration_open_at(now) {
    info!(event_id = event.id, deadline = %event.registration_deadline, "Registration closed.");
    return Err(AppError::RegistrationClosed { event_id: event.id });
  }
  Ok(StepControl::Continue)
}

async fn check_existing_registration(ctx: Ctx) -> AppResult<StepControl> {
  let (uow, user_id, event_id) = ctx.with(|c| (c.uow.clone(), c.caller.user_id, c.event_id));
  let existing = uow.lock().await.find_registration_for(user_id, event_id).await?;
  if let Some(existing) = existing {
    info!(registration_id = existing.id, "Caller already registered for event.");
    return Err(AppError::AlreadyRegistered { event_id });
  }
  Ok(StepControl::Continue)
}

async fn create_registration(ctx: Ctx) -> AppResult<StepControl> {
  let (uow, user_id, event_id) = ctx.with(|c| (c.uow.clone(), c.caller.user_id, c.event_id));
  let registration = uow.lock().await.insert_registration(user_id, event_id).await?;
  info!(registration_id = registration.id, %user_id, event_id, "Pending registration created.");
  ctx.write().registration = Some(registration);
  Ok(StepControl::Continue)
}

fn initial(app_state: &AppState, caller: Caller, event_id: i64, dry_run: bool) -> impl FnOnce(crate::db::UnitOfWork) -> InitiateRegistrationCtxData {
  let app_state = app_state.clone();
  move |uow| InitiateRegistrationCtxData {
    app_state,
    uow,
    caller,
    event_id,
    now: Utc::now(),
    dry_run,
    event: None,
    registration: None,
  }
}

/// InitiateRegistration: creates a `Pending` registration for the caller.
#[instrument(name = "registration::initiate", skip(state), fields(user_id = %caller.user_id), err(Display))]
pub async fn initiate_registration(state: &AppState, caller: Caller, event_id: i64) -> AppResult<Registration> {
  run_in_unit_of_work(state, initial(state, caller, event_id, false), |outcome, data| {
    expect_completed(outcome, "Registration")?;
    loaded(&data.registration, "the registration")
  })
  .await
}

/// The same checks as `initiate_registration` without creating anything.
#[instrument(name = "registration::check", skip(state), fields(user_id = %caller.user_id), err(Display))]
pub async fn check_registration(state: &AppState, caller: Caller, event_id: i64) -> AppResult<Event> {
  run_in_unit_of_work(state, initial(state, caller, event_id, true), |outcome, data| {
    expect_completed(outcome, "Registration check")?;
    if data.registration.is_some() {
      warn!("Registration check created a row.");
      return Err(AppError::Internal("Registration check must not create rows.".to_string()));
    }
    loaded(&data.event, "the event")
  })
  .await
}
