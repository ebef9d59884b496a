// event_ticketing/src/pipelines/signup_pipeline.rs

use super::contexts::SignupCtxData;
use super::{loaded, run_in_unit_of_work};
use crate::config::AdminSeed;
use crate::errors::{AppError, Result as AppResult};
use crate::models::{NewUser, Role, User};
use crate::services::auth_service;
use crate::state::AppState;
use ticketflow::{ContextData, Pipeline, RunOutcome, StepControl};
use tracing::{event, info, instrument, warn, Level};

type Ctx = ContextData<SignupCtxData>;

pub(crate) fn build() -> AppResult<Pipeline<SignupCtxData, AppError>> {
  let mut signup_p = Pipeline::<SignupCtxData, AppError>::with_steps(
    "signup",
    &[
      ("validate_signup_input", false),
      ("check_existing_user", false),
      ("create_user", false),
    ],
  )?;

  signup_p.on("validate_signup_input", |ctx: Ctx| async move {
    // Later steps look up and store exactly what is validated here.
    let (name, email, password) = ctx.update(|c| {
      c.name = c.name.trim().to_string();
      c.email = c.email.trim().to_string();
      (c.name.clone(), c.email.clone(), c.password.clone())
    });

    event!(Level::DEBUG, %email, "Validating signup input.");
    if name.is_empty() {
      return Err(AppError::Validation("Name is required.".to_string()));
    }
    if email.is_empty() || !email.contains('@') {
      warn!("Invalid email format provided for signup.");
      return Err(AppError::Validation("Valid email is required.".to_string()));
    }
    auth_service::check_password_policy(&password)?;
    Ok::<_, AppError>(StepControl::Continue)
  })?;

  signup_p.on("check_existing_user", |ctx: Ctx| async move {
    let (uow, email, existing_is_ok) = ctx.with(|c| (c.uow.clone(), c.email.clone(), c.existing_is_ok));

    let existing = uow.lock().await.find_user_by_email(&email).await?;
    match existing {
      Some(user) if existing_is_ok => {
        info!(%email, "User already exists; nothing to create.");
        ctx.write().user = Some(user);
        Ok(StepControl::Stop)
      }
      Some(_) => {
        warn!(%email, "Attempt to sign up with an existing email.");
        Err(AppError::Validation("An account with this email already exists.".to_string()))
      }
      None => Ok(StepControl::Continue),
    }
  })?;

  signup_p.on("create_user", |ctx: Ctx| async move {
    let (uow, new_user) = ctx.with(|c| {
      (
        c.uow.clone(),
        (c.name.clone(), c.email.clone(), c.phone.clone(), c.password.clone(), c.role),
      )
    });
    let (name, email, phone, password, role) = new_user;

    let password_hash = auth_service::hash_password(&password)?;
    let phone = phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty());
    let user = uow
      .lock()
      .await
      .insert_user(NewUser {
        name,
        email,
        phone,
        password_hash,
        role,
      })
      .await?;

    info!(user_id = %user.id, email = %user.email, role = ?user.role, "User created.");
    ctx.update(|c| {
      c.user = Some(user);
      c.created = true;
    });
    Ok::<_, AppError>(StepControl::Continue)
  })?;

  Ok(signup_p)
}

async fn run(
  state: &AppState,
  name: String,
  email: String,
  phone: Option<String>,
  password: String,
  role: Role,
  existing_is_ok: bool,
) -> AppResult<(User, bool)> {
  let app_state = state.clone();
  run_in_unit_of_work(
    state,
    move |uow| SignupCtxData {
      app_state,
      uow,
      name,
      email,
      phone,
      password,
      role,
      existing_is_ok,
      user: None,
      created: false,
    },
    |outcome, data| {
      let user = loaded(&data.user, "the user")?;
      match outcome {
        RunOutcome::Completed => Ok((user, data.created)),
        RunOutcome::Stopped if data.existing_is_ok => Ok((user, false)),
        RunOutcome::Stopped => Err(AppError::Internal("Signup was halted by an internal step.".to_string())),
      }
    },
  )
  .await
}

/// Signup: a new account with role `User`.
#[instrument(name = "account::sign_up", skip(state, password, phone), err(Display))]
pub async fn sign_up(
  state: &AppState,
  name: String,
  email: String,
  phone: Option<String>,
  password: String,
) -> AppResult<User> {
  let (user, _) = run(state, name, email, phone, password, Role::User, false).await?;
  Ok(user)
}

/// Creates the configured administrator unless that email is already taken.
/// Returns whether a user was created.
#[instrument(name = "account::seed_admin", skip_all, fields(email = %seed.email), err(Display))]
pub async fn seed_admin(state: &AppState, seed: &AdminSeed) -> AppResult<bool> {
  let (user, created) = run(
    state,
    seed.name.clone(),
    seed.email.clone(),
    None,
    seed.password.clone(),
    Role::Admin,
    true,
  )
  .await?;
  if !created && user.role != Role::Admin {
    warn!(user_id = %user.id, "Seed email belongs to a non-admin account; leaving it unchanged.");
  }
  Ok(created)
}
