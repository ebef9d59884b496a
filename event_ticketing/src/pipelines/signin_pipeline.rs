// event_ticketing/src/pipelines/signin_pipeline.rs

use super::contexts::SigninCtxData;
use super::{expect_completed, loaded, run_in_unit_of_work};
use crate::auth::Caller;
use crate::errors::{AppError, Result as AppResult};
use crate::models::User;
use crate::services::auth_service;
use crate::state::AppState;
use ticketflow::{ContextData, Pipeline, StepControl};
use tracing::{event, info, instrument, warn, Level};

type Ctx = ContextData<SigninCtxData>;

const INVALID_LOGIN: &str = "Invalid login attempt.";

pub(crate) fn build() -> AppResult<Pipeline<SigninCtxData, AppError>> {
  let mut signin_p = Pipeline::<SigninCtxData, AppError>::with_steps(
    "signin",
    &[("find_user", false), ("verify_password", false), ("open_session", false)],
  )?;

  signin_p.on("find_user", |ctx: Ctx| async move {
    let (uow, login) = ctx.with(|c| (c.uow.clone(), c.login.trim().to_string()));
    if login.is_empty() {
      return Err(AppError::Validation("Email or phone number is required.".to_string()));
    }

    event!(Level::DEBUG, %login, "Looking up user for sign-in.");
    let user = {
      let mut tx = uow.lock().await;
      if login.contains('@') {
        tx.find_user_by_email(&login).await?
      } else {
        tx.find_user_by_phone(&login).await?
      }
    };
    match user {
      Some(user) => {
        ctx.write().user = Some(user);
        Ok(StepControl::Continue)
      }
      None => {
        warn!(%login, "Sign-in for unknown user.");
        Err(AppError::Unauthorized(INVALID_LOGIN.to_string()))
      }
    }
  })?;

  signin_p.on("verify_password", |ctx: Ctx| async move {
    let (user, password) = ctx.with(|c| (loaded(&c.user, "the user"), c.password.clone()));
    let user = user?;
    if auth_service::verify_password(&user.password_hash, &password)? {
      Ok(StepControl::Continue)
    } else {
      warn!(user_id = %user.id, "Sign-in with wrong password.");
      Err(AppError::Unauthorized(INVALID_LOGIN.to_string()))
    }
  })?;

  signin_p.on("open_session", |ctx: Ctx| async move {
    ctx.update(|c| {
      let user = loaded(&c.user, "the user")?;
      let token = c.app_state.sessions.open(Caller {
        user_id: user.id,
        role: user.role,
      });
      info!(user_id = %user.id, "Session opened for user.");
      c.session_token = Some(token);
      Ok::<_, AppError>(StepControl::Continue)
    })
  })?;

  Ok(signin_p)
}

/// Signin: checks the credentials and opens a bearer session.
#[instrument(name = "account::sign_in", skip(state, password), err(Display))]
pub async fn sign_in(state: &AppState, login: String, password: String) -> AppResult<(User, String)> {
  let app_state = state.clone();
  run_in_unit_of_work(
    state,
    move |uow| SigninCtxData {
      app_state,
      uow,
      login,
      password,
      user: None,
      session_token: None,
    },
    |outcome, data| {
      expect_completed(outcome, "Sign-in")?;
      Ok((loaded(&data.user, "the user")?, loaded(&data.session_token, "the session token")?))
    },
  )
  .await
}
