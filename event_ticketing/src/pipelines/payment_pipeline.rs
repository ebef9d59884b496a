// event_ticketing/src/pipelines/payment_pipeline.rs

use super::contexts::RecordPaymentCtxData;
use super::{expect_completed, loaded, run_in_unit_of_work};
use crate::auth::{authorize_owner, Caller};
use crate::errors::{AppError, Result as AppResult};
use crate::models::Registration;
use crate::services::messages::receipt_message;
use crate::state::AppState;
use ticketflow::{ContextData, Pipeline, StepControl};
use tracing::{info, instrument, warn};

type Ctx = ContextData<RecordPaymentCtxData>;

pub(crate) fn build() -> AppResult<Pipeline<RecordPaymentCtxData, AppError>> {
  let mut p = Pipeline::<RecordPaymentCtxData, AppError>::with_steps(
    "record_payment",
    &[
      ("load_registration", false),
      ("authorize_payer", false),
      ("resolve_transaction_id", false),
      ("record_payment", false),
      ("send_payment_receipt", true),
    ],
  )?;

  p.on("load_registration", |ctx: Ctx| async move {
    let (uow, registration_id) = ctx.with(|c| (c.uow.clone(), c.registration_id));
    let registration = uow
      .lock()
      .await
      .find_registration(registration_id)
      .await?
      .ok_or_else(|| AppError::NotFound(format!("Registration {} not found.", registration_id)))?;
    ctx.write().registration = Some(registration);
    Ok::<_, AppError>(StepControl::Continue)
  })?;

  p.on("authorize_payer", |ctx: Ctx| async move {
    ctx.with(|c| authorize_owner(&c.caller, &loaded(&c.registration, "the registration")?))?;
    Ok::<_, AppError>(StepControl::Continue)
  })?;

  p.on("resolve_transaction_id", |ctx: Ctx| async move {
    ctx.update(|c| {
      let supplied = c
        .transaction_id
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);
      let transaction_id = supplied.unwrap_or_else(|| {
        let generated = c.app_state.transactions.generate();
        info!(transaction_id = %generated, "No transaction id supplied; generated one.");
        generated
      });
      c.transaction_id = Some(transaction_id);
    });
    Ok::<_, AppError>(StepControl::Continue)
  })?;

  p.on("record_payment", record_payment_step)?;

  p.on("send_payment_receipt", send_payment_receipt)?;
  p.skip_step_if("send_payment_receipt", |data| !data.send_receipt)?;

  Ok(p)
}

async fn record_payment_step(ctx: Ctx) -> AppResult<StepControl> {
  let (uow, previous, transaction_id) = ctx.with(|c| {
    (
      c.uow.clone(),
      loaded(&c.registration, "the registration"),
      loaded(&c.transaction_id, "the transaction id"),
    )
  });
  let (previous, transaction_id) = (previous?, transaction_id?);

  // No idempotency guard: a second payment overwrites the stored id.
  if let Some(old) = previous.transaction_id.as_deref() {
    warn!(
      registration_id = previous.id,
      old_transaction_id = %old,
      new_transaction_id = %transaction_id,
      "Overwriting transaction id of an already paid registration."
    );
  }

  let updated = uow
    .lock()
    .await
    .mark_paid(previous.id, &transaction_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Registration {} not found.", previous.id)))?;
  info!(registration_id = updated.id, %transaction_id, "Payment recorded.");
  ctx.write().registration = Some(updated);
  Ok(StepControl::Continue)
}

/// Failures are logged and swallowed; the payment stays recorded.
async fn send_payment_receipt(ctx: Ctx) -> AppResult<StepControl> {
  let (uow, notifier, registration_id) =
    ctx.with(|c| (c.uow.clone(), c.app_state.notifier.clone(), c.registration_id));

  let details = match uow.lock().await.registration_details(registration_id).await {
    Ok(Some(details)) => details,
    Ok(None) => {
      warn!(registration_id, "Receipt skipped: registration details missing.");
      return Ok(StepControl::Continue);
    }
    Err(e) => {
      warn!(registration_id, error = %e, "Receipt skipped: could not load registration details.");
      return Ok(StepControl::Continue);
    }
  };

  let message = receipt_message(&details);
  match notifier
    .send_email(&details.user.email, &message.subject, &message.body_html)
    .await
  {
    Ok(sent) => {
      info!(message_id = %sent.message_id, "Payment receipt sent.");
      ctx.write().receipt = Some(sent);
    }
    Err(e) => warn!(registration_id, error = %e, "Payment receipt could not be sent."),
  }
  Ok(StepControl::Continue)
}

async fn run(
  state: &AppState,
  caller: Caller,
  registration_id: i64,
  transaction_id: Option<String>,
  send_receipt: bool,
) -> AppResult<Registration> {
  let app_state = state.clone();
  run_in_unit_of_work(
    state,
    move |uow| RecordPaymentCtxData {
      app_state,
      uow,
      caller,
      registration_id,
      transaction_id,
      send_receipt,
      registration: None,
      receipt: None,
    },
    |outcome, data| {
      expect_completed(outcome, "Payment")?;
      loaded(&data.registration, "the registration")
    },
  )
  .await
}

/// RecordPayment: `Pending -> Success` with the given (or a generated) transaction id.
#[instrument(name = "payment::record", skip(state, transaction_id), fields(user_id = %caller.user_id), err(Display))]
pub async fn record_payment(
  state: &AppState,
  caller: Caller,
  registration_id: i64,
  transaction_id: Option<String>,
) -> AppResult<Registration> {
  run(state, caller, registration_id, transaction_id, false).await
}

/// Stub gateway completion: generates the transaction id and emails a receipt.
#[instrument(name = "payment::complete_stub", skip(state), fields(user_id = %caller.user_id), err(Display))]
pub async fn complete_stub_payment(state: &AppState, caller: Caller, registration_id: i64) -> AppResult<Registration> {
  run(state, caller, registration_id, None, true).await
}
