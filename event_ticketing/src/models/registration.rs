// event_ticketing/src/models/registration.rs

use super::{Event, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use std::fmt;
use uuid::Uuid;

/// `Pending --RecordPayment--> Success`; nothing leaves `Success`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "payment_status_enum")]
pub enum PaymentStatus {
  Pending,
  Success,
}

impl PaymentStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      PaymentStatus::Pending => "Pending",
      PaymentStatus::Success => "Success",
    }
  }
}

impl fmt::Display for PaymentStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Registration {
  pub id: i64,
  pub user_id: Uuid,
  pub event_id: i64,
  pub payment_status: PaymentStatus,
  pub transaction_id: Option<String>,
  pub created_at: DateTime<Utc>,
}

impl Registration {
  pub fn is_paid(&self) -> bool {
    self.payment_status == PaymentStatus::Success
  }
}

/// A registration with both sides of the join loaded.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationDetails {
  pub registration: Registration,
  pub event: Event,
  pub user: User,
}

/// One row of a user's ticket list.
#[derive(Debug, Clone, Serialize)]
pub struct UserTicket {
  pub registration: Registration,
  pub event: Event,
}

/// One row of an event's attendee list.
#[derive(Debug, Clone, Serialize)]
pub struct Attendee {
  pub registration: Registration,
  pub user: User,
}
