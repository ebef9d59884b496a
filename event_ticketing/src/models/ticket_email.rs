// event_ticketing/src/models/ticket_email.rs

use super::{Event, Registration};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Append-only record of a confirmation email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct TicketEmail {
  pub id: i64,
  pub user_id: Uuid,
  pub registration_id: i64,
  pub subject: String,
  pub body_html: String,
  pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTicketEmail {
  pub user_id: Uuid,
  pub registration_id: i64,
  pub subject: String,
  pub body_html: String,
}

/// An inbox row: the email plus the ticket it confirms.
#[derive(Debug, Clone, Serialize)]
pub struct TicketEmailEntry {
  pub email: TicketEmail,
  pub registration: Registration,
  pub event: Event,
}
