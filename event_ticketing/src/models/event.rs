// event_ticketing/src/models/event.rs

use crate::errors::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Event {
  pub id: i64,
  pub title: String,
  pub description: String,
  pub date: DateTime<Utc>,
  pub registration_deadline: DateTime<Utc>,
  pub price_cents: i64,
  pub created_at: DateTime<Utc>,
}

impl Event {
  /// Registration stays open up to and including the deadline instant.
  pub fn registration_open_at(&self, now: DateTime<Utc>) -> bool {
    now <= self.registration_deadline
  }

  pub fn price_display(&self) -> String {
    format_amount(self.price_cents)
  }
}

/// Renders integer cents as a decimal amount, e.g. `49900` as `499.00`.
pub fn format_amount(cents: i64) -> String {
  let sign = if cents < 0 { "-" } else { "" };
  let abs = cents.unsigned_abs();
  format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

/// Admin form payload for creating or editing an event.
#[derive(Debug, Clone, Deserialize)]
pub struct EventInput {
  pub title: String,
  pub description: String,
  pub date: DateTime<Utc>,
  pub registration_deadline: DateTime<Utc>,
  pub price_cents: i64,
}

impl EventInput {
  pub fn validate(&self) -> Result<(), AppError> {
    if self.title.trim().is_empty() {
      return Err(AppError::Validation("Event title is required.".to_string()));
    }
    if self.description.trim().is_empty() {
      return Err(AppError::Validation("Event description is required.".to_string()));
    }
    if self.price_cents < 0 {
      return Err(AppError::Validation("Price cannot be negative.".to_string()));
    }
    if self.registration_deadline > self.date {
      return Err(AppError::Validation(
        "Registration deadline must not be after the event date.".to_string(),
      ));
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Duration;

  fn input() -> EventInput {
    let now = Utc::now();
    EventInput {
      title: "RustConf".to_string(),
      description: "Talks".to_string(),
      date: now + Duration::days(10),
      registration_deadline: now + Duration::days(5),
      price_cents: 49900,
    }
  }

  #[test]
  fn amount_formatting() {
    assert_eq!(format_amount(49900), "499.00");
    assert_eq!(format_amount(5), "0.05");
    assert_eq!(format_amount(0), "0.00");
  }

  #[test]
  fn input_validation() {
    assert!(input().validate().is_ok());

    let mut blank = input();
    blank.title = "   ".to_string();
    assert!(matches!(blank.validate(), Err(AppError::Validation(_))));

    let mut negative = input();
    negative.price_cents = -1;
    assert!(matches!(negative.validate(), Err(AppError::Validation(_))));

    let mut late = input();
    late.registration_deadline = late.date + Duration::hours(1);
    assert!(matches!(late.validate(), Err(AppError::Validation(_))));
  }

  #[test]
  fn deadline_is_inclusive() {
    let i = input();
    let event = Event {
      id: 1,
      title: i.title,
      description: i.description,
      date: i.date,
      registration_deadline: i.registration_deadline,
      price_cents: i.price_cents,
      created_at: Utc::now(),
    };
    assert!(event.registration_open_at(event.registration_deadline));
    assert!(!event.registration_open_at(event.registration_deadline + Duration::seconds(1)));
  }
}
