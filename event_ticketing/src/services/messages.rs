// event_ticketing/src/services/messages.rs

//! Email subjects and HTML bodies. User-supplied text is escaped.

use crate::models::{Event, RegistrationDetails, User};
use chrono::{DateTime, Utc};

pub const CONFIRMATION_SUBJECT: &str = "Event Registration Confirmation";

pub fn escape_html(input: &str) -> String {
  let mut out = String::with_capacity(input.len());
  for c in input.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      other => out.push(other),
    }
  }
  out
}

/// e.g. `Friday, 05 June 2026`.
pub fn long_date(date: DateTime<Utc>) -> String {
  date.format("%A, %d %B %Y").to_string()
}

pub struct Message {
  pub subject: String,
  pub body_html: String,
}

pub fn confirmation_message(user: &User, event: &Event) -> Message {
  let body_html = format!(
    "<h1>Registration Confirmation</h1>\
     <p>Hi {},</p>\
     <p>Your ticket for <strong>{}</strong> is confirmed!</p>\
     <p>Date: {}</p>\
     <p>Thank you for registering!</p>",
    escape_html(&user.name),
    escape_html(&event.title),
    long_date(event.date),
  );
  Message {
    subject: CONFIRMATION_SUBJECT.to_string(),
    body_html,
  }
}

/// Sent by the stub gateway once it has generated a transaction id.
pub fn receipt_message(details: &RegistrationDetails) -> Message {
  let RegistrationDetails {
    registration,
    event,
    user,
  } = details;
  let body_html = format!(
    "<h1>Ticket Confirmation</h1>\
     <p>Hi {},</p>\
     <p>Your ticket for <strong>{}</strong> is confirmed!</p>\
     <p>Event Date: {}</p>\
     <p>Transaction ID: {}</p>\
     <p>Thank you for registering!</p>",
    escape_html(&user.name),
    escape_html(&event.title),
    long_date(event.date),
    escape_html(registration.transaction_id.as_deref().unwrap_or("N/A")),
  );
  Message {
    subject: format!("Ticket Confirmation for {}", event.title),
    body_html,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::Role;
  use chrono::TimeZone;
  use uuid::Uuid;

  #[test]
  fn confirmation_is_deterministic_and_escaped() {
    let date = Utc.with_ymd_and_hms(2026, 6, 5, 18, 0, 0).unwrap();
    let user = User {
      id: Uuid::new_v4(),
      name: "Ann <script>".to_string(),
      email: "ann@example.com".to_string(),
      phone: None,
      password_hash: String::new(),
      role: Role::User,
      created_at: Utc::now(),
    };
    let event = Event {
      id: 1,
      title: "Rust & Friends".to_string(),
      description: String::new(),
      date,
      registration_deadline: date,
      price_cents: 0,
      created_at: Utc::now(),
    };

    let message = confirmation_message(&user, &event);
    assert_eq!(message.subject, "Event Registration Confirmation");
    assert_eq!(
      message.body_html,
      "<h1>Registration Confirmation</h1><p>Hi Ann &lt;script&gt;,</p>\
       <p>Your ticket for <strong>Rust &amp; Friends</strong> is confirmed!</p>\
       <p>Date: Friday, 05 June 2026</p><p>Thank you for registering!</p>"
    );
    assert_eq!(confirmation_message(&user, &event).body_html, message.body_html);
  }
}
