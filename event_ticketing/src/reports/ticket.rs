// event_ticketing/src/reports/ticket.rs

use crate::models::RegistrationDetails;
use crate::services::messages::{escape_html, long_date};

/// HTML ticket served when the PDF cannot be rendered.
pub fn ticket_html(details: &RegistrationDetails) -> String {
  let RegistrationDetails { registration, event, user } = details;
  let transaction = registration.transaction_id.as_deref().unwrap_or("N/A");
  format!(
    "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>Ticket {id}</title></head><body>\
<h1>{title}</h1>\
<p><strong>Attendee:</strong> {name}</p>\
<p><strong>Email:</strong> {email}</p>\
<p><strong>Date:</strong> {date}</p>\
<p><strong>Ticket No.:</strong> {id}</p>\
<p><strong>Amount:</strong> {amount}</p>\
<p><strong>Payment:</strong> {status}</p>\
<p><strong>Transaction:</strong> {transaction}</p>\
</body></html>",
    id = registration.id,
    title = escape_html(&event.title),
    name = escape_html(&user.name),
    email = escape_html(&user.email),
    date = long_date(event.date),
    amount = event.price_display(),
    status = registration.payment_status,
    transaction = escape_html(transaction),
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::{Event, PaymentStatus, Registration, Role, User};
  use chrono::{TimeZone, Utc};
  use uuid::Uuid;

  #[test]
  fn escapes_user_text() {
    let when = Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap();
    let user_id = Uuid::new_v4();
    let details = RegistrationDetails {
      registration: Registration {
        id: 12,
        user_id,
        event_id: 2,
        payment_status: PaymentStatus::Success,
        transaction_id: Some("TXN_AB".to_string()),
        created_at: when,
      },
      event: Event {
        id: 2,
        title: "<Meetup>".to_string(),
        description: "d".to_string(),
        date: when,
        registration_deadline: when,
        price_cents: 49900,
        created_at: when,
      },
      user: User {
        id: user_id,
        name: "Ana & Co".to_string(),
        email: "ana@example.com".to_string(),
        phone: None,
        password_hash: String::new(),
        role: Role::User,
        created_at: when,
      },
    };
    let html = ticket_html(&details);
    assert!(html.contains("<h1>&lt;Meetup&gt;</h1>"));
    assert!(html.contains("Ana &amp; Co"));
    assert!(html.contains("Friday, 01 May 2026"));
    assert!(html.contains("TXN_AB"));
    assert!(html.contains("499.00"));
  }
}
