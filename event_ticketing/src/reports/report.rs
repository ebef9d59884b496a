// event_ticketing/src/reports/report.rs

use crate::models::{Attendee, Event};
use serde::Serialize;

pub const NOT_AVAILABLE: &str = "N/A";
pub const TABLE_HEADER: [&str; 5] = ["User Name", "Email", "Phone", "Payment Status", "Transaction ID"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
  pub user_name: String,
  pub email: String,
  pub phone: String,
  pub payment_status: String,
  pub transaction_id: String,
}

impl ReportRow {
  pub fn cells(&self) -> [&str; 5] {
    [
      &self.user_name,
      &self.email,
      &self.phone,
      &self.payment_status,
      &self.transaction_id,
    ]
  }
}

/// Registrations of one event, flattened for export.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationReport {
  pub title: String,
  /// `YYYY-MM-DD`.
  pub date: String,
  pub total: usize,
  pub rows: Vec<ReportRow>,
}

impl RegistrationReport {
  pub fn build(event: &Event, attendees: &[Attendee]) -> Self {
    let rows = attendees
      .iter()
      .map(|a| ReportRow {
        user_name: a.user.name.clone(),
        email: a.user.email.clone(),
        phone: present_or_na(a.user.phone.as_deref()),
        payment_status: a.registration.payment_status.to_string(),
        transaction_id: present_or_na(a.registration.transaction_id.as_deref()),
      })
      .collect::<Vec<_>>();
    Self {
      title: event.title.clone(),
      date: event.date.format("%Y-%m-%d").to_string(),
      total: rows.len(),
      rows,
    }
  }

  pub fn csv_file_name(&self) -> String {
    format!("Event_{}_Registrations.csv", file_safe(&self.title))
  }

  pub fn xlsx_file_name(&self) -> String {
    format!("Event_{}_Registrations.xlsx", file_safe(&self.title))
  }

  pub fn pdf_file_name(&self) -> String {
    format!("Event_{}_Registrations.pdf", file_safe(&self.title))
  }

  /// Summary rows, a blank row, then the attendee table.
  pub fn to_csv(&self) -> String {
    let mut out = String::new();
    push_record(&mut out, &["Event:", &self.title]);
    push_record(&mut out, &["Date:", &self.date]);
    push_record(&mut out, &["Total Registrations:", &self.total.to_string()]);
    out.push_str("\r\n");
    push_record(&mut out, &TABLE_HEADER);
    for row in &self.rows {
      push_record(&mut out, &row.cells());
    }
    out
  }
}

fn present_or_na(value: Option<&str>) -> String {
  match value.map(str::trim) {
    Some(v) if !v.is_empty() => v.to_string(),
    _ => NOT_AVAILABLE.to_string(),
  }
}

fn push_record(out: &mut String, fields: &[&str]) {
  for (i, field) in fields.iter().enumerate() {
    if i > 0 {
      out.push(',');
    }
    out.push_str(&csv_field(field));
  }
  out.push_str("\r\n");
}

/// RFC 4180 quoting.
fn csv_field(value: &str) -> String {
  if value.contains([',', '"', '\r', '\n']) {
    format!("\"{}\"", value.replace('"', "\"\""))
  } else {
    value.to_string()
  }
}

/// Keeps file names header-safe: quotes, separators and control characters become `_`.
pub(crate) fn file_safe(name: &str) -> String {
  name
    .chars()
    .map(|c| if c.is_control() || matches!(c, '"' | '/' | '\\' | ';') { '_' } else { c })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::{PaymentStatus, Registration, Role, User};
  use chrono::{TimeZone, Utc};
  use uuid::Uuid;

  fn attendee(name: &str, phone: Option<&str>, status: PaymentStatus, txn: Option<&str>) -> Attendee {
    let user_id = Uuid::new_v4();
    Attendee {
      registration: Registration {
        id: 1,
        user_id,
        event_id: 4,
        payment_status: status,
        transaction_id: txn.map(str::to_string),
        created_at: Utc::now(),
      },
      user: User {
        id: user_id,
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        phone: phone.map(str::to_string),
        password_hash: String::new(),
        role: Role::User,
        created_at: Utc::now(),
      },
    }
  }

  fn event() -> Event {
    let date = Utc.with_ymd_and_hms(2026, 3, 14, 18, 0, 0).unwrap();
    Event {
      id: 4,
      title: "Rust, Live".to_string(),
      description: "Talks".to_string(),
      date,
      registration_deadline: date,
      price_cents: 1000,
      created_at: date,
    }
  }

  #[test]
  fn missing_phone_and_transaction_become_na() {
    let report = RegistrationReport::build(
      &event(),
      &[
        attendee("Asha", None, PaymentStatus::Pending, None),
        attendee("Ben", Some("555-0100"), PaymentStatus::Success, Some("TXN_1")),
      ],
    );
    assert_eq!(report.total, 2);
    assert_eq!(report.date, "2026-03-14");
    assert_eq!(report.rows[0].phone, "N/A");
    assert_eq!(report.rows[0].transaction_id, "N/A");
    assert_eq!(report.rows[0].payment_status, "Pending");
    assert_eq!(report.rows[1].transaction_id, "TXN_1");
  }

  #[test]
  fn csv_layout_and_quoting() {
    let report = RegistrationReport::build(&event(), &[attendee("Asha", None, PaymentStatus::Pending, None)]);
    let csv = report.to_csv();
    let lines: Vec<&str> = csv.split("\r\n").collect();
    assert_eq!(lines[0], "Event:,\"Rust, Live\"");
    assert_eq!(lines[1], "Date:,2026-03-14");
    assert_eq!(lines[2], "Total Registrations:,1");
    assert_eq!(lines[3], "");
    assert_eq!(lines[4], "User Name,Email,Phone,Payment Status,Transaction ID");
    assert_eq!(lines[5], "Asha,asha@example.com,N/A,Pending,N/A");
    assert_eq!(report.csv_file_name(), "Event_Rust, Live_Registrations.csv");
  }

  #[test]
  fn embedded_quotes_are_doubled() {
    assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    assert_eq!(csv_field("plain"), "plain");
  }
}
