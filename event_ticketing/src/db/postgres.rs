// event_ticketing/src/db/postgres.rs

use super::{Store, StoreTx};
use crate::errors::Result as AppResult;
use crate::models::{
  Attendee, Event, EventInput, NewTicketEmail, NewUser, Registration, RegistrationDetails, TicketEmail,
  TicketEmailEntry, User, UserTicket,
};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, Row, Transaction};
use tracing::{info, instrument};
use uuid::Uuid;

const SCHEMA: &str = include_str!("schema.sql");

const USER_COLUMNS: &str = "id, name, email, phone, password_hash, role, created_at";
const EVENT_COLUMNS: &str = "id, title, description, date, registration_deadline, price_cents, created_at";
const REGISTRATION_COLUMNS: &str = "id, user_id, event_id, payment_status, transaction_id, created_at";
const TICKET_EMAIL_COLUMNS: &str = "id, user_id, registration_id, subject, body_html, sent_at";

#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  #[instrument(name = "PgStore::connect", skip_all, err(Display))]
  pub async fn connect(database_url: &str) -> AppResult<Self> {
    let pool = PgPoolOptions::new().max_connections(10).connect(database_url).await?;
    info!("Connected to PostgreSQL.");
    Ok(Self { pool })
  }

  pub fn from_pool(pool: PgPool) -> Self {
    Self { pool }
  }

  pub async fn apply_schema(&self) -> AppResult<()> {
    sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
    info!("Database schema applied.");
    Ok(())
  }
}

#[async_trait]
impl Store for PgStore {
  async fn begin(&self) -> AppResult<Box<dyn StoreTx>> {
    let tx = self.pool.begin().await?;
    Ok(Box::new(PgTx { tx }))
  }

  fn backend(&self) -> &'static str {
    "postgres"
  }
}

struct PgTx {
  tx: Transaction<'static, Postgres>,
}

// Joined rows alias each table's columns with a prefix (`r_id`, `e_title`, ...).

fn user_from(row: &PgRow, p: &str) -> Result<User, sqlx::Error> {
  let col = |name: &str| format!("{p}{name}");
  Ok(User {
    id: row.try_get(col("id").as_str())?,
    name: row.try_get(col("name").as_str())?,
    email: row.try_get(col("email").as_str())?,
    phone: row.try_get(col("phone").as_str())?,
    password_hash: row.try_get(col("password_hash").as_str())?,
    role: row.try_get(col("role").as_str())?,
    created_at: row.try_get(col("created_at").as_str())?,
  })
}

fn event_from(row: &PgRow, p: &str) -> Result<Event, sqlx::Error> {
  let col = |name: &str| format!("{p}{name}");
  Ok(Event {
    id: row.try_get(col("id").as_str())?,
    title: row.try_get(col("title").as_str())?,
    description: row.try_get(col("description").as_str())?,
    date: row.try_get(col("date").as_str())?,
    registration_deadline: row.try_get(col("registration_deadline").as_str())?,
    price_cents: row.try_get(col("price_cents").as_str())?,
    created_at: row.try_get(col("created_at").as_str())?,
  })
}

fn registration_from(row: &PgRow, p: &str) -> Result<Registration, sqlx::Error> {
  let col = |name: &str| format!("{p}{name}");
  Ok(Registration {
    id: row.try_get(col("id").as_str())?,
    user_id: row.try_get(col("user_id").as_str())?,
    event_id: row.try_get(col("event_id").as_str())?,
    payment_status: row.try_get(col("payment_status").as_str())?,
    transaction_id: row.try_get(col("transaction_id").as_str())?,
    created_at: row.try_get(col("created_at").as_str())?,
  })
}

fn ticket_email_from(row: &PgRow, p: &str) -> Result<TicketEmail, sqlx::Error> {
  let col = |name: &str| format!("{p}{name}");
  Ok(TicketEmail {
    id: row.try_get(col("id").as_str())?,
    user_id: row.try_get(col("user_id").as_str())?,
    registration_id: row.try_get(col("registration_id").as_str())?,
    subject: row.try_get(col("subject").as_str())?,
    body_html: row.try_get(col("body_html").as_str())?,
    sent_at: row.try_get(col("sent_at").as_str())?,
  })
}

/// `alias.col AS prefixcol, ...` for a column list.
fn prefixed(columns: &str, alias: &str, prefix: &str) -> String {
  columns
    .split(", ")
    .map(|c| format!("{alias}.{c} AS {prefix}{c}"))
    .collect::<Vec<_>>()
    .join(", ")
}

#[async_trait]
impl StoreTx for PgTx {
  async fn insert_user(&mut self, user: NewUser) -> AppResult<User> {
    let sql = format!(
      "INSERT INTO users (id, name, email, phone, password_hash, role) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {USER_COLUMNS}"
    );
    let row = sqlx::query_as::<_, User>(&sql)
      .bind(Uuid::new_v4())
      .bind(&user.name)
      .bind(&user.email)
      .bind(&user.phone)
      .bind(&user.password_hash)
      .bind(user.role)
      .fetch_one(&mut *self.tx)
      .await?;
    Ok(row)
  }

  async fn find_user_by_email(&mut self, email: &str) -> AppResult<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)");
    Ok(sqlx::query_as::<_, User>(&sql).bind(email).fetch_optional(&mut *self.tx).await?)
  }

  async fn find_user_by_phone(&mut self, phone: &str) -> AppResult<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE phone = $1 ORDER BY created_at LIMIT 1");
    Ok(sqlx::query_as::<_, User>(&sql).bind(phone).fetch_optional(&mut *self.tx).await?)
  }

  async fn list_events(&mut self) -> AppResult<Vec<Event>> {
    let sql = format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY id");
    Ok(sqlx::query_as::<_, Event>(&sql).fetch_all(&mut *self.tx).await?)
  }

  async fn find_event(&mut self, id: i64) -> AppResult<Option<Event>> {
    let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
    Ok(sqlx::query_as::<_, Event>(&sql).bind(id).fetch_optional(&mut *self.tx).await?)
  }

  async fn insert_event(&mut self, input: &EventInput) -> AppResult<Event> {
    let sql = format!(
      "INSERT INTO events (title, description, date, registration_deadline, price_cents) VALUES ($1, $2, $3, $4, $5) RETURNING {EVENT_COLUMNS}"
    );
    Ok(
      sqlx::query_as::<_, Event>(&sql)
        .bind(input.title.trim())
        .bind(input.description.trim())
        .bind(input.date)
        .bind(input.registration_deadline)
        .bind(input.price_cents)
        .fetch_one(&mut *self.tx)
        .await?,
    )
  }

  async fn update_event(&mut self, id: i64, input: &EventInput) -> AppResult<Option<Event>> {
    let sql = format!(
      "UPDATE events SET title = $2, description = $3, date = $4, registration_deadline = $5, price_cents = $6 WHERE id = $1 RETURNING {EVENT_COLUMNS}"
    );
    Ok(
      sqlx::query_as::<_, Event>(&sql)
        .bind(id)
        .bind(input.title.trim())
        .bind(input.description.trim())
        .bind(input.date)
        .bind(input.registration_deadline)
        .bind(input.price_cents)
        .fetch_optional(&mut *self.tx)
        .await?,
    )
  }

  async fn delete_event(&mut self, id: i64) -> AppResult<bool> {
    let result = sqlx::query("DELETE FROM events WHERE id = $1")
      .bind(id)
      .execute(&mut *self.tx)
      .await?;
    Ok(result.rows_affected() > 0)
  }

  async fn find_registration(&mut self, id: i64) -> AppResult<Option<Registration>> {
    let sql = format!("SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE id = $1");
    Ok(
      sqlx::query_as::<_, Registration>(&sql)
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?,
    )
  }

  async fn find_registration_for(&mut self, user_id: Uuid, event_id: i64) -> AppResult<Option<Registration>> {
    let sql = format!(
      "SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE user_id = $1 AND event_id = $2 ORDER BY id LIMIT 1"
    );
    Ok(
      sqlx::query_as::<_, Registration>(&sql)
        .bind(user_id)
        .bind(event_id)
        .fetch_optional(&mut *self.tx)
        .await?,
    )
  }

  async fn insert_registration(&mut self, user_id: Uuid, event_id: i64) -> AppResult<Registration> {
    let sql = format!(
      "INSERT INTO registrations (user_id, event_id, payment_status) VALUES ($1, $2, 'Pending') RETURNING {REGISTRATION_COLUMNS}"
    );
    Ok(
      sqlx::query_as::<_, Registration>(&sql)
        .bind(user_id)
        .bind(event_id)
        .fetch_one(&mut *self.tx)
        .await?,
    )
  }

  async fn mark_paid(&mut self, id: i64, transaction_id: &str) -> AppResult<Option<Registration>> {
    let sql = format!(
      "UPDATE registrations SET payment_status = 'Success', transaction_id = $2 WHERE id = $1 RETURNING {REGISTRATION_COLUMNS}"
    );
    Ok(
      sqlx::query_as::<_, Registration>(&sql)
        .bind(id)
        .bind(transaction_id)
        .fetch_optional(&mut *self.tx)
        .await?,
    )
  }

  async fn registration_details(&mut self, id: i64) -> AppResult<Option<RegistrationDetails>> {
    let sql = format!(
      "SELECT {}, {}, {} FROM registrations r JOIN events e ON e.id = r.event_id JOIN users u ON u.id = r.user_id WHERE r.id = $1",
      prefixed(REGISTRATION_COLUMNS, "r", "r_"),
      prefixed(EVENT_COLUMNS, "e", "e_"),
      prefixed(USER_COLUMNS, "u", "u_"),
    );
    let row = sqlx::query(&sql).bind(id).fetch_optional(&mut *self.tx).await?;
    let details = row
      .map(|row| -> Result<RegistrationDetails, sqlx::Error> {
        Ok(RegistrationDetails {
          registration: registration_from(&row, "r_")?,
          event: event_from(&row, "e_")?,
          user: user_from(&row, "u_")?,
        })
      })
      .transpose()?;
    Ok(details)
  }

  async fn tickets_for_user(&mut self, user_id: Uuid) -> AppResult<Vec<UserTicket>> {
    let sql = format!(
      "SELECT {}, {} FROM registrations r JOIN events e ON e.id = r.event_id WHERE r.user_id = $1 ORDER BY r.id",
      prefixed(REGISTRATION_COLUMNS, "r", "r_"),
      prefixed(EVENT_COLUMNS, "e", "e_"),
    );
    let rows = sqlx::query(&sql).bind(user_id).fetch_all(&mut *self.tx).await?;
    let tickets = rows
      .iter()
      .map(|row| -> Result<UserTicket, sqlx::Error> {
        Ok(UserTicket {
          registration: registration_from(row, "r_")?,
          event: event_from(row, "e_")?,
        })
      })
      .collect::<Result<Vec<_>, sqlx::Error>>()?;
    Ok(tickets)
  }

  async fn attendees_for_event(&mut self, event_id: i64) -> AppResult<Vec<Attendee>> {
    let sql = format!(
      "SELECT {}, {} FROM registrations r JOIN users u ON u.id = r.user_id WHERE r.event_id = $1 ORDER BY r.id",
      prefixed(REGISTRATION_COLUMNS, "r", "r_"),
      prefixed(USER_COLUMNS, "u", "u_"),
    );
    let rows = sqlx::query(&sql).bind(event_id).fetch_all(&mut *self.tx).await?;
    let attendees = rows
      .iter()
      .map(|row| -> Result<Attendee, sqlx::Error> {
        Ok(Attendee {
          registration: registration_from(row, "r_")?,
          user: user_from(row, "u_")?,
        })
      })
      .collect::<Result<Vec<_>, sqlx::Error>>()?;
    Ok(attendees)
  }

  async fn insert_ticket_email(&mut self, email: NewTicketEmail) -> AppResult<TicketEmail> {
    let sql = format!(
      "INSERT INTO ticket_emails (user_id, registration_id, subject, body_html) VALUES ($1, $2, $3, $4) RETURNING {TICKET_EMAIL_COLUMNS}"
    );
    Ok(
      sqlx::query_as::<_, TicketEmail>(&sql)
        .bind(email.user_id)
        .bind(email.registration_id)
        .bind(&email.subject)
        .bind(&email.body_html)
        .fetch_one(&mut *self.tx)
        .await?,
    )
  }

  async fn ticket_emails_for_user(&mut self, user_id: Uuid) -> AppResult<Vec<TicketEmailEntry>> {
    let sql = format!(
      "SELECT {}, {}, {} FROM ticket_emails t JOIN registrations r ON r.id = t.registration_id JOIN events e ON e.id = r.event_id WHERE t.user_id = $1 ORDER BY t.sent_at DESC, t.id DESC",
      prefixed(TICKET_EMAIL_COLUMNS, "t", "t_"),
      prefixed(REGISTRATION_COLUMNS, "r", "r_"),
      prefixed(EVENT_COLUMNS, "e", "e_"),
    );
    let rows = sqlx::query(&sql).bind(user_id).fetch_all(&mut *self.tx).await?;
    let entries = rows
      .iter()
      .map(|row| -> Result<TicketEmailEntry, sqlx::Error> {
        Ok(TicketEmailEntry {
          email: ticket_email_from(row, "t_")?,
          registration: registration_from(row, "r_")?,
          event: event_from(row, "e_")?,
        })
      })
      .collect::<Result<Vec<_>, sqlx::Error>>()?;
    Ok(entries)
  }

  async fn find_ticket_email_for_user(&mut self, email_id: i64, user_id: Uuid) -> AppResult<Option<TicketEmail>> {
    let sql = format!("SELECT {TICKET_EMAIL_COLUMNS} FROM ticket_emails WHERE id = $1 AND user_id = $2");
    Ok(
      sqlx::query_as::<_, TicketEmail>(&sql)
        .bind(email_id)
        .bind(user_id)
        .fetch_optional(&mut *self.tx)
        .await?,
    )
  }

  async fn commit(self: Box<Self>) -> AppResult<()> {
    self.tx.commit().await?;
    Ok(())
  }

  async fn rollback(self: Box<Self>) -> AppResult<()> {
    self.tx.rollback().await?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn prefixed_aliases_every_column() {
    assert_eq!(
      prefixed("id, title", "e", "e_"),
      "e.id AS e_id, e.title AS e_title"
    );
  }
}
