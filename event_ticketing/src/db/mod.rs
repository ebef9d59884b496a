// event_ticketing/src/db/mod.rs

//! Persistence: a `Store` opens units of work, and every workflow operation
//! runs its queries through exactly one of them.
//!
//! Two backends exist. `postgres` talks to a real database through `sqlx`;
//! `memory` keeps the tables in process and is used for development and
//! tests. Both commit or roll back explicitly; dropping an uncommitted unit of
//! work discards its changes.

pub mod memory;
pub mod postgres;

use crate::errors::{AppError, Result as AppResult};
use crate::models::{
  Attendee, Event, EventInput, NewTicketEmail, NewUser, Registration, RegistrationDetails, TicketEmail,
  TicketEmailEntry, User, UserTicket,
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait Store: Send + Sync {
  async fn begin(&self) -> AppResult<Box<dyn StoreTx>>;

  /// Short backend name for logs.
  fn backend(&self) -> &'static str;
}

/// Queries available inside one unit of work.
///
/// Listing queries return rows in ascending id order unless stated otherwise.
#[async_trait]
pub trait StoreTx: Send {
  async fn insert_user(&mut self, user: NewUser) -> AppResult<User>;
  async fn find_user_by_email(&mut self, email: &str) -> AppResult<Option<User>>;
  async fn find_user_by_phone(&mut self, phone: &str) -> AppResult<Option<User>>;

  async fn list_events(&mut self) -> AppResult<Vec<Event>>;
  async fn find_event(&mut self, id: i64) -> AppResult<Option<Event>>;
  async fn insert_event(&mut self, input: &EventInput) -> AppResult<Event>;
  async fn update_event(&mut self, id: i64, input: &EventInput) -> AppResult<Option<Event>>;
  /// Removes the event with its registrations and their ticket emails.
  async fn delete_event(&mut self, id: i64) -> AppResult<bool>;

  async fn find_registration(&mut self, id: i64) -> AppResult<Option<Registration>>;
  async fn find_registration_for(&mut self, user_id: Uuid, event_id: i64) -> AppResult<Option<Registration>>;
  async fn insert_registration(&mut self, user_id: Uuid, event_id: i64) -> AppResult<Registration>;
  /// Sets status `Success` and stores the transaction id, overwriting any earlier one.
  async fn mark_paid(&mut self, id: i64, transaction_id: &str) -> AppResult<Option<Registration>>;
  async fn registration_details(&mut self, id: i64) -> AppResult<Option<RegistrationDetails>>;
  async fn tickets_for_user(&mut self, user_id: Uuid) -> AppResult<Vec<UserTicket>>;
  async fn attendees_for_event(&mut self, event_id: i64) -> AppResult<Vec<Attendee>>;

  async fn insert_ticket_email(&mut self, email: NewTicketEmail) -> AppResult<TicketEmail>;
  /// Newest first.
  async fn ticket_emails_for_user(&mut self, user_id: Uuid) -> AppResult<Vec<TicketEmailEntry>>;
  async fn find_ticket_email_for_user(&mut self, email_id: i64, user_id: Uuid) -> AppResult<Option<TicketEmail>>;

  async fn commit(self: Box<Self>) -> AppResult<()>;
  async fn rollback(self: Box<Self>) -> AppResult<()>;
}

/// A shareable handle on one open transaction.
///
/// Pipeline contexts carry a clone; the operation that opened it keeps another
/// and finishes it once every other clone is gone.
#[derive(Clone)]
pub struct UnitOfWork(Arc<Mutex<Box<dyn StoreTx>>>);

impl UnitOfWork {
  pub async fn begin(store: &dyn Store) -> AppResult<Self> {
    let tx = store.begin().await?;
    tracing::trace!(backend = store.backend(), "Unit of work opened.");
    Ok(Self(Arc::new(Mutex::new(tx))))
  }

  /// Exclusive access to the transaction. Do not hold across another `lock`.
  pub async fn lock(&self) -> MutexGuard<'_, Box<dyn StoreTx>> {
    self.0.lock().await
  }

  pub async fn commit(self) -> AppResult<()> {
    self.into_inner()?.commit().await
  }

  pub async fn rollback(self) -> AppResult<()> {
    self.into_inner()?.rollback().await
  }

  fn into_inner(self) -> AppResult<Box<dyn StoreTx>> {
    Arc::try_unwrap(self.0)
      .map(Mutex::into_inner)
      .map_err(|_| AppError::Internal("Unit of work finished while still shared.".to_string()))
  }
}

/// Opens the configured backend.
pub async fn connect(database_url: Option<&str>) -> AppResult<Arc<dyn Store>> {
  match database_url {
    Some(url) => {
      let store = PgStore::connect(url).await?;
      store.apply_schema().await?;
      Ok(Arc::new(store))
    }
    None => {
      tracing::warn!("DATABASE_URL not set; using the in-memory store. Data is lost on exit.");
      Ok(Arc::new(MemoryStore::new()))
    }
  }
}
