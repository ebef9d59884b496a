// event_ticketing/src/db/memory.rs

use super::{Store, StoreTx};
use crate::errors::{AppError, Result as AppResult};
use crate::models::{
  Attendee, Event, EventInput, NewTicketEmail, NewUser, PaymentStatus, Registration, RegistrationDetails,
  TicketEmail, TicketEmailEntry, User, UserTicket,
};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
struct Tables {
  users: Vec<User>,
  events: Vec<Event>,
  registrations: Vec<Registration>,
  ticket_emails: Vec<TicketEmail>,
  next_event_id: i64,
  next_registration_id: i64,
  next_ticket_email_id: i64,
}

impl Tables {
  fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
  }

  fn user(&self, id: Uuid) -> Option<&User> {
    self.users.iter().find(|u| u.id == id)
  }

  fn event(&self, id: i64) -> Option<&Event> {
    self.events.iter().find(|e| e.id == id)
  }

  fn registration(&self, id: i64) -> Option<&Registration> {
    self.registrations.iter().find(|r| r.id == id)
  }
}

/// In-process tables behind an async mutex.
///
/// A unit of work holds the lock for its whole life and edits a staged copy,
/// so units of work run one at a time and commit is all-or-nothing.
#[derive(Clone, Default)]
pub struct MemoryStore {
  tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl Store for MemoryStore {
  async fn begin(&self) -> AppResult<Box<dyn StoreTx>> {
    let guard = self.tables.clone().lock_owned().await;
    let staged = guard.clone();
    Ok(Box::new(MemoryTx { guard, staged }))
  }

  fn backend(&self) -> &'static str {
    "memory"
  }
}

struct MemoryTx {
  guard: OwnedMutexGuard<Tables>,
  staged: Tables,
}

fn apply_input(event: &mut Event, input: &EventInput) {
  event.title = input.title.trim().to_string();
  event.description = input.description.trim().to_string();
  event.date = input.date;
  event.registration_deadline = input.registration_deadline;
  event.price_cents = input.price_cents;
}

#[async_trait]
impl StoreTx for MemoryTx {
  async fn insert_user(&mut self, user: NewUser) -> AppResult<User> {
    if self.staged.users.iter().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
      return Err(AppError::Validation("An account with this email already exists.".to_string()));
    }
    let row = User {
      id: Uuid::new_v4(),
      name: user.name,
      email: user.email,
      phone: user.phone,
      password_hash: user.password_hash,
      role: user.role,
      created_at: Utc::now(),
    };
    self.staged.users.push(row.clone());
    Ok(row)
  }

  async fn find_user_by_email(&mut self, email: &str) -> AppResult<Option<User>> {
    Ok(self.staged.users.iter().find(|u| u.email.eq_ignore_ascii_case(email)).cloned())
  }

  async fn find_user_by_phone(&mut self, phone: &str) -> AppResult<Option<User>> {
    Ok(self.staged.users.iter().find(|u| u.phone.as_deref() == Some(phone)).cloned())
  }

  async fn list_events(&mut self) -> AppResult<Vec<Event>> {
    Ok(self.staged.events.clone())
  }

  async fn find_event(&mut self, id: i64) -> AppResult<Option<Event>> {
    Ok(self.staged.event(id).cloned())
  }

  async fn insert_event(&mut self, input: &EventInput) -> AppResult<Event> {
    let id = Tables::next_id(&mut self.staged.next_event_id);
    let mut event = Event {
      id,
      title: String::new(),
      description: String::new(),
      date: input.date,
      registration_deadline: input.registration_deadline,
      price_cents: input.price_cents,
      created_at: Utc::now(),
    };
    apply_input(&mut event, input);
    self.staged.events.push(event.clone());
    Ok(event)
  }

  async fn update_event(&mut self, id: i64, input: &EventInput) -> AppResult<Option<Event>> {
    Ok(self.staged.events.iter_mut().find(|e| e.id == id).map(|event| {
      apply_input(event, input);
      event.clone()
    }))
  }

  async fn delete_event(&mut self, id: i64) -> AppResult<bool> {
    let before = self.staged.events.len();
    self.staged.events.retain(|e| e.id != id);
    if self.staged.events.len() == before {
      return Ok(false);
    }
    let removed: Vec<i64> = self
      .staged
      .registrations
      .iter()
      .filter(|r| r.event_id == id)
      .map(|r| r.id)
      .collect();
    self.staged.registrations.retain(|r| r.event_id != id);
    self
      .staged
      .ticket_emails
      .retain(|t| !removed.contains(&t.registration_id));
    Ok(true)
  }

  async fn find_registration(&mut self, id: i64) -> AppResult<Option<Registration>> {
    Ok(self.staged.registration(id).cloned())
  }

  async fn find_registration_for(&mut self, user_id: Uuid, event_id: i64) -> AppResult<Option<Registration>> {
    Ok(
      self
        .staged
        .registrations
        .iter()
        .find(|r| r.user_id == user_id && r.event_id == event_id)
        .cloned(),
    )
  }

  async fn insert_registration(&mut self, user_id: Uuid, event_id: i64) -> AppResult<Registration> {
    if self.staged.user(user_id).is_none() || self.staged.event(event_id).is_none() {
      return Err(AppError::Internal(format!(
        "Foreign key violation inserting registration (user {}, event {})",
        user_id, event_id
      )));
    }
    let row = Registration {
      id: Tables::next_id(&mut self.staged.next_registration_id),
      user_id,
      event_id,
      payment_status: PaymentStatus::Pending,
      transaction_id: None,
      created_at: Utc::now(),
    };
    self.staged.registrations.push(row.clone());
    Ok(row)
  }

  async fn mark_paid(&mut self, id: i64, transaction_id: &str) -> AppResult<Option<Registration>> {
    Ok(self.staged.registrations.iter_mut().find(|r| r.id == id).map(|r| {
      r.payment_status = PaymentStatus::Success;
      r.transaction_id = Some(transaction_id.to_string());
      r.clone()
    }))
  }

  async fn registration_details(&mut self, id: i64) -> AppResult<Option<RegistrationDetails>> {
    let t = &self.staged;
    Ok(t.registration(id).and_then(|registration| {
      let event = t.event(registration.event_id)?.clone();
      let user = t.user(registration.user_id)?.clone();
      Some(RegistrationDetails {
        registration: registration.clone(),
        event,
        user,
      })
    }))
  }

  async fn tickets_for_user(&mut self, user_id: Uuid) -> AppResult<Vec<UserTicket>> {
    let t = &self.staged;
    Ok(
      t.registrations
        .iter()
        .filter(|r| r.user_id == user_id)
        .filter_map(|r| {
          t.event(r.event_id).map(|event| UserTicket {
            registration: r.clone(),
            event: event.clone(),
          })
        })
        .collect(),
    )
  }

  async fn attendees_for_event(&mut self, event_id: i64) -> AppResult<Vec<Attendee>> {
    let t = &self.staged;
    Ok(
      t.registrations
        .iter()
        .filter(|r| r.event_id == event_id)
        .filter_map(|r| {
          t.user(r.user_id).map(|user| Attendee {
            registration: r.clone(),
            user: user.clone(),
          })
        })
        .collect(),
    )
  }

  async fn insert_ticket_email(&mut self, email: NewTicketEmail) -> AppResult<TicketEmail> {
    if self.staged.registration(email.registration_id).is_none() {
      return Err(AppError::Internal(format!(
        "Foreign key violation inserting ticket email (registration {})",
        email.registration_id
      )));
    }
    let row = TicketEmail {
      id: Tables::next_id(&mut self.staged.next_ticket_email_id),
      user_id: email.user_id,
      registration_id: email.registration_id,
      subject: email.subject,
      body_html: email.body_html,
      sent_at: Utc::now(),
    };
    self.staged.ticket_emails.push(row.clone());
    Ok(row)
  }

  async fn ticket_emails_for_user(&mut self, user_id: Uuid) -> AppResult<Vec<TicketEmailEntry>> {
    let t = &self.staged;
    let mut entries: Vec<TicketEmailEntry> = t
      .ticket_emails
      .iter()
      .filter(|m| m.user_id == user_id)
      .filter_map(|m| {
        let registration = t.registration(m.registration_id)?;
        let event = t.event(registration.event_id)?;
        Some(TicketEmailEntry {
          email: m.clone(),
          registration: registration.clone(),
          event: event.clone(),
        })
      })
      .collect();
    entries.sort_by(|a, b| (b.email.sent_at, b.email.id).cmp(&(a.email.sent_at, a.email.id)));
    Ok(entries)
  }

  async fn find_ticket_email_for_user(&mut self, email_id: i64, user_id: Uuid) -> AppResult<Option<TicketEmail>> {
    Ok(
      self
        .staged
        .ticket_emails
        .iter()
        .find(|m| m.id == email_id && m.user_id == user_id)
        .cloned(),
    )
  }

  async fn commit(self: Box<Self>) -> AppResult<()> {
    let MemoryTx { mut guard, staged } = *self;
    *guard = staged;
    Ok(())
  }

  async fn rollback(self: Box<Self>) -> AppResult<()> {
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::Role;
  use chrono::Duration;

  fn event_input(title: &str) -> EventInput {
    let now = Utc::now();
    EventInput {
      title: title.to_string(),
      description: "desc".to_string(),
      date: now + Duration::days(3),
      registration_deadline: now + Duration::days(2),
      price_cents: 1000,
    }
  }

  fn new_user(email: &str) -> NewUser {
    NewUser {
      name: "Ann".to_string(),
      email: email.to_string(),
      phone: None,
      password_hash: "hash".to_string(),
      role: Role::User,
    }
  }

  #[tokio::test]
  async fn uncommitted_changes_are_discarded() {
    let store = MemoryStore::new();
    let mut tx = store.begin().await.unwrap();
    tx.insert_event(&event_input("Gone")).await.unwrap();
    tx.rollback().await.unwrap();

    let mut tx = store.begin().await.unwrap();
    tx.insert_event(&event_input("Dropped")).await.unwrap();
    drop(tx);

    let mut tx = store.begin().await.unwrap();
    assert!(tx.list_events().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn delete_event_cascades() {
    let store = MemoryStore::new();
    let mut tx = store.begin().await.unwrap();
    let user = tx.insert_user(new_user("a@example.com")).await.unwrap();
    let keep = tx.insert_event(&event_input("Keep")).await.unwrap();
    let drop_me = tx.insert_event(&event_input("Drop")).await.unwrap();
    let kept_reg = tx.insert_registration(user.id, keep.id).await.unwrap();
    let reg = tx.insert_registration(user.id, drop_me.id).await.unwrap();
    for registration_id in [kept_reg.id, reg.id] {
      tx.insert_ticket_email(NewTicketEmail {
        user_id: user.id,
        registration_id,
        subject: "s".to_string(),
        body_html: "b".to_string(),
      })
      .await
      .unwrap();
    }
    tx.commit().await.unwrap();

    let mut tx = store.begin().await.unwrap();
    assert!(tx.delete_event(drop_me.id).await.unwrap());
    assert!(!tx.delete_event(drop_me.id).await.unwrap());
    assert!(tx.find_registration(reg.id).await.unwrap().is_none());
    let inbox = tx.ticket_emails_for_user(user.id).await.unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].registration.id, kept_reg.id);
  }

  #[tokio::test]
  async fn ids_follow_insertion_order() {
    let store = MemoryStore::new();
    let mut tx = store.begin().await.unwrap();
    let a = tx.insert_event(&event_input("A")).await.unwrap();
    let b = tx.insert_event(&event_input("B")).await.unwrap();
    assert!(a.id < b.id);
    let titles: Vec<String> = tx.list_events().await.unwrap().into_iter().map(|e| e.title).collect();
    assert_eq!(titles, vec!["A", "B"]);
  }
}
