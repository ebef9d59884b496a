// event_ticketing/tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, Utc};
use event_ticketing::auth::Caller;
use event_ticketing::catalog;
use event_ticketing::config::AppConfig;
use event_ticketing::db::{MemoryStore, Store, UnitOfWork};
use event_ticketing::models::{Event, EventInput, Registration, Role, User};
use event_ticketing::pipelines;
use event_ticketing::services::email::{EmailNotifier, SentEmail, TransportError};
use event_ticketing::services::payment::TransactionIdGenerator;
use event_ticketing::state::AppState;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::Level;
use uuid::Uuid;

pub const PASSWORD: &str = "Passw0rd";

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

#[derive(Debug, Clone)]
pub struct Outgoing {
  pub to: String,
  pub subject: String,
  pub body: String,
}

#[derive(Default)]
pub struct RecordingNotifier {
  pub sent: Mutex<Vec<Outgoing>>,
}

impl RecordingNotifier {
  pub fn outbox(&self) -> Vec<Outgoing> {
    self.sent.lock().clone()
  }
}

#[async_trait]
impl EmailNotifier for RecordingNotifier {
  async fn send_email(&self, to: &str, subject: &str, html_body: &str) -> Result<SentEmail, TransportError> {
    let mut sent = self.sent.lock();
    sent.push(Outgoing {
      to: to.to_string(),
      subject: subject.to_string(),
      body: html_body.to_string(),
    });
    Ok(SentEmail {
      to: to.to_string(),
      from: "tests@example.com".to_string(),
      subject: subject.to_string(),
      body_preview: html_body.chars().take(50).collect(),
      message_id: format!("test_{}", sent.len()),
    })
  }
}

#[derive(Default)]
pub struct FailingNotifier {
  pub attempts: AtomicUsize,
}

#[async_trait]
impl EmailNotifier for FailingNotifier {
  async fn send_email(&self, _to: &str, _subject: &str, _html_body: &str) -> Result<SentEmail, TransportError> {
    self.attempts.fetch_add(1, Ordering::SeqCst);
    Err(TransportError("smtp relay unreachable".to_string()))
  }
}

/// Hands out `TXN_TEST_1`, `TXN_TEST_2`, ...
#[derive(Default)]
pub struct SequentialTransactionIds {
  next: AtomicUsize,
}

impl TransactionIdGenerator for SequentialTransactionIds {
  fn generate(&self) -> String {
    format!("TXN_TEST_{}", self.next.fetch_add(1, Ordering::SeqCst) + 1)
  }
}

pub struct TestApp {
  pub state: AppState,
  pub notifier: Arc<RecordingNotifier>,
}

pub fn test_app() -> TestApp {
  app_with_store(Arc::new(MemoryStore::new()))
}

pub fn app_with_store(store: Arc<dyn Store>) -> TestApp {
  setup_tracing();
  let notifier = Arc::new(RecordingNotifier::default());
  let state = AppState::with_services(
    AppConfig::default(),
    store,
    notifier.clone(),
    Arc::new(SequentialTransactionIds::default()),
  )
  .expect("pipelines register");
  TestApp { state, notifier }
}

pub fn app_with_notifier(notifier: Arc<dyn EmailNotifier>) -> AppState {
  setup_tracing();
  AppState::with_services(
    AppConfig::default(),
    Arc::new(MemoryStore::new()),
    notifier,
    Arc::new(SequentialTransactionIds::default()),
  )
  .expect("pipelines register")
}

pub fn admin() -> Caller {
  Caller {
    user_id: Uuid::new_v4(),
    role: Role::Admin,
  }
}

pub fn caller_of(user: &User) -> Caller {
  Caller {
    user_id: user.id,
    role: user.role,
  }
}

pub async fn sign_up_user(state: &AppState, name: &str, phone: Option<&str>) -> User {
  pipelines::sign_up(
    state,
    name.to_string(),
    format!("{}@example.com", name.to_lowercase()),
    phone.map(str::to_string),
    PASSWORD.to_string(),
  )
  .await
  .expect("sign up")
}

pub fn event_input(title: &str, deadline_in: Duration) -> EventInput {
  let deadline = Utc::now() + deadline_in;
  EventInput {
    title: title.to_string(),
    description: format!("{} description", title),
    date: deadline + Duration::days(1),
    registration_deadline: deadline,
    price_cents: 49900,
  }
}

pub async fn open_event(state: &AppState, title: &str) -> Event {
  catalog::create_event(state, admin(), event_input(title, Duration::days(7)))
    .await
    .expect("create open event")
}

pub async fn closed_event(state: &AppState, title: &str) -> Event {
  catalog::create_event(state, admin(), event_input(title, Duration::days(-2)))
    .await
    .expect("create closed event")
}

pub async fn registration(state: &AppState, id: i64) -> Option<Registration> {
  let uow = UnitOfWork::begin(state.store.as_ref()).await.expect("begin");
  let found = uow.lock().await.find_registration(id).await.expect("query");
  uow.rollback().await.expect("rollback");
  found
}

pub async fn registrations_for(state: &AppState, event_id: i64) -> usize {
  let uow = UnitOfWork::begin(state.store.as_ref()).await.expect("begin");
  let rows = uow.lock().await.attendees_for_event(event_id).await.expect("query");
  uow.rollback().await.expect("rollback");
  rows.len()
}

pub async fn ticket_email_count(state: &AppState, user_id: Uuid) -> usize {
  let uow = UnitOfWork::begin(state.store.as_ref()).await.expect("begin");
  let rows = uow.lock().await.ticket_emails_for_user(user_id).await.expect("query");
  uow.rollback().await.expect("rollback");
  rows.len()
}
