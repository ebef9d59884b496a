// event_ticketing/src/state.rs

use crate::config::AppConfig;
use crate::db::Store;
use crate::errors::{AppError, Result as AppResult};
use crate::pipelines;
use crate::services::email::{ConsoleEmailNotifier, EmailNotifier};
use crate::services::payment::{RandomTransactionIds, TransactionIdGenerator};
use crate::services::session::SessionStore;
use std::sync::Arc;
use ticketflow::Registry;

#[derive(Clone)]
pub struct AppState {
  pub store: Arc<dyn Store>,
  pub flows: Arc<Registry<AppError>>,
  pub config: Arc<AppConfig>,
  pub notifier: Arc<dyn EmailNotifier>,
  pub transactions: Arc<dyn TransactionIdGenerator>,
  pub sessions: Arc<SessionStore>,
}

impl AppState {
  /// State with the console email notifier and random transaction ids.
  pub fn new(config: AppConfig, store: Arc<dyn Store>) -> AppResult<Self> {
    let notifier = Arc::new(ConsoleEmailNotifier::new(
      config.email_sender.clone(),
      config.email_display_name.clone(),
    ));
    Self::with_services(config, store, notifier, Arc::new(RandomTransactionIds))
  }

  pub fn with_services(
    config: AppConfig,
    store: Arc<dyn Store>,
    notifier: Arc<dyn EmailNotifier>,
    transactions: Arc<dyn TransactionIdGenerator>,
  ) -> AppResult<Self> {
    let flows = Registry::<AppError>::new();
    pipelines::register_all_pipelines(&flows)?;
    let sessions = SessionStore::new(chrono::Duration::minutes(config.session_ttl_minutes));
    Ok(Self {
      store,
      flows: Arc::new(flows),
      config: Arc::new(config),
      notifier,
      transactions,
      sessions: Arc::new(sessions),
    })
  }
}
