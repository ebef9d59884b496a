// event_ticketing/src/services/email.rs

//! Outbound email. The notifier only transports; callers build subject and body.

use crate::errors::AppError;
use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Clone)]
pub struct SentEmail {
  pub to: String,
  pub from: String,
  pub subject: String,
  pub body_preview: String,
  pub message_id: String,
}

#[derive(Debug, Clone, Error)]
#[error("Email transport failed: {0}")]
pub struct TransportError(pub String);

impl From<TransportError> for AppError {
  fn from(err: TransportError) -> Self {
    AppError::Transport(err.0)
  }
}

#[async_trait]
pub trait EmailNotifier: Send + Sync {
  async fn send_email(&self, to: &str, subject: &str, html_body: &str) -> Result<SentEmail, TransportError>;
}

/// Writes every message to the log instead of delivering it.
#[derive(Debug, Clone)]
pub struct ConsoleEmailNotifier {
  sender: String,
  display_name: String,
}

impl ConsoleEmailNotifier {
  pub fn new(sender: impl Into<String>, display_name: impl Into<String>) -> Self {
    Self {
      sender: sender.into(),
      display_name: display_name.into(),
    }
  }

  fn from_header(&self) -> String {
    format!("{} <{}>", self.display_name, self.sender)
  }
}

pub(crate) fn body_preview(html_body: &str) -> String {
  const PREVIEW_CHARS: usize = 50;
  if html_body.chars().count() <= PREVIEW_CHARS {
    return html_body.to_string();
  }
  html_body.chars().take(PREVIEW_CHARS).collect::<String>() + "..."
}

#[async_trait]
impl EmailNotifier for ConsoleEmailNotifier {
  #[instrument(name = "ConsoleEmailNotifier::send_email", skip(self, html_body), fields(%to, %subject))]
  async fn send_email(&self, to: &str, subject: &str, html_body: &str) -> Result<SentEmail, TransportError> {
    if to.trim().is_empty() {
      return Err(TransportError("recipient address is empty".to_string()));
    }
    let from = self.from_header();
    let message_id = format!("console_{}", uuid::Uuid::new_v4());
    info!(%from, %message_id, body = %html_body, "Email written to console instead of sent.");
    Ok(SentEmail {
      to: to.to_string(),
      from,
      subject: subject.to_string(),
      body_preview: body_preview(html_body),
      message_id,
    })
  }
}
