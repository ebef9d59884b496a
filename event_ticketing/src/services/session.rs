// event_ticketing/src/services/session.rs

//! Opaque bearer tokens for signed-in users.

use crate::auth::Caller;
use rand_core::{OsRng, RngCore};
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt::Write as _;

#[derive(Debug, Clone)]
struct Session {
  caller: Caller,
  expires_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct SessionStore {
  sessions: RwLock<HashMap<String, Session>>,
  ttl: Duration,
}

impl SessionStore {
  pub fn new(ttl: Duration) -> Self {
    Self {
      sessions: RwLock::new(HashMap::new()),
      ttl,
    }
  }

  pub fn open(&self, caller: Caller) -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    let mut token = String::with_capacity(64);
    for b in bytes {
      let _ = write!(token, "{:02x}", b);
    }
    let now = Utc::now();
    let session = Session {
      caller,
      expires_at: now + self.ttl,
    };
    let mut sessions = self.sessions.write();
    sessions.retain(|_, s| s.expires_at > now);
    sessions.insert(token.clone(), session);
    drop(sessions);
    tracing::debug!(user_id = %caller.user_id, "Session opened.");
    token
  }

  /// The caller behind `token`, dropping the session if it has expired.
  pub fn resolve(&self, token: &str) -> Option<Caller> {
    let now = Utc::now();
    {
      let sessions = self.sessions.read();
      match sessions.get(token) {
        Some(s) if s.expires_at > now => return Some(s.caller),
        Some(_) => {}
        None => return None,
      }
    }
    self.sessions.write().remove(token);
    None
  }

  pub fn revoke(&self, token: &str) -> bool {
    self.sessions.write().remove(token).is_some()
  }

  /// Stored sessions, including expired ones not yet pruned.
  pub fn len(&self) -> usize {
    self.sessions.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.sessions.read().is_empty()
  }
}
