// event_ticketing/src/models/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "user_role_enum", rename_all = "lowercase")]
pub enum Role {
  User,
  Admin,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
  pub id: Uuid,
  pub name: String,
  pub email: String,
  pub phone: Option<String>,
  #[serde(skip_serializing)] // Never send password hash to client
  pub password_hash: String,
  pub role: Role,
  pub created_at: DateTime<Utc>,
}

/// Row data for a user that does not exist yet; the store assigns id and timestamp.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub name: String,
  pub email: String,
  pub phone: Option<String>,
  pub password_hash: String,
  pub role: Role,
}
