// event_ticketing/src/auth.rs

//! Caller identity and the authorization checks built on it.
//!
//! Checks are pure functions of the caller and the resource, so workflow steps
//! call them directly with whatever they loaded.

use crate::errors::AppError;
use crate::models::{Registration, Role};
use uuid::Uuid;

/// Identity of whoever makes a request. Every workflow operation takes one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
  pub user_id: Uuid,
  pub role: Role,
}

impl Caller {
  pub fn is_admin(&self) -> bool {
    self.role == Role::Admin
  }
}

pub fn authorize_owner(caller: &Caller, registration: &Registration) -> Result<(), AppError> {
  if caller.user_id == registration.user_id {
    Ok(())
  } else {
    tracing::warn!(
      caller = %caller.user_id,
      registration_id = registration.id,
      "Caller does not own the registration."
    );
    Err(AppError::Forbidden(format!(
      "Registration {} belongs to another user.",
      registration.id
    )))
  }
}

pub fn require_admin(caller: &Caller) -> Result<(), AppError> {
  if caller.is_admin() {
    Ok(())
  } else {
    Err(AppError::Forbidden("Administrator role required.".to_string()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::PaymentStatus;
  use chrono::Utc;

  fn registration_of(user_id: Uuid) -> Registration {
    Registration {
      id: 3,
      user_id,
      event_id: 1,
      payment_status: PaymentStatus::Pending,
      transaction_id: None,
      created_at: Utc::now(),
    }
  }

  #[test]
  fn owner_check() {
    let owner = Caller {
      user_id: Uuid::new_v4(),
      role: Role::User,
    };
    let stranger = Caller {
      user_id: Uuid::new_v4(),
      role: Role::Admin,
    };
    let reg = registration_of(owner.user_id);
    assert!(authorize_owner(&owner, &reg).is_ok());
    assert!(matches!(authorize_owner(&stranger, &reg), Err(AppError::Forbidden(_))));
  }

  #[test]
  fn admin_check() {
    let user = Caller {
      user_id: Uuid::new_v4(),
      role: Role::User,
    };
    assert!(matches!(require_admin(&user), Err(AppError::Forbidden(_))));
    let admin = Caller { role: Role::Admin, ..user };
    assert!(require_admin(&admin).is_ok());
  }
}
