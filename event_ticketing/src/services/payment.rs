// event_ticketing/src/services/payment.rs

//! Stub payment gateway: transaction ids, payment links and order references.

use crate::errors::AppError;
use crate::models::event::format_amount;
use rand_core::{OsRng, RngCore};
use std::fmt::Write as _;

pub const ORDER_PREFIX: &str = "ORDER_";
pub const TRANSACTION_PREFIX: &str = "TXN_";
pub const CURRENCY: &str = "INR";

pub trait TransactionIdGenerator: Send + Sync {
  fn generate(&self) -> String;
}

/// 128 random bits from the OS RNG as `TXN_` plus 32 upper-case hex digits.
/// Ids are not persisted and collisions are not checked.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTransactionIds;

impl TransactionIdGenerator for RandomTransactionIds {
  fn generate(&self) -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    let mut id = String::with_capacity(TRANSACTION_PREFIX.len() + 32);
    id.push_str(TRANSACTION_PREFIX);
    for b in bytes {
      let _ = write!(id, "{:02X}", b);
    }
    id
  }
}

pub fn order_ref(registration_id: i64) -> String {
  format!("{ORDER_PREFIX}{registration_id}")
}

pub fn payment_link(registration_id: i64, amount_cents: i64) -> String {
  format!(
    "/Payment/Process?orderId={}&amount={}",
    order_ref(registration_id),
    format_amount(amount_cents)
  )
}

/// Parses `ORDER_{id}` back into a registration id.
pub fn parse_order_id(order_id: &str) -> Result<i64, AppError> {
  order_id
    .trim()
    .strip_prefix(ORDER_PREFIX)
    .and_then(|rest| rest.parse::<i64>().ok())
    .filter(|id| *id > 0)
    .ok_or_else(|| AppError::Validation(format!("Invalid order ID: '{}'", order_id)))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn transaction_ids_are_prefixed_hex() {
    let id = RandomTransactionIds.generate();
    assert!(id.starts_with("TXN_"));
    let hex = &id[4..];
    assert_eq!(hex.len(), 32);
    assert!(hex.chars().all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
    assert_ne!(id, RandomTransactionIds.generate());
  }

  #[test]
  fn payment_link_embeds_order_and_amount() {
    assert_eq!(payment_link(12, 49900), "/Payment/Process?orderId=ORDER_12&amount=499.00");
  }

  #[test]
  fn order_refs_round_trip_and_reject_garbage() {
    assert_eq!(parse_order_id(&order_ref(42)).unwrap(), 42);
    for bad in ["42", "ORDER_", "ORDER_abc", "ORDER_-3", "PAY_4"] {
      assert!(matches!(parse_order_id(bad), Err(AppError::Validation(_))), "{bad}");
    }
  }
}
