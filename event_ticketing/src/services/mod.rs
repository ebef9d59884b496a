// event_ticketing/src/services/mod.rs

pub mod auth_service;
pub mod email;
pub mod messages;
pub mod payment;
pub mod session;
