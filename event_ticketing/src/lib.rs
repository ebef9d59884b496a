// event_ticketing/src/lib.rs

//! Event registration and payment confirmation over actix-web, with each
//! state-changing operation running as a ticketflow pipeline.

pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod reports;
pub mod services;
pub mod state;
pub mod web;
