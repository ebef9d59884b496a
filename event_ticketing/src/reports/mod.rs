// event_ticketing/src/reports/mod.rs

//! Admin exports (xlsx, CSV and PDF) and the downloadable ticket.

pub mod pdf;
pub mod report;
pub mod ticket;
pub mod xlsx;

pub use report::{RegistrationReport, ReportRow};
