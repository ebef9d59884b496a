// event_ticketing/src/models/mod.rs

//! Rows of the four tables and the joined read models built from them.

pub mod event;
pub mod registration;
pub mod ticket_email;
pub mod user;

pub use event::{Event, EventInput};
pub use registration::{Attendee, PaymentStatus, Registration, RegistrationDetails, UserTicket};
pub use ticket_email::{NewTicketEmail, TicketEmail, TicketEmailEntry};
pub use user::{NewUser, Role, User};
