//! Mutations on mail, calendar and contact records

mod handler;

pub use handler::{ActionHandler, OutgoingMessage, labels};
