//! Appointment booking mirrored into Cal.com, slot listings, cancellation and
//! the calendar reconciliation job.

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod state;

pub use router::appointment_routes;
pub use state::AppointmentState;
