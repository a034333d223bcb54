pub mod booking;
pub mod calendar;
pub mod directory;
pub mod management;
pub mod reconcile;
pub mod slots;

pub use booking::AppointmentBookingService;
pub use calendar::{CalComClient, CalendarError, CalendarProvider};
pub use management::AppointmentService;
pub use reconcile::ReconciliationJob;
pub use slots::SlotService;
