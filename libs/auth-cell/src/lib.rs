//! Patient OTP login, staff password login with lockout, and token refresh.

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod state;

pub use router::auth_routes;
pub use state::AuthState;
