//! Hospital, doctor and pharmacist onboarding with one-time temporary passwords.

pub mod domain;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod state;

pub use router::onboarding_routes;
pub use state::OnboardingState;
