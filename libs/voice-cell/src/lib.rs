//! Voice assistant session bootstrap and the per-patient WebSocket relay.

pub mod handlers;
pub mod models;
pub mod relay;
pub mod router;
pub mod services;
pub mod state;

pub use relay::RelayHub;
pub use router::voice_routes;
pub use state::VoiceState;
