pub mod session;
pub mod vapi;

pub use session::VoiceSessionService;
pub use vapi::VapiClient;
