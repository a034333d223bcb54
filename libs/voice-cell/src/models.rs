use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use shared_models::error::{AppError, ErrorCode};

/// Events a client may push through the relay. Anything else is dropped.
pub const RELAYED_EVENTS: [&str; 2] = ["voice_control", "initialize_voice_session"];

pub fn patient_room(patient_id: Uuid) -> String {
    format!("patient-{}", patient_id)
}

#[derive(Debug, Default, Deserialize)]
pub struct VapiSessionRequest {
    pub assistant_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VapiSession {
    pub session_id: Uuid,
    pub public_key: String,
    pub assistant_id: String,
    pub room: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assistant: Option<Value>,
}

/// Wire shape of relay messages: `{ "event": "...", "data": ... }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayEvent {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

impl RelayEvent {
    pub fn is_relayed(&self) -> bool {
        RELAYED_EVENTS.contains(&self.event.as_str())
    }
}

/// Query string accepted by the socket handshake.
#[derive(Debug, Default, Deserialize)]
pub struct SocketAuth {
    pub token: Option<String>,
}

#[derive(Error, Debug)]
pub enum VoiceError {
    #[error("Only patients can start voice sessions")]
    Forbidden,

    #[error("Voice assistant is not configured")]
    AssistantNotConfigured,

    #[error("Voice service public key is not configured")]
    PublicKeyMissing,

    #[error("Vapi API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Vapi request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl From<VoiceError> for AppError {
    fn from(err: VoiceError) -> Self {
        let message = err.to_string();
        match err {
            VoiceError::Forbidden => AppError::domain(ErrorCode::InsufficientPermissions, message),
            VoiceError::AssistantNotConfigured => AppError::domain(ErrorCode::ConfigError, message),
            VoiceError::PublicKeyMissing | VoiceError::Api { .. } | VoiceError::Transport(_) => {
                AppError::Internal(message)
            }
        }
    }
}
