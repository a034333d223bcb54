use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::{Role, User};

use crate::models::{patient_room, VapiSession, VapiSessionRequest, VoiceError};
use crate::services::vapi::VapiClient;

pub struct VoiceSessionService {
    config: Arc<AppConfig>,
    vapi: Arc<VapiClient>,
}

impl VoiceSessionService {
    pub fn new(config: Arc<AppConfig>, vapi: Arc<VapiClient>) -> Self {
        Self { config, vapi }
    }

    /// Hand the client what it needs to open a Vapi call itself. Nothing is
    /// stored; a new session id is minted on every call.
    pub async fn create_session(
        &self,
        user: &User,
        request: VapiSessionRequest,
    ) -> Result<VapiSession, VoiceError> {
        if user.role != Role::Patient {
            return Err(VoiceError::Forbidden);
        }

        let assistant_id = request
            .assistant_id
            .filter(|id| !id.trim().is_empty())
            .or_else(|| Some(self.config.vapi_assistant_id.clone()).filter(|id| !id.is_empty()))
            .ok_or(VoiceError::AssistantNotConfigured)?;

        if !self.config.is_voice_configured() {
            return Err(VoiceError::PublicKeyMissing);
        }

        let assistant = if self.vapi.has_private_key() {
            match self.vapi.fetch_assistant(&assistant_id).await {
                Ok(assistant) => Some(assistant),
                Err(e) => {
                    warn!("Continuing without assistant metadata for {}: {}", assistant_id, e);
                    None
                }
            }
        } else {
            None
        };

        let session = VapiSession {
            session_id: Uuid::new_v4(),
            public_key: self.config.vapi_public_key.clone(),
            assistant_id,
            room: patient_room(user.id),
            assistant,
        };

        info!("Voice session {} issued to patient {}", session.session_id, user.id);
        Ok(session)
    }
}
