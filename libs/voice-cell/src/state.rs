use std::sync::Arc;

use shared_config::AppConfig;

use crate::relay::RelayHub;
use crate::services::{VapiClient, VoiceSessionService};

pub struct VoiceState {
    pub config: Arc<AppConfig>,
    pub hub: Arc<RelayHub>,
    pub vapi: Arc<VapiClient>,
}

impl VoiceState {
    pub fn new(config: Arc<AppConfig>) -> Self {
        let vapi = Arc::new(VapiClient::new(&config));
        Self {
            config,
            hub: Arc::new(RelayHub::new()),
            vapi,
        }
    }

    pub fn session_service(&self) -> VoiceSessionService {
        VoiceSessionService::new(self.config.clone(), self.vapi.clone())
    }
}
