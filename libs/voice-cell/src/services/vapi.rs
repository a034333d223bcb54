use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error};

use shared_config::AppConfig;

use crate::models::VoiceError;

/// Server-side Vapi client, authenticated with the private key.
pub struct VapiClient {
    client: Client,
    base_url: String,
    private_key: String,
}

impl VapiClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.vapi_base_url.trim_end_matches('/').to_string(),
            private_key: config.vapi_private_key.clone(),
        }
    }

    pub fn has_private_key(&self) -> bool {
        !self.private_key.is_empty()
    }

    /// GET /assistant/{id}
    pub async fn fetch_assistant(&self, assistant_id: &str) -> Result<Value, VoiceError> {
        let url = format!("{}/assistant/{}", self.base_url, assistant_id);
        debug!("Fetching Vapi assistant {}", assistant_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.private_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await?;
            error!("Vapi assistant lookup failed: {} - {}", status, message);
            return Err(VoiceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}
