use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, error, info};

use shared_config::AppConfig;

#[derive(Error, Debug)]
pub enum SmsError {
    #[error("SMS provider is not configured")]
    NotConfigured,

    #[error("SMS provider rejected the message ({status}): {message}")]
    Provider { status: u16, message: String },

    #[error("SMS transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Outbound SMS delivery. Injected into the auth state so tests and
/// alternative providers can stand in for Twilio.
#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send_sms(&self, to: &str, body: &str) -> Result<(), SmsError>;
}

/// Twilio Programmable Messaging client.
/// POST {base}/Accounts/{sid}/Messages.json
pub struct TwilioSmsClient {
    client: Client,
    base_url: String,
    account_sid: String,
    auth_token: String,
    from_number: String,
    configured: bool,
}

impl TwilioSmsClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.twilio_base_url.trim_end_matches('/').to_string(),
            account_sid: config.twilio_account_sid.clone(),
            auth_token: config.twilio_auth_token.clone(),
            from_number: config.twilio_from_number.clone(),
            configured: config.is_sms_configured(),
        }
    }
}

#[async_trait]
impl SmsSender for TwilioSmsClient {
    async fn send_sms(&self, to: &str, body: &str) -> Result<(), SmsError> {
        if !self.configured {
            return Err(SmsError::NotConfigured);
        }

        let url = format!("{}/Accounts/{}/Messages.json", self.base_url, self.account_sid);
        debug!("Sending SMS via Twilio to {}", to);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("To", to), ("From", self.from_number.as_str()), ("Body", body)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!("Twilio send failed: {} - {}", status, message);
            return Err(SmsError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        info!("SMS dispatched to {}", to);
        Ok(())
    }
}
