use std::sync::Arc;

use shared_config::AppConfig;
use shared_database::SupabaseClient;

use crate::services::{CredentialService, OtpRateLimiter, OtpService, SmsSender, StaffAuthService};

pub struct AuthState {
    pub config: Arc<AppConfig>,
    pub supabase: Arc<SupabaseClient>,
    pub sms: Arc<dyn SmsSender>,
    pub otp_limiter: Arc<OtpRateLimiter>,
}

impl AuthState {
    pub fn new(config: Arc<AppConfig>, supabase: Arc<SupabaseClient>, sms: Arc<dyn SmsSender>) -> Self {
        Self {
            config,
            supabase,
            sms,
            otp_limiter: Arc::new(OtpRateLimiter::default()),
        }
    }

    pub fn otp_service(&self) -> OtpService {
        OtpService::new(self.config.clone(), self.supabase.clone(), self.sms.clone())
    }

    pub fn staff_service(&self) -> StaffAuthService {
        StaffAuthService::new(self.config.clone(), self.supabase.clone())
    }

    pub fn credential_service(&self) -> CredentialService {
        CredentialService::new(self.config.clone(), self.supabase.clone())
    }
}
