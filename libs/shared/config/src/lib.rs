use std::env;
use tracing::warn;

pub const DEFAULT_JWT_SECRET: &str = "your_jwt_secret_key";
pub const DEFAULT_JWT_REFRESH_SECRET: &str = "your_jwt_refresh_secret_key";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub supabase_url: String,
    pub supabase_service_role_key: String,
    pub jwt_secret: String,
    pub jwt_refresh_secret: String,
    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    pub twilio_from_number: String,
    pub twilio_base_url: String,
    pub cal_com_api_key: String,
    pub cal_com_base_url: String,
    pub cal_com_default_event_type_id: Option<i64>,
    pub cal_com_guest_email_domain: String,
    pub vapi_public_key: String,
    pub vapi_private_key: String,
    pub vapi_assistant_id: String,
    pub vapi_base_url: String,
    /// Offset of the clinics' wall clock from UTC, used for slot listings.
    pub business_utc_offset_minutes: i32,
    /// Seconds between calendar reconciliation runs; 0 disables the job.
    pub reconcile_interval_secs: u64,
}

fn var_or_empty(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| {
        warn!("{} not set, using empty value", name);
        String::new()
    })
}

fn var_or_default(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| {
        warn!("{} not set, using default", name);
        default.to_string()
    })
}

fn parsed_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{} is not a valid value ({}), using default", name, raw);
            default
        }),
        Err(_) => default,
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            port: parsed_var("PORT", 3000),
            supabase_url: var_or_empty("SUPABASE_URL"),
            supabase_service_role_key: var_or_empty("SUPABASE_SERVICE_ROLE_KEY"),
            jwt_secret: var_or_default("JWT_SECRET", DEFAULT_JWT_SECRET),
            jwt_refresh_secret: var_or_default("JWT_REFRESH_SECRET", DEFAULT_JWT_REFRESH_SECRET),
            twilio_account_sid: var_or_empty("TWILIO_ACCOUNT_SID"),
            twilio_auth_token: var_or_empty("TWILIO_AUTH_TOKEN"),
            twilio_from_number: var_or_empty("TWILIO_FROM_NUMBER"),
            twilio_base_url: var_or_default("TWILIO_BASE_URL", "https://api.twilio.com/2010-04-01"),
            cal_com_api_key: var_or_empty("CAL_COM_API_KEY"),
            cal_com_base_url: var_or_default("CAL_COM_BASE_URL", "https://api.cal.com/v1"),
            cal_com_default_event_type_id: env::var("CAL_COM_DEFAULT_EVENT_TYPE_ID")
                .ok()
                .and_then(|raw| raw.parse().ok()),
            cal_com_guest_email_domain: var_or_default(
                "CAL_COM_GUEST_EMAIL_DOMAIN",
                "patients.carelink.app",
            ),
            vapi_public_key: var_or_empty("VAPI_PUBLIC_KEY"),
            vapi_private_key: var_or_empty("VAPI_PRIVATE_KEY"),
            vapi_assistant_id: var_or_empty("VAPI_ASSISTANT_ID"),
            vapi_base_url: var_or_default("VAPI_BASE_URL", "https://api.vapi.ai"),
            business_utc_offset_minutes: parsed_var("BUSINESS_UTC_OFFSET_MINUTES", 330),
            reconcile_interval_secs: parsed_var("RECONCILE_INTERVAL_SECS", 900),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        if config.uses_default_jwt_secrets() {
            warn!("JWT secrets fall back to built-in defaults; set JWT_SECRET and JWT_REFRESH_SECRET");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_service_role_key.is_empty()
    }

    pub fn uses_default_jwt_secrets(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET || self.jwt_refresh_secret == DEFAULT_JWT_REFRESH_SECRET
    }

    pub fn is_sms_configured(&self) -> bool {
        !self.twilio_account_sid.is_empty()
            && !self.twilio_auth_token.is_empty()
            && !self.twilio_from_number.is_empty()
    }

    pub fn is_calendar_configured(&self) -> bool {
        !self.cal_com_api_key.is_empty() && !self.cal_com_base_url.is_empty()
    }

    pub fn is_voice_configured(&self) -> bool {
        !self.vapi_public_key.is_empty()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            supabase_url: String::new(),
            supabase_service_role_key: String::new(),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            jwt_refresh_secret: DEFAULT_JWT_REFRESH_SECRET.to_string(),
            twilio_account_sid: String::new(),
            twilio_auth_token: String::new(),
            twilio_from_number: String::new(),
            twilio_base_url: "https://api.twilio.com/2010-04-01".to_string(),
            cal_com_api_key: String::new(),
            cal_com_base_url: "https://api.cal.com/v1".to_string(),
            cal_com_default_event_type_id: None,
            cal_com_guest_email_domain: "patients.carelink.app".to_string(),
            vapi_public_key: String::new(),
            vapi_private_key: String::new(),
            vapi_assistant_id: String::new(),
            vapi_base_url: "https://api.vapi.ai".to_string(),
            business_utc_offset_minutes: 330,
            reconcile_interval_secs: 900,
        }
    }
}
