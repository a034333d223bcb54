use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_database::SupabaseClient;
use shared_models::auth::Role;
use shared_utils::jwt::{generate_tokens, TokenSubject};
use shared_utils::validation::{is_valid_indian_phone, is_valid_otp_code};

use crate::models::{AuthError, OtpDispatch, OtpRecord, PatientLogin, PatientSummary, UserRecord};
use crate::services::sms::SmsSender;

pub const OTP_TTL_MINUTES: i64 = 5;

/// Phone number as stored in the `otps` table: no leading `+`.
pub fn otp_number(phone: &str) -> &str {
    phone.trim_start_matches('+')
}

pub fn generate_otp() -> i32 {
    rand::thread_rng().gen_range(1000..=9999)
}

pub fn is_expired(created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - created_at > Duration::minutes(OTP_TTL_MINUTES)
}

pub struct OtpService {
    config: Arc<AppConfig>,
    supabase: Arc<SupabaseClient>,
    sms: Arc<dyn SmsSender>,
}

impl OtpService {
    pub fn new(config: Arc<AppConfig>, supabase: Arc<SupabaseClient>, sms: Arc<dyn SmsSender>) -> Self {
        Self { config, supabase, sms }
    }

    /// Issue a fresh code for the phone. Any previous code is discarded. SMS
    /// failure does not fail the request; the code stays valid and the caller
    /// gets a warning instead.
    pub async fn request_otp(&self, phone: &str) -> Result<OtpDispatch, AuthError> {
        if !is_valid_indian_phone(phone) {
            return Err(AuthError::InvalidPhone);
        }

        let number = otp_number(phone);
        let code = generate_otp();

        let delete_path = format!("/rest/v1/otps?number=eq.{}", number);
        let _: Value = self.supabase.request(Method::DELETE, &delete_path, None).await?;

        let _: Value = self
            .supabase
            .request(
                Method::POST,
                "/rest/v1/otps",
                Some(json!({
                    "number": number,
                    "otp": code,
                    "created_at": Utc::now().to_rfc3339()
                })),
            )
            .await?;

        debug!("Stored OTP for {}", number);

        let message = format!(
            "Your CareLink verification code is {}. It is valid for {} minutes.",
            code, OTP_TTL_MINUTES
        );

        let (sms_delivered, warning) = match self.sms.send_sms(phone, &message).await {
            Ok(()) => (true, None),
            Err(e) => {
                warn!("OTP for {} stored but SMS delivery failed: {}", number, e);
                (false, Some("OTP generated but SMS delivery failed".to_string()))
            }
        };

        info!("OTP issued for {}", number);

        Ok(OtpDispatch {
            phone: phone.to_string(),
            expires_in: Duration::minutes(OTP_TTL_MINUTES).num_seconds(),
            sms_delivered,
            warning,
        })
    }

    /// Check a code against the most recent one issued for the phone. Codes are
    /// single-use; expired codes are removed when detected.
    pub async fn verify_otp(&self, phone: &str, code: &str) -> Result<PatientLogin, AuthError> {
        if !is_valid_indian_phone(phone) {
            return Err(AuthError::InvalidPhone);
        }
        if !is_valid_otp_code(code) {
            return Err(AuthError::InvalidOtpFormat);
        }

        let number = otp_number(phone);
        let path = format!("/rest/v1/otps?number=eq.{}&order=created_at.desc&limit=1", number);

        let record: OtpRecord = self
            .supabase
            .select_one(&path)
            .await?
            .ok_or(AuthError::OtpNotFound)?;

        if is_expired(record.created_at, Utc::now()) {
            self.delete_otp(&record).await?;
            return Err(AuthError::OtpExpired);
        }

        let submitted: i32 = code.parse().map_err(|_| AuthError::InvalidOtpFormat)?;
        if submitted != record.otp {
            return Err(AuthError::InvalidOtp);
        }

        self.delete_otp(&record).await?;

        let (user, is_new_user) = self.find_or_create_patient(phone).await?;

        let tokens = generate_tokens(
            &TokenSubject {
                user_id: user.id,
                role: user.role,
                hospital_id: user.hospital_id,
            },
            &self.config,
        )
        .map_err(AuthError::Internal)?;

        info!("Patient {} verified via OTP (new user: {})", user.id, is_new_user);

        Ok(PatientLogin {
            tokens,
            user: PatientSummary {
                id: user.id,
                phone: user.phone,
                role: user.role,
                is_new_user,
            },
        })
    }

    async fn delete_otp(&self, record: &OtpRecord) -> Result<(), AuthError> {
        let path = format!("/rest/v1/otps?id=eq.{}", record.id);
        let _: Value = self.supabase.request(Method::DELETE, &path, None).await?;
        Ok(())
    }

    async fn find_or_create_patient(&self, phone: &str) -> Result<(UserRecord, bool), AuthError> {
        let now = Utc::now().to_rfc3339();
        let lookup = format!("/rest/v1/users?phone=eq.{}", urlencoding::encode(phone));

        if let Some(existing) = self.supabase.select_one::<UserRecord>(&lookup).await? {
            let path = format!("/rest/v1/users?id=eq.{}", existing.id);
            let _: Value = self
                .supabase
                .request(
                    Method::PATCH,
                    &path,
                    Some(json!({ "updated_at": now, "last_login": now })),
                )
                .await?;
            return Ok((existing, false));
        }

        let rows = self
            .supabase
            .request_returning(
                Method::POST,
                "/rest/v1/users",
                json!({
                    "role": Role::Patient,
                    "phone": phone,
                    "last_login": now,
                    "created_at": now,
                    "updated_at": now
                }),
            )
            .await?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| AuthError::DatabaseError("User insert returned no rows".to_string()))?;
        let user: UserRecord =
            serde_json::from_value(row).map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok((user, true))
    }
}
