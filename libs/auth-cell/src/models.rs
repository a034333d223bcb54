use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::auth::{Role, TokenPair};
use shared_models::error::{AppError, ErrorCode};

// ==============================================================================
// STORE ROWS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileEmbed {
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub role: Role,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default, skip_serializing)]
    pub password_hash: Option<String>,
    pub hospital_id: Option<Uuid>,
    #[serde(default)]
    pub force_password_change: bool,
    #[serde(default)]
    pub password_temp: bool,
    #[serde(default)]
    pub login_attempts: i32,
    pub lockout_until: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "profiles")]
    pub profile: Option<ProfileEmbed>,
}

impl UserRecord {
    pub fn full_name(&self) -> Option<&str> {
        self.profile.as_ref().and_then(|p| p.full_name.as_deref())
    }

    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.lockout_until.map(|until| until > now).unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpRecord {
    pub id: Uuid,
    pub number: String,
    pub otp: i32,
    pub created_at: DateTime<Utc>,
}

// ==============================================================================
// REQUEST / RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct OtpRequest {
    pub phone: Option<String>,
}

/// Mobile clients send the code either as a string or as a JSON number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OtpInput {
    Text(String),
    Number(u64),
}

impl OtpInput {
    pub fn as_code(&self) -> String {
        match self {
            OtpInput::Text(text) => text.trim().to_string(),
            OtpInput::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerifyOtpRequest {
    pub phone: String,
    pub otp: OtpInput,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StaffLoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OtpDispatch {
    pub phone: String,
    pub expires_in: i64,
    pub sms_delivered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PatientLogin {
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub user: PatientSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct PatientSummary {
    pub id: Uuid,
    pub phone: Option<String>,
    pub role: Role,
    pub is_new_user: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct StaffLogin {
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub user: StaffSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct StaffSummary {
    pub id: Uuid,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub role: Role,
    pub hospital_id: Option<Uuid>,
    pub force_password_change: bool,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Phone number must be +91 followed by 10 digits")]
    InvalidPhone,

    #[error("OTP must be exactly 4 digits")]
    InvalidOtpFormat,

    #[error("No OTP found for this number. Please request a new one")]
    OtpNotFound,

    #[error("OTP has expired. Please request a new one")]
    OtpExpired,

    #[error("Invalid OTP")]
    InvalidOtp,

    #[error("Too many OTP requests. Please try again after 15 minutes")]
    RateLimited,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account is locked until {until}")]
    AccountLocked { until: DateTime<Utc> },

    #[error("{0}")]
    WeakPassword(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid token: {0}")]
    Token(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        AuthError::DatabaseError(err.to_string())
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let message = err.to_string();
        match err {
            AuthError::InvalidPhone | AuthError::InvalidOtpFormat | AuthError::WeakPassword(_) => {
                AppError::ValidationError(message)
            }
            AuthError::OtpNotFound => AppError::domain(ErrorCode::OtpNotFound, message),
            AuthError::OtpExpired => AppError::domain(ErrorCode::OtpExpired, message),
            AuthError::InvalidOtp => AppError::domain(ErrorCode::InvalidOtp, message),
            AuthError::RateLimited => AppError::RateLimited(message),
            AuthError::InvalidCredentials => AppError::domain(ErrorCode::InvalidCredentials, message),
            AuthError::AccountLocked { .. } => AppError::domain(ErrorCode::AccountLocked, message),
            AuthError::UserNotFound | AuthError::Token(_) => AppError::Auth(message),
            AuthError::DatabaseError(msg) => AppError::Database(msg),
            AuthError::Internal(msg) => AppError::Internal(msg),
        }
    }
}
