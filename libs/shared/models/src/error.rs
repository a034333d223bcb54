use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Public error codes surfaced in the `code` field of failure envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Unauthorized,
    InsufficientPermissions,
    ValidationError,
    RateLimited,
    OtpNotFound,
    OtpExpired,
    InvalidOtp,
    InvalidCredentials,
    AccountLocked,
    EmailExists,
    HospitalExists,
    HospitalNotFound,
    HospitalMismatch,
    HospitalNameMismatch,
    EmailDomainMismatch,
    DoctorNotFound,
    AppointmentNotFound,
    PastDatetime,
    SlotUnavailable,
    CalComError,
    ConfigError,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::InsufficientPermissions => "INSUFFICIENT_PERMISSIONS",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::RateLimited => "RATE_LIMITED",
            ErrorCode::OtpNotFound => "OTP_NOT_FOUND",
            ErrorCode::OtpExpired => "OTP_EXPIRED",
            ErrorCode::InvalidOtp => "INVALID_OTP",
            ErrorCode::InvalidCredentials => "INVALID_CREDENTIALS",
            ErrorCode::AccountLocked => "ACCOUNT_LOCKED",
            ErrorCode::EmailExists => "EMAIL_EXISTS",
            ErrorCode::HospitalExists => "HOSPITAL_EXISTS",
            ErrorCode::HospitalNotFound => "HOSPITAL_NOT_FOUND",
            ErrorCode::HospitalMismatch => "HOSPITAL_MISMATCH",
            ErrorCode::HospitalNameMismatch => "HOSPITAL_NAME_MISMATCH",
            ErrorCode::EmailDomainMismatch => "EMAIL_DOMAIN_MISMATCH",
            ErrorCode::DoctorNotFound => "DOCTOR_NOT_FOUND",
            ErrorCode::AppointmentNotFound => "APPOINTMENT_NOT_FOUND",
            ErrorCode::PastDatetime => "PAST_DATETIME",
            ErrorCode::SlotUnavailable => "SLOT_UNAVAILABLE",
            ErrorCode::CalComError => "CAL_COM_ERROR",
            ErrorCode::ConfigError => "CONFIG_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::Unauthorized | ErrorCode::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ErrorCode::InsufficientPermissions | ErrorCode::HospitalMismatch => StatusCode::FORBIDDEN,
            ErrorCode::ValidationError
            | ErrorCode::OtpNotFound
            | ErrorCode::OtpExpired
            | ErrorCode::InvalidOtp
            | ErrorCode::HospitalNameMismatch
            | ErrorCode::EmailDomainMismatch
            | ErrorCode::PastDatetime => StatusCode::BAD_REQUEST,
            ErrorCode::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ErrorCode::AccountLocked => StatusCode::LOCKED,
            ErrorCode::EmailExists | ErrorCode::HospitalExists | ErrorCode::SlotUnavailable => {
                StatusCode::CONFLICT
            }
            ErrorCode::HospitalNotFound
            | ErrorCode::DoctorNotFound
            | ErrorCode::AppointmentNotFound => StatusCode::NOT_FOUND,
            ErrorCode::CalComError => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::ConfigError | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Too many requests: {0}")]
    RateLimited(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(String),

    /// A domain failure with its own public code.
    #[error("{message}")]
    Domain { code: ErrorCode, message: String },
}

impl AppError {
    pub fn domain(code: ErrorCode, message: impl Into<String>) -> Self {
        AppError::Domain { code, message: message.into() }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Auth(_) => ErrorCode::Unauthorized,
            AppError::Forbidden(_) => ErrorCode::InsufficientPermissions,
            AppError::ValidationError(_) => ErrorCode::ValidationError,
            AppError::RateLimited(_) => ErrorCode::RateLimited,
            AppError::Internal(_) | AppError::Database(_) => ErrorCode::InternalError,
            AppError::Domain { code, .. } => *code,
        }
    }

    /// Message safe to show to callers; store failures are not echoed.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Internal(_) | AppError::Database(_) => "Internal server error".to_string(),
            AppError::Auth(msg)
            | AppError::Forbidden(msg)
            | AppError::ValidationError(msg)
            | AppError::RateLimited(msg) => msg.clone(),
            AppError::Domain { message, .. } => message.clone(),
        }
    }
}

// Extractor rejections go out in the same envelope as every other failure.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let status = code.status();

        tracing::error!("Error: {} {}: {}", status, code.as_str(), self);

        let body = Json(json!({
            "success": false,
            "code": code.as_str(),
            "message": self.public_message()
        }));

        (status, body).into_response()
    }
}
