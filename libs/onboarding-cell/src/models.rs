use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_database::postgrest_error;
use shared_models::auth::Role;
use shared_models::error::{AppError, ErrorCode};

// ==============================================================================
// STORE ROWS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hospital {
    pub id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Row returned by `create_hospital_with_admin`.
#[derive(Debug, Clone, Deserialize)]
pub struct HospitalRpcResult {
    pub hospital_id: Uuid,
    pub admin_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffProfileEmbed {
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorEmbed {
    pub specialty: Option<String>,
    pub cal_event_type_id: Option<i64>,
}

/// Staff row as listed for a hospital admin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffListing {
    pub id: Uuid,
    pub role: Role,
    pub email: Option<String>,
    #[serde(default)]
    pub force_password_change: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "profiles")]
    pub profile: Option<StaffProfileEmbed>,
    #[serde(default, rename = "doctors")]
    pub doctor: Option<DoctorEmbed>,
}

// ==============================================================================
// REQUESTS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateHospitalRequest {
    pub name: String,
    pub address: Option<String>,
    pub admin_email: String,
    pub admin_full_name: String,
    pub admin_phone: Option<String>,
}

/// Body shared by the doctor and pharmacist endpoints. `hospital_id` is only
/// read by `POST /doctors`; the dashboard routes take it from the path.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateStaffRequest {
    pub hospital_id: Option<Uuid>,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub specialty: Option<String>,
    pub cal_event_type_id: Option<i64>,
}

/// Staff roles a hospital admin may create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaffKind {
    Doctor,
    Pharmacist,
}

impl StaffKind {
    pub fn role(&self) -> Role {
        match self {
            StaffKind::Doctor => Role::Doctor,
            StaffKind::Pharmacist => Role::Pharmacist,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StaffKind::Doctor => "Doctor",
            StaffKind::Pharmacist => "Pharmacist",
        }
    }
}

// ==============================================================================
// RESPONSES
// ==============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct AccountSummary {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub hospital_id: Uuid,
}

#[derive(Debug, Clone, Serialize)]
pub struct HospitalCreated {
    pub hospital: Hospital,
    pub admin: AccountSummary,
    /// Shown once; only the hash is stored.
    pub temporary_password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StaffCreated {
    #[serde(flatten)]
    pub account: AccountSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    pub temporary_password: String,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug)]
pub enum OnboardingError {
    #[error("{0}")]
    Validation(String),

    #[error("Admin email domain must match the hospital name")]
    HospitalNameMismatch,

    #[error("A hospital with this name already exists")]
    HospitalExists,

    #[error("An account with this email already exists")]
    EmailExists,

    #[error("An account with this phone number already exists")]
    PhoneExists,

    #[error("Only hospital administrators can manage staff")]
    InsufficientPermissions,

    #[error("Hospital not found")]
    HospitalNotFound,

    #[error("You can only manage staff of your own hospital")]
    HospitalMismatch,

    #[error("Email domain must match the hospital name")]
    EmailDomainMismatch,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for OnboardingError {
    fn from(err: anyhow::Error) -> Self {
        OnboardingError::Database(err.to_string())
    }
}

impl OnboardingError {
    /// Map a failed creation RPC, classifying unique violations by the
    /// constraint Postgres reports rather than by the offending value.
    pub fn from_rpc(err: anyhow::Error) -> Self {
        let constraint = postgrest_error(&err)
            .filter(|e| e.is_conflict())
            .and_then(|e| e.violated_constraint());

        match constraint.as_deref() {
            Some("hospitals_name_lower_key") => OnboardingError::HospitalExists,
            Some("users_email_key") => OnboardingError::EmailExists,
            Some("users_phone_key") => OnboardingError::PhoneExists,
            _ => OnboardingError::from(err),
        }
    }
}

impl From<OnboardingError> for AppError {
    fn from(err: OnboardingError) -> Self {
        let message = err.to_string();
        match err {
            OnboardingError::Validation(msg) => AppError::ValidationError(msg),
            OnboardingError::HospitalNameMismatch => {
                AppError::domain(ErrorCode::HospitalNameMismatch, message)
            }
            OnboardingError::HospitalExists => AppError::domain(ErrorCode::HospitalExists, message),
            OnboardingError::EmailExists => AppError::domain(ErrorCode::EmailExists, message),
            OnboardingError::PhoneExists => AppError::ValidationError(message),
            OnboardingError::InsufficientPermissions => {
                AppError::domain(ErrorCode::InsufficientPermissions, message)
            }
            OnboardingError::HospitalNotFound => AppError::domain(ErrorCode::HospitalNotFound, message),
            OnboardingError::HospitalMismatch => AppError::domain(ErrorCode::HospitalMismatch, message),
            OnboardingError::EmailDomainMismatch => {
                AppError::domain(ErrorCode::EmailDomainMismatch, message)
            }
            OnboardingError::Database(msg) => AppError::Database(msg),
            OnboardingError::Internal(msg) => AppError::Internal(msg),
        }
    }
}
