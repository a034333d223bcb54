use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use shared_models::auth::Role;
use shared_models::error::{AppError, ErrorCode};

use crate::services::calendar::CalendarError;

// ==============================================================================
// STATUS AND TYPE
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
    Rescheduled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "SCHEDULED",
            AppointmentStatus::Confirmed => "CONFIRMED",
            AppointmentStatus::InProgress => "IN_PROGRESS",
            AppointmentStatus::Completed => "COMPLETED",
            AppointmentStatus::Cancelled => "CANCELLED",
            AppointmentStatus::NoShow => "NO_SHOW",
            AppointmentStatus::Rescheduled => "RESCHEDULED",
        }
    }

    /// Statuses reachable from this one.
    pub fn valid_transitions(&self) -> &'static [AppointmentStatus] {
        match self {
            AppointmentStatus::Scheduled => &[
                AppointmentStatus::Confirmed,
                AppointmentStatus::InProgress,
                AppointmentStatus::Completed,
                AppointmentStatus::Cancelled,
                AppointmentStatus::NoShow,
                AppointmentStatus::Rescheduled,
            ],
            AppointmentStatus::Confirmed
            | AppointmentStatus::InProgress
            | AppointmentStatus::Rescheduled => &[
                AppointmentStatus::Scheduled,
                AppointmentStatus::Cancelled,
            ],
            // The remote booking is gone once cancelled, so there is no way back.
            AppointmentStatus::Cancelled
            | AppointmentStatus::Completed
            | AppointmentStatus::NoShow => &[],
        }
    }

    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        self.valid_transitions().contains(&next)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statuses a client may set through `PATCH /appointments/{id}/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestedStatus {
    Cancelled,
    Pending,
}

impl RequestedStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "cancelled" => Some(RequestedStatus::Cancelled),
            "pending" => Some(RequestedStatus::Pending),
            _ => None,
        }
    }

    pub fn stored_status(&self) -> AppointmentStatus {
        match self {
            RequestedStatus::Cancelled => AppointmentStatus::Cancelled,
            RequestedStatus::Pending => AppointmentStatus::Scheduled,
        }
    }
}

pub const DEFAULT_DURATION_MINUTES: i64 = 30;

/// Visit types with their fixed durations. Unknown types are kept verbatim
/// and booked for the default duration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AppointmentType {
    #[default]
    Consultation,
    Followup,
    Emergency,
    SurgeryConsultation,
    Telemedicine,
    PrescriptionReview,
    FollowUpSurgery,
    Other(String),
}

impl AppointmentType {
    pub fn duration_minutes(&self) -> i64 {
        match self {
            AppointmentType::Consultation => 30,
            AppointmentType::Followup => 20,
            AppointmentType::Emergency => 60,
            AppointmentType::SurgeryConsultation => 45,
            AppointmentType::Telemedicine => 30,
            AppointmentType::PrescriptionReview => 15,
            AppointmentType::FollowUpSurgery => 30,
            AppointmentType::Other(_) => DEFAULT_DURATION_MINUTES,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AppointmentType::Consultation => "consultation",
            AppointmentType::Followup => "followup",
            AppointmentType::Emergency => "emergency",
            AppointmentType::SurgeryConsultation => "surgery_consultation",
            AppointmentType::Telemedicine => "telemedicine",
            AppointmentType::PrescriptionReview => "prescription_review",
            AppointmentType::FollowUpSurgery => "follow_up_surgery",
            AppointmentType::Other(raw) => raw.as_str(),
        }
    }
}

impl From<String> for AppointmentType {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "consultation" => AppointmentType::Consultation,
            "followup" => AppointmentType::Followup,
            "emergency" => AppointmentType::Emergency,
            "surgery_consultation" => AppointmentType::SurgeryConsultation,
            "telemedicine" => AppointmentType::Telemedicine,
            "prescription_review" => AppointmentType::PrescriptionReview,
            "follow_up_surgery" => AppointmentType::FollowUpSurgery,
            _ => AppointmentType::Other(raw),
        }
    }
}

impl From<AppointmentType> for String {
    fn from(kind: AppointmentType) -> Self {
        match kind {
            AppointmentType::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for AppointmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==============================================================================
// STORE ROWS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub appointment_number: String,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_type: AppointmentType,
    pub start_ts: DateTime<Utc>,
    pub end_ts: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub cal_booking_id: Option<i64>,
    pub cal_booking_uid: Option<String>,
    #[serde(default, skip_serializing)]
    pub cal_raw_payload: Option<Value>,
    pub meeting_link: Option<String>,
    pub notes: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Appointment {
    /// Patients see their own bookings; doctors see those made with them.
    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.patient_id == user_id || self.doctor_id == user_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameEmbed {
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorDetailsEmbed {
    pub specialty: Option<String>,
    pub cal_event_type_id: Option<i64>,
}

/// A user row with its profile and doctor extension embedded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorRecord {
    pub id: Uuid,
    pub role: Role,
    pub email: Option<String>,
    pub hospital_id: Option<Uuid>,
    #[serde(default, rename = "profiles")]
    pub profile: Option<NameEmbed>,
    #[serde(default, rename = "doctors")]
    pub details: Option<DoctorDetailsEmbed>,
}

impl DoctorRecord {
    pub fn full_name(&self) -> Option<&str> {
        self.profile.as_ref().and_then(|p| p.full_name.as_deref())
    }

    pub fn specialty(&self) -> Option<&str> {
        self.details.as_ref().and_then(|d| d.specialty.as_deref())
    }

    pub fn cal_event_type_id(&self) -> Option<i64> {
        self.details.as_ref().and_then(|d| d.cal_event_type_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientRecord {
    pub id: Uuid,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[serde(default, rename = "profiles")]
    pub profile: Option<NameEmbed>,
}

impl PatientRecord {
    pub fn full_name(&self) -> Option<&str> {
        self.profile.as_ref().and_then(|p| p.full_name.as_deref())
    }
}

// ==============================================================================
// REQUESTS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: Uuid,
    pub appointment_datetime: DateTime<Utc>,
    #[serde(default)]
    pub appointment_type: AppointmentType,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailableSlotsQuery {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

// ==============================================================================
// RESPONSES
// ==============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct DoctorSummary {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub specialty: Option<String>,
    pub email: Option<String>,
}

impl From<&DoctorRecord> for DoctorSummary {
    fn from(doctor: &DoctorRecord) -> Self {
        Self {
            id: doctor.id,
            full_name: doctor.full_name().map(str::to_string),
            specialty: doctor.specialty().map(str::to_string),
            email: doctor.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PatientSummary {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotDetails {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_minutes: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingConfirmation {
    pub appointment: Appointment,
    pub doctor: DoctorSummary,
    pub patient: PatientSummary,
    pub slot: SlotDetails,
    pub meeting_link: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotView {
    /// Local wall-clock time, `HH:MM`.
    pub time: String,
    pub start: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AvailableSlots {
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub slots: Vec<SlotView>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug)]
pub enum AppointmentError {
    #[error("Appointment must be booked at least 60 minutes in advance")]
    PastDatetime,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Appointment not found")]
    NotFound,

    #[error("The requested slot is not available")]
    SlotUnavailable,

    #[error("You do not have access to this appointment")]
    Forbidden,

    #[error("{0}")]
    Validation(String),

    #[error("Calendar service error: {0}")]
    Calendar(#[from] CalendarError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for AppointmentError {
    fn from(err: anyhow::Error) -> Self {
        AppointmentError::Database(err.to_string())
    }
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        let message = err.to_string();
        match err {
            AppointmentError::PastDatetime => AppError::domain(ErrorCode::PastDatetime, message),
            AppointmentError::DoctorNotFound => AppError::domain(ErrorCode::DoctorNotFound, message),
            AppointmentError::NotFound => AppError::domain(ErrorCode::AppointmentNotFound, message),
            AppointmentError::SlotUnavailable => AppError::domain(ErrorCode::SlotUnavailable, message),
            AppointmentError::Forbidden => AppError::domain(ErrorCode::InsufficientPermissions, message),
            AppointmentError::Validation(msg) => AppError::ValidationError(msg),
            AppointmentError::Calendar(_) => AppError::domain(ErrorCode::CalComError, message),
            AppointmentError::Database(msg) => AppError::Database(msg),
            AppointmentError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_table() {
        assert_eq!(AppointmentType::Consultation.duration_minutes(), 30);
        assert_eq!(AppointmentType::Followup.duration_minutes(), 20);
        assert_eq!(AppointmentType::Emergency.duration_minutes(), 60);
        assert_eq!(AppointmentType::SurgeryConsultation.duration_minutes(), 45);
        assert_eq!(AppointmentType::Telemedicine.duration_minutes(), 30);
        assert_eq!(AppointmentType::PrescriptionReview.duration_minutes(), 15);
        assert_eq!(AppointmentType::FollowUpSurgery.duration_minutes(), 30);
        assert_eq!(AppointmentType::from("dental".to_string()).duration_minutes(), 30);
    }

    #[test]
    fn unknown_types_keep_their_name() {
        let kind: AppointmentType = serde_json::from_value(serde_json::json!("dental")).unwrap();
        assert_eq!(kind, AppointmentType::Other("dental".to_string()));
        assert_eq!(serde_json::to_value(&kind).unwrap(), "dental");

        let kind: AppointmentType = serde_json::from_value(serde_json::json!("Emergency")).unwrap();
        assert_eq!(kind, AppointmentType::Emergency);
    }

    #[test]
    fn only_cancelled_and_pending_are_client_settable() {
        assert_eq!(RequestedStatus::parse("CANCELLED"), Some(RequestedStatus::Cancelled));
        assert_eq!(
            RequestedStatus::parse("pending").map(|s| s.stored_status()),
            Some(AppointmentStatus::Scheduled)
        );
        assert_eq!(RequestedStatus::parse("completed"), None);
    }

    #[test]
    fn scheduled_reaches_every_other_status() {
        for next in [
            AppointmentStatus::Confirmed,
            AppointmentStatus::InProgress,
            AppointmentStatus::Completed,
            AppointmentStatus::Cancelled,
            AppointmentStatus::NoShow,
            AppointmentStatus::Rescheduled,
        ] {
            assert!(AppointmentStatus::Scheduled.can_transition_to(next));
        }
        assert!(!AppointmentStatus::Completed.can_transition_to(AppointmentStatus::Scheduled));
        assert!(!AppointmentStatus::Cancelled.can_transition_to(AppointmentStatus::Scheduled));
    }
}
