use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use reqwest::Method;
use serde_json::json;
use tracing::{debug, error, info, warn};

use shared_config::AppConfig;
use shared_database::SupabaseClient;
use shared_models::auth::{Role, User};

use crate::models::{
    Appointment, AppointmentError, AppointmentStatus, BookAppointmentRequest, BookingConfirmation,
    DoctorSummary, PatientRecord, PatientSummary, SlotDetails,
};
use crate::services::calendar::{
    Attendee, CalBooking, CalendarError, CalendarProvider, NewBooking, BOOKING_SOURCE,
};
use crate::services::directory::{find_doctor, find_patient};

pub const MIN_LEAD_TIME_MINUTES: i64 = 60;

/// `AID-{YYYYMMDD}-{NNNN}`: creation date plus the low four digits of the
/// epoch millis. A human-friendly reference, not a key.
pub fn appointment_number(now: DateTime<Utc>) -> String {
    format!(
        "AID-{}-{:04}",
        now.format("%Y%m%d"),
        now.timestamp_millis().rem_euclid(10_000)
    )
}

pub fn meets_lead_time(requested: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    requested > now + Duration::minutes(MIN_LEAD_TIME_MINUTES)
}

/// Attendee identity sent to the calendar. Patients sign in by phone, so a
/// synthetic address under the guest domain stands in when no email is known.
pub fn attendee_for(patient: &PatientRecord, guest_domain: &str) -> Attendee {
    let email = patient.email.clone().unwrap_or_else(|| {
        let local = patient
            .phone
            .as_deref()
            .map(|phone| phone.chars().filter(char::is_ascii_digit).collect::<String>())
            .filter(|digits| !digits.is_empty())
            .unwrap_or_else(|| patient.id.to_string());
        format!("{}@{}", local, guest_domain)
    });

    Attendee {
        name: patient.full_name().unwrap_or("CareLink Patient").to_string(),
        email,
    }
}

pub struct AppointmentBookingService {
    config: Arc<AppConfig>,
    supabase: Arc<SupabaseClient>,
    calendar: Arc<dyn CalendarProvider>,
}

impl AppointmentBookingService {
    pub fn new(
        config: Arc<AppConfig>,
        supabase: Arc<SupabaseClient>,
        calendar: Arc<dyn CalendarProvider>,
    ) -> Self {
        Self { config, supabase, calendar }
    }

    /// Book in two phases: the remote calendar booking first, then the local
    /// row. A failed local write is compensated by cancelling the remote
    /// booking; if that fails too the reconciliation job cleans up.
    pub async fn book_appointment(
        &self,
        user: &User,
        request: BookAppointmentRequest,
    ) -> Result<BookingConfirmation, AppointmentError> {
        match user.role {
            Role::Patient => {}
            Role::Doctor | Role::Pharmacist | Role::HospitalAdmin => {
                return Err(AppointmentError::Forbidden)
            }
        }

        let now = Utc::now();
        let start = request.appointment_datetime;
        if !meets_lead_time(start, now) {
            return Err(AppointmentError::PastDatetime);
        }

        let doctor = find_doctor(&self.supabase, request.doctor_id)
            .await?
            .ok_or(AppointmentError::DoctorNotFound)?;

        let patient = find_patient(&self.supabase, user.id)
            .await?
            .ok_or_else(|| AppointmentError::Internal(format!("Patient {} has no user row", user.id)))?;

        let number = appointment_number(now);
        let duration = request.appointment_type.duration_minutes();
        let end = start + Duration::minutes(duration);

        let event_type_id = doctor
            .cal_event_type_id()
            .or_else(|| self.calendar.default_event_type_id())
            .ok_or(CalendarError::NoEventType)?;

        debug!(
            "Booking {} for patient {} with doctor {} at {} ({} min)",
            number, user.id, doctor.id, start, duration
        );

        if !self.calendar.check_availability(event_type_id, start, end).await? {
            return Err(AppointmentError::SlotUnavailable);
        }

        let mut metadata = HashMap::new();
        metadata.insert("source".to_string(), BOOKING_SOURCE.to_string());
        metadata.insert("appointment_number".to_string(), number.clone());
        metadata.insert("patient_id".to_string(), user.id.to_string());
        metadata.insert("doctor_id".to_string(), doctor.id.to_string());
        metadata.insert("created_at".to_string(), now.to_rfc3339());

        let remote = self
            .calendar
            .create_booking(&NewBooking {
                event_type_id,
                start,
                end,
                attendee: attendee_for(&patient, &self.config.cal_com_guest_email_domain),
                title: format!(
                    "{} with {}",
                    request.appointment_type,
                    doctor.full_name().unwrap_or("doctor")
                ),
                notes: request.notes.clone(),
                metadata,
            })
            .await?;

        let appointment = match self.persist(&number, user, &request, start, end, &remote).await {
            Ok(appointment) => appointment,
            Err(e) => {
                self.compensate(&remote, &number).await;
                return Err(e);
            }
        };

        info!(
            "Appointment {} ({}) booked with Cal.com booking {}",
            appointment.id, number, remote.id
        );

        let meeting_link = appointment.meeting_link.clone();
        Ok(BookingConfirmation {
            doctor: DoctorSummary::from(&doctor),
            patient: PatientSummary {
                id: patient.id,
                full_name: patient.full_name().map(str::to_string),
                phone: patient.phone.clone(),
            },
            slot: SlotDetails {
                start,
                end,
                duration_minutes: duration,
            },
            meeting_link,
            appointment,
        })
    }

    async fn persist(
        &self,
        number: &str,
        user: &User,
        request: &BookAppointmentRequest,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        remote: &CalBooking,
    ) -> Result<Appointment, AppointmentError> {
        let now = Utc::now().to_rfc3339();
        let rows = self
            .supabase
            .request_returning(
                Method::POST,
                "/rest/v1/appointments",
                json!({
                    "appointment_number": number,
                    "patient_id": user.id,
                    "doctor_id": request.doctor_id,
                    "appointment_type": request.appointment_type,
                    "start_ts": start.to_rfc3339(),
                    "end_ts": end.to_rfc3339(),
                    "status": AppointmentStatus::Scheduled,
                    "cal_booking_id": remote.id,
                    "cal_booking_uid": remote.uid,
                    "cal_raw_payload": remote.raw,
                    "meeting_link": remote.meeting_link(),
                    "notes": request.notes,
                    "last_synced_at": now,
                    "created_at": now,
                    "updated_at": now
                }),
            )
            .await?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| AppointmentError::Database("Appointment insert returned no rows".to_string()))?;

        serde_json::from_value(row).map_err(|e| AppointmentError::Database(e.to_string()))
    }

    async fn compensate(&self, remote: &CalBooking, number: &str) {
        warn!(
            "Local write for {} failed; cancelling Cal.com booking {}",
            number, remote.id
        );

        if let Err(e) = self
            .calendar
            .cancel_booking(remote.id, "Booking could not be recorded")
            .await
        {
            error!(
                "Orphaned Cal.com booking {} ({}) for {}: compensation failed: {}",
                remote.id, remote.uid, number, e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    #[test]
    fn appointment_number_uses_date_and_millis() {
        let now = Utc.with_ymd_and_hms(2024, 5, 17, 10, 0, 0).unwrap() + Duration::milliseconds(42);
        let number = appointment_number(now);
        assert!(number.starts_with("AID-20240517-"));
        assert_eq!(number.len(), "AID-20240517-0042".len());
        assert_eq!(&number[13..], format!("{:04}", now.timestamp_millis() % 10_000));
    }

    #[test]
    fn lead_time_is_strictly_more_than_an_hour() {
        let now = Utc::now();
        assert!(!meets_lead_time(now + Duration::minutes(60), now));
        assert!(meets_lead_time(now + Duration::minutes(61), now));
        assert!(!meets_lead_time(now - Duration::days(1), now));
    }

    #[test]
    fn attendee_falls_back_to_phone_based_guest_email() {
        let patient = PatientRecord {
            id: Uuid::new_v4(),
            phone: Some("+919876543210".to_string()),
            email: None,
            profile: None,
        };
        let attendee = attendee_for(&patient, "patients.carelink.app");
        assert_eq!(attendee.email, "919876543210@patients.carelink.app");
        assert_eq!(attendee.name, "CareLink Patient");
    }
}
