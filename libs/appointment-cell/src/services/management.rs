use std::sync::Arc;

use chrono::Utc;
use reqwest::Method;
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_database::SupabaseClient;
use shared_models::auth::{Role, User};

use crate::models::{Appointment, AppointmentError, AppointmentStatus, RequestedStatus};
use crate::services::calendar::CalendarProvider;
use crate::services::directory::find_appointment;

pub struct AppointmentService {
    supabase: Arc<SupabaseClient>,
    calendar: Arc<dyn CalendarProvider>,
}

impl AppointmentService {
    pub fn new(supabase: Arc<SupabaseClient>, calendar: Arc<dyn CalendarProvider>) -> Self {
        Self { supabase, calendar }
    }

    pub async fn list_for_user(&self, user: &User) -> Result<Vec<Appointment>, AppointmentError> {
        let column = match user.role {
            Role::Patient => "patient_id",
            Role::Doctor => "doctor_id",
            Role::Pharmacist | Role::HospitalAdmin => return Err(AppointmentError::Forbidden),
        };

        let path = format!(
            "/rest/v1/appointments?{}=eq.{}&order=start_ts.asc",
            column, user.id
        );
        let appointments: Vec<Appointment> = self.supabase.request(Method::GET, &path, None).await?;

        debug!("Found {} appointments for {} {}", appointments.len(), user.role, user.id);
        Ok(appointments)
    }

    pub async fn get_for_user(&self, user: &User, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        let appointment = find_appointment(&self.supabase, appointment_id)
            .await?
            .ok_or(AppointmentError::NotFound)?;

        if !appointment.is_participant(user.id) {
            return Err(AppointmentError::Forbidden);
        }

        Ok(appointment)
    }

    /// Only the booking patient may cancel. Ownership is checked before any
    /// write. The remote booking is cancelled best-effort afterwards.
    pub async fn cancel(&self, user: &User, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        let appointment = find_appointment(&self.supabase, appointment_id)
            .await?
            .ok_or(AppointmentError::NotFound)?;

        if appointment.patient_id != user.id {
            return Err(AppointmentError::Forbidden);
        }

        if appointment.status == AppointmentStatus::Cancelled {
            debug!("Appointment {} already cancelled", appointment.id);
            return Ok(appointment);
        }

        if !appointment.status.can_transition_to(AppointmentStatus::Cancelled) {
            return Err(AppointmentError::Validation(format!(
                "Appointment in status {} cannot be cancelled",
                appointment.status
            )));
        }

        let updated = self.write_status(appointment.id, AppointmentStatus::Cancelled).await?;
        info!("Appointment {} cancelled by patient {}", updated.id, user.id);

        if let Some(booking_id) = appointment.cal_booking_id {
            if let Err(e) = self
                .calendar
                .cancel_booking(booking_id, "Cancelled by patient")
                .await
            {
                warn!(
                    "Appointment {} cancelled locally but Cal.com booking {} was not: {}",
                    appointment.id, booking_id, e
                );
            }
        }

        Ok(updated)
    }

    /// Client-driven status change. `cancelled` goes through [`Self::cancel`];
    /// `pending` puts the appointment back to SCHEDULED.
    pub async fn update_status(
        &self,
        user: &User,
        appointment_id: Uuid,
        raw_status: &str,
    ) -> Result<Appointment, AppointmentError> {
        let requested = RequestedStatus::parse(raw_status).ok_or_else(|| {
            AppointmentError::Validation("Status must be either 'cancelled' or 'pending'".to_string())
        })?;

        match requested {
            RequestedStatus::Cancelled => self.cancel(user, appointment_id).await,
            RequestedStatus::Pending => {
                let appointment = self.get_for_user(user, appointment_id).await?;
                let target = requested.stored_status();

                if appointment.status == target {
                    return Ok(appointment);
                }
                if !appointment.status.can_transition_to(target) {
                    return Err(AppointmentError::Validation(format!(
                        "Appointment in status {} cannot be set to pending",
                        appointment.status
                    )));
                }

                let updated = self.write_status(appointment.id, target).await?;
                info!("Appointment {} set back to {}", updated.id, target);
                Ok(updated)
            }
        }
    }

    async fn write_status(
        &self,
        appointment_id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Appointment, AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let rows = self
            .supabase
            .request_returning(
                Method::PATCH,
                &path,
                json!({ "status": status, "updated_at": Utc::now().to_rfc3339() }),
            )
            .await?;

        let row = rows.into_iter().next().ok_or(AppointmentError::NotFound)?;
        serde_json::from_value(row).map_err(|e| AppointmentError::Database(e.to_string()))
    }
}
