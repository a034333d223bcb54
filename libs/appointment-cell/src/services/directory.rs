use uuid::Uuid;

use shared_database::SupabaseClient;
use shared_models::auth::Role;

use crate::models::{Appointment, AppointmentError, DoctorRecord, PatientRecord};

/// A user that exists and holds the DOCTOR role.
pub async fn find_doctor(
    supabase: &SupabaseClient,
    doctor_id: Uuid,
) -> Result<Option<DoctorRecord>, AppointmentError> {
    let path = format!(
        "/rest/v1/users?id=eq.{}&select=id,role,email,hospital_id,profiles(full_name),doctors(specialty,cal_event_type_id)",
        doctor_id
    );
    let doctor: Option<DoctorRecord> = supabase.select_one(&path).await?;
    Ok(doctor.filter(|d| d.role == Role::Doctor))
}

pub async fn find_patient(
    supabase: &SupabaseClient,
    patient_id: Uuid,
) -> Result<Option<PatientRecord>, AppointmentError> {
    let path = format!(
        "/rest/v1/users?id=eq.{}&select=id,phone,email,profiles(full_name)",
        patient_id
    );
    Ok(supabase.select_one(&path).await?)
}

pub async fn find_appointment(
    supabase: &SupabaseClient,
    appointment_id: Uuid,
) -> Result<Option<Appointment>, AppointmentError> {
    let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
    Ok(supabase.select_one(&path).await?)
}
