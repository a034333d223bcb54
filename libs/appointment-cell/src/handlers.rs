use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_models::response::ok;
use shared_utils::extractor::{AppJson, AppPath, AppQuery};

use crate::models::{AvailableSlotsQuery, BookAppointmentRequest, UpdateStatusRequest};
use crate::state::AppointmentState;

pub async fn book_appointment(
    State(state): State<Arc<AppointmentState>>,
    Extension(user): Extension<User>,
    AppJson(request): AppJson<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    debug!("Booking request from {} for doctor {}", user.id, request.doctor_id);

    let confirmation = state.booking_service().book_appointment(&user, request).await?;
    Ok((StatusCode::CREATED, ok("Appointment booked successfully", confirmation)))
}

pub async fn list_appointments(
    State(state): State<Arc<AppointmentState>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let appointments = state.appointment_service().list_for_user(&user).await?;
    Ok(ok("Appointments retrieved successfully", appointments))
}

pub async fn get_available_slots(
    State(state): State<Arc<AppointmentState>>,
    Extension(_user): Extension<User>,
    AppQuery(query): AppQuery<AvailableSlotsQuery>,
) -> Result<Json<Value>, AppError> {
    let slots = state
        .slot_service()
        .available_slots(query.doctor_id, query.date)
        .await?;
    Ok(ok("Available slots retrieved successfully", slots))
}

pub async fn get_appointment(
    State(state): State<Arc<AppointmentState>>,
    Extension(user): Extension<User>,
    AppPath(appointment_id): AppPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointment = state
        .appointment_service()
        .get_for_user(&user, appointment_id)
        .await?;
    Ok(ok("Appointment retrieved successfully", appointment))
}

pub async fn update_appointment_status(
    State(state): State<Arc<AppointmentState>>,
    Extension(user): Extension<User>,
    AppPath(appointment_id): AppPath<Uuid>,
    AppJson(request): AppJson<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let appointment = state
        .appointment_service()
        .update_status(&user, appointment_id, &request.status)
        .await?;
    Ok(ok("Appointment status updated successfully", appointment))
}

pub async fn cancel_appointment(
    State(state): State<Arc<AppointmentState>>,
    Extension(user): Extension<User>,
    AppPath(appointment_id): AppPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    let appointment = state.appointment_service().cancel(&user, appointment_id).await?;
    Ok(ok("Appointment cancelled successfully", appointment))
}
