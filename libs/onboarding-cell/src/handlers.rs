use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use uuid::Uuid;

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_models::response::ok;
use shared_utils::extractor::{AppJson, AppPath};

use crate::models::{CreateHospitalRequest, CreateStaffRequest, StaffKind};
use crate::state::OnboardingState;

pub async fn create_hospital(
    State(state): State<Arc<OnboardingState>>,
    AppJson(request): AppJson<CreateHospitalRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let created = state.hospital_service().create_hospital(request).await?;
    Ok((StatusCode::CREATED, ok("Hospital created successfully", created)))
}

/// `POST /doctors`: the hospital is named in the body.
pub async fn create_doctor(
    State(state): State<Arc<OnboardingState>>,
    Extension(user): Extension<User>,
    AppJson(request): AppJson<CreateStaffRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let hospital_id = request
        .hospital_id
        .ok_or_else(|| AppError::ValidationError("hospital_id is required".to_string()))?;

    let created = state
        .staff_service()
        .create_staff(&user, hospital_id, StaffKind::Doctor, request)
        .await?;

    Ok((StatusCode::CREATED, ok("Doctor created successfully", created)))
}

pub async fn create_hospital_doctor(
    State(state): State<Arc<OnboardingState>>,
    Extension(user): Extension<User>,
    AppPath(hospital_id): AppPath<Uuid>,
    AppJson(request): AppJson<CreateStaffRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let created = state
        .staff_service()
        .create_staff(&user, hospital_id, StaffKind::Doctor, request)
        .await?;

    Ok((StatusCode::CREATED, ok("Doctor created successfully", created)))
}

pub async fn create_hospital_pharmacist(
    State(state): State<Arc<OnboardingState>>,
    Extension(user): Extension<User>,
    AppPath(hospital_id): AppPath<Uuid>,
    AppJson(request): AppJson<CreateStaffRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let created = state
        .staff_service()
        .create_staff(&user, hospital_id, StaffKind::Pharmacist, request)
        .await?;

    Ok((StatusCode::CREATED, ok("Pharmacist created successfully", created)))
}

pub async fn list_hospital_staff(
    State(state): State<Arc<OnboardingState>>,
    Extension(user): Extension<User>,
    AppPath(hospital_id): AppPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    let staff = state.staff_service().list_staff(&user, hospital_id).await?;
    Ok(ok("Staff retrieved successfully", staff))
}
