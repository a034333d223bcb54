use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    http::HeaderMap,
    Json,
};
use serde_json::Value;
use tracing::debug;

use shared_models::auth::{Role, User};
use shared_models::error::AppError;
use shared_models::response::{ok, ok_message};
use shared_utils::extractor::{client_ip, require_role, AppJson};

use crate::models::{
    AuthError, ChangePasswordRequest, OtpRequest, RefreshTokenRequest, StaffLoginRequest,
    VerifyOtpRequest,
};
use crate::state::AuthState;

// ==============================================================================
// PATIENT OTP
// ==============================================================================

pub async fn request_otp(
    State(state): State<Arc<AuthState>>,
    headers: HeaderMap,
    AppJson(request): AppJson<OtpRequest>,
) -> Result<Json<Value>, AppError> {
    let phone = request.phone.as_deref().map(str::trim).filter(|p| !p.is_empty());

    let limit_key = match (phone, client_ip(&headers)) {
        (Some(phone), _) => phone.to_string(),
        (None, Some(ip)) => format!("ip:{}", ip),
        (None, None) => "unknown".to_string(),
    };

    if !state.otp_limiter.check(&limit_key).await {
        return Err(AuthError::RateLimited.into());
    }

    let phone = phone.ok_or(AuthError::InvalidPhone)?;
    debug!("OTP requested for {}", phone);

    let dispatch = state.otp_service().request_otp(phone).await?;
    Ok(ok("OTP sent successfully", dispatch))
}

pub async fn verify_otp(
    State(state): State<Arc<AuthState>>,
    AppJson(request): AppJson<VerifyOtpRequest>,
) -> Result<Json<Value>, AppError> {
    let phone = request.phone.trim();
    let login = state
        .otp_service()
        .verify_otp(phone, &request.otp.as_code())
        .await?;

    Ok(ok("OTP verified successfully", login))
}

// ==============================================================================
// STAFF
// ==============================================================================

pub async fn staff_login(
    State(state): State<Arc<AuthState>>,
    AppJson(request): AppJson<StaffLoginRequest>,
) -> Result<Json<Value>, AppError> {
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(AppError::ValidationError("Email and password are required".to_string()));
    }

    let login = state
        .staff_service()
        .login(&request.email, &request.password)
        .await?;

    Ok(ok("Login successful", login))
}

pub async fn change_password(
    State(state): State<Arc<AuthState>>,
    Extension(user): Extension<User>,
    AppJson(request): AppJson<ChangePasswordRequest>,
) -> Result<Json<Value>, AppError> {
    require_role(&user, &[Role::Doctor, Role::Pharmacist, Role::HospitalAdmin])?;

    state
        .staff_service()
        .change_password(user.id, &request.current_password, &request.new_password)
        .await?;

    Ok(ok_message("Password changed successfully"))
}

// ==============================================================================
// SESSION
// ==============================================================================

pub async fn refresh_token(
    State(state): State<Arc<AuthState>>,
    AppJson(request): AppJson<RefreshTokenRequest>,
) -> Result<Json<Value>, AppError> {
    let tokens = state
        .credential_service()
        .refresh(&request.refresh_token)
        .await?;

    Ok(ok("Token refreshed successfully", tokens))
}

pub async fn get_me(
    State(state): State<Arc<AuthState>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let record = state.credential_service().get_user(user.id).await?;
    Ok(ok("User retrieved successfully", record))
}
