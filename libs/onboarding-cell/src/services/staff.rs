use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use shared_database::SupabaseClient;
use shared_models::auth::{Role, User};
use shared_utils::password::{generate_temporary_password, hash_password};
use shared_utils::validation::{is_valid_email, is_valid_indian_phone};

use crate::domain::email_matches_hospital;
use crate::models::{
    AccountSummary, CreateStaffRequest, Hospital, OnboardingError, StaffCreated, StaffKind,
    StaffListing,
};
use crate::services::directory::{email_taken, find_hospital};

pub struct StaffOnboardingService {
    supabase: Arc<SupabaseClient>,
}

impl StaffOnboardingService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    /// Permission, existence and membership checks shared by every
    /// admin-dashboard operation, in that order.
    async fn authorize_admin(&self, caller: &User, hospital_id: Uuid) -> Result<Hospital, OnboardingError> {
        match caller.role {
            Role::HospitalAdmin => {}
            Role::Patient | Role::Doctor | Role::Pharmacist => {
                return Err(OnboardingError::InsufficientPermissions)
            }
        }

        let hospital = find_hospital(&self.supabase, hospital_id)
            .await?
            .ok_or(OnboardingError::HospitalNotFound)?;

        if caller.hospital_id != Some(hospital.id) {
            return Err(OnboardingError::HospitalMismatch);
        }

        Ok(hospital)
    }

    pub async fn create_staff(
        &self,
        caller: &User,
        hospital_id: Uuid,
        kind: StaffKind,
        request: CreateStaffRequest,
    ) -> Result<StaffCreated, OnboardingError> {
        let hospital = self.authorize_admin(caller, hospital_id).await?;

        let email = request.email.trim().to_lowercase();
        let full_name = request.full_name.trim().to_string();
        let specialty = request
            .specialty
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        if full_name.is_empty() {
            return Err(OnboardingError::Validation("Full name is required".to_string()));
        }
        if !is_valid_email(&email) {
            return Err(OnboardingError::Validation("Invalid email".to_string()));
        }
        if let Some(phone) = request.phone.as_deref() {
            if !is_valid_indian_phone(phone) {
                return Err(OnboardingError::Validation(
                    "Phone number must be +91 followed by 10 digits".to_string(),
                ));
            }
        }
        if kind == StaffKind::Doctor && specialty.is_none() {
            return Err(OnboardingError::Validation("Doctor specialty is required".to_string()));
        }

        if !email_matches_hospital(&email, &hospital.name) {
            return Err(OnboardingError::EmailDomainMismatch);
        }
        if email_taken(&self.supabase, &email).await? {
            return Err(OnboardingError::EmailExists);
        }

        let temporary_password = generate_temporary_password();
        let password_hash =
            hash_password(&temporary_password).map_err(|e| OnboardingError::Internal(e.to_string()))?;

        debug!("Creating {} {} for hospital {}", kind.label(), email, hospital.id);

        let user_id: Uuid = self
            .supabase
            .rpc(
                "create_staff_member",
                json!({
                    "p_role": kind.role(),
                    "p_hospital_id": hospital.id,
                    "p_email": email,
                    "p_full_name": full_name,
                    "p_phone": request.phone,
                    "p_password_hash": password_hash,
                    "p_specialty": specialty,
                    "p_cal_event_type_id": request.cal_event_type_id
                }),
            )
            .await
            .map_err(OnboardingError::from_rpc)?;

        info!(
            "{} {} created in hospital {} by admin {}",
            kind.label(),
            user_id,
            hospital.id,
            caller.id
        );

        Ok(StaffCreated {
            account: AccountSummary {
                id: user_id,
                email,
                full_name,
                role: kind.role(),
                hospital_id: hospital.id,
            },
            specialty,
            temporary_password,
        })
    }

    pub async fn list_staff(
        &self,
        caller: &User,
        hospital_id: Uuid,
    ) -> Result<Vec<StaffListing>, OnboardingError> {
        let hospital = self.authorize_admin(caller, hospital_id).await?;

        let path = format!(
            "/rest/v1/users?hospital_id=eq.{}&role=in.(DOCTOR,PHARMACIST)\
             &select=id,role,email,force_password_change,last_login,created_at,profiles(full_name),doctors(specialty,cal_event_type_id)\
             &order=created_at.asc",
            hospital.id
        );

        let staff: Vec<StaffListing> = self
            .supabase
            .request(reqwest::Method::GET, &path, None)
            .await?;

        debug!("Listed {} staff members for hospital {}", staff.len(), hospital.id);
        Ok(staff)
    }
}
