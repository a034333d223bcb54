use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, warn};

use shared_database::SupabaseClient;
use shared_models::auth::Role;
use shared_utils::password::{generate_temporary_password, hash_password};
use shared_utils::validation::{is_valid_email, is_valid_indian_phone};

use crate::domain::email_matches_hospital;
use crate::models::{
    AccountSummary, CreateHospitalRequest, Hospital, HospitalCreated, HospitalRpcResult,
    OnboardingError,
};
use crate::services::directory::{email_taken, hospital_name_taken};

pub struct HospitalOnboardingService {
    supabase: Arc<SupabaseClient>,
}

impl HospitalOnboardingService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    /// Create a hospital together with its first administrator. Both rows are
    /// written by one RPC so a failure leaves neither behind.
    pub async fn create_hospital(
        &self,
        request: CreateHospitalRequest,
    ) -> Result<HospitalCreated, OnboardingError> {
        let name = request.name.trim().to_string();
        let admin_email = request.admin_email.trim().to_lowercase();
        let admin_full_name = request.admin_full_name.trim().to_string();

        if name.is_empty() || admin_full_name.is_empty() {
            return Err(OnboardingError::Validation(
                "Hospital name and admin full name are required".to_string(),
            ));
        }
        if !is_valid_email(&admin_email) {
            return Err(OnboardingError::Validation("Invalid admin email".to_string()));
        }
        if let Some(phone) = request.admin_phone.as_deref() {
            if !is_valid_indian_phone(phone) {
                return Err(OnboardingError::Validation(
                    "Phone number must be +91 followed by 10 digits".to_string(),
                ));
            }
        }

        if !email_matches_hospital(&admin_email, &name) {
            return Err(OnboardingError::HospitalNameMismatch);
        }
        if hospital_name_taken(&self.supabase, &name).await? {
            return Err(OnboardingError::HospitalExists);
        }
        if email_taken(&self.supabase, &admin_email).await? {
            return Err(OnboardingError::EmailExists);
        }

        let temporary_password = generate_temporary_password();
        let password_hash =
            hash_password(&temporary_password).map_err(|e| OnboardingError::Internal(e.to_string()))?;

        debug!("Creating hospital {} with admin {}", name, admin_email);

        let result: HospitalRpcResult = self
            .supabase
            .rpc(
                "create_hospital_with_admin",
                json!({
                    "p_name": name,
                    "p_address": request.address,
                    "p_admin_email": admin_email,
                    "p_admin_full_name": admin_full_name,
                    "p_admin_phone": request.admin_phone,
                    "p_password_hash": password_hash
                }),
            )
            .await
            // Lost a race with a concurrent signup; the unique indexes decide.
            .map_err(OnboardingError::from_rpc)?;

        info!("Hospital {} created with admin {}", result.hospital_id, result.admin_id);

        let hospital = match self.fetch_hospital(&result).await {
            Some(hospital) => hospital,
            None => Hospital {
                id: result.hospital_id,
                name: name.clone(),
                address: request.address.clone(),
                created_at: None,
            },
        };

        Ok(HospitalCreated {
            hospital,
            admin: AccountSummary {
                id: result.admin_id,
                email: admin_email,
                full_name: admin_full_name,
                role: Role::HospitalAdmin,
                hospital_id: result.hospital_id,
            },
            temporary_password,
        })
    }

    async fn fetch_hospital(&self, result: &HospitalRpcResult) -> Option<Hospital> {
        let path = format!("/rest/v1/hospitals?id=eq.{}", result.hospital_id);
        match self.supabase.select_one(&path).await {
            Ok(hospital) => hospital,
            Err(e) => {
                warn!("Hospital {} created but could not be re-read: {}", result.hospital_id, e);
                None
            }
        }
    }
}
