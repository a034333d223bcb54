use std::sync::Arc;

use shared_config::AppConfig;
use shared_database::SupabaseClient;

use crate::services::{HospitalOnboardingService, StaffOnboardingService};

pub struct OnboardingState {
    pub config: Arc<AppConfig>,
    pub supabase: Arc<SupabaseClient>,
}

impl OnboardingState {
    pub fn new(config: Arc<AppConfig>, supabase: Arc<SupabaseClient>) -> Self {
        Self { config, supabase }
    }

    pub fn hospital_service(&self) -> HospitalOnboardingService {
        HospitalOnboardingService::new(self.supabase.clone())
    }

    pub fn staff_service(&self) -> StaffOnboardingService {
        StaffOnboardingService::new(self.supabase.clone())
    }
}
