use std::sync::Arc;

use axum::{routing::get, Router};

use appointment_cell::services::CalendarProvider;
use appointment_cell::{appointment_routes, AppointmentState};
use auth_cell::services::SmsSender;
use auth_cell::{auth_routes, AuthState};
use onboarding_cell::{onboarding_routes, OnboardingState};
use shared_config::AppConfig;
use shared_database::SupabaseClient;
use voice_cell::{voice_routes, VoiceState};

/// Clients shared by every cell.
pub struct Services {
    pub config: Arc<AppConfig>,
    pub supabase: Arc<SupabaseClient>,
    pub sms: Arc<dyn SmsSender>,
    pub calendar: Arc<dyn CalendarProvider>,
}

pub fn create_router(services: Services) -> Router {
    let Services { config, supabase, sms, calendar } = services;

    let api = Router::new()
        .nest(
            "/auth",
            auth_routes(Arc::new(AuthState::new(config.clone(), supabase.clone(), sms))),
        )
        .merge(onboarding_routes(Arc::new(OnboardingState::new(
            config.clone(),
            supabase.clone(),
        ))))
        .nest(
            "/appointments",
            appointment_routes(Arc::new(AppointmentState::new(config.clone(), supabase, calendar))),
        )
        .merge(voice_routes(Arc::new(VoiceState::new(config))));

    Router::new()
        .route("/", get(|| async { "CareLink Clinic API is running!" }))
        .nest("/api/v1", api)
}
