use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::state::OnboardingState;

pub fn onboarding_routes(state: Arc<OnboardingState>) -> Router {
    let public_routes = Router::new().route("/hospitals", post(handlers::create_hospital));

    let protected_routes = Router::new()
        .route("/hospitals/{hospital_id}/doctors", post(handlers::create_hospital_doctor))
        .route("/hospitals/{hospital_id}/pharmacists", post(handlers::create_hospital_pharmacist))
        .route("/hospitals/{hospital_id}/staff", get(handlers::list_hospital_staff))
        .route("/doctors", post(handlers::create_doctor))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
