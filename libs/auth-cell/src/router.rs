use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::state::AuthState;

pub fn auth_routes(state: Arc<AuthState>) -> Router {
    let public_routes = Router::new()
        .route("/patient/otp/request", post(handlers::request_otp))
        .route("/patient/otp/verify", post(handlers::verify_otp))
        .route("/staff/login", post(handlers::staff_login))
        .route("/refresh", post(handlers::refresh_token));

    let protected_routes = Router::new()
        .route("/staff/change-password", post(handlers::change_password))
        .route("/me", get(handlers::get_me))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
