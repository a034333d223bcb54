use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::state::VoiceState;

pub fn voice_routes(state: Arc<VoiceState>) -> Router {
    // The socket handshake authenticates itself so it can read `?token=`
    let public_routes = Router::new().route("/ws/voice", get(handlers::voice_socket));

    let protected_routes = Router::new()
        .route("/sessions/vapi", post(handlers::create_vapi_session))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
