use std::sync::Arc;

use axum::{
    extract::{
        rejection::JsonRejection,
        ws::{rejection::WebSocketUpgradeRejection, Message, WebSocket, WebSocketUpgrade},
        Extension, State,
    },
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tracing::{debug, info};

use shared_models::auth::User;
use shared_models::error::AppError;
use shared_models::response::ok;
use shared_utils::extractor::{extract_bearer_token, AppQuery};
use shared_utils::jwt::validate_token;

use crate::models::{patient_room, SocketAuth, VapiSessionRequest};
use crate::relay::RelayHub;
use crate::state::VoiceState;

pub async fn create_vapi_session(
    State(state): State<Arc<VoiceState>>,
    Extension(user): Extension<User>,
    body: Result<Json<VapiSessionRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    // The body is optional; a request without one uses the configured assistant.
    let request = match body {
        Ok(Json(request)) => request,
        Err(JsonRejection::MissingJsonContentType(_)) => VapiSessionRequest::default(),
        Err(rejection) => return Err(rejection.into()),
    };
    let session = state.session_service().create_session(&user, request).await?;
    Ok(ok("Voice session created", session))
}

/// Authenticate the handshake, then upgrade. The token comes from `?token=`
/// or the bearer header.
pub async fn voice_socket(
    State(state): State<Arc<VoiceState>>,
    AppQuery(auth): AppQuery<SocketAuth>,
    headers: HeaderMap,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, AppError> {
    let token = match auth.token.filter(|t| !t.is_empty()) {
        Some(token) => token,
        None => extract_bearer_token(&headers)?,
    };
    let user = validate_token(&token, &state.config.jwt_secret).map_err(AppError::Auth)?;

    let upgrade = match upgrade {
        Ok(upgrade) => upgrade,
        Err(rejection) => return Ok(rejection.into_response()),
    };

    let room = patient_room(user.id);
    let hub = state.hub.clone();
    info!("Voice relay connection for user {} in {}", user.id, room);

    Ok(upgrade.on_upgrade(move |socket| relay_socket(socket, hub, room)))
}

async fn relay_socket(socket: WebSocket, hub: Arc<RelayHub>, room: String) {
    let mut subscription = hub.join(&room).await;
    let connection_id = subscription.connection_id;
    let (mut outbound, mut inbound) = socket.split();

    let forward = tokio::spawn(async move {
        while let Some(payload) = subscription.next_from_peers().await {
            if outbound.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(message)) = inbound.next().await {
        match message {
            Message::Text(text) => {
                hub.relay_event(&room, connection_id, text.as_str()).await;
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    forward.abort();
    // The subscription lives in the aborted task; wait for it to be dropped.
    let _ = forward.await;
    hub.leave(&room).await;
    debug!("Relay connection {} left {}", connection_id, room);
}
