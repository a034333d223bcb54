use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared_config::AppConfig;
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};
use voice_cell::router::voice_routes;
use voice_cell::state::VoiceState;

const PHONE: &str = "+919876543210";

fn create_test_app(config: AppConfig) -> Router {
    voice_routes(Arc::new(VoiceState::new(Arc::new(config))))
}

fn session_request(user: &TestUser, body: Option<Value>) -> Request<Body> {
    let token = JwtTestUtils::create_test_token(user, &TestConfig::default().jwt_secret, None);
    let builder = Request::builder()
        .method("POST")
        .uri("/sessions/vapi")
        .header("authorization", format!("Bearer {}", token));

    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn read_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_session_uses_configured_assistant() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(TestConfig::default().with_mock_server(&mock_server.uri()));
    let patient = TestUser::patient(PHONE);

    let response = app.oneshot(session_request(&patient, None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["assistant_id"], "assistant-default");
    assert_eq!(body["data"]["public_key"], "vapi-public");
    assert_eq!(body["data"]["room"], format!("patient-{}", patient.id));
    assert!(Uuid::parse_str(body["data"]["session_id"].as_str().unwrap()).is_ok());
    assert!(body["data"].get("assistant").is_none());
}

#[tokio::test]
async fn test_session_fetches_assistant_metadata_with_private_key() {
    let mock_server = MockServer::start().await;
    let config = AppConfig {
        vapi_private_key: "vapi-private".to_string(),
        ..TestConfig::default().with_mock_server(&mock_server.uri())
    };
    let app = create_test_app(config);
    let patient = TestUser::patient(PHONE);

    Mock::given(method("GET"))
        .and(path("/assistant/assistant-custom"))
        .and(header("authorization", "Bearer vapi-private"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "assistant-custom",
            "name": "Booking Helper"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = app
        .oneshot(session_request(&patient, Some(json!({ "assistant_id": "assistant-custom" }))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["assistant_id"], "assistant-custom");
    assert_eq!(body["data"]["assistant"]["name"], "Booking Helper");
}

#[tokio::test]
async fn test_session_survives_vapi_outage() {
    let mock_server = MockServer::start().await;
    let config = AppConfig {
        vapi_private_key: "vapi-private".to_string(),
        ..TestConfig::default().with_mock_server(&mock_server.uri())
    };
    let app = create_test_app(config);

    Mock::given(method("GET"))
        .and(path("/assistant/assistant-default"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let response = app
        .oneshot(session_request(&TestUser::patient(PHONE), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(read_json(response).await["data"].get("assistant").is_none());
}

#[tokio::test]
async fn test_session_without_assistant_is_config_error() {
    let mock_server = MockServer::start().await;
    let config = AppConfig {
        vapi_assistant_id: String::new(),
        ..TestConfig::default().with_mock_server(&mock_server.uri())
    };
    let app = create_test_app(config);

    let response = app
        .oneshot(session_request(&TestUser::patient(PHONE), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(read_json(response).await["code"], "CONFIG_ERROR");
}

#[tokio::test]
async fn test_session_without_public_key_is_internal_error() {
    let mock_server = MockServer::start().await;
    let config = AppConfig {
        vapi_public_key: String::new(),
        ..TestConfig::default().with_mock_server(&mock_server.uri())
    };
    let app = create_test_app(config);

    let response = app
        .oneshot(session_request(&TestUser::patient(PHONE), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(read_json(response).await["code"], "INTERNAL_ERROR");
}

#[tokio::test]
async fn test_staff_cannot_start_voice_sessions() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(TestConfig::default().with_mock_server(&mock_server.uri()));
    let doctor = TestUser::doctor("dr.rao@citycare.com", Uuid::new_v4());

    let response = app.oneshot(session_request(&doctor, None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(read_json(response).await["code"], "INSUFFICIENT_PERMISSIONS");
}

#[tokio::test]
async fn test_socket_handshake_requires_token() {
    let app = create_test_app(TestConfig::default().to_app_config());

    let response = app
        .oneshot(Request::builder().uri("/ws/voice").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_socket_handshake_rejects_forged_token() {
    let app = create_test_app(TestConfig::default().to_app_config());
    let forged = JwtTestUtils::create_invalid_signature_token(&TestUser::patient(PHONE));

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/ws/voice?token={}", forged))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_socket_handshake_accepts_query_token() {
    let app = create_test_app(TestConfig::default().to_app_config());
    let token = JwtTestUtils::create_test_token(
        &TestUser::patient(PHONE),
        &TestConfig::default().jwt_secret,
        None,
    );

    // Authenticated, but a plain GET cannot be upgraded.
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/ws/voice?token={}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_ne!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_malformed_session_body_is_validation_envelope() {
    let app = create_test_app(TestConfig::default().to_app_config());
    let patient = TestUser::patient(PHONE);
    let token = JwtTestUtils::create_test_token(&patient, &TestConfig::default().jwt_secret, None);

    let request = Request::builder()
        .method("POST")
        .uri("/sessions/vapi")
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from("{\"assistant_id\":"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}
