use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::router::appointment_routes;
use appointment_cell::services::CalComClient;
use appointment_cell::state::AppointmentState;
use shared_config::AppConfig;
use shared_database::SupabaseClient;
use shared_utils::test_utils::{JwtTestUtils, MockSupabaseResponses, TestConfig, TestUser};

const PHONE: &str = "+919876543210";
const CAL_BOOKING_ID: i64 = 555;

fn create_test_app(config: AppConfig) -> Router {
    let config = Arc::new(config);
    let supabase = Arc::new(SupabaseClient::new(&config));
    let calendar = Arc::new(CalComClient::new(&config));
    appointment_routes(Arc::new(AppointmentState::new(config, supabase, calendar)))
}

fn token_for(user: &TestUser) -> String {
    JwtTestUtils::create_test_token(user, &TestConfig::default().jwt_secret, None)
}

fn authed(method: &str, uri: &str, user: &TestUser, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token_for(user)))
        .header("content-type", "application/json");

    match body {
        Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn read_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn slot_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2035, 1, 15, 4, 0, 0).unwrap()
}

fn cal_booking(start: DateTime<Utc>, minutes: i64) -> Value {
    json!({
        "id": CAL_BOOKING_ID,
        "uid": "bk_555",
        "startTime": start.to_rfc3339(),
        "endTime": (start + Duration::minutes(minutes)).to_rfc3339(),
        "status": "ACCEPTED",
        "metadata": { "videoCallUrl": "https://cal.video/bk_555" },
        "location": "integrations:daily"
    })
}

async fn mount_doctor(mock_server: &MockServer, doctor_id: Uuid) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("id", format!("eq.{}", doctor_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::doctor_response(doctor_id, "dr.rao@citycare.com", "Dr. Rao", "Cardiology")
        ])))
        .mount(mock_server)
        .await;
}

async fn mount_patient(mock_server: &MockServer, patient: &TestUser) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("id", format!("eq.{}", patient.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": patient.id, "phone": PHONE, "email": null, "profiles": { "full_name": "Asha Patel" } }
        ])))
        .mount(mock_server)
        .await;
}

async fn mount_open_slot(mock_server: &MockServer, start: DateTime<Utc>) {
    Mock::given(method("GET"))
        .and(path("/slots"))
        .and(query_param("apiKey", "cal_test_key"))
        .and(query_param("eventTypeId", "42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "slots": { start.format("%Y-%m-%d").to_string(): [ { "time": start.to_rfc3339() } ] }
        })))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_book_emergency_appointment() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(TestConfig::default().with_mock_server(&mock_server.uri()));

    let patient = TestUser::patient(PHONE);
    let doctor_id = Uuid::new_v4();
    let start = slot_start();
    let end = start + Duration::minutes(60);

    mount_doctor(&mock_server, doctor_id).await;
    mount_patient(&mock_server, &patient).await;
    mount_open_slot(&mock_server, start).await;

    Mock::given(method("POST"))
        .and(path("/bookings"))
        .and(body_partial_json(json!({
            "eventTypeId": 42,
            "responses": { "name": "Asha Patel", "email": "919876543210@patients.carelink.app" },
            "metadata": { "source": "carelink-api", "patient_id": patient.id.to_string() }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(cal_booking(start, 60)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut row = MockSupabaseResponses::appointment_response(Uuid::new_v4(), patient.id, doctor_id, "SCHEDULED");
    row["appointment_type"] = json!("emergency");
    row["start_ts"] = json!(start.to_rfc3339());
    row["end_ts"] = json!(end.to_rfc3339());
    row["cal_booking_id"] = json!(CAL_BOOKING_ID);
    row["meeting_link"] = json!("https://cal.video/bk_555");

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .and(body_partial_json(json!({
            "appointment_type": "emergency",
            "status": "SCHEDULED",
            "start_ts": start.to_rfc3339(),
            "end_ts": end.to_rfc3339(),
            "cal_booking_id": CAL_BOOKING_ID,
            "cal_booking_uid": "bk_555"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([row])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = app
        .oneshot(authed(
            "POST",
            "/",
            &patient,
            Some(json!({
                "doctor_id": doctor_id,
                "appointment_datetime": start.to_rfc3339(),
                "appointment_type": "emergency"
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["appointment"]["status"], "SCHEDULED");
    assert_eq!(body["data"]["slot"]["duration_minutes"], 60);
    assert_eq!(body["data"]["doctor"]["full_name"], "Dr. Rao");
    assert_eq!(body["data"]["meeting_link"], "https://cal.video/bk_555");
    assert!(body["data"]["appointment"].get("cal_raw_payload").is_none());
}

#[tokio::test]
async fn test_booking_within_lead_time_is_rejected() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(TestConfig::default().with_mock_server(&mock_server.uri()));
    let patient = TestUser::patient(PHONE);

    let response = app
        .oneshot(authed(
            "POST",
            "/",
            &patient,
            Some(json!({
                "doctor_id": Uuid::new_v4(),
                "appointment_datetime": (Utc::now() + Duration::minutes(30)).to_rfc3339()
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["code"], "PAST_DATETIME");
}

#[tokio::test]
async fn test_booking_unknown_doctor() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(TestConfig::default().with_mock_server(&mock_server.uri()));
    let patient = TestUser::patient(PHONE);

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let response = app
        .oneshot(authed(
            "POST",
            "/",
            &patient,
            Some(json!({ "doctor_id": Uuid::new_v4(), "appointment_datetime": slot_start().to_rfc3339() })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(read_json(response).await["code"], "DOCTOR_NOT_FOUND");
}

#[tokio::test]
async fn test_booking_taken_slot_conflicts() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(TestConfig::default().with_mock_server(&mock_server.uri()));
    let patient = TestUser::patient(PHONE);
    let doctor_id = Uuid::new_v4();

    mount_doctor(&mock_server, doctor_id).await;
    mount_patient(&mock_server, &patient).await;

    Mock::given(method("GET"))
        .and(path("/slots"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "slots": {} })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cal_booking(slot_start(), 30)))
        .expect(0)
        .mount(&mock_server)
        .await;

    let response = app
        .oneshot(authed(
            "POST",
            "/",
            &patient,
            Some(json!({ "doctor_id": doctor_id, "appointment_datetime": slot_start().to_rfc3339() })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(read_json(response).await["code"], "SLOT_UNAVAILABLE");
}

#[tokio::test]
async fn test_calendar_failure_writes_nothing_locally() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(TestConfig::default().with_mock_server(&mock_server.uri()));
    let patient = TestUser::patient(PHONE);
    let doctor_id = Uuid::new_v4();

    mount_doctor(&mock_server, doctor_id).await;
    mount_patient(&mock_server, &patient).await;
    mount_open_slot(&mock_server, slot_start()).await;

    Mock::given(method("POST"))
        .and(path("/bookings"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "boom" })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let response = app
        .oneshot(authed(
            "POST",
            "/",
            &patient,
            Some(json!({ "doctor_id": doctor_id, "appointment_datetime": slot_start().to_rfc3339() })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(read_json(response).await["code"], "CAL_COM_ERROR");
}

#[tokio::test]
async fn test_failed_local_write_cancels_remote_booking() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(TestConfig::default().with_mock_server(&mock_server.uri()));
    let patient = TestUser::patient(PHONE);
    let doctor_id = Uuid::new_v4();

    mount_doctor(&mock_server, doctor_id).await;
    mount_patient(&mock_server, &patient).await;
    mount_open_slot(&mock_server, slot_start()).await;

    Mock::given(method("POST"))
        .and(path("/bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cal_booking(slot_start(), 30)))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(500).set_body_json(
            MockSupabaseResponses::error_response("connection reset", "08006"),
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path(format!("/bookings/{}/cancel", CAL_BOOKING_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = app
        .oneshot(authed(
            "POST",
            "/",
            &patient,
            Some(json!({ "doctor_id": doctor_id, "appointment_datetime": slot_start().to_rfc3339() })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_doctors_cannot_book() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(TestConfig::default().with_mock_server(&mock_server.uri()));
    let doctor = TestUser::doctor("dr.rao@citycare.com", Uuid::new_v4());

    let response = app
        .oneshot(authed(
            "POST",
            "/",
            &doctor,
            Some(json!({ "doctor_id": doctor.id, "appointment_datetime": slot_start().to_rfc3339() })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_list_appointments_for_patient() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(TestConfig::default().with_mock_server(&mock_server.uri()));
    let patient = TestUser::patient(PHONE);

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("patient_id", format!("eq.{}", patient.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::appointment_response(Uuid::new_v4(), patient.id, Uuid::new_v4(), "SCHEDULED")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = app.oneshot(authed("GET", "/", &patient, None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_cancel_appointment() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(TestConfig::default().with_mock_server(&mock_server.uri()));
    let patient = TestUser::patient(PHONE);
    let appointment_id = Uuid::new_v4();
    let doctor_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::appointment_response(appointment_id, patient.id, doctor_id, "SCHEDULED")
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .and(body_partial_json(json!({ "status": "CANCELLED" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::appointment_response(appointment_id, patient.id, doctor_id, "CANCELLED")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/bookings/9001/cancel"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = app
        .oneshot(authed("DELETE", &format!("/{}", appointment_id), &patient, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["data"]["status"], "CANCELLED");
}

#[tokio::test]
async fn test_cancel_survives_calendar_outage() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(TestConfig::default().with_mock_server(&mock_server.uri()));
    let patient = TestUser::patient(PHONE);
    let appointment_id = Uuid::new_v4();
    let doctor_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::appointment_response(appointment_id, patient.id, doctor_id, "CONFIRMED")
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::appointment_response(appointment_id, patient.id, doctor_id, "CANCELLED")
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/bookings/9001/cancel"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock_server)
        .await;

    let response = app
        .oneshot(authed("DELETE", &format!("/{}", appointment_id), &patient, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_cancel_someone_elses_appointment() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(TestConfig::default().with_mock_server(&mock_server.uri()));
    let patient = TestUser::patient(PHONE);
    let appointment_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::appointment_response(appointment_id, Uuid::new_v4(), Uuid::new_v4(), "SCHEDULED")
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let response = app
        .oneshot(authed("DELETE", &format!("/{}", appointment_id), &patient, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(read_json(response).await["code"], "INSUFFICIENT_PERMISSIONS");
}

#[tokio::test]
async fn test_get_missing_appointment() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(TestConfig::default().with_mock_server(&mock_server.uri()));
    let patient = TestUser::patient(PHONE);

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let response = app
        .oneshot(authed("GET", &format!("/{}", Uuid::new_v4()), &patient, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(read_json(response).await["code"], "APPOINTMENT_NOT_FOUND");
}

#[tokio::test]
async fn test_doctor_can_view_own_appointment() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(TestConfig::default().with_mock_server(&mock_server.uri()));
    let doctor = TestUser::doctor("dr.rao@citycare.com", Uuid::new_v4());
    let appointment_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::appointment_response(appointment_id, Uuid::new_v4(), doctor.id, "SCHEDULED")
        ])))
        .mount(&mock_server)
        .await;

    let response = app
        .oneshot(authed("GET", &format!("/{}", appointment_id), &doctor, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["data"]["id"], appointment_id.to_string());
}

#[tokio::test]
async fn test_status_update_rejects_unknown_value() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(TestConfig::default().with_mock_server(&mock_server.uri()));
    let patient = TestUser::patient(PHONE);

    let response = app
        .oneshot(authed(
            "PATCH",
            &format!("/{}/status", Uuid::new_v4()),
            &patient,
            Some(json!({ "status": "completed" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_cancelled_appointment_cannot_return_to_pending() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(TestConfig::default().with_mock_server(&mock_server.uri()));
    let patient = TestUser::patient(PHONE);
    let appointment_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::appointment_response(appointment_id, patient.id, Uuid::new_v4(), "CANCELLED")
        ])))
        .mount(&mock_server)
        .await;

    let response = app
        .oneshot(authed(
            "PATCH",
            &format!("/{}/status", appointment_id),
            &patient,
            Some(json!({ "status": "Pending" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_slots_for_past_date_are_empty() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(TestConfig::default().with_mock_server(&mock_server.uri()));
    let patient = TestUser::patient(PHONE);
    let doctor_id = Uuid::new_v4();

    mount_doctor(&mock_server, doctor_id).await;

    let response = app
        .oneshot(authed(
            "GET",
            &format!("/available-slots?doctor_id={}&date=2020-01-01", doctor_id),
            &patient,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["date"], "2020-01-01");
    assert!(body["data"]["slots"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_slots_for_future_date() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(TestConfig::default().with_mock_server(&mock_server.uri()));
    let patient = TestUser::patient(PHONE);
    let doctor_id = Uuid::new_v4();

    mount_doctor(&mock_server, doctor_id).await;

    let response = app
        .oneshot(authed(
            "GET",
            &format!("/available-slots?doctor_id={}&date=2035-01-15", doctor_id),
            &patient,
            None,
        ))
        .await
        .unwrap();

    let body = read_json(response).await;
    let slots = body["data"]["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 12);
    assert_eq!(slots[0]["time"], "09:00");
    assert_eq!(slots[11]["time"], "16:30");
}

#[tokio::test]
async fn test_slots_for_unknown_doctor() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(TestConfig::default().with_mock_server(&mock_server.uri()));
    let patient = TestUser::patient(PHONE);

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let response = app
        .oneshot(authed(
            "GET",
            &format!("/available-slots?doctor_id={}&date=2035-01-15", Uuid::new_v4()),
            &patient,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(read_json(response).await["code"], "DOCTOR_NOT_FOUND");
}

async fn assert_validation_envelope(response: axum::response::Response) {
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/json"
    );
    let body = read_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_malformed_booking_body_is_validation_envelope() {
    let app = create_test_app(TestConfig::default().to_app_config());
    let patient = TestUser::patient(PHONE);

    let response = app
        .oneshot(authed(
            "POST",
            "/",
            &patient,
            Some(json!({ "doctor_id": "nope", "appointment_datetime": "2035-01-15T04:00:00Z" })),
        ))
        .await
        .unwrap();

    assert_validation_envelope(response).await;
}

#[tokio::test]
async fn test_malformed_appointment_id_is_validation_envelope() {
    let app = create_test_app(TestConfig::default().to_app_config());
    let patient = TestUser::patient(PHONE);

    let response = app
        .oneshot(authed("GET", "/not-a-uuid", &patient, None))
        .await
        .unwrap();

    assert_validation_envelope(response).await;
}

#[tokio::test]
async fn test_malformed_slots_query_is_validation_envelope() {
    let app = create_test_app(TestConfig::default().to_app_config());
    let patient = TestUser::patient(PHONE);

    let response = app
        .oneshot(authed(
            "GET",
            &format!("/available-slots?doctor_id={}&date=tomorrow", Uuid::new_v4()),
            &patient,
            None,
        ))
        .await
        .unwrap();

    assert_validation_envelope(response).await;
}

#[tokio::test]
async fn test_requires_authentication() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(TestConfig::default().with_mock_server(&mock_server.uri()));

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
