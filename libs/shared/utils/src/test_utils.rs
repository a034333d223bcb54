use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::{JwtClaims, Role, TokenType, User};

pub struct TestConfig {
    pub jwt_secret: String,
    pub jwt_refresh_secret: String,
    pub supabase_url: String,
    pub supabase_service_role_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            jwt_refresh_secret: "test-refresh-secret-key-distinct-from-access".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_service_role_key: "test-service-role-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_service_role_key: self.supabase_service_role_key.clone(),
            jwt_secret: self.jwt_secret.clone(),
            jwt_refresh_secret: self.jwt_refresh_secret.clone(),
            ..AppConfig::default()
        }
    }

    /// Config whose every external base URL points at one mock server.
    pub fn with_mock_server(&self, uri: &str) -> AppConfig {
        AppConfig {
            supabase_url: uri.to_string(),
            twilio_account_sid: "ACtest".to_string(),
            twilio_auth_token: "twilio-token".to_string(),
            twilio_from_number: "+15005550006".to_string(),
            twilio_base_url: uri.to_string(),
            cal_com_api_key: "cal_test_key".to_string(),
            cal_com_base_url: uri.to_string(),
            cal_com_default_event_type_id: Some(42),
            vapi_public_key: "vapi-public".to_string(),
            vapi_assistant_id: "assistant-default".to_string(),
            vapi_base_url: uri.to_string(),
            ..self.to_app_config()
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: Uuid,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Role,
    pub hospital_id: Option<Uuid>,
}

impl TestUser {
    pub fn patient(phone: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: None,
            phone: Some(phone.to_string()),
            role: Role::Patient,
            hospital_id: None,
        }
    }

    pub fn staff(email: &str, role: Role, hospital_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: Some(email.to_string()),
            phone: None,
            role,
            hospital_id: Some(hospital_id),
        }
    }

    pub fn doctor(email: &str, hospital_id: Uuid) -> Self {
        Self::staff(email, Role::Doctor, hospital_id)
    }

    pub fn hospital_admin(email: &str, hospital_id: Uuid) -> Self {
        Self::staff(email, Role::HospitalAdmin, hospital_id)
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id,
            role: self.role,
            hospital_id: self.hospital_id,
            permissions: self.role.permissions().iter().map(|p| p.to_string()).collect(),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: user.id,
            role: user.role,
            permissions: user.role.permissions().iter().map(|p| p.to_string()).collect(),
            hospital_id: user.hospital_id,
            token_type: TokenType::Access,
            iat: now.timestamp(),
            exp: (now + Duration::hours(exp_hours.unwrap_or(24))).timestamp(),
        };

        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
            .expect("test token encodes")
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-2))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

/// Canned PostgREST rows matching the schema in `supabase/migrations`.
pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn patient_user_response(user_id: Uuid, phone: &str) -> Value {
        json!({
            "id": user_id,
            "role": "PATIENT",
            "email": null,
            "phone": phone,
            "password_hash": null,
            "hospital_id": null,
            "force_password_change": false,
            "password_temp": false,
            "login_attempts": 0,
            "lockout_until": null,
            "last_login": null,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z",
            "profiles": { "full_name": "Test Patient" }
        })
    }

    pub fn staff_user_response(
        user_id: Uuid,
        email: &str,
        role: Role,
        hospital_id: Uuid,
        password_hash: &str,
    ) -> Value {
        json!({
            "id": user_id,
            "role": role.as_str(),
            "email": email,
            "phone": null,
            "password_hash": password_hash,
            "hospital_id": hospital_id,
            "force_password_change": true,
            "password_temp": true,
            "login_attempts": 0,
            "lockout_until": null,
            "last_login": null,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z",
            "profiles": { "full_name": "Test Staff" }
        })
    }

    pub fn doctor_response(user_id: Uuid, email: &str, full_name: &str, specialty: &str) -> Value {
        json!({
            "id": user_id,
            "role": "DOCTOR",
            "email": email,
            "hospital_id": Uuid::new_v4(),
            "profiles": { "full_name": full_name },
            "doctors": { "specialty": specialty, "cal_event_type_id": null }
        })
    }

    pub fn hospital_response(hospital_id: Uuid, name: &str) -> Value {
        json!({
            "id": hospital_id,
            "name": name,
            "address": null,
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn otp_response(number: &str, otp: u16, age_minutes: i64) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "number": number,
            "otp": otp,
            "created_at": (Utc::now() - Duration::minutes(age_minutes)).to_rfc3339()
        })
    }

    pub fn appointment_response(
        appointment_id: Uuid,
        patient_id: Uuid,
        doctor_id: Uuid,
        status: &str,
    ) -> Value {
        let start = Utc::now() + Duration::hours(3);
        json!({
            "id": appointment_id,
            "appointment_number": "AID-20240101-0042",
            "patient_id": patient_id,
            "doctor_id": doctor_id,
            "appointment_type": "consultation",
            "start_ts": start.to_rfc3339(),
            "end_ts": (start + Duration::minutes(30)).to_rfc3339(),
            "status": status,
            "cal_booking_id": 9001,
            "cal_booking_uid": "cal-uid-9001",
            "cal_raw_payload": null,
            "meeting_link": null,
            "notes": null,
            "last_synced_at": null,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn error_response(message: &str, code: &str) -> Value {
        json!({
            "message": message,
            "code": code,
            "details": null,
            "hint": null
        })
    }
}
