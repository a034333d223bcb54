use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::SupabaseClient;
use shared_utils::jwt::{generate_tokens, TokenSubject};
use shared_utils::password::{hash_password, verify_password, MIN_PASSWORD_LENGTH};

use crate::models::{AuthError, StaffLogin, StaffSummary, UserRecord};

pub const MAX_FAILED_LOGINS: i32 = 5;
pub const LOCKOUT_MINUTES: i64 = 30;

/// Outcome of recording one failed password check.
#[derive(Debug, Clone, PartialEq)]
pub enum FailedLoginOutcome {
    Counted { attempts: i32 },
    Locked { until: DateTime<Utc> },
}

/// Pure lockout arithmetic: the fifth consecutive failure locks the account
/// and resets the counter.
pub fn register_failed_login(previous_attempts: i32, now: DateTime<Utc>) -> FailedLoginOutcome {
    let attempts = previous_attempts + 1;
    if attempts >= MAX_FAILED_LOGINS {
        FailedLoginOutcome::Locked {
            until: now + Duration::minutes(LOCKOUT_MINUTES),
        }
    } else {
        FailedLoginOutcome::Counted { attempts }
    }
}

pub struct StaffAuthService {
    config: Arc<AppConfig>,
    supabase: Arc<SupabaseClient>,
}

impl StaffAuthService {
    pub fn new(config: Arc<AppConfig>, supabase: Arc<SupabaseClient>) -> Self {
        Self { config, supabase }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<StaffLogin, AuthError> {
        let email = email.trim().to_lowercase();
        let path = format!(
            "/rest/v1/users?email=eq.{}&select=*,profiles(full_name)",
            urlencoding::encode(&email)
        );

        let user: UserRecord = self
            .supabase
            .select_one(&path)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.role.is_staff() {
            return Err(AuthError::InvalidCredentials);
        }

        let now = Utc::now();
        if let Some(until) = user.lockout_until.filter(|_| user.is_locked_at(now)) {
            warn!("Login attempt for locked account {}", user.id);
            return Err(AuthError::AccountLocked { until });
        }

        let hash = user.password_hash.as_deref().ok_or(AuthError::InvalidCredentials)?;
        let password_ok =
            verify_password(password, hash).map_err(|e| AuthError::Internal(e.to_string()))?;

        if !password_ok {
            return Err(self.record_failed_login(&user, now).await?);
        }

        let path = format!("/rest/v1/users?id=eq.{}", user.id);
        let _: Value = self
            .supabase
            .request(
                Method::PATCH,
                &path,
                Some(json!({
                    "login_attempts": 0,
                    "lockout_until": null,
                    "last_login": now.to_rfc3339(),
                    "updated_at": now.to_rfc3339()
                })),
            )
            .await?;

        let tokens = generate_tokens(
            &TokenSubject {
                user_id: user.id,
                role: user.role,
                hospital_id: user.hospital_id,
            },
            &self.config,
        )
        .map_err(AuthError::Internal)?;

        info!("Staff member {} ({}) logged in", user.id, user.role);

        Ok(StaffLogin {
            tokens,
            user: StaffSummary {
                id: user.id,
                email: user.email.clone(),
                full_name: user.full_name().map(str::to_string),
                role: user.role,
                hospital_id: user.hospital_id,
                force_password_change: user.force_password_change,
            },
        })
    }

    /// Persist a failed attempt and return the error the caller should see.
    async fn record_failed_login(
        &self,
        user: &UserRecord,
        now: DateTime<Utc>,
    ) -> Result<AuthError, AuthError> {
        let path = format!("/rest/v1/users?id=eq.{}", user.id);

        let (update, error) = match register_failed_login(user.login_attempts, now) {
            FailedLoginOutcome::Counted { attempts } => (
                json!({ "login_attempts": attempts }),
                AuthError::InvalidCredentials,
            ),
            FailedLoginOutcome::Locked { until } => {
                warn!("Locking account {} until {}", user.id, until);
                (
                    json!({ "login_attempts": 0, "lockout_until": until.to_rfc3339() }),
                    AuthError::AccountLocked { until },
                )
            }
        };

        let _: Value = self.supabase.request(Method::PATCH, &path, Some(update)).await?;
        Ok(error)
    }

    pub async fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        if new_password.len() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::WeakPassword(format!(
                "New password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }
        if new_password == current_password {
            return Err(AuthError::WeakPassword(
                "New password must differ from the current password".to_string(),
            ));
        }

        let path = format!("/rest/v1/users?id=eq.{}", user_id);
        let user: UserRecord = self
            .supabase
            .select_one(&path)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let hash = user.password_hash.as_deref().ok_or(AuthError::InvalidCredentials)?;
        if !verify_password(current_password, hash).map_err(|e| AuthError::Internal(e.to_string()))? {
            return Err(AuthError::InvalidCredentials);
        }

        let new_hash = hash_password(new_password).map_err(|e| AuthError::Internal(e.to_string()))?;

        let _: Value = self
            .supabase
            .request(
                Method::PATCH,
                &path,
                Some(json!({
                    "password_hash": new_hash,
                    "force_password_change": false,
                    "password_temp": false,
                    "updated_at": Utc::now().to_rfc3339()
                })),
            )
            .await?;

        info!("Password changed for user {}", user_id);
        Ok(())
    }
}
