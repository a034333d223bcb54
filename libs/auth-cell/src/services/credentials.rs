use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::SupabaseClient;
use shared_models::auth::TokenPair;
use shared_utils::jwt::{generate_tokens, validate_refresh_token, TokenSubject};

use crate::models::{AuthError, UserRecord};

/// Token refresh and current-user lookups shared by patients and staff.
pub struct CredentialService {
    config: Arc<AppConfig>,
    supabase: Arc<SupabaseClient>,
}

impl CredentialService {
    pub fn new(config: Arc<AppConfig>, supabase: Arc<SupabaseClient>) -> Self {
        Self { config, supabase }
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<UserRecord, AuthError> {
        let path = format!("/rest/v1/users?id=eq.{}&select=*,profiles(full_name)", user_id);
        self.supabase
            .select_one(&path)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Exchange a refresh token for a new pair. The user is re-read so that a
    /// role or hospital change since issuance is reflected.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = validate_refresh_token(refresh_token, &self.config.jwt_refresh_secret)
            .map_err(AuthError::Token)?;

        let user = self.get_user(claims.sub).await?;
        debug!("Refreshing tokens for user {}", user.id);

        generate_tokens(
            &TokenSubject {
                user_id: user.id,
                role: user.role,
                hospital_id: user.hospital_id,
            },
            &self.config,
        )
        .map_err(AuthError::Internal)
    }
}
