use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::{JwtClaims, Role, TokenPair, TokenType, User};

/// Identity fields needed to mint a token pair.
#[derive(Debug, Clone)]
pub struct TokenSubject {
    pub user_id: Uuid,
    pub role: Role,
    pub hospital_id: Option<Uuid>,
}

fn sign(claims: &JwtClaims, secret: &str) -> Result<String, String> {
    if secret.is_empty() {
        return Err("JWT secret is not set".to_string());
    }

    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| format!("Failed to sign token: {}", e))
}

/// Mint an access/refresh pair. Lifetimes come from the role; the two tokens
/// are signed with distinct secrets.
pub fn generate_tokens(subject: &TokenSubject, config: &AppConfig) -> Result<TokenPair, String> {
    let now = Utc::now();
    let access_ttl = subject.role.access_token_ttl();
    let refresh_ttl = subject.role.refresh_token_ttl();

    let access_claims = JwtClaims {
        sub: subject.user_id,
        role: subject.role,
        permissions: subject.role.permissions().iter().map(|p| p.to_string()).collect(),
        hospital_id: subject.hospital_id,
        token_type: TokenType::Access,
        iat: now.timestamp(),
        exp: (now + access_ttl).timestamp(),
    };

    let refresh_claims = JwtClaims {
        sub: subject.user_id,
        role: subject.role,
        permissions: Vec::new(),
        hospital_id: subject.hospital_id,
        token_type: TokenType::Refresh,
        iat: now.timestamp(),
        exp: (now + refresh_ttl).timestamp(),
    };

    Ok(TokenPair {
        access_token: sign(&access_claims, &config.jwt_secret)?,
        refresh_token: sign(&refresh_claims, &config.jwt_refresh_secret)?,
        token_type: "Bearer".to_string(),
        expires_in: access_ttl.num_seconds(),
        refresh_expires_in: refresh_ttl.num_seconds(),
    })
}

fn decode_claims(token: &str, secret: &str, expected: TokenType) -> Result<JwtClaims, String> {
    if secret.is_empty() {
        return Err("JWT secret is not set".to_string());
    }

    let validation = Validation::new(Algorithm::HS256);
    let data = decode::<JwtClaims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map_err(|e| {
            debug!("Token rejected: {}", e);
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => "Token expired".to_string(),
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    "Invalid token signature".to_string()
                }
                _ => "Invalid token format".to_string(),
            }
        })?;

    if data.claims.token_type != expected {
        return Err("Unexpected token type".to_string());
    }

    Ok(data.claims)
}

pub fn validate_token(token: &str, jwt_secret: &str) -> Result<User, String> {
    let claims = decode_claims(token, jwt_secret, TokenType::Access)?;
    debug!("Token validated successfully for user: {}", claims.sub);
    Ok(User::from(claims))
}

pub fn validate_refresh_token(token: &str, refresh_secret: &str) -> Result<JwtClaims, String> {
    decode_claims(token, refresh_secret, TokenType::Refresh)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig {
            jwt_secret: "access-secret".to_string(),
            jwt_refresh_secret: "refresh-secret".to_string(),
            ..AppConfig::default()
        }
    }

    #[test]
    fn access_token_carries_role_permissions_and_hospital() {
        let hospital_id = Uuid::new_v4();
        let subject = TokenSubject {
            user_id: Uuid::new_v4(),
            role: Role::HospitalAdmin,
            hospital_id: Some(hospital_id),
        };

        let pair = generate_tokens(&subject, &config()).unwrap();
        assert_eq!(pair.expires_in, 7_200);
        assert_eq!(pair.refresh_expires_in, 43_200);

        let user = validate_token(&pair.access_token, "access-secret").unwrap();
        assert_eq!(user.id, subject.user_id);
        assert_eq!(user.role, Role::HospitalAdmin);
        assert_eq!(user.hospital_id, Some(hospital_id));
        assert!(user.has_permission("staff:create"));
    }

    #[test]
    fn refresh_token_is_not_accepted_as_access_token() {
        let subject = TokenSubject {
            user_id: Uuid::new_v4(),
            role: Role::Patient,
            hospital_id: None,
        };
        let pair = generate_tokens(&subject, &config()).unwrap();
        assert_eq!(pair.expires_in, 86_400);

        // Signed with the refresh secret, so the access secret rejects it.
        assert!(validate_token(&pair.refresh_token, "access-secret").is_err());
        // And with the right secret it is still the wrong token type.
        assert_eq!(
            validate_token(&pair.refresh_token, "refresh-secret").unwrap_err(),
            "Unexpected token type"
        );

        let claims = validate_refresh_token(&pair.refresh_token, "refresh-secret").unwrap();
        assert_eq!(claims.sub, subject.user_id);
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert_eq!(validate_token("a.b.c", "").unwrap_err(), "JWT secret is not set");
    }
}
