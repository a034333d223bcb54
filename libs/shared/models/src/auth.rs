use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Patient,
    Doctor,
    Pharmacist,
    HospitalAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "PATIENT",
            Role::Doctor => "DOCTOR",
            Role::Pharmacist => "PHARMACIST",
            Role::HospitalAdmin => "HOSPITAL_ADMIN",
        }
    }

    pub fn is_staff(&self) -> bool {
        !matches!(self, Role::Patient)
    }

    /// Static permission table handed out in access tokens.
    pub fn permissions(&self) -> &'static [&'static str] {
        match self {
            Role::Patient => &[
                "appointments:create",
                "appointments:read:own",
                "appointments:cancel:own",
                "profile:read:own",
                "profile:update:own",
                "voice:session",
            ],
            Role::Doctor => &[
                "appointments:read:assigned",
                "appointments:update:assigned",
                "patients:read:assigned",
                "prescriptions:create",
                "profile:read:own",
            ],
            Role::Pharmacist => &[
                "prescriptions:read",
                "prescriptions:dispense",
                "inventory:read",
                "inventory:update",
                "profile:read:own",
            ],
            Role::HospitalAdmin => &[
                "hospital:read",
                "hospital:update",
                "staff:create",
                "staff:read",
                "staff:update",
                "appointments:read:hospital",
                "reports:read",
            ],
        }
    }

    pub fn access_token_ttl(&self) -> Duration {
        match self {
            Role::Patient => Duration::hours(24),
            Role::Doctor | Role::Pharmacist | Role::HospitalAdmin => Duration::hours(2),
        }
    }

    pub fn refresh_token_ttl(&self) -> Duration {
        match self {
            Role::Patient => Duration::days(7),
            Role::Doctor | Role::Pharmacist | Role::HospitalAdmin => Duration::hours(12),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PATIENT" => Ok(Role::Patient),
            "DOCTOR" => Ok(Role::Doctor),
            "PHARMACIST" => Ok(Role::Pharmacist),
            "HOSPITAL_ADMIN" => Ok(Role::HospitalAdmin),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: Uuid,
    pub role: Role,
    #[serde(default)]
    pub permissions: Vec<String>,
    pub hospital_id: Option<Uuid>,
    pub token_type: TokenType,
    pub iat: i64,
    pub exp: i64,
}

/// Authenticated principal placed into request extensions by the auth middleware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub role: Role,
    pub hospital_id: Option<Uuid>,
    pub permissions: Vec<String>,
}

impl User {
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}

impl From<JwtClaims> for User {
    fn from(claims: JwtClaims) -> Self {
        Self {
            id: claims.sub,
            role: claims.role,
            hospital_id: claims.hospital_id,
            permissions: claims.permissions,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub refresh_expires_in: i64,
}
