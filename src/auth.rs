//! Authentication utilities: JWT token validation for incoming requests

use anyhow::{anyhow, Result};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Request;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// User email
    pub email: String,
    /// User role (admin, gabinete, assessor)
    pub role: String,
    /// Owner ID (for assessors, the office account they work under)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
    /// BCP-47 locale code. Available immediately on login.
    #[serde(default = "default_locale")]
    pub locale: String,
    /// Issued at (unix timestamp)
    pub iat: usize,
    /// Expiration (unix timestamp)
    pub exp: usize,
}

fn default_locale() -> String {
    "pt-BR".to_string()
}

/// Authentication result from extract_auth
#[derive(Debug, Clone)]
pub struct AuthInfo {
    pub user_id: Uuid,
    pub role: String,
    /// For assessors, the office account's user_id
    pub owner_id: Option<Uuid>,
}

impl AuthInfo {
    /// Returns the user_id that owns the caller's data. Assessors share
    /// their office's data, so they resolve to the owner's user_id.
    pub fn data_user_id(&self) -> Uuid {
        if self.role == "assessor" {
            self.owner_id.unwrap_or(self.user_id)
        } else {
            self.user_id
        }
    }
}

/// Validate a JWT token and return claims
pub fn validate_token(token: &str, secret: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| anyhow!("Invalid token: {}", e))?;

    Ok(token_data.claims)
}

/// Extract authentication info from a NATS request. A valid JWT in the
/// envelope's `token` field is the only accepted credential.
pub fn extract_auth<T>(request: &Request<T>, jwt_secret: &str) -> Result<AuthInfo> {
    if let Some(ref token) = request.token {
        let claims = validate_token(token, jwt_secret)?;
        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|e| anyhow!("Invalid user_id in token: {}", e))?;
        let owner_id = claims
            .owner_id
            .as_deref()
            .map(Uuid::parse_str)
            .transpose()
            .map_err(|e| anyhow!("Invalid owner_id in token: {}", e))?;
        return Ok(AuthInfo {
            user_id,
            role: claims.role,
            owner_id,
        });
    }

    Err(anyhow!("No authentication provided, JWT token is required"))
}

// =============================================================================
// Tests
// =============================================================================
