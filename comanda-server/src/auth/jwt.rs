//! JWT validation service
//!
//! The auth collaborator signs tokens; this service only verifies them and
//! maps claims to an [`AuthContext`]. Customer scope (table session or a
//! specific order) travels inside the token, so guest reconnection is
//! entirely a token-scoping concern.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use shared::{Actor, Role, ViewerScope};
use thiserror::Error;

use super::AuthContext;

/// JWT errors
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("token expired")]
    ExpiredToken,

    #[error("invalid token: {0}")]
    InvalidToken(String),
}

/// Claims supplied by the auth collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Request role
    pub role: Role,
    /// Restaurant the session belongs to
    pub restaurant_id: String,
    /// Customer scope - table session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
    /// Customer scope - specific order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Expiration (Unix seconds)
    pub exp: i64,
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        Self {
            scope: ViewerScope {
                order_id: claims.order_id,
                table_id: claims.table_id,
            },
            actor: Actor::new(claims.sub, claims.role, claims.restaurant_id),
        }
    }
}

/// Token validation service
pub struct JwtService {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService").finish_non_exhaustive()
    }
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Extract the token from an `Authorization: Bearer <token>` header value
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }

    /// Validate a token and build the request context
    pub fn verify(&self, token: &str) -> Result<AuthContext, JwtError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                _ => JwtError::InvalidToken(e.to_string()),
            }
        })?;
        Ok(data.claims.into())
    }
}
