//! JWT Extractor
//!
//! Custom extractor for automatically validating JWT tokens

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{AuthContext, JwtError, JwtService};
use crate::core::ServerState;
use crate::utils::AppError;

/// Use this extractor in protected handlers to automatically validate the
/// bearer token and extract the request's [`AuthContext`]
impl FromRequestParts<ServerState> for AuthContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        // Check if already extracted earlier in the request
        if let Some(ctx) = parts.extensions.get::<AuthContext>() {
            return Ok(ctx.clone());
        }

        // Extract Authorization header
        let auth_header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let token = match auth_header {
            Some(header) => JwtService::extract_from_header(header)
                .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
            None => {
                tracing::warn!(uri = %parts.uri, "Missing authorization header");
                return Err(AppError::unauthorized());
            }
        };

        match state.jwt_service.verify(token) {
            Ok(ctx) => {
                // Store in extensions for potential reuse
                parts.extensions.insert(ctx.clone());
                Ok(ctx)
            }
            Err(JwtError::ExpiredToken) => Err(AppError::token_expired()),
            Err(e) => {
                tracing::warn!(error = %e, uri = %parts.uri, "Token validation failed");
                Err(AppError::invalid_token("Invalid token"))
            }
        }
    }
}
