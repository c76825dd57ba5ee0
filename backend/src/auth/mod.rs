//! Request identity extractors
//!
//! Identity is asserted by the fronting gateway, which authenticates the
//! customer and forwards `x-user-id` / `x-user-email` headers. Admin
//! endpoints use a shared secret in `x-admin-token` compared against the
//! configured `ADMIN_TOKEN`.

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use crate::core::ServerState;
use crate::utils::AppError;

const USER_ID_HEADER: &str = "x-user-id";
const USER_EMAIL_HEADER: &str = "x-user-email";
const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Authenticated customer identity
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: String,
    pub email: String,
}

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let (Some(user_id), Some(email)) = (header(USER_ID_HEADER), header(USER_EMAIL_HEADER))
        else {
            return Err(AppError::Unauthorized);
        };

        let user = CurrentUser { user_id, email };
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

/// Guest checkout is allowed: missing identity headers yield `None`
/// instead of a rejection.
impl OptionalFromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Option<Self>, Self::Rejection> {
        match <Self as FromRequestParts<ServerState>>::from_request_parts(parts, state).await {
            Ok(user) => Ok(Some(user)),
            Err(AppError::Unauthorized) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Admin identity, proven by the shared admin token
#[derive(Debug, Clone)]
pub struct AdminUser;

impl FromRequestParts<ServerState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.config.admin_token.as_deref() else {
            warn!(uri = %parts.uri, "Admin endpoint hit but ADMIN_TOKEN is not configured");
            return Err(AppError::Forbidden("admin access is not configured".into()));
        };

        let provided = parts
            .headers
            .get(ADMIN_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok());

        match provided {
            Some(token) if token == expected => Ok(AdminUser),
            Some(_) => {
                warn!(uri = %parts.uri, "Admin token mismatch");
                Err(AppError::Forbidden("invalid admin token".into()))
            }
            None => Err(AppError::Unauthorized),
        }
    }
}
