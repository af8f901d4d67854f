//! JWT Extractor
//!
//! Custom extractors for automatically validating JWT tokens

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::AppError;
use crate::auth::{CurrentUser, JwtService};
use crate::core::ServerState;

fn extract_user(parts: &mut Parts, state: &ServerState) -> Result<CurrentUser, AppError> {
    // Check if already extracted
    if let Some(user) = parts.extensions.get::<CurrentUser>() {
        return Ok(user.clone());
    }

    let auth_header = parts
        .headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => {
            JwtService::extract_from_header(header).ok_or(AppError::InvalidToken)?
        }
        None => {
            tracing::warn!(target: "security", uri = %parts.uri, "Missing authorization header");
            return Err(AppError::Unauthorized);
        }
    };

    match state.jwt_service.validate_token(token) {
        Ok(claims) => {
            let user = CurrentUser::from(claims);
            // Store in extensions for potential reuse
            parts.extensions.insert(user.clone());
            Ok(user)
        }
        Err(e) => {
            tracing::warn!(target: "security", error = %e, uri = %parts.uri, "Token validation failed");
            match e {
                crate::auth::JwtError::ExpiredToken => Err(AppError::TokenExpired),
                _ => Err(AppError::InvalidToken),
            }
        }
    }
}

/// JWT Auth Extractor
///
/// Use this extractor in protected handlers to automatically validate JWT
/// and extract CurrentUser
impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        extract_user(parts, state)
    }
}

/// 可选认证提取器 - 游客下单等场景
///
/// 没有 Authorization 头时返回 `OptionalUser(None)`；
/// 带了头但令牌无效时仍然拒绝请求 (不能静默降级为游客)。
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<CurrentUser>);

impl FromRequestParts<ServerState> for OptionalUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if parts.headers.get(http::header::AUTHORIZATION).is_none() {
            return Ok(OptionalUser(None));
        }
        extract_user(parts, state).map(|user| OptionalUser(Some(user)))
    }
}
