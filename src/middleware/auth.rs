use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::{error::AppError, AppState};

/// Extractor for endpoints that require an authenticated user.
pub struct AuthUser(pub i32);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = extract_token(parts)?;
        let user_id = state.auth_service.validate_token(&token)?;
        Ok(AuthUser(user_id))
    }
}

/// Extractor for endpoints whose response shape depends on the viewer
/// (favorited/in-cart/subscribed flags) but which anonymous users may hit.
pub struct OptionalAuthUser(pub Option<i32>);

impl FromRequestParts<AppState> for OptionalAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match extract_token(parts) {
            Ok(token) => {
                match state.auth_service.validate_token(&token) {
                    Ok(user_id) => Ok(OptionalAuthUser(Some(user_id))),
                    Err(_) => Ok(OptionalAuthUser(None)),
                }
            }
            Err(_) => Ok(OptionalAuthUser(None)),
        }
    }
}

// Accepts both "Bearer <jwt>" and the legacy "Token <jwt>" scheme still sent
// by older clients.
fn extract_token(parts: &Parts) -> Result<String, AppError> {
    let auth_header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    for scheme in ["Bearer ", "Token "] {
        if let Some(token) = auth_header.strip_prefix(scheme) {
            return Ok(token.to_string());
        }
    }

    Err(AppError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_auth(value: &str) -> Parts {
        let (parts, _) = Request::builder()
            .header(AUTHORIZATION, value)
            .body(())
            .expect("request should build")
            .into_parts();
        parts
    }

    #[test]
    fn test_extract_token_bearer_scheme() {
        let parts = parts_with_auth("Bearer abc.def.ghi");
        assert_eq!(extract_token(&parts).expect("token expected"), "abc.def.ghi");
    }

    #[test]
    fn test_extract_token_legacy_token_scheme() {
        let parts = parts_with_auth("Token abc.def.ghi");
        assert_eq!(extract_token(&parts).expect("token expected"), "abc.def.ghi");
    }

    #[test]
    fn test_extract_token_rejects_unknown_scheme() {
        let parts = parts_with_auth("Basic dXNlcjpwYXNz");
        assert!(extract_token(&parts).is_err());
    }

    #[test]
    fn test_extract_token_rejects_missing_header() {
        let (parts, _) = Request::builder()
            .body(())
            .expect("request should build")
            .into_parts();
        assert!(extract_token(&parts).is_err());
    }
}
