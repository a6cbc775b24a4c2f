//! Session cookie handling and the user extractors.
//!
//! The token is read from the `session` cookie, or from an
//! `Authorization: Bearer` header for API clients. Three extractors expose the
//! result to handlers:
//!
//! * [`CurrentUser`] rejects anonymous requests with a JSON 401.
//! * [`MaybeUser`] never rejects on a missing session.
//! * [`PageUser`] redirects anonymous visitors to `/login`.

use crate::{
    config::settings::ServerSettings,
    core::session::{self, CurrentUser},
    server::{AppState, error::ApiError},
};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{
        HeaderMap, StatusCode,
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
    },
    response::{IntoResponse, Redirect, Response},
};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session";

/// Where anonymous page visitors are sent.
pub const LOGIN_PATH: &str = "/login";

/// Extracts the session token from the request headers.
///
/// A bearer token takes precedence over the cookie.
#[must_use]
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value that stores `token` for the session lifetime.
#[must_use]
pub fn session_cookie(token: &str, settings: &ServerSettings) -> String {
    let max_age = settings.session_ttl().num_seconds();
    let secure = if settings.secure_cookies { "; Secure" } else { "" };
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}{secure}")
}

/// `Set-Cookie` value that removes the session cookie.
#[must_use]
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Resolves the request's session, if any.
async fn authenticate(parts: &Parts, state: &AppState) -> Result<Option<CurrentUser>, ApiError> {
    let Some(token) = session_token(&parts.headers) else {
        return Ok(None);
    };

    session::resolve_session(&state.database, &token)
        .await
        .map_err(|e| {
            tracing::error!("Failed to resolve session: {e}");
            ApiError::internal("Failed to load session")
        })
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        authenticate(parts, state)
            .await?
            .ok_or_else(ApiError::unauthorized)
    }
}

/// The signed-in user when there is one.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<CurrentUser>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        authenticate(parts, state).await.map(MaybeUser)
    }
}

/// The signed-in user of a page request.
#[derive(Debug, Clone)]
pub struct PageUser(pub CurrentUser);

#[async_trait]
impl FromRequestParts<AppState> for PageUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match authenticate(parts, state).await {
            Ok(Some(user)) => Ok(Self(user)),
            Ok(None) => Err(Redirect::to(LOGIN_PATH).into_response()),
            Err(_) => Err((StatusCode::INTERNAL_SERVER_ERROR, "Failed to load session").into_response()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_token_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; session=abc123; other=1"));
        assert_eq!(session_token(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_bearer_takes_precedence() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("session=from-cookie"));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        assert_eq!(session_token(&headers).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_missing_or_empty_token() {
        let mut headers = HeaderMap::new();
        assert!(session_token(&headers).is_none());

        headers.insert(COOKIE, HeaderValue::from_static("session=; theme=dark"));
        assert!(session_token(&headers).is_none());
    }

    #[test]
    fn test_session_cookie_attributes() {
        let mut settings = ServerSettings::default();
        settings.session_ttl_hours = 1;
        assert_eq!(
            session_cookie("tok", &settings),
            "session=tok; Path=/; HttpOnly; SameSite=Lax; Max-Age=3600"
        );

        settings.secure_cookies = true;
        assert!(session_cookie("tok", &settings).ends_with("; Secure"));
        assert!(clear_session_cookie().contains("Max-Age=0"));
    }
}
