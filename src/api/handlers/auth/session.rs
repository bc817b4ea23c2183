//! Session cookie helpers and session endpoints.

use axum::{
    Json,
    extract::Extension,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{COOKIE, InvalidHeaderValue, SET_COOKIE},
    },
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::error;

use super::{
    state::{AuthConfig, AuthState},
    token::AdminIdentity,
};

pub const SESSION_COOKIE_NAME: &str = "admin_session";

#[utoipa::path(
    get,
    path = "/api/admin/session",
    responses(
        (status = 200, description = "Session is active", body = AdminIdentity),
        (status = 401, description = "No valid session")
    ),
    tag = "auth"
)]
pub async fn session(Extension(identity): Extension<AdminIdentity>) -> impl IntoResponse {
    // The route guard has already verified the cookie and attached the claims.
    (StatusCode::OK, Json(identity))
}

#[utoipa::path(
    post,
    path = "/api/admin/logout",
    responses(
        (status = 204, description = "Session cleared")
    ),
    tag = "auth"
)]
pub async fn logout(auth_state: Extension<Arc<AuthState>>) -> impl IntoResponse {
    // Sessions are stateless; dropping the cookie is all there is to do.
    let mut response_headers = HeaderMap::new();
    match clear_session_cookie(auth_state.config()) {
        Ok(cookie) => {
            response_headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => error!("Failed to build session cookie: {err}"),
    }
    (StatusCode::NO_CONTENT, response_headers).into_response()
}

/// Build a secure `HttpOnly` cookie for the session token.
pub(super) fn session_cookie(
    config: &AuthConfig,
    token: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = config.session_ttl_seconds();
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}"
    );
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub(super) fn clear_session_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

pub(super) fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let key = parts.next().map(str::trim);
            let val = parts.next().map(str::trim);
            if let (Some(SESSION_COOKIE_NAME), Some(val)) = (key, val) {
                if !val.is_empty() {
                    return Some(val.to_string());
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::auth::state::Environment;

    fn config(environment: Environment) -> AuthConfig {
        AuthConfig::new(environment, "https://instrumenti.bg".to_string())
    }

    #[test]
    fn session_cookie_has_expected_attributes() -> anyhow::Result<()> {
        let cookie = session_cookie(&config(Environment::Production), "abc.def.ghi")?;
        assert_eq!(
            cookie.to_str()?,
            "admin_session=abc.def.ghi; Path=/; HttpOnly; SameSite=Lax; Max-Age=604800; Secure"
        );
        Ok(())
    }

    #[test]
    fn session_cookie_not_secure_in_development() -> anyhow::Result<()> {
        let cookie = session_cookie(&config(Environment::Development), "t")?;
        assert!(!cookie.to_str()?.contains("Secure"));
        Ok(())
    }

    #[test]
    fn clear_cookie_expires_immediately() -> anyhow::Result<()> {
        let cookie = clear_session_cookie(&config(Environment::Production))?;
        let value = cookie.to_str()?;
        assert!(value.starts_with("admin_session=;"));
        assert!(value.contains("Max-Age=0"));
        Ok(())
    }

    #[test]
    fn extract_session_token_finds_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("cart=3; admin_session=tok.en.sig; consent=all"),
        );
        assert_eq!(extract_session_token(&headers), Some("tok.en.sig".to_string()));
    }

    #[test]
    fn extract_session_token_ignores_empty_or_missing() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_session_token(&headers), None);
        headers.insert(COOKIE, HeaderValue::from_static("admin_session=; cart=3"));
        assert_eq!(extract_session_token(&headers), None);
        headers.insert(COOKIE, HeaderValue::from_static("admin_session_old=x"));
        assert_eq!(extract_session_token(&headers), None);
    }
}
