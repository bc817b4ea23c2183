//! Route guard for the admin section.
//!
//! - `/admin/**` (except `/admin/login`): redirect to the login page without a
//!   valid session, clearing a cookie that failed verification.
//! - `/admin/login` with a valid session: redirect to the dashboard.
//! - `/api/admin/**` (except login/logout): `401` JSON instead of a redirect.
//!
//! [`limit_api`] applies the generic API rate limit policy when it is enabled.
//!
//! Verified claims are attached to the request as an `AdminIdentity` extension.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error};

use super::{
    error::AuthError,
    session::{clear_session_cookie, extract_session_token},
    state::AuthState,
    utils::client_identifier,
};

pub const ADMIN_HOME_PATH: &str = "/admin";
pub const ADMIN_LOGIN_PATH: &str = "/admin/login";
const ADMIN_API_PREFIX: &str = "/api/admin";
const PUBLIC_ADMIN_API: [&str; 2] = ["/api/admin/login", "/api/admin/logout"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Protection {
    Public,
    LoginPage,
    Page,
    Api,
}

fn classify(path: &str) -> Protection {
    let path = if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    };
    if path == ADMIN_LOGIN_PATH {
        Protection::LoginPage
    } else if under(path, ADMIN_HOME_PATH) {
        Protection::Page
    } else if under(path, ADMIN_API_PREFIX) && !PUBLIC_ADMIN_API.contains(&path) {
        Protection::Api
    } else {
        Protection::Public
    }
}

fn under(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Middleware enforcing an admin session on protected paths.
pub async fn require_admin(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let protection = classify(request.uri().path());
    if protection == Protection::Public {
        return next.run(request).await;
    }

    let token = extract_session_token(request.headers());
    let identity = token
        .as_deref()
        .and_then(|token| auth_state.signer().verify(token));

    match (protection, identity) {
        (Protection::LoginPage, Some(_)) => Redirect::to(ADMIN_HOME_PATH).into_response(),
        (Protection::LoginPage, None) | (Protection::Public, _) => next.run(request).await,
        (Protection::Page | Protection::Api, Some(identity)) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        (Protection::Page, None) => {
            debug!(client = %client_identifier(request.headers()), "redirecting unauthenticated admin request");
            let mut response = Redirect::to(ADMIN_LOGIN_PATH).into_response();
            if token.is_some() {
                clear_cookie(&auth_state, response.headers_mut());
            }
            response
        }
        (Protection::Api, None) => {
            let mut response = AuthError::Unauthorized.into_response();
            if token.is_some() {
                clear_cookie(&auth_state, response.headers_mut());
            }
            response
        }
    }
}

/// Middleware applying the generic API policy to `/api/**` when enabled.
pub async fn limit_api(
    State(auth_state): State<Arc<AuthState>>,
    request: Request,
    next: Next,
) -> Response {
    if !auth_state.config().api_rate_limit_enabled() || !under(request.uri().path(), "/api") {
        return next.run(request).await;
    }

    let outcome = auth_state
        .api_limiter()
        .check(&client_identifier(request.headers()));
    if outcome.success {
        next.run(request).await
    } else {
        AuthError::RateLimited {
            retry_after_secs: outcome.retry_after_secs(Instant::now()).max(1),
        }
        .into_response()
    }
}

fn clear_cookie(auth_state: &AuthState, headers: &mut HeaderMap) {
    match clear_session_cookie(auth_state.config()) {
        Ok(cookie) => {
            headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => error!("Failed to build session cookie: {err}"),
    }
}
