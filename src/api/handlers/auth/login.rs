//! Admin login endpoint.
//!
//! Flow Overview:
//! 1) Count the attempt against `login:<client-ip>`; reject with 429 past the limit.
//! 2) Look up the admin by normalized email and verify the bcrypt hash.
//! 3) Mint a session token and set it as the `admin_session` cookie.
//!
//! Unknown accounts and wrong passwords get the same status, body and bcrypt cost.

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

use super::{
    error::AuthError,
    password::verify_or_pad,
    session::session_cookie,
    state::AuthState,
    token::AdminIdentity,
    types::{ErrorResponse, LoginRequest},
    utils::{client_identifier, normalize_email, valid_email},
};

#[utoipa::path(
    post,
    path = "/api/admin/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; session cookie set", body = AdminIdentity),
        (status = 400, description = "Missing or malformed payload", body = ErrorResponse),
        (status = 401, description = "Wrong email or password", body = ErrorResponse),
        (status = 429, description = "Too many attempts", body = ErrorResponse),
        (status = 500, description = "Internal error", body = ErrorResponse)
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn login(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> Response {
    match authenticate(&headers, &auth_state, payload).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

async fn authenticate(
    headers: &HeaderMap,
    auth_state: &Arc<AuthState>,
    payload: Option<Json<LoginRequest>>,
) -> Result<Response, AuthError> {
    let client = client_identifier(headers);
    let outcome = auth_state.login_limiter().check(&client);
    if !outcome.success {
        return Err(AuthError::RateLimited {
            retry_after_secs: outcome.retry_after_secs(Instant::now()).max(1),
        });
    }

    let Some(Json(request)) = payload else {
        return Err(AuthError::BadRequest);
    };

    let email = normalize_email(&request.email);
    let record = if valid_email(&email) {
        auth_state
            .credentials()
            .find_admin(&email)
            .await
            .map_err(|err| {
                error!("Failed to look up admin: {err:#}");
                AuthError::Internal
            })?
    } else {
        None
    };

    let password = request.password;
    let hash = record.as_ref().map(|record| record.password_hash.clone());
    let verified = tokio::task::spawn_blocking(move || verify_or_pad(&password, hash.as_deref()))
        .await
        .map_err(|err| {
            error!("Password verification task failed: {err}");
            AuthError::Internal
        })?;

    let record = match record {
        Some(record) if verified => record,
        _ => {
            warn!(client = %client, "admin login failed");
            return Err(AuthError::InvalidCredentials);
        }
    };

    let identity = AdminIdentity {
        id: record.id.to_string(),
        email: record.email,
        name: record.name,
    };

    let token = auth_state.signer().issue(&identity).map_err(|err| {
        error!("Failed to issue session token: {err:#}");
        AuthError::Internal
    })?;

    let cookie = session_cookie(auth_state.config(), &token.token).map_err(|err| {
        error!("Failed to build session cookie: {err}");
        AuthError::Internal
    })?;

    info!(admin_id = %identity.id, "admin logged in");

    let mut response_headers = HeaderMap::new();
    response_headers.insert(SET_COOKIE, cookie);
    Ok((StatusCode::OK, response_headers, Json(identity)).into_response())
}
