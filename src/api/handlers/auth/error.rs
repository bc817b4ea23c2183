//! Error responses for admin auth endpoints.
//!
//! Messages are shown to shop staff as-is, so they are in Bulgarian.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

pub(super) const MSG_INVALID_CREDENTIALS: &str = "Грешен имейл или парола";
pub(super) const MSG_RATE_LIMITED: &str = "Твърде много опити. Моля, опитайте отново по-късно.";
pub(super) const MSG_UNAUTHORIZED: &str = "Необходим е вход";
pub(super) const MSG_BAD_REQUEST: &str = "Невалидна заявка";
pub(super) const MSG_INTERNAL: &str = "Възникна грешка. Моля, опитайте отново.";

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Unknown account or wrong password; the two are never distinguished.
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
    #[error("authentication required")]
    Unauthorized,
    #[error("bad request")]
    BadRequest,
    #[error("internal error")]
    Internal,
}

impl AuthError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials | Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    const fn message(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => MSG_INVALID_CREDENTIALS,
            Self::RateLimited { .. } => MSG_RATE_LIMITED,
            Self::Unauthorized => MSG_UNAUTHORIZED,
            Self::BadRequest => MSG_BAD_REQUEST,
            Self::Internal => MSG_INTERNAL,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message().to_string(),
        });
        let mut response = (self.status(), body).into_response();
        if let Self::RateLimited { retry_after_secs } = self {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(retry_after_secs));
        }
        response
    }
}
