//! Small helpers for login input handling.

use axum::http::HeaderMap;
use regex::Regex;

/// Identifier used for rate limiting when no proxy header names the client.
pub(super) const UNKNOWN_CLIENT: &str = "unknown";

/// Normalize an email for lookup.
pub(super) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
pub(super) fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}

/// Extract a client IP for rate limiting from common proxy headers.
pub(super) fn extract_client_ip(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    if forwarded.is_some() {
        return forwarded.map(str::to_string);
    }
    headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Client identifier for rate limiting, `"unknown"` when headers are absent.
pub(super) fn client_identifier(headers: &HeaderMap) -> String {
    extract_client_ip(headers).unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}
