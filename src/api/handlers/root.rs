use crate::APP_USER_AGENT;
use axum::response::IntoResponse;

// axum handler for `/`
pub async fn root() -> impl IntoResponse {
    APP_USER_AGENT
}
