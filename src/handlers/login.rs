use axum::{
    extract::State,
    http::{header, HeaderName, StatusCode},
    Form, Json,
};
use tracing::{error, info, warn};

use crate::models::{ErrorResponse, LoginRequest, LoginResponse};
use crate::services::auth_service::{check_admin_credentials, removal_cookie, session_cookie};
use crate::state::AppState;

/// Log the admin in and hand out a session token
pub async fn login(
    State(state): State<AppState>,
    Form(req): Form<LoginRequest>,
) -> Result<(StatusCode, [(HeaderName, String); 1], Json<LoginResponse>), (StatusCode, Json<ErrorResponse>)> {

    if !check_admin_credentials(&state.config, &req.username, &req.password) {
        warn!("Rejected login attempt for '{}'", req.username);
        return Err(ErrorResponse::reply(StatusCode::UNAUTHORIZED, "Invalid credentials"));
    }

    let token = state.tokens.issue(&req.username).map_err(|e| {
        error!("{}", e);
        ErrorResponse::reply(StatusCode::INTERNAL_SERVER_ERROR, "Failed to issue session")
    })?;

    info!("Admin '{}' logged in", req.username);
    let cookie = session_cookie(&state.config.session_cookie, &token, state.tokens.ttl_secs());
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse { username: req.username, token }),
    ))
}

/// Drop the session cookie
pub async fn logout(State(state): State<AppState>) -> (StatusCode, [(HeaderName, String); 1]) {
    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, removal_cookie(&state.config.session_cookie))],
    )
}
