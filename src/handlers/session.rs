use axum::{extract::State, http::HeaderMap, Json};
use chrono::Local;

use crate::models::SessionResponse;
use crate::services::auth_service::get_auth_token;
use crate::state::AppState;

/// Describe the live post as the current visitor sees it
pub async fn session_info(State(state): State<AppState>, headers: HeaderMap) -> Json<SessionResponse> {
    let token = get_auth_token(None, &headers, &state.config.session_cookie);
    let claim = state.tokens.validate(token.as_deref());
    let is_admin = state.tokens.is_admin(&claim);

    Json(SessionResponse {
        is_admin,
        ws_token: if is_admin { token } else { None },
        content: state.hub.current_content(),
        viewer_count: state.hub.viewer_count(),
        date: Local::now().format("%B %d, %Y").to_string(),
    })
}
