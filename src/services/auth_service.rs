use axum::http::{header, HeaderMap};
use cookie::{time::Duration, Cookie, SameSite};

use crate::config::Config;

// Get the session token of a request.
// Order: explicit query parameter, Authorization header, session cookie.
pub fn get_auth_token(query_token: Option<&str>, headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    // 1. Query parameter, as used by the websocket handshake
    if let Some(token) = query_token.filter(|t| !t.is_empty()) {
        return Some(token.to_string());
    }

    // 2. Authorization header
    if let Some(auth_str) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        let token = auth_str.strip_prefix("Bearer ").unwrap_or(auth_str).trim();
        if !token.is_empty() {
            return Some(token.to_string());
        }
    }

    // 3. Session cookie
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    Cookie::split_parse(cookie_header)
        .flatten()
        .find(|c| c.name() == cookie_name)
        .map(|c| c.value().to_string())
        .filter(|value| !value.is_empty())
}

// Check posted credentials against the configured admin account
pub fn check_admin_credentials(config: &Config, username: &str, password: &str) -> bool {
    match (&config.admin_username, &config.admin_password) {
        (Some(admin_user), Some(admin_pass)) if !admin_user.is_empty() && !admin_pass.is_empty() => {
            username == admin_user && password == admin_pass
        }
        _ => false,
    }
}

// Build the Set-Cookie value carrying a fresh session token
pub fn session_cookie(name: &str, token: &str, max_age_secs: i64) -> String {
    Cookie::build((name.to_string(), token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(max_age_secs))
        .build()
        .to_string()
}

// Build the Set-Cookie value that deletes the session cookie
pub fn removal_cookie(name: &str) -> String {
    let mut cookie = Cookie::build((name.to_string(), String::new())).path("/").build();
    cookie.make_removal();
    cookie.to_string()
}
