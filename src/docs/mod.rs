use utoipa::OpenApi;
use crate::models::*;

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
#[allow(dead_code)]
pub async fn health_check_doc() {}

/// Readiness check endpoint
#[utoipa::path(
    get,
    path = "/api/ready",
    responses(
        (status = 200, description = "Service is ready", body = ReadyResponse)
    )
)]
#[allow(dead_code)]
pub async fn ready_check_doc() {}

/// Log in as the admin
#[utoipa::path(
    post,
    path = "/api/login",
    request_body(content = LoginRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Session issued and set as cookie", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
#[allow(dead_code)]
pub async fn login_doc() {}

/// Drop the session cookie
#[utoipa::path(
    post,
    path = "/api/logout",
    responses(
        (status = 204, description = "Session cookie cleared")
    )
)]
#[allow(dead_code)]
pub async fn logout_doc() {}

/// Current live post and visitor role
#[utoipa::path(
    get,
    path = "/api/session",
    responses(
        (status = 200, description = "Live post as seen by the caller", body = SessionResponse)
    )
)]
#[allow(dead_code)]
pub async fn session_doc() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check_doc,
        ready_check_doc,
        login_doc,
        logout_doc,
        session_doc,
    ),
    components(
        schemas(HealthResponse, ReadyResponse, LoginRequest, LoginResponse, SessionResponse, ErrorResponse)
    ),
    tags(
        (name = "api", description = "API endpoints")
    )
)]
pub struct ApiDoc;
