use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Credentials posted by the login form
#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Issued session
#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct LoginResponse {
    pub username: String,
    pub token: String,
}
