use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// What a page needs to render the live post for the current visitor
#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct SessionResponse {
    pub is_admin: bool,
    /// Token to pass as `?token=` when opening `/ws`. Only handed to the admin.
    pub ws_token: Option<String>,
    pub content: String,
    pub viewer_count: usize,
    /// Today's date, e.g. "October 14, 2026"
    pub date: String,
}
