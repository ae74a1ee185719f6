use serde::{Deserialize, Serialize};

/// Messages pushed from the server to connected clients
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Snapshot of the live post, sent once right after connecting
    Content { content: String },
    /// The admin replaced the live post
    Update { content: String },
    /// The admin moved the cursor
    Cursor { position: i64 },
    /// Number of viewers currently watching
    ViewerCount { count: usize },
}

/// Messages received from clients. Only the admin's are acted upon.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Update {
        #[serde(default)]
        content: String,
    },
    Cursor {
        #[serde(default)]
        position: i64,
    },
    #[serde(other)]
    Unknown,
}
