use tracing::debug;

use crate::auth::Role;
use crate::hub::{BroadcastHub, Connection};

/// Handle an update message: only the admin may replace the live content
pub fn handle_update_message(content: String, conn: &Connection, hub: &BroadcastHub) {
    if conn.role != Role::Admin {
        debug!("Ignoring update from non-admin connection {}", conn.id);
        return;
    }

    debug!("Update from admin {} ({} bytes)", conn.id, content.len());
    hub.publish_content(content);
}
