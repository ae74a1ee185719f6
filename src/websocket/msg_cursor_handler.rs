use tracing::debug;

use crate::auth::Role;
use crate::hub::{BroadcastHub, Connection};

/// Handle a cursor message: relayed to viewers when it comes from the admin
pub fn handle_cursor_message(position: i64, conn: &Connection, hub: &BroadcastHub) {
    if conn.role != Role::Admin {
        debug!("Ignoring cursor from non-admin connection {}", conn.id);
        return;
    }

    hub.publish_cursor(position);
}
