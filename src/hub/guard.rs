use std::sync::Arc;
use tracing::info;

use super::broadcast::BroadcastHub;
use super::connection::ConnId;
use crate::auth::Role;

/// Deregisters a connection and republishes the viewer count when dropped.
///
/// Held for the whole life of a connection handler so cleanup runs on every
/// exit path: normal close, transport error, task abort or panic.
pub struct ConnectionGuard {
    hub: Arc<BroadcastHub>,
    id: ConnId,
    role: Role,
}

impl ConnectionGuard {
    pub fn new(hub: Arc<BroadcastHub>, id: ConnId, role: Role) -> Self {
        Self { hub, id, role }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        match self.role {
            Role::Admin => self.hub.disconnect_admin(self.id),
            Role::Viewer => self.hub.disconnect_viewer(self.id),
        };
        self.hub.publish_viewer_count();
        info!("Connection {} ({:?}) closed, {} viewers left", self.id, self.role, self.hub.viewer_count());
    }
}
