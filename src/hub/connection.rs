use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::debug;
use uuid::Uuid;

use crate::auth::Role;
use crate::models::ServerMessage;

pub type ConnId = Uuid;

/// Messages a connection may have queued before further ones are dropped
pub const OUTBOUND_CAPACITY: usize = 100;

/// Handle to one live client, as seen by the hub.
///
/// The hub only ever queues messages here; a per-connection writer task owns
/// the receiving half and pushes them onto the socket.
#[derive(Clone, Debug)]
pub struct Connection {
    pub id: ConnId,
    pub role: Role,
    tx: mpsc::Sender<ServerMessage>,
}

impl Connection {
    pub fn open(role: Role) -> (Self, mpsc::Receiver<ServerMessage>) {
        let (tx, rx) = mpsc::channel(OUTBOUND_CAPACITY);
        (Self { id: Uuid::new_v4(), role, tx }, rx)
    }

    /// Queue a message for this client without waiting.
    /// Returns false when the client is gone or has stopped reading.
    pub fn deliver(&self, msg: ServerMessage) -> bool {
        match self.tx.try_send(msg) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                debug!("Outbound queue full for connection {}, dropping message", self.id);
                false
            }
            Err(TrySendError::Closed(_)) => {
                debug!("Dropping message for closed connection {}", self.id);
                false
            }
        }
    }
}
