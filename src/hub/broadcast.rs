//! Process-wide live state: the post content, the admin slot and the viewers.
//!
//! Every membership change and every fan-out runs under one mutex, so a
//! broadcast never iterates the viewer set while it is being mutated and
//! content updates go out in the order the admin sent them. Delivery is
//! queue-only (bounded channel per connection, full queues drop), which keeps
//! the critical section short and free of I/O.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

use super::connection::{Connection, ConnId};
use crate::models::ServerMessage;

#[derive(Default)]
struct HubState {
    content: String,
    admin: Option<Connection>,
    viewers: HashMap<ConnId, Connection>,
}

impl HubState {
    /// Unicast the current content to one connection
    fn send_snapshot(&self, conn: &Connection) -> bool {
        conn.deliver(ServerMessage::Content { content: self.content.clone() })
    }

    /// Fan out to every viewer, skipping the ones that are gone
    fn to_viewers(&self, msg: &ServerMessage) -> usize {
        self.viewers
            .values()
            .filter(|viewer| viewer.deliver(msg.clone()))
            .count()
    }

    fn viewer_count_message(&self) -> ServerMessage {
        ServerMessage::ViewerCount { count: self.viewers.len() }
    }

    fn publish_viewer_count(&self) -> usize {
        let msg = self.viewer_count_message();
        let to_admin = self
            .admin
            .as_ref()
            .map(|admin| admin.deliver(msg.clone()))
            .unwrap_or(false);
        self.to_viewers(&msg) + usize::from(to_admin)
    }
}

/// The single broadcast hub shared by all connection handlers
#[derive(Default)]
pub struct BroadcastHub {
    state: Mutex<HubState>,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, HubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take the admin slot, replacing any previous holder without closing it.
    /// The new admin gets its snapshot, then everyone gets the viewer count.
    pub fn connect_admin(&self, conn: Connection) {
        let mut state = self.state();
        state.send_snapshot(&conn);
        if let Some(previous) = state.admin.replace(conn) {
            info!("Admin connection {} superseded", previous.id);
        }
        state.publish_viewer_count();
    }

    /// Register a viewer, send it the snapshot, then publish the viewer count
    pub fn connect_viewer(&self, conn: Connection) {
        let mut state = self.state();
        state.send_snapshot(&conn);
        state.viewers.insert(conn.id, conn);
        state.publish_viewer_count();
    }

    /// Remove a viewer. Returns false if it was not registered.
    pub fn disconnect_viewer(&self, id: ConnId) -> bool {
        self.state().viewers.remove(&id).is_some()
    }

    /// Clear the admin slot if `id` still holds it.
    ///
    /// A superseded admin closing later must not evict its replacement
    /// (the slot is replaced on connect without closing the old holder).
    pub fn disconnect_admin(&self, id: ConnId) -> bool {
        let mut state = self.state();
        if state.admin.as_ref().is_some_and(|admin| admin.id == id) {
            state.admin = None;
            true
        } else {
            false
        }
    }

    /// Replace the live content and push it to every viewer.
    /// Returns how many viewers it was delivered to.
    pub fn publish_content(&self, content: String) -> usize {
        let mut state = self.state();
        state.content = content;
        let msg = ServerMessage::Update { content: state.content.clone() };
        let delivered = state.to_viewers(&msg);
        debug!("Content update delivered to {}/{} viewers", delivered, state.viewers.len());
        delivered
    }

    /// Push a cursor hint to every viewer, best effort
    pub fn publish_cursor(&self, position: i64) -> usize {
        self.state().to_viewers(&ServerMessage::Cursor { position })
    }

    /// Send the viewer count to the admin (if any) and to every viewer.
    /// Returns how many connections it was delivered to.
    pub fn publish_viewer_count(&self) -> usize {
        self.state().publish_viewer_count()
    }

    pub fn viewer_count(&self) -> usize {
        self.state().viewers.len()
    }

    pub fn current_content(&self) -> String {
        self.state().content.clone()
    }

    pub fn has_admin(&self) -> bool {
        self.state().admin.is_some()
    }

    #[cfg(test)]
    pub fn admin_id(&self) -> Option<ConnId> {
        self.state().admin.as_ref().map(|admin| admin.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::hub::OUTBOUND_CAPACITY;
    use crate::websocket::handler::dispatch_message;
    use std::sync::Arc;
    use tokio::sync::mpsc::Receiver;

    fn drain(rx: &mut Receiver<ServerMessage>) -> Vec<ServerMessage> {
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            out.push(msg);
        }
        out
    }

    fn count(n: usize) -> ServerMessage {
        ServerMessage::ViewerCount { count: n }
    }

    fn content(s: &str) -> ServerMessage {
        ServerMessage::Content { content: s.to_string() }
    }

    fn update(s: &str) -> ServerMessage {
        ServerMessage::Update { content: s.to_string() }
    }

    #[test]
    fn viewer_gets_snapshot_then_count() {
        let hub = BroadcastHub::new();
        hub.publish_content("draft".to_string());

        let (viewer, mut rx) = Connection::open(Role::Viewer);
        hub.connect_viewer(viewer);

        assert_eq!(drain(&mut rx), vec![content("draft"), count(1)]);
        assert_eq!(hub.viewer_count(), 1);
    }

    #[test]
    fn admin_is_not_counted_as_viewer() {
        let hub = BroadcastHub::new();
        let (admin, mut admin_rx) = Connection::open(Role::Admin);
        hub.connect_admin(admin);
        assert_eq!(drain(&mut admin_rx), vec![content(""), count(0)]);

        let (viewer, mut viewer_rx) = Connection::open(Role::Viewer);
        hub.connect_viewer(viewer);
        assert_eq!(drain(&mut admin_rx), vec![count(1)]);
        assert_eq!(drain(&mut viewer_rx), vec![content(""), count(1)]);
        assert_eq!(hub.viewer_count(), 1);
    }

    #[test]
    fn scenario_two_viewers_admin_update_and_leave() {
        let hub = BroadcastHub::new();

        let (a, mut a_rx) = Connection::open(Role::Viewer);
        let a_id = a.id;
        hub.connect_viewer(a);
        assert_eq!(drain(&mut a_rx), vec![content(""), count(1)]);

        let (b, mut b_rx) = Connection::open(Role::Viewer);
        hub.connect_viewer(b);
        assert_eq!(drain(&mut a_rx), vec![count(2)]);
        assert_eq!(drain(&mut b_rx), vec![content(""), count(2)]);

        let (admin, mut admin_rx) = Connection::open(Role::Admin);
        hub.connect_admin(admin);
        assert_eq!(drain(&mut admin_rx), vec![content(""), count(2)]);
        drain(&mut a_rx);
        drain(&mut b_rx);

        assert_eq!(hub.publish_content("hello".to_string()), 2);
        assert_eq!(drain(&mut a_rx), vec![update("hello")]);
        assert_eq!(drain(&mut b_rx), vec![update("hello")]);
        assert!(drain(&mut admin_rx).is_empty());
        assert_eq!(hub.current_content(), "hello");

        assert!(hub.disconnect_viewer(a_id));
        hub.publish_viewer_count();
        assert_eq!(drain(&mut b_rx), vec![count(1)]);
        assert_eq!(drain(&mut admin_rx), vec![count(1)]);
    }

    #[test]
    fn new_admin_replaces_slot_and_keeps_viewers() {
        let hub = BroadcastHub::new();
        let (viewer, _viewer_rx) = Connection::open(Role::Viewer);
        hub.connect_viewer(viewer);

        let (first, mut first_rx) = Connection::open(Role::Admin);
        let first_id = first.id;
        hub.connect_admin(first);
        let (second, _second_rx) = Connection::open(Role::Admin);
        let second_id = second.id;
        hub.connect_admin(second);

        assert_eq!(hub.admin_id(), Some(second_id));
        assert_eq!(hub.viewer_count(), 1);

        // The superseded admin is not notified any more, but is not closed either
        drain(&mut first_rx);
        hub.publish_viewer_count();
        assert!(drain(&mut first_rx).is_empty());

        // Its late disconnect leaves the replacement in place
        assert!(!hub.disconnect_admin(first_id));
        assert_eq!(hub.admin_id(), Some(second_id));
        assert!(hub.disconnect_admin(second_id));
        assert!(!hub.has_admin());
    }

    #[test]
    fn late_joiner_snapshot_matches_current_content() {
        let hub = BroadcastHub::new();
        hub.publish_content("C1".to_string());
        hub.publish_content("C2".to_string());

        let (viewer, mut rx) = Connection::open(Role::Viewer);
        hub.connect_viewer(viewer);
        assert_eq!(drain(&mut rx).first(), Some(&content("C2")));
    }

    #[test]
    fn cursor_goes_to_viewers_only() {
        let hub = BroadcastHub::new();
        let (admin, mut admin_rx) = Connection::open(Role::Admin);
        hub.connect_admin(admin);
        let (viewer, mut viewer_rx) = Connection::open(Role::Viewer);
        hub.connect_viewer(viewer);
        drain(&mut admin_rx);
        drain(&mut viewer_rx);

        assert_eq!(hub.publish_cursor(42), 1);
        assert_eq!(drain(&mut viewer_rx), vec![ServerMessage::Cursor { position: 42 }]);
        assert!(drain(&mut admin_rx).is_empty());
    }

    #[test]
    fn dead_viewer_does_not_block_others() {
        let hub = BroadcastHub::new();
        let (dead, dead_rx) = Connection::open(Role::Viewer);
        hub.connect_viewer(dead);
        drop(dead_rx);
        let (alive, mut alive_rx) = Connection::open(Role::Viewer);
        hub.connect_viewer(alive);
        drain(&mut alive_rx);

        assert_eq!(hub.publish_content("still here".to_string()), 1);
        assert_eq!(drain(&mut alive_rx), vec![update("still here")]);
        // Undeliverable viewers stay registered until their own disconnect
        assert_eq!(hub.viewer_count(), 2);
    }

    #[test]
    fn disconnect_is_idempotent() {
        let hub = BroadcastHub::new();
        let (viewer, _rx) = Connection::open(Role::Viewer);
        let id = viewer.id;
        let (stranger, _stranger_rx) = Connection::open(Role::Viewer);

        assert!(!hub.disconnect_viewer(stranger.id));
        hub.connect_viewer(viewer);
        assert!(hub.disconnect_viewer(id));
        assert!(!hub.disconnect_viewer(id));
        assert!(!hub.disconnect_admin(id));
        assert_eq!(hub.viewer_count(), 0);
    }

    #[test]
    fn count_tracks_viewer_set_through_churn() {
        let hub = BroadcastHub::new();
        let (observer, mut observer_rx) = Connection::open(Role::Admin);
        hub.connect_admin(observer);

        let mut ids = Vec::new();
        for _ in 0..5 {
            let (viewer, _rx) = Connection::open(Role::Viewer);
            ids.push(viewer.id);
            hub.connect_viewer(viewer);
        }
        for id in ids.iter().take(3) {
            hub.disconnect_viewer(*id);
            hub.publish_viewer_count();
        }

        let counts: Vec<_> = drain(&mut observer_rx)
            .into_iter()
            .filter_map(|msg| match msg {
                ServerMessage::ViewerCount { count } => Some(count),
                _ => None,
            })
            .collect();
        assert_eq!(counts, vec![0, 1, 2, 3, 4, 5, 4, 3, 2]);
        assert_eq!(hub.viewer_count(), 2);
    }

    #[test]
    fn send_snapshot_unicasts_current_content() {
        let hub = BroadcastHub::new();
        hub.publish_content("now".to_string());
        let (viewer, mut rx) = Connection::open(Role::Viewer);
        assert!(hub.state().send_snapshot(&viewer));
        assert_eq!(drain(&mut rx), vec![content("now")]);
        assert_eq!(hub.viewer_count(), 0);
    }

    #[test]
    fn stalled_viewer_queue_stays_bounded() {
        let hub = BroadcastHub::new();
        let (stalled, mut stalled_rx) = Connection::open(Role::Viewer);
        hub.connect_viewer(stalled);
        let (reader, mut reader_rx) = Connection::open(Role::Viewer);
        hub.connect_viewer(reader);
        drain(&mut reader_rx);

        let body = "x".repeat(1024);
        for i in 0..1_000 {
            hub.publish_content(format!("{}{}", body, i));
            // The reading viewer keeps up and sees every update
            assert_eq!(drain(&mut reader_rx).len(), 1);
        }

        assert!(drain(&mut stalled_rx).len() <= OUTBOUND_CAPACITY);
        assert_eq!(hub.viewer_count(), 2);
        assert!(hub.current_content().ends_with("999"));
    }

    #[test]
    fn superseded_admin_can_still_push_updates() {
        let hub = BroadcastHub::new();
        let (first, _first_rx) = Connection::open(Role::Admin);
        hub.connect_admin(first.clone());
        let (second, _second_rx) = Connection::open(Role::Admin);
        hub.connect_admin(second);
        let (viewer, mut viewer_rx) = Connection::open(Role::Viewer);
        hub.connect_viewer(viewer);
        drain(&mut viewer_rx);

        dispatch_message(r#"{"type":"update","content":"from the old tab"}"#, &first, &hub);

        assert_eq!(hub.current_content(), "from the old tab");
        assert_eq!(drain(&mut viewer_rx), vec![update("from the old tab")]);
    }

    #[test]
    fn concurrent_churn_keeps_count_consistent() {
        let hub = Arc::new(BroadcastHub::new());
        let (admin, mut admin_rx) = Connection::open(Role::Admin);
        hub.connect_admin(admin);

        let workers: Vec<_> = (0..8)
            .map(|_| {
                let hub = hub.clone();
                std::thread::spawn(move || {
                    let mut kept = Vec::new();
                    for i in 0..50 {
                        let (viewer, rx) = Connection::open(Role::Viewer);
                        let id = viewer.id;
                        hub.connect_viewer(viewer);
                        if i % 2 == 0 {
                            assert!(hub.disconnect_viewer(id));
                            hub.publish_viewer_count();
                        } else {
                            kept.push(rx);
                        }
                    }
                    kept
                })
            })
            .collect();

        let publisher = {
            let hub = hub.clone();
            std::thread::spawn(move || {
                for i in 0..200 {
                    hub.publish_content(format!("rev {}", i));
                    hub.publish_cursor(i);
                }
            })
        };

        let mut receivers = Vec::new();
        for worker in workers {
            receivers.extend(worker.join().unwrap());
        }
        publisher.join().unwrap();

        assert_eq!(hub.viewer_count(), 8 * 25);
        assert_eq!(hub.current_content(), "rev 199");

        // Once their queues are drained, every registered connection gets the final count
        drain(&mut admin_rx);
        for rx in receivers.iter_mut() {
            drain(rx);
        }
        assert_eq!(hub.publish_viewer_count(), 8 * 25 + 1);
        assert_eq!(drain(&mut admin_rx), vec![count(8 * 25)]);
        for rx in receivers.iter_mut() {
            assert_eq!(drain(rx), vec![count(8 * 25)]);
        }
    }
}
