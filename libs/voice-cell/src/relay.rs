use std::collections::HashMap;

use tokio::sync::{broadcast, broadcast::error::RecvError, RwLock};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::RelayEvent;

const ROOM_CAPACITY: usize = 64;

/// One message published into a room, tagged with the connection that sent it.
#[derive(Debug, Clone)]
pub struct RelayFrame {
    pub from: Uuid,
    pub payload: String,
}

/// A connection's membership in a room.
pub struct Subscription {
    pub connection_id: Uuid,
    receiver: broadcast::Receiver<RelayFrame>,
}

impl Subscription {
    /// Next payload published by another connection in the room. The
    /// connection's own frames are never returned. `None` once the room closes.
    pub async fn next_from_peers(&mut self) -> Option<String> {
        loop {
            match self.receiver.recv().await {
                Ok(frame) if frame.from == self.connection_id => continue,
                Ok(frame) => return Some(frame.payload),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(
                        "Relay connection {} lagged, {} frames dropped",
                        self.connection_id, skipped
                    );
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

/// Room registry for the voice relay. Each room is a bounded broadcast
/// channel; slow sockets lag and lose frames instead of stalling senders.
#[derive(Default)]
pub struct RelayHub {
    rooms: RwLock<HashMap<String, broadcast::Sender<RelayFrame>>>,
}

impl RelayHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a new connection to `room`, creating it on first join.
    pub async fn join(&self, room: &str) -> Subscription {
        let connection_id = Uuid::new_v4();
        let mut rooms = self.rooms.write().await;
        let receiver = match rooms.get(room) {
            Some(sender) => sender.subscribe(),
            None => {
                let (sender, receiver) = broadcast::channel(ROOM_CAPACITY);
                rooms.insert(room.to_string(), sender);
                debug!("Opened relay room {}", room);
                receiver
            }
        };

        debug!("Connection {} joined {}", connection_id, room);
        Subscription { connection_id, receiver }
    }

    /// Publish to every subscriber of `room`. Returns how many receivers were
    /// reached, the sender's own included.
    pub async fn publish(&self, room: &str, from: Uuid, payload: String) -> usize {
        let rooms = self.rooms.read().await;
        match rooms.get(room) {
            Some(sender) => sender.send(RelayFrame { from, payload }).unwrap_or(0),
            None => 0,
        }
    }

    /// Relay a raw socket message. Only `voice_control` and
    /// `initialize_voice_session` events travel; anything else, malformed
    /// JSON included, is dropped and reaches nobody.
    pub async fn relay_event(&self, room: &str, from: Uuid, text: &str) -> usize {
        let event: RelayEvent = match serde_json::from_str(text) {
            Ok(event) => event,
            Err(e) => {
                debug!("Ignoring malformed relay message from {}: {}", from, e);
                return 0;
            }
        };

        if !event.is_relayed() {
            debug!("Ignoring relay event {} from {}", event.event, from);
            return 0;
        }

        match serde_json::to_string(&event) {
            Ok(payload) => self.publish(room, from, payload).await,
            Err(e) => {
                warn!("Could not re-encode relay event {}: {}", event.event, e);
                0
            }
        }
    }

    /// Drop the room once its last subscription is gone. Call after the
    /// leaving connection's [`Subscription`] has been dropped.
    pub async fn leave(&self, room: &str) {
        let mut rooms = self.rooms.write().await;
        if rooms.get(room).is_some_and(|sender| sender.receiver_count() == 0) {
            rooms.remove(room);
            debug!("Closed empty relay room {}", room);
        }
    }

    pub async fn active_rooms(&self) -> Vec<String> {
        self.rooms.read().await.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::{json, Value};
    use tokio::time::timeout;

    use super::*;

    const QUIET: Duration = Duration::from_millis(50);

    async fn nothing_arrives(subscription: &mut Subscription) -> bool {
        timeout(QUIET, subscription.next_from_peers()).await.is_err()
    }

    #[tokio::test]
    async fn voice_events_reach_peers_but_not_the_sender() {
        let hub = RelayHub::new();
        let mut alice = hub.join("patient-1").await;
        let mut bob = hub.join("patient-1").await;
        let mut other = hub.join("patient-2").await;

        let text = json!({ "event": "voice_control", "data": { "action": "mute" } }).to_string();
        assert_eq!(hub.relay_event("patient-1", alice.connection_id, &text).await, 2);

        let received: Value = serde_json::from_str(&bob.next_from_peers().await.unwrap()).unwrap();
        assert_eq!(received["event"], "voice_control");
        assert_eq!(received["data"]["action"], "mute");

        assert!(nothing_arrives(&mut alice).await);
        assert!(nothing_arrives(&mut other).await);
    }

    #[tokio::test]
    async fn sender_still_sees_peer_frames_after_its_own() {
        let hub = RelayHub::new();
        let mut alice = hub.join("patient-3").await;
        let bob = hub.join("patient-3").await;

        let init = json!({ "event": "initialize_voice_session", "data": {} }).to_string();
        hub.relay_event("patient-3", alice.connection_id, &init).await;
        hub.relay_event("patient-3", bob.connection_id, &init).await;

        // Alice's own frame is skipped; Bob's comes through.
        let received: Value = serde_json::from_str(&alice.next_from_peers().await.unwrap()).unwrap();
        assert_eq!(received["event"], "initialize_voice_session");
        assert!(nothing_arrives(&mut alice).await);
    }

    #[tokio::test]
    async fn non_voice_events_are_dropped() {
        let hub = RelayHub::new();
        let alice = hub.join("patient-4").await;
        let mut bob = hub.join("patient-4").await;

        let chat = json!({ "event": "chat", "data": { "text": "hi" } }).to_string();
        assert_eq!(hub.relay_event("patient-4", alice.connection_id, &chat).await, 0);
        assert_eq!(hub.relay_event("patient-4", alice.connection_id, "not json").await, 0);
        assert_eq!(hub.relay_event("patient-4", alice.connection_id, r#"{"data":1}"#).await, 0);

        assert!(nothing_arrives(&mut bob).await);
    }

    #[tokio::test]
    async fn empty_rooms_are_dropped() {
        let hub = RelayHub::new();
        let a = hub.join("patient-9").await;
        let b = hub.join("patient-9").await;

        drop(a);
        hub.leave("patient-9").await;
        assert_eq!(hub.active_rooms().await, vec!["patient-9".to_string()]);

        drop(b);
        hub.leave("patient-9").await;
        assert!(hub.active_rooms().await.is_empty());
    }

    #[tokio::test]
    async fn publishing_to_missing_room_is_a_no_op() {
        let hub = RelayHub::new();
        assert_eq!(hub.publish("nobody", Uuid::new_v4(), "x".to_string()).await, 0);
    }
}
