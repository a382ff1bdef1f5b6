use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, Mutex};
use uuid::Uuid;

/// Messages buffered per member before further fan-out to it is dropped.
pub const OUTBOUND_QUEUE: usize = 64;

/// The kind of event carried by a [`ChatResponse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    #[serde(rename = "New User")]
    NewUser,
    Chat,
    Leave,
}

/// Inbound frame: `{"Message": "..."}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ChatPayload {
    pub message: String,
}

/// Outbound frame: `{"From": "...", "Type": "...", "Message": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChatResponse {
    pub from: String,
    #[serde(rename = "Type")]
    pub kind: MessageKind,
    pub message: String,
}

struct Member {
    id: Uuid,
    username: String,
    outbound: mpsc::Sender<ChatResponse>,
}

/// Registry of live chat connections.
///
/// Every membership change and fan-out happens under one lock, so a member
/// never sees a message for a connection it has not been told about.
#[derive(Clone, Default)]
pub struct ChatHub {
    members: Arc<Mutex<Vec<Member>>>,
}

impl ChatHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection and announces it to everyone else.
    ///
    /// # Returns
    ///
    /// The connection id and the receiver its writer task drains.
    pub async fn join(&self, username: &str) -> (Uuid, mpsc::Receiver<ChatResponse>) {
        let (outbound, receiver) = mpsc::channel(OUTBOUND_QUEUE);
        let id = Uuid::new_v4();

        let mut members = self.members.lock().await;
        members.push(Member {
            id,
            username: username.to_string(),
            outbound,
        });
        let announcement = ChatResponse {
            from: username.to_string(),
            kind: MessageKind::NewUser,
            message: String::new(),
        };
        fan_out(&members, id, &announcement);
        tracing::info!("💬 {} joined chat ({} connected)", username, members.len());

        (id, receiver)
    }

    /// Sends `message` to every member except the sender.
    ///
    /// Returns how many members had room for it. Unknown senders reach nobody.
    pub async fn broadcast(&self, from: Uuid, kind: MessageKind, message: &str) -> usize {
        let members = self.members.lock().await;
        let Some(sender) = members.iter().find(|m| m.id == from) else {
            return 0;
        };
        let response = ChatResponse {
            from: sender.username.clone(),
            kind,
            message: message.to_string(),
        };
        fan_out(&members, from, &response)
    }

    /// Announces the departure, then forgets the connection.
    pub async fn leave(&self, id: Uuid) {
        let mut members = self.members.lock().await;
        let Some(index) = members.iter().position(|m| m.id == id) else {
            return;
        };
        let response = ChatResponse {
            from: members[index].username.clone(),
            kind: MessageKind::Leave,
            message: String::new(),
        };
        fan_out(&members, id, &response);
        let member = members.remove(index);
        tracing::info!("💬 {} left chat ({} connected)", member.username, members.len());
    }

    pub async fn len(&self) -> usize {
        self.members.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.members.lock().await.is_empty()
    }
}

fn fan_out(members: &[Member], from: Uuid, response: &ChatResponse) -> usize {
    let mut delivered = 0;
    for member in members.iter().filter(|m| m.id != from) {
        match member.outbound.try_send(response.clone()) {
            Ok(()) => delivered += 1,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!("⚠️ Chat queue full for {}, message dropped", member.id);
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::debug!("Chat writer for {} already gone", member.id);
            }
        }
    }
    delivered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(rx: &mut mpsc::Receiver<ChatResponse>) -> Vec<ChatResponse> {
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            out.push(msg);
        }
        out
    }

    fn event(from: &str, kind: MessageKind, message: &str) -> ChatResponse {
        ChatResponse {
            from: from.into(),
            kind,
            message: message.into(),
        }
    }

    #[tokio::test]
    async fn join_chat_and_leave_reach_everyone_but_the_sender() {
        let hub = ChatHub::new();
        let (a, mut rx_a) = hub.join("A").await;
        let (_b, mut rx_b) = hub.join("B").await;
        let (_c, mut rx_c) = hub.join("C").await;

        assert_eq!(
            drain(&mut rx_a),
            vec![
                event("B", MessageKind::NewUser, ""),
                event("C", MessageKind::NewUser, ""),
            ]
        );
        assert_eq!(drain(&mut rx_b), vec![event("C", MessageKind::NewUser, "")]);
        assert!(drain(&mut rx_c).is_empty());

        assert_eq!(hub.broadcast(a, MessageKind::Chat, "hi").await, 2);
        assert_eq!(drain(&mut rx_b), vec![event("A", MessageKind::Chat, "hi")]);
        assert_eq!(drain(&mut rx_c), vec![event("A", MessageKind::Chat, "hi")]);
        assert!(drain(&mut rx_a).is_empty());

        hub.leave(a).await;
        assert_eq!(drain(&mut rx_b), vec![event("A", MessageKind::Leave, "")]);
        assert_eq!(drain(&mut rx_c), vec![event("A", MessageKind::Leave, "")]);
        assert_eq!(hub.len().await, 2);
        assert_eq!(rx_a.recv().await, None);
    }

    #[tokio::test]
    async fn full_queues_drop_instead_of_blocking() {
        let hub = ChatHub::new();
        let (a, _rx_a) = hub.join("A").await;
        let (_slow, mut rx_slow) = hub.join("slow").await;

        for _ in 0..OUTBOUND_QUEUE + 5 {
            hub.broadcast(a, MessageKind::Chat, "spam").await;
        }
        assert_eq!(drain(&mut rx_slow).len(), OUTBOUND_QUEUE);
    }

    #[tokio::test]
    async fn departed_members_cannot_broadcast() {
        let hub = ChatHub::new();
        let (a, _rx_a) = hub.join("A").await;
        let (_b, mut rx_b) = hub.join("B").await;
        hub.leave(a).await;
        drain(&mut rx_b);

        assert_eq!(hub.broadcast(a, MessageKind::Chat, "ghost").await, 0);
        assert!(drain(&mut rx_b).is_empty());
        hub.leave(a).await;
    }

    #[test]
    fn wire_format_uses_pascal_case_and_spaced_kind() {
        let json = sonic_rs::to_string(&event("A", MessageKind::NewUser, "")).unwrap();
        assert_eq!(json, r#"{"From":"A","Type":"New User","Message":""}"#);

        let payload: ChatPayload = sonic_rs::from_str(r#"{"Message":"hello"}"#).unwrap();
        assert_eq!(payload.message, "hello");
    }
}
