//! Request-body definitions for the three reconciliation exchanges.

use rumor_core::{CallbackType, Digest, DigestBuffer, Message, Peer};
use serde::{Deserialize, Serialize};

/// Body of a `POST /gossip`: the sender's digest of its message buffer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GossipRequest {
    /// Sender address, for the reply hop.
    pub addr: String,
    /// Sender port, for the reply hop.
    pub port: String,
    /// The sender's round number when it gossiped.
    pub round_number: u64,
    /// Digest of every message the sender holds.
    pub digests: Vec<Digest>,
}

impl GossipRequest {
    /// Builds a gossip body from a digest snapshot.
    #[must_use]
    pub fn new(sender: &Peer, round_number: u64, digests: DigestBuffer) -> Self {
        Self {
            addr: sender.addr.clone(),
            port: sender.port.clone(),
            round_number,
            digests: digests.into_digests(),
        }
    }

    /// The peer to reply to.
    #[must_use]
    pub fn sender(&self) -> Peer {
        Peer::new(self.addr.clone(), self.port.clone())
    }

    /// The carried digests as a set.
    #[must_use]
    pub fn digest_buffer(&self) -> DigestBuffer {
        self.digests.iter().cloned().collect()
    }
}

/// Body of a `POST /solicitation`: the digests the sender is missing and
/// wants transferred.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolicitationRequest {
    /// Sender address, for the reply hop.
    pub addr: String,
    /// Sender port, for the reply hop.
    pub port: String,
    /// Echo of the round number from the gossip that triggered this.
    pub round_number: u64,
    /// Digests of the messages the sender wants.
    pub digests: Vec<Digest>,
}

impl SolicitationRequest {
    /// Builds a solicitation body from the missing-digest set.
    #[must_use]
    pub fn new(sender: &Peer, round_number: u64, missing: DigestBuffer) -> Self {
        Self {
            addr: sender.addr.clone(),
            port: sender.port.clone(),
            round_number,
            digests: missing.into_digests(),
        }
    }

    /// The peer to reply to.
    #[must_use]
    pub fn sender(&self) -> Peer {
        Peer::new(self.addr.clone(), self.port.clone())
    }

    /// The wanted digests as a set.
    #[must_use]
    pub fn digest_buffer(&self) -> DigestBuffer {
        self.digests.iter().cloned().collect()
    }
}

/// Body of a `POST /synchronization`: the solicited message bodies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynchronizationRequest {
    /// Sender address.
    pub addr: String,
    /// Sender port.
    pub port: String,
    /// The transferred messages.
    pub messages: Vec<WireMessage>,
}

impl SynchronizationRequest {
    /// Builds a synchronization body from resolved messages.
    #[must_use]
    pub fn new(sender: &Peer, messages: Vec<Message>) -> Self {
        Self {
            addr: sender.addr.clone(),
            port: sender.port.clone(),
            messages: messages.into_iter().map(WireMessage::from).collect(),
        }
    }
}

/// A message as it travels the wire: id, payload, and callback tag.
///
/// The local gossip count never crosses the wire; a decoded message starts
/// counting rounds from zero on the receiving node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMessage {
    /// Message identifier.
    pub id: String,
    /// Opaque application payload.
    pub msg: String,
    /// Callback tag.
    pub callback_type: CallbackType,
}

impl From<Message> for WireMessage {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            msg: message.payload,
            callback_type: message.callback_type,
        }
    }
}

impl From<WireMessage> for Message {
    fn from(wire: WireMessage) -> Self {
        Message::with_id(wire.id, wire.msg, wire.callback_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rumor_core::MessageBuffer;

    #[test]
    fn gossip_wire_shape() {
        let buffer = MessageBuffer::new();
        buffer.add(Message::with_id("m1", "hello", CallbackType::None));

        let sender = Peer::new("localhost", "4000");
        let body = GossipRequest::new(&sender, 7, buffer.digest());
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "addr": "localhost",
                "port": "4000",
                "roundNumber": 7,
                "digests": [{"id": "m1", "callbackType": "NONE"}],
            })
        );
    }

    #[test]
    fn synchronization_wire_shape() {
        let sender = Peer::new("localhost", "4000");
        let mut message = Message::with_id("m1", "hello", CallbackType::Custom("review".into()));
        message.gossip_count = 9;

        let body = SynchronizationRequest::new(&sender, vec![message]);
        let json = serde_json::to_value(&body).unwrap();

        // gossip_count is local state and must not appear on the wire.
        assert_eq!(
            json,
            serde_json::json!({
                "addr": "localhost",
                "port": "4000",
                "messages": [{"id": "m1", "msg": "hello", "callbackType": "review"}],
            })
        );
    }

    #[test]
    fn decoded_message_restarts_gossip_count() {
        let wire = WireMessage {
            id: "m1".to_owned(),
            msg: "hello".to_owned(),
            callback_type: CallbackType::AddPeer,
        };

        let message = Message::from(wire);
        assert_eq!(message.gossip_count, 0);
        assert_eq!(message.callback_type, CallbackType::AddPeer);
    }

    #[test]
    fn solicitation_echoes_round_number() {
        let sender = Peer::new("localhost", "4000");
        let body = SolicitationRequest::new(&sender, 42, DigestBuffer::default());

        let decoded: SolicitationRequest =
            serde_json::from_value(serde_json::to_value(&body).unwrap()).unwrap();
        assert_eq!(decoded.round_number, 42);
        assert_eq!(decoded.sender(), sender);
    }
}
