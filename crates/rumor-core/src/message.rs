//! Gossip messages, their digest projection, and callback tags.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved tag for the membership callback that adds a peer.
pub const ADD_PEER_TAG: &str = "ADDPEER";
/// Reserved tag for the membership callback that removes a peer.
pub const REMOVE_PEER_TAG: &str = "REMOVEPEER";
/// Sentinel tag for messages with no callback.
pub const NO_CALLBACK_TAG: &str = "NONE";

/// The callback a message triggers on delivery.
///
/// The wire representation is the tag string; anything that is not one of
/// the reserved tags decodes as `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CallbackType {
    /// No callback; the message is stored as-is.
    None,
    /// Membership callback: add the peer named by the payload.
    AddPeer,
    /// Membership callback: remove the peer named by the payload.
    RemovePeer,
    /// Application-provided callback, looked up in the custom registry.
    Custom(String),
}

impl CallbackType {
    /// Whether `tag` names one of the reserved callback types.
    #[must_use]
    pub fn is_reserved(tag: &str) -> bool {
        matches!(tag, ADD_PEER_TAG | REMOVE_PEER_TAG | NO_CALLBACK_TAG)
    }

    /// The wire tag for this callback type.
    #[must_use]
    pub fn as_tag(&self) -> &str {
        match self {
            CallbackType::None => NO_CALLBACK_TAG,
            CallbackType::AddPeer => ADD_PEER_TAG,
            CallbackType::RemovePeer => REMOVE_PEER_TAG,
            CallbackType::Custom(tag) => tag,
        }
    }
}

impl From<String> for CallbackType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            NO_CALLBACK_TAG => CallbackType::None,
            ADD_PEER_TAG => CallbackType::AddPeer,
            REMOVE_PEER_TAG => CallbackType::RemovePeer,
            _ => CallbackType::Custom(tag),
        }
    }
}

impl From<CallbackType> for String {
    fn from(value: CallbackType) -> Self {
        value.as_tag().to_owned()
    }
}

impl fmt::Display for CallbackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// A message held in the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Unique identifier; the buffer's primary key.
    pub id: String,
    /// Opaque application payload.
    pub payload: String,
    /// Callback triggered when the message is delivered.
    pub callback_type: CallbackType,
    /// Rounds this node has gossiped the message for. Strictly local,
    /// never authoritative on the wire.
    pub gossip_count: u64,
}

impl Message {
    /// Creates a message with a fresh random identifier.
    #[must_use]
    pub fn new(payload: impl Into<String>, callback_type: CallbackType) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), payload, callback_type)
    }

    /// Creates a message with a known identifier, as decoded from a
    /// synchronization. The gossip count starts at zero on this node.
    #[must_use]
    pub fn with_id(
        id: impl Into<String>,
        payload: impl Into<String>,
        callback_type: CallbackType,
    ) -> Self {
        Self {
            id: id.into(),
            payload: payload.into(),
            callback_type,
            gossip_count: 0,
        }
    }

    /// The digest projection of this message.
    #[must_use]
    pub fn digest(&self) -> Digest {
        Digest {
            id: self.id.clone(),
            callback_type: self.callback_type.clone(),
        }
    }
}

/// Minimal fingerprint of a message: enough for a remote node to decide
/// whether it already holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Digest {
    /// Identifier of the fingerprinted message.
    pub id: String,
    /// Its callback tag.
    pub callback_type: CallbackType,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fresh_messages_get_unique_ids() {
        let a = Message::new("hello", CallbackType::None);
        let b = Message::new("hello", CallbackType::None);
        assert_ne!(a.id, b.id);
        assert_eq!(a.gossip_count, 0);
    }

    #[test]
    fn callback_type_tag_roundtrip() {
        for tag in ["NONE", "ADDPEER", "REMOVEPEER", "review"] {
            let parsed = CallbackType::from(tag.to_owned());
            assert_eq!(parsed.as_tag(), tag);
        }
        assert_eq!(CallbackType::from("NONE".to_owned()), CallbackType::None);
        assert_eq!(
            CallbackType::from("review".to_owned()),
            CallbackType::Custom("review".to_owned())
        );
    }

    #[test]
    fn reserved_tags() {
        assert!(CallbackType::is_reserved("ADDPEER"));
        assert!(CallbackType::is_reserved("REMOVEPEER"));
        assert!(CallbackType::is_reserved("NONE"));
        assert!(!CallbackType::is_reserved("review"));
    }

    #[test]
    fn digest_matches_message() {
        let msg = Message::with_id("m1", "hello", CallbackType::Custom("review".into()));
        let digest = msg.digest();
        assert_eq!(digest.id, "m1");
        assert_eq!(digest.callback_type, msg.callback_type);
    }

    #[test]
    fn digest_wire_shape() {
        let digest = Digest {
            id: "m1".to_owned(),
            callback_type: CallbackType::AddPeer,
        };
        let json = serde_json::to_value(&digest).unwrap();
        assert_eq!(json, serde_json::json!({"id": "m1", "callbackType": "ADDPEER"}));
    }
}
