//! The shared message buffer and digest-buffer set operations.

use crate::message::{Digest, Message};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};

/// The shared buffer of messages this node holds, keyed by id.
///
/// The scheduler and the inbound request handlers both hold references to
/// one buffer; every public operation is atomic under the internal lock.
/// Snapshots handed out (`digest`, `messages`, `matching`) are owned values
/// so callers can encode them without holding the lock.
#[derive(Debug, Default)]
pub struct MessageBuffer {
    messages: RwLock<HashMap<String, Message>>,
}

impl MessageBuffer {
    /// Creates an empty message buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a message unless one with the same id exists. Returns
    /// whether the buffer changed.
    pub fn add(&self, message: Message) -> bool {
        let mut messages = self.messages.write();
        if messages.contains_key(&message.id) {
            return false;
        }
        messages.insert(message.id.clone(), message);
        true
    }

    /// Digest snapshot of every buffered message.
    pub fn digest(&self) -> DigestBuffer {
        let messages = self.messages.read();
        DigestBuffer::from_digests(messages.values().map(Message::digest).collect())
    }

    /// Bumps the gossip count of every buffered message. Called once per
    /// round before peers are sampled.
    pub fn increment_gossip_counts(&self) {
        let mut messages = self.messages.write();
        for message in messages.values_mut() {
            message.gossip_count += 1;
        }
    }

    /// The buffered messages whose ids appear in `wanted`.
    pub fn matching(&self, wanted: &DigestBuffer) -> Vec<Message> {
        let messages = self.messages.read();
        wanted
            .iter()
            .filter_map(|digest| messages.get(&digest.id).cloned())
            .collect()
    }

    /// Set equality on message identifiers.
    pub fn same_messages(&self, other: &MessageBuffer) -> bool {
        let ours = self.messages.read();
        let theirs = other.messages.read();
        ours.len() == theirs.len() && ours.keys().all(|id| theirs.contains_key(id))
    }

    /// Number of buffered messages.
    pub fn len(&self) -> usize {
        self.messages.read().len()
    }

    /// Whether the buffer holds no messages.
    pub fn is_empty(&self) -> bool {
        self.messages.read().is_empty()
    }

    /// Snapshot of every buffered message.
    pub fn messages(&self) -> Vec<Message> {
        self.messages.read().values().cloned().collect()
    }
}

/// An owned set of digests, the projection a node sends on the wire to
/// describe what it holds. Membership is by message id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigestBuffer {
    digests: Vec<Digest>,
}

impl DigestBuffer {
    /// Creates a digest buffer from a list of digests.
    #[must_use]
    pub fn from_digests(digests: Vec<Digest>) -> Self {
        Self { digests }
    }

    /// The digests present in `self` but absent from `local`.
    ///
    /// This is what the receiver of a gossip computes to decide which
    /// messages to solicit.
    #[must_use]
    pub fn missing_from(&self, local: &DigestBuffer) -> DigestBuffer {
        let held: HashSet<&str> = local.digests.iter().map(|d| d.id.as_str()).collect();
        DigestBuffer::from_digests(
            self.digests
                .iter()
                .filter(|d| !held.contains(d.id.as_str()))
                .cloned()
                .collect(),
        )
    }

    /// Number of digests in the buffer.
    pub fn len(&self) -> usize {
        self.digests.len()
    }

    /// Whether the buffer holds no digests.
    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }

    /// Iterates over the digests.
    pub fn iter(&self) -> impl Iterator<Item = &Digest> {
        self.digests.iter()
    }

    /// Consumes the buffer, yielding its digests.
    #[must_use]
    pub fn into_digests(self) -> Vec<Digest> {
        self.digests
    }
}

impl FromIterator<Digest> for DigestBuffer {
    fn from_iter<I: IntoIterator<Item = Digest>>(iter: I) -> Self {
        Self::from_digests(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::CallbackType;
    use pretty_assertions::assert_eq;

    fn msg(id: &str) -> Message {
        Message::with_id(id, format!("payload-{id}"), CallbackType::None)
    }

    #[test]
    fn add_is_idempotent_on_id() {
        let buffer = MessageBuffer::new();
        assert!(buffer.add(msg("m1")));
        assert!(!buffer.add(msg("m1")));
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn digest_covers_every_message() {
        let buffer = MessageBuffer::new();
        buffer.add(msg("m1"));
        buffer.add(Message::with_id(
            "m2",
            "payload",
            CallbackType::Custom("review".into()),
        ));

        let digest = buffer.digest();
        assert_eq!(digest.len(), 2);

        let by_id: HashMap<&str, &Digest> =
            digest.iter().map(|d| (d.id.as_str(), d)).collect();
        assert_eq!(by_id["m1"].callback_type, CallbackType::None);
        assert_eq!(
            by_id["m2"].callback_type,
            CallbackType::Custom("review".into())
        );
    }

    #[test]
    fn digest_snapshot_is_detached_from_buffer() {
        let buffer = MessageBuffer::new();
        buffer.add(msg("m1"));

        let snapshot = buffer.digest();
        buffer.add(msg("m2"));
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn increment_bumps_every_count() {
        let buffer = MessageBuffer::new();
        buffer.add(msg("m1"));
        buffer.add(msg("m2"));

        buffer.increment_gossip_counts();
        buffer.increment_gossip_counts();

        for message in buffer.messages() {
            assert_eq!(message.gossip_count, 2);
        }
    }

    #[test]
    fn matching_resolves_only_held_ids() {
        let buffer = MessageBuffer::new();
        buffer.add(msg("m1"));

        let wanted = DigestBuffer::from_digests(vec![
            msg("m1").digest(),
            msg("unknown").digest(),
        ]);

        let resolved = buffer.matching(&wanted);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].id, "m1");
    }

    #[test]
    fn same_messages_is_id_set_equality() {
        let a = MessageBuffer::new();
        let b = MessageBuffer::new();
        a.add(msg("m1"));
        assert!(!a.same_messages(&b));

        // Payloads may differ; identity is the id.
        b.add(Message::with_id("m1", "other", CallbackType::None));
        assert!(a.same_messages(&b));

        b.add(msg("m2"));
        assert!(!a.same_messages(&b));
    }

    #[test]
    fn missing_from_is_set_difference_on_id() {
        let a = DigestBuffer::from_digests(vec![
            msg("m1").digest(),
            msg("m2").digest(),
            msg("m3").digest(),
        ]);
        let b = DigestBuffer::from_digests(vec![msg("m2").digest()]);

        let missing = a.missing_from(&b);
        let ids: Vec<&str> = missing.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m3"]);

        // Nothing is missing from a superset.
        assert!(b.missing_from(&a).is_empty());
    }
}
