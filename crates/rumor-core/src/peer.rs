//! Peer endpoints and the shared peer set.

use parking_lot::RwLock;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A peer endpoint known to the node.
///
/// Equality is structural on both fields; the peer buffer keys on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Peer {
    /// Host address the peer serves on.
    pub addr: String,
    /// Port the peer serves on, kept as a string because it travels the
    /// wire as one.
    pub port: String,
}

impl Peer {
    /// Creates a new peer endpoint.
    #[must_use]
    pub fn new(addr: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            port: port.into(),
        }
    }
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.addr, self.port)
    }
}

/// The shared set of known peers.
///
/// Mutated concurrently by the membership callbacks and read by the gossip
/// scheduler; all operations take the internal lock for their duration.
#[derive(Debug, Default)]
pub struct PeerBuffer {
    peers: RwLock<Vec<Peer>>,
}

impl PeerBuffer {
    /// Creates an empty peer buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a peer buffer seeded with an initial membership list.
    ///
    /// Duplicates in the input collapse to one entry.
    #[must_use]
    pub fn with_peers(initial: Vec<Peer>) -> Self {
        let buffer = Self::new();
        for peer in initial {
            buffer.add(peer);
        }
        buffer
    }

    /// Adds a peer if it is not already present. Returns whether the set
    /// changed.
    pub fn add(&self, peer: Peer) -> bool {
        let mut peers = self.peers.write();
        if peers.contains(&peer) {
            return false;
        }
        peers.push(peer);
        true
    }

    /// Removes a peer. Returns whether the set changed.
    pub fn remove(&self, peer: &Peer) -> bool {
        let mut peers = self.peers.write();
        let before = peers.len();
        peers.retain(|p| p != peer);
        peers.len() != before
    }

    /// Number of known peers.
    pub fn len(&self) -> usize {
        self.peers.read().len()
    }

    /// Whether no peers are known.
    pub fn is_empty(&self) -> bool {
        self.peers.read().is_empty()
    }

    /// Snapshot of the current peer set.
    pub fn peers(&self) -> Vec<Peer> {
        self.peers.read().clone()
    }

    /// Uniform sample of `k` peers without replacement, or every peer if
    /// fewer than `k` are known.
    pub fn random_peers(&self, k: usize) -> Vec<Peer> {
        let peers = self.peers.read();
        peers
            .choose_multiple(&mut rand::thread_rng(), k)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn peer_display() {
        let peer = Peer::new("localhost", "4000");
        assert_eq!(peer.to_string(), "localhost:4000");
    }

    #[test]
    fn add_is_idempotent() {
        let buffer = PeerBuffer::new();
        assert!(buffer.add(Peer::new("localhost", "4000")));
        assert!(!buffer.add(Peer::new("localhost", "4000")));
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn distinct_ports_are_distinct_peers() {
        let buffer = PeerBuffer::new();
        buffer.add(Peer::new("localhost", "4000"));
        buffer.add(Peer::new("localhost", "4001"));
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn remove_unknown_peer_is_noop() {
        let buffer = PeerBuffer::with_peers(vec![Peer::new("localhost", "4000")]);
        assert!(!buffer.remove(&Peer::new("localhost", "9999")));
        assert!(buffer.remove(&Peer::new("localhost", "4000")));
        assert!(buffer.is_empty());
    }

    #[test]
    fn with_peers_collapses_duplicates() {
        let buffer = PeerBuffer::with_peers(vec![
            Peer::new("localhost", "4000"),
            Peer::new("localhost", "4000"),
            Peer::new("localhost", "4001"),
        ]);
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn random_peers_samples_without_replacement() {
        let buffer = PeerBuffer::with_peers(
            (0..10)
                .map(|i| Peer::new("localhost", format!("400{i}")))
                .collect(),
        );

        let sample = buffer.random_peers(4);
        assert_eq!(sample.len(), 4);

        let mut unique = sample.clone();
        unique.sort_by(|a, b| a.port.cmp(&b.port));
        unique.dedup();
        assert_eq!(unique.len(), 4);
    }

    #[test]
    fn random_peers_caps_at_population() {
        let buffer = PeerBuffer::with_peers(vec![
            Peer::new("localhost", "4000"),
            Peer::new("localhost", "4001"),
        ]);
        assert_eq!(buffer.random_peers(10).len(), 2);
    }
}
