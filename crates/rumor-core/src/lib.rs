//! Core types and shared buffers for the rumor gossip protocol.
//!
//! This crate holds the data model every node maintains: the peer set, the
//! message buffer with its digest projection, and the gossip round counter.
//! All shared structures serialize their public operations through an
//! internal lock so the scheduler and inbound request handlers can use them
//! concurrently.

mod buffer;
mod message;
mod peer;
mod round;

pub use buffer::{DigestBuffer, MessageBuffer};
pub use message::{CallbackType, Digest, Message};
pub use peer::{Peer, PeerBuffer};
pub use round::GossipRound;
