//! Wire-level message bodies for the rumor gossip protocol.
//!
//! Each node exposes three HTTP POST endpoints; the request bodies defined
//! here are JSON-encoded by the transport. The `addr`/`port` fields always
//! identify the *sender*, so the receiver knows where to direct its reply
//! hop (replies are fresh outbound requests, never HTTP responses).

mod messages;

pub use messages::{GossipRequest, SolicitationRequest, SynchronizationRequest, WireMessage};

/// Endpoint receiving gossip digests.
pub const GOSSIP_PATH: &str = "/gossip";
/// Endpoint receiving solicitations for missing messages.
pub const SOLICITATION_PATH: &str = "/solicitation";
/// Endpoint receiving synchronized message bodies.
pub const SYNCHRONIZATION_PATH: &str = "/synchronization";
