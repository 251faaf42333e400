//! Outbound protocol sends.

use crate::error::TransportError;
use rumor_core::Peer;
use rumor_protocol::{
    GossipRequest, SolicitationRequest, SynchronizationRequest, GOSSIP_PATH, SOLICITATION_PATH,
    SYNCHRONIZATION_PATH,
};
use serde::Serialize;
use tracing::debug;

/// HTTP client for the three protocol sends.
///
/// Built once per node with a request timeout of one round interval; a
/// peer that cannot answer within a round is indistinguishable from a lost
/// hop, and the next round retries anyway.
#[derive(Debug, Clone)]
pub(crate) struct Transport {
    client: reqwest::Client,
    loss: f64,
}

impl Transport {
    /// Builds the transport. `loss` is the synthetic drop probability
    /// applied to each send, zero in production.
    pub(crate) fn new(timeout: std::time::Duration, loss: f64) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("rumor-node/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self { client, loss })
    }

    /// Pushes a gossip digest to `peer`.
    pub(crate) async fn send_gossip(
        &self,
        peer: &Peer,
        body: &GossipRequest,
    ) -> Result<(), TransportError> {
        self.post(peer, GOSSIP_PATH, body).await
    }

    /// Asks `peer` for the messages behind the missing digests.
    pub(crate) async fn send_solicitation(
        &self,
        peer: &Peer,
        body: &SolicitationRequest,
    ) -> Result<(), TransportError> {
        self.post(peer, SOLICITATION_PATH, body).await
    }

    /// Transfers solicited messages to `peer`.
    pub(crate) async fn send_synchronization(
        &self,
        peer: &Peer,
        body: &SynchronizationRequest,
    ) -> Result<(), TransportError> {
        self.post(peer, SYNCHRONIZATION_PATH, body).await
    }

    async fn post<B: Serialize>(
        &self,
        peer: &Peer,
        path: &str,
        body: &B,
    ) -> Result<(), TransportError> {
        if self.loss > 0.0 && rand::random::<f64>() < self.loss {
            debug!(peer = %peer, path, "Dropped outbound send (synthetic loss)");
            return Ok(());
        }

        let url = format!("http://{}:{}{path}", peer.addr, peer.port);
        let response = self.client.post(&url).json(body).send().await?;

        if !response.status().is_success() {
            return Err(TransportError::Status {
                status: response.status(),
            });
        }
        Ok(())
    }
}
