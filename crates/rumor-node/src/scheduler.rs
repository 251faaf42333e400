//! The gossip round scheduler.

use crate::node::Shared;
use rumor_protocol::GossipRequest;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, trace};

/// Runs gossip rounds until the stop signal fires.
///
/// Each round: advance the round counter, bump every message's gossip
/// count, sample `⌈β·ln(N+1)⌉` peers, and push the current digest snapshot
/// to each. Sends are best-effort; failures are logged and the next round
/// re-attempts anti-entropy.
pub(crate) async fn run(shared: Arc<Shared>, mut shutdown: watch::Receiver<bool>) {
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            () = tokio::time::sleep(shared.round_duration) => {}
        }

        let round = shared.round.increment();
        shared.msg_buffer.increment_gossip_counts();

        let population = shared.peer_buffer.len();
        if population == 0 {
            trace!(round, "No peers, skipping round");
            continue;
        }

        let k = fanout(shared.beta, population);
        let peers = shared.peer_buffer.random_peers(k);
        // Snapshot the digest once per round; peers may see it a hop
        // stale, which anti-entropy tolerates.
        let digests = shared.msg_buffer.digest();
        trace!(round, fanout = k, digests = digests.len(), "Gossip round");

        for peer in peers {
            let body = GossipRequest::new(&shared.identity, round, digests.clone());
            if let Err(error) = shared.transport.send_gossip(&peer, &body).await {
                debug!(peer = %peer, %error, "Gossip send failed");
            }
        }
    }
    debug!("Gossip scheduler stopped");
}

/// Fanout for a peer population of `n`: `⌈β·ln(n+1)⌉`. Grows
/// logarithmically with the population so each message still reaches every
/// correct node with high probability in O(log N) rounds.
pub(crate) fn fanout(beta: f64, n: usize) -> usize {
    (beta * ((n + 1) as f64).ln()).ceil() as usize
}
