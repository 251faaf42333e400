//! The reconciliation HTTP server.
//!
//! Three POST endpoints drive the anti-entropy exchange. Replies travel as
//! fresh outbound requests to the sender named in the body, never as HTTP
//! responses, so every handler answers 200 with an empty body once the hop
//! is processed. Digest snapshots are taken as owned values before any
//! outbound send, so no buffer lock is held across an await.

use crate::node::Shared;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use rumor_core::Message;
use rumor_protocol::{
    GossipRequest, SolicitationRequest, SynchronizationRequest, GOSSIP_PATH, SOLICITATION_PATH,
    SYNCHRONIZATION_PATH,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

/// Builds the node's router.
pub(crate) fn router(shared: Arc<Shared>) -> Router {
    Router::new()
        .route(GOSSIP_PATH, post(gossip))
        .route(SOLICITATION_PATH, post(solicitation))
        .route(SYNCHRONIZATION_PATH, post(synchronization))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}

/// A peer pushed its digest: solicit whatever it holds that we do not.
async fn gossip(
    State(shared): State<Arc<Shared>>,
    Json(body): Json<GossipRequest>,
) -> StatusCode {
    let local = shared.msg_buffer.digest();
    let missing = body.digest_buffer().missing_from(&local);

    debug!(
        from = %body.sender(),
        round = body.round_number,
        missing = missing.len(),
        "Received gossip"
    );

    if !missing.is_empty() {
        let target = body.sender();
        let reply = SolicitationRequest::new(&shared.identity, body.round_number, missing);
        if let Err(error) = shared.transport.send_solicitation(&target, &reply).await {
            warn!(peer = %target, %error, "Failed to send solicitation");
        }
    }
    StatusCode::OK
}

/// A peer asked for messages behind digests: resolve what we hold and
/// synchronize it back. Digests we cannot resolve are silently dropped.
async fn solicitation(
    State(shared): State<Arc<Shared>>,
    Json(body): Json<SolicitationRequest>,
) -> StatusCode {
    let messages = shared.msg_buffer.matching(&body.digest_buffer());

    debug!(
        from = %body.sender(),
        round = body.round_number,
        resolved = messages.len(),
        "Received solicitation"
    );

    let target = body.sender();
    let reply = SynchronizationRequest::new(&shared.identity, messages);
    if let Err(error) = shared.transport.send_synchronization(&target, &reply).await {
        warn!(peer = %target, %error, "Failed to send synchronization");
    }
    StatusCode::OK
}

/// A peer transferred message bodies: deliver each in order.
async fn synchronization(
    State(shared): State<Arc<Shared>>,
    Json(body): Json<SynchronizationRequest>,
) -> StatusCode {
    debug!(
        addr = %body.addr,
        port = %body.port,
        messages = body.messages.len(),
        "Received synchronization"
    );

    for wire in body.messages {
        shared.deliver(Message::from(wire));
    }
    StatusCode::OK
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    round: u64,
    messages: usize,
    peers: usize,
}

/// Liveness endpoint.
async fn health(State(shared): State<Arc<Shared>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        round: shared.round.get(),
        messages: shared.msg_buffer.len(),
        peers: shared.peer_buffer.len(),
    })
}
