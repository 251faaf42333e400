//! Node lifecycle and callback dispatch.

use crate::callback::{CallbackOutcome, CustomRegistry};
use crate::config::NodeConfig;
use crate::error::NodeError;
use crate::scheduler;
use crate::server;
use crate::transport::Transport;
use parking_lot::Mutex;
use rumor_core::{CallbackType, GossipRound, Message, MessageBuffer, Peer, PeerBuffer};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// How long `stop` waits for in-flight requests and the scheduler to drain.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// State shared by the scheduler, the reconciliation server, and the
/// public node API. Buffers carry their own locks; everything else here is
/// immutable after construction.
#[derive(Debug)]
pub(crate) struct Shared {
    /// The endpoint this node advertises as the sender of its exchanges.
    pub(crate) identity: Peer,
    /// Fanout coefficient.
    pub(crate) beta: f64,
    /// Round interval.
    pub(crate) round_duration: Duration,
    pub(crate) msg_buffer: MessageBuffer,
    pub(crate) peer_buffer: PeerBuffer,
    pub(crate) round: GossipRound,
    pub(crate) transport: Transport,
    callbacks: CustomRegistry,
}

impl Shared {
    pub(crate) fn new(config: &NodeConfig, callbacks: CustomRegistry) -> Result<Self, NodeError> {
        let transport = Transport::new(config.round_duration(), config.loss)?;
        Ok(Self {
            identity: Peer::new(config.addr.clone(), config.port.clone()),
            beta: config.beta,
            round_duration: config.round_duration(),
            msg_buffer: MessageBuffer::new(),
            peer_buffer: PeerBuffer::with_peers(config.peers.clone()),
            round: GossipRound::new(),
            transport,
            callbacks,
        })
    }

    /// Delivers one synchronized message: runs its callback and records
    /// the message in the buffer if the callback accepts it.
    pub(crate) fn deliver(&self, message: Message) {
        match message.callback_type.clone() {
            CallbackType::None => {
                if self.msg_buffer.add(message.clone()) {
                    info!(
                        id = %message.id,
                        round = self.round.get(),
                        "Synced buffer with message"
                    );
                }
            }
            CallbackType::AddPeer => {
                let outcome = self.apply_membership(&message, true);
                self.record(message, outcome);
            }
            CallbackType::RemovePeer => {
                let outcome = self.apply_membership(&message, false);
                self.record(message, outcome);
            }
            CallbackType::Custom(tag) => {
                let Some(callback) = self.callbacks.get(&tag) else {
                    // No registry matches: the message is dropped from
                    // callback processing and never stored.
                    debug!(id = %message.id, %tag, "No callback registered, dropping message");
                    return;
                };
                let outcome = callback(&message.payload);
                self.record(message, outcome);
            }
        }
    }

    /// Applies an ADDPEER/REMOVEPEER payload to the peer buffer.
    fn apply_membership(&self, message: &Message, add: bool) -> CallbackOutcome {
        match serde_json::from_str::<Peer>(&message.payload) {
            Ok(peer) => {
                if add {
                    if self.peer_buffer.add(peer.clone()) {
                        info!(peer = %peer, "Added peer to buffer");
                    }
                } else if self.peer_buffer.remove(&peer) {
                    info!(peer = %peer, "Removed peer from buffer");
                }
                CallbackOutcome::accepted()
            }
            Err(err) => CallbackOutcome::rejected_with_error(format!("invalid peer payload: {err}")),
        }
    }

    /// Applies a callback outcome: logs any reported error and stores the
    /// message only when accepted (even if an error accompanied it).
    fn record(&self, message: Message, outcome: CallbackOutcome) {
        if let Some(err) = &outcome.error {
            warn!(id = %message.id, error = %err, "Callback reported an error");
        }
        if outcome.accept && self.msg_buffer.add(message.clone()) {
            info!(
                id = %message.id,
                round = self.round.get(),
                "Synced buffer with message"
            );
        }
    }
}

/// Handles for the running activities, released by `stop`.
struct Runtime {
    shutdown: watch::Sender<bool>,
    server: JoinHandle<()>,
    scheduler: JoinHandle<()>,
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime").finish_non_exhaustive()
    }
}

/// A bimodal multicast node.
///
/// Construction validates the configuration; `start` launches the
/// reconciliation server and the gossip scheduler, both observing one stop
/// signal; `stop` broadcasts the signal and drains with a bounded timeout.
#[derive(Debug)]
pub struct Node {
    shared: Arc<Shared>,
    runtime: Mutex<Option<Runtime>>,
}

impl Node {
    /// Creates a node from configuration. Fails on invalid configuration,
    /// including custom callbacks registered under reserved types.
    pub fn new(config: NodeConfig) -> Result<Self, NodeError> {
        config.validate()?;
        let callbacks = CustomRegistry::new(config.callbacks.clone())?;
        let shared = Arc::new(Shared::new(&config, callbacks)?);

        Ok(Self {
            shared,
            runtime: Mutex::new(None),
        })
    }

    /// Starts the reconciliation server and the gossip scheduler.
    ///
    /// # Errors
    ///
    /// Fails if the node is already running or the listen address cannot
    /// be bound.
    pub async fn start(&self) -> Result<(), NodeError> {
        if self.runtime.lock().is_some() {
            return Err(NodeError::AlreadyStarted);
        }

        let bind_addr = format!("{}:{}", self.shared.identity.addr, self.shared.identity.port);
        let listener = tokio::net::TcpListener::bind(&bind_addr)
            .await
            .map_err(|source| NodeError::Bind {
                addr: bind_addr.clone(),
                source,
            })?;
        info!(addr = %bind_addr, "Reconciliation server listening");

        let (shutdown, shutdown_rx) = watch::channel(false);

        let app = server::router(self.shared.clone());
        let mut server_rx = shutdown_rx.clone();
        let server = tokio::spawn(async move {
            let shutdown_future = async move {
                let _ = server_rx.changed().await;
            };
            if let Err(err) = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_future)
                .await
            {
                error!(error = %err, "Reconciliation server error");
            }
        });

        let scheduler = tokio::spawn(scheduler::run(self.shared.clone(), shutdown_rx));

        *self.runtime.lock() = Some(Runtime {
            shutdown,
            server,
            scheduler,
        });
        Ok(())
    }

    /// Signals shutdown and waits for the server and scheduler to drain.
    /// A no-op if the node is not running.
    pub async fn stop(&self) {
        let Some(runtime) = self.runtime.lock().take() else {
            return;
        };

        let _ = runtime.shutdown.send(true);
        if tokio::time::timeout(SHUTDOWN_TIMEOUT, runtime.server)
            .await
            .is_err()
        {
            warn!("Reconciliation server did not drain before the shutdown timeout");
        }
        if tokio::time::timeout(SHUTDOWN_TIMEOUT, runtime.scheduler)
            .await
            .is_err()
        {
            warn!("Gossip scheduler did not stop before the shutdown timeout");
        }
        info!(node = %self.shared.identity, "Node stopped");
    }

    /// Adds an application message with a fresh random id. The message is
    /// picked up by subsequent gossip rounds. Returns the id.
    pub fn add_message(&self, payload: impl Into<String>, callback_type: CallbackType) -> String {
        let message = Message::new(payload, callback_type);
        let id = message.id.clone();
        self.msg_buffer_add(message);
        id
    }

    /// Adds a peer to the local buffer and posts an ADDPEER message so the
    /// rest of the system learns the change through gossip. Returns the
    /// membership message id.
    pub fn add_peer(
        &self,
        addr: impl Into<String>,
        port: impl Into<String>,
    ) -> Result<String, NodeError> {
        let peer = Peer::new(addr, port);
        self.shared.peer_buffer.add(peer.clone());
        self.post_membership(&peer, CallbackType::AddPeer)
    }

    /// Removes a peer from the local buffer and posts a REMOVEPEER
    /// message. Returns the membership message id.
    pub fn remove_peer(
        &self,
        addr: impl Into<String>,
        port: impl Into<String>,
    ) -> Result<String, NodeError> {
        let peer = Peer::new(addr, port);
        self.shared.peer_buffer.remove(&peer);
        self.post_membership(&peer, CallbackType::RemovePeer)
    }

    /// Snapshot of the buffered messages.
    pub fn messages(&self) -> Vec<Message> {
        self.shared.msg_buffer.messages()
    }

    /// Snapshot of the known peers.
    pub fn peers(&self) -> Vec<Peer> {
        self.shared.peer_buffer.peers()
    }

    fn post_membership(&self, peer: &Peer, kind: CallbackType) -> Result<String, NodeError> {
        let payload = serde_json::to_string(peer)?;
        let message = Message::new(payload, kind);
        let id = message.id.clone();
        self.msg_buffer_add(message);
        Ok(id)
    }

    fn msg_buffer_add(&self, message: Message) {
        if self.shared.msg_buffer.add(message.clone()) {
            debug!(id = %message.id, "Added local message");
        }
    }
}
