//! Bimodal multicast node.
//!
//! A node couples two activities around a pair of shared buffers: a gossip
//! scheduler that pushes message-buffer digests to a random subset of peers
//! every round, and a reconciliation HTTP server that answers the three
//! exchange hops (gossip, solicitation, synchronization) until the buffers
//! of all correct nodes converge. Delivery of a synchronized message runs
//! its callback; membership callbacks mutate the peer set, so the protocol
//! also disseminates membership changes.
//!
//! ```no_run
//! use rumor_node::{Node, NodeConfig};
//! use rumor_core::CallbackType;
//!
//! # async fn run() -> Result<(), rumor_node::NodeError> {
//! let node = Node::new(NodeConfig::default())?;
//! node.start().await?;
//! node.add_message("hello", CallbackType::None);
//! # node.stop().await;
//! # Ok(())
//! # }
//! ```

pub mod callback;
pub mod config;
mod error;
pub mod logging;
mod node;
mod scheduler;
mod server;
mod transport;

pub use callback::{CallbackOutcome, CustomCallback, CustomCallbacks};
pub use config::{LoggingConfig, NodeConfig};
pub use error::{ConfigError, NodeError, TransportError};
pub use node::Node;
