//! Node error types.

use thiserror::Error;

/// Errors surfaced while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required field is empty or absent.
    #[error("missing required field: {field}")]
    MissingField {
        /// The field that is missing.
        field: &'static str,
    },

    /// The fanout coefficient is unusable.
    #[error("invalid beta {beta}: must be finite and greater than zero")]
    InvalidBeta {
        /// The rejected value.
        beta: f64,
    },

    /// The round duration is zero.
    #[error("invalid round duration: must be greater than zero")]
    InvalidRoundDuration,

    /// The synthetic loss probability is out of range.
    #[error("invalid loss {loss}: must be within [0.0, 1.0)")]
    InvalidLoss {
        /// The rejected value.
        loss: f64,
    },

    /// A custom callback was registered under a reserved type.
    #[error("callback type {tag:?} is reserved")]
    ReservedCallback {
        /// The offending callback type.
        tag: String,
    },

    /// Reading the configuration file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid TOML.
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Errors surfaced from node construction and lifecycle.
#[derive(Debug, Error)]
pub enum NodeError {
    /// The configuration did not validate.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The reconciliation server could not bind its listen address.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// The address that could not be bound.
        addr: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The outbound HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    /// Encoding a membership payload failed.
    #[error("failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),

    /// `start` was called on a node that is already running.
    #[error("node already started")]
    AlreadyStarted,
}

/// Errors from a single outbound protocol send. Steady-state callers log
/// these and move on; the next round re-attempts anti-entropy.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be sent or timed out.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The peer answered with a non-success status.
    #[error("unexpected status {status} from peer")]
    Status {
        /// The status the peer returned.
        status: reqwest::StatusCode,
    },
}
