//! Node configuration.

use crate::callback::CustomCallbacks;
use crate::error::ConfigError;
use rumor_core::Peer;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;

fn default_addr() -> String {
    "127.0.0.1".to_owned()
}

fn default_port() -> String {
    "4000".to_owned()
}

fn default_beta() -> f64 {
    0.5
}

fn default_round_duration_ms() -> u64 {
    100
}

/// Node configuration.
///
/// Loadable from a TOML file; the custom-callback table is code, not data,
/// and is attached to the struct after loading.
#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeConfig {
    /// Address the node binds and advertises.
    #[serde(default = "default_addr")]
    pub addr: String,
    /// Port the node binds and advertises.
    #[serde(default = "default_port")]
    pub port: String,
    /// Initial peer membership.
    #[serde(default)]
    pub peers: Vec<Peer>,
    /// Fanout coefficient; actual fanout is `⌈beta · ln(N+1)⌉`.
    #[serde(default = "default_beta")]
    pub beta: f64,
    /// Gossip round interval in milliseconds.
    #[serde(default = "default_round_duration_ms")]
    pub round_duration_ms: u64,
    /// Probability of dropping each outbound protocol send. Zero in
    /// production; raised only in loss-tolerance experiments.
    #[serde(default)]
    pub loss: f64,
    /// Log level and format for the binary.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Custom callbacks, keyed by callback type.
    #[serde(skip)]
    pub callbacks: CustomCallbacks,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            port: default_port(),
            peers: Vec::new(),
            beta: default_beta(),
            round_duration_ms: default_round_duration_ms(),
            loss: 0.0,
            logging: LoggingConfig::default(),
            callbacks: CustomCallbacks::new(),
        }
    }
}

impl NodeConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Validates the configuration. The node refuses to construct on any
    /// error returned here.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.addr.is_empty() {
            return Err(ConfigError::MissingField { field: "addr" });
        }
        if self.port.is_empty() {
            return Err(ConfigError::MissingField { field: "port" });
        }
        if !self.beta.is_finite() || self.beta <= 0.0 {
            return Err(ConfigError::InvalidBeta { beta: self.beta });
        }
        if self.round_duration_ms == 0 {
            return Err(ConfigError::InvalidRoundDuration);
        }
        if !(0.0..1.0).contains(&self.loss) {
            return Err(ConfigError::InvalidLoss { loss: self.loss });
        }
        Ok(())
    }

    /// The gossip round interval.
    #[must_use]
    pub fn round_duration(&self) -> Duration {
        Duration::from_millis(self.round_duration_ms)
    }
}

impl fmt::Debug for NodeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeConfig")
            .field("addr", &self.addr)
            .field("port", &self.port)
            .field("peers", &self.peers)
            .field("beta", &self.beta)
            .field("round_duration_ms", &self.round_duration_ms)
            .field("loss", &self.loss)
            .field("logging", &self.logging)
            .field("callbacks", &self.callbacks.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Log output configuration, consumed by the binary.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
    /// Log format: "json" or "pretty".
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_owned()
    }

    fn default_format() -> String {
        "pretty".to_owned()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            format: Self::default_format(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_validate() {
        let config = NodeConfig::default();
        config.validate().unwrap();
        assert_eq!(config.round_duration(), Duration::from_millis(100));
    }

    #[test]
    fn from_file_parses_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rumor.toml");
        std::fs::write(
            &path,
            r#"
                addr = "10.0.0.7"
                port = "4100"
                beta = 0.4
                round_duration_ms = 250

                [[peers]]
                addr = "10.0.0.8"
                port = "4100"

                [logging]
                level = "debug"
            "#,
        )
        .unwrap();

        let config = NodeConfig::from_file(&path).unwrap();
        assert_eq!(config.addr, "10.0.0.7");
        assert_eq!(config.beta, 0.4);
        assert_eq!(config.round_duration(), Duration::from_millis(250));
        assert_eq!(config.peers, vec![Peer::new("10.0.0.8", "4100")]);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.loss, 0.0);
    }

    #[test]
    fn rejects_bad_beta() {
        for beta in [0.0, -0.3, f64::NAN, f64::INFINITY] {
            let config = NodeConfig {
                beta,
                ..NodeConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidBeta { .. })
            ));
        }
    }

    #[test]
    fn rejects_empty_addr_and_port() {
        let config = NodeConfig {
            addr: String::new(),
            ..NodeConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingField { field: "addr" })
        ));

        let config = NodeConfig {
            port: String::new(),
            ..NodeConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingField { field: "port" })
        ));
    }

    #[test]
    fn rejects_zero_round_duration_and_full_loss() {
        let config = NodeConfig {
            round_duration_ms: 0,
            ..NodeConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRoundDuration)
        ));

        let config = NodeConfig {
            loss: 1.0,
            ..NodeConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidLoss { .. })
        ));
    }
}
