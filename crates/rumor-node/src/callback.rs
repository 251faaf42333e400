//! Application callbacks and the custom-callback registry.
//!
//! Delivery of a synchronized message with a callback type runs the
//! matching callback; the outcome decides whether the message is recorded
//! in the buffer (and therefore re-gossiped). Membership callbacks
//! (ADDPEER/REMOVEPEER) are built into the node; everything else goes
//! through the registry defined here.

use crate::error::ConfigError;
use rumor_core::CallbackType;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// The result of running a callback.
///
/// `accept` and `error` are independent: a callback may accept the message
/// while still reporting an error, in which case the message is recorded
/// and the error is only logged.
#[derive(Debug, Clone)]
pub struct CallbackOutcome {
    /// Whether the message should be recorded in the buffer.
    pub accept: bool,
    /// An application error to surface in the logs, if any.
    pub error: Option<String>,
}

impl CallbackOutcome {
    /// Accepts the message.
    #[must_use]
    pub fn accepted() -> Self {
        Self {
            accept: true,
            error: None,
        }
    }

    /// Rejects the message without reporting an error.
    #[must_use]
    pub fn rejected() -> Self {
        Self {
            accept: false,
            error: None,
        }
    }

    /// Rejects the message and reports an error.
    #[must_use]
    pub fn rejected_with_error(error: impl Into<String>) -> Self {
        Self {
            accept: false,
            error: Some(error.into()),
        }
    }

    /// Accepts the message but still reports an error.
    #[must_use]
    pub fn accepted_with_error(error: impl Into<String>) -> Self {
        Self {
            accept: true,
            error: Some(error.into()),
        }
    }
}

/// An application-provided callback over the opaque message payload.
pub type CustomCallback = Arc<dyn Fn(&str) -> CallbackOutcome + Send + Sync>;

/// The custom-callback table handed to the node at construction.
pub type CustomCallbacks = HashMap<String, CustomCallback>;

/// Validated registry of custom callbacks, keyed by callback type.
pub(crate) struct CustomRegistry {
    callbacks: CustomCallbacks,
}

impl CustomRegistry {
    /// Builds a registry, rejecting any callback registered under a
    /// reserved type.
    pub(crate) fn new(callbacks: CustomCallbacks) -> Result<Self, ConfigError> {
        for tag in callbacks.keys() {
            if CallbackType::is_reserved(tag) {
                return Err(ConfigError::ReservedCallback { tag: tag.clone() });
            }
        }
        Ok(Self { callbacks })
    }

    /// Looks up the callback registered for `tag`.
    pub(crate) fn get(&self, tag: &str) -> Option<&CustomCallback> {
        self.callbacks.get(tag)
    }
}

impl fmt::Debug for CustomRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomRegistry")
            .field("tags", &self.callbacks.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> CustomCallback {
        Arc::new(|_: &str| CallbackOutcome::accepted())
    }

    #[test]
    fn empty_registry_is_valid() {
        assert!(CustomRegistry::new(CustomCallbacks::new()).is_ok());
    }

    #[test]
    fn rejects_reserved_tags() {
        for reserved in ["ADDPEER", "REMOVEPEER", "NONE"] {
            let mut callbacks = CustomCallbacks::new();
            callbacks.insert(reserved.to_owned(), noop());

            let err = CustomRegistry::new(callbacks).unwrap_err();
            assert!(matches!(err, ConfigError::ReservedCallback { tag } if tag == reserved));
        }
    }

    #[test]
    fn looks_up_registered_tags() {
        let mut callbacks = CustomCallbacks::new();
        callbacks.insert("review".to_owned(), noop());

        let registry = CustomRegistry::new(callbacks).unwrap();
        assert!(registry.get("review").is_some());
        assert!(registry.get("unknown").is_none());
    }

    #[test]
    fn outcome_constructors() {
        assert!(CallbackOutcome::accepted().accept);
        assert!(!CallbackOutcome::rejected().accept);

        let outcome = CallbackOutcome::accepted_with_error("stale payload");
        assert!(outcome.accept);
        assert_eq!(outcome.error.as_deref(), Some("stale payload"));

        let outcome = CallbackOutcome::rejected_with_error("bad payload");
        assert!(!outcome.accept);
        assert!(outcome.error.is_some());
    }
}
