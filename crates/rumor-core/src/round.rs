//! The gossip round counter.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonically increasing round counter, advanced once per scheduler
/// tick and read by handlers for logging.
#[derive(Debug, Default)]
pub struct GossipRound {
    number: AtomicU64,
}

impl GossipRound {
    /// Creates a counter starting at round zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current round number.
    pub fn get(&self) -> u64 {
        self.number.load(Ordering::Relaxed)
    }

    /// Advances to the next round, returning the new round number.
    pub fn increment(&self) -> u64 {
        self.number.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero_and_increments() {
        let round = GossipRound::new();
        assert_eq!(round.get(), 0);
        assert_eq!(round.increment(), 1);
        assert_eq!(round.increment(), 2);
        assert_eq!(round.get(), 2);
    }
}
