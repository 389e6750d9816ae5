//! Matchmaker configuration

use std::time::Duration;

/// Tunables for pairing and room formation.
#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// How long a matched room may stay Forming, measured from match time.
    pub forming_timeout: Duration,
    /// Join requests buffered ahead of the dispatcher.
    pub intake_capacity: usize,
    /// Frames buffered per peer before senders wait on its writer.
    pub outbound_capacity: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            forming_timeout: Duration::from_secs(10),
            intake_capacity: 1,
            outbound_capacity: 64,
        }
    }
}
