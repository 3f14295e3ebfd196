//! Matcher configuration types.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Iterations between two consultations of the time-limit oracle
pub const DEFAULT_CHECK_INTERVAL: u32 = 50_000;

/// Configuration for multi-literal matching and the subsumption front end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Require injective literal matching (each instance literal used once)
    pub multiset: bool,
    /// Search iterations between time-limit checks
    pub check_interval: u32,
    /// Budget for a single search, None means unlimited
    pub timeout: Option<Duration>,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        MatcherConfig {
            multiset: false,
            check_interval: DEFAULT_CHECK_INTERVAL,
            timeout: None,
        }
    }
}

impl MatcherConfig {
    pub fn multiset() -> Self {
        MatcherConfig {
            multiset: true,
            ..Self::default()
        }
    }
}
