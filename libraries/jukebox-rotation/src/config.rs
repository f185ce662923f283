//! Rotation configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How an empty queue is refilled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplenishStrategy {
    /// Random pick from the queue's history (least-played fallback)
    #[default]
    History,

    /// Ask the previous track's backend for a related track, then fall back
    /// to the history pick
    ArtistRadio,
}

/// What `update_head` does when no head is cached
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateMissPolicy {
    /// Drop the update and report no head
    #[default]
    Ignore,

    /// Resolve the head from the database (no auto-fill), then apply
    Resolve,
}

/// Rotation engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    pub strategy: ReplenishStrategy,

    /// Size of the least-played fallback pool
    pub least_played_limit: u32,

    /// Lower bound for head cache lifetimes
    pub min_head_ttl_secs: u64,

    /// Lifetime of cached queue listings
    pub listing_ttl_secs: u64,

    /// Upper bound for every metadata source call
    pub source_timeout_ms: u64,

    /// Check the head track still exists upstream before serving it
    pub validate_heads: bool,

    pub update_miss_policy: UpdateMissPolicy,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            strategy: ReplenishStrategy::History,
            least_played_limit: 50,
            min_head_ttl_secs: 1,
            listing_ttl_secs: 30,
            source_timeout_ms: 5000,
            validate_heads: true,
            update_miss_policy: UpdateMissPolicy::Ignore,
        }
    }
}

impl RotationConfig {
    pub fn source_timeout(&self) -> Duration {
        Duration::from_millis(self.source_timeout_ms)
    }

    pub fn listing_ttl(&self) -> Duration {
        Duration::from_secs(self.listing_ttl_secs)
    }
}
