//! Transfer configuration.
//!
//! Everything here is a compile-time default that a host may override
//! by deserializing a config document. The core never touches the
//! filesystem or the environment; cadence and sizing are plain values
//! handed in by the embedding application.

use std::time::Duration;

use serde::Deserialize;

/// Tunables for one sender/receiver pair.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Raw payload bytes per fragment, before text encoding.
    ///
    /// Deliberately conservative: a denser symbol is faster in theory
    /// but stops scanning reliably on a handheld camera.
    pub chunk_size: usize,

    /// Milliseconds each fragment stays on screen before the sender
    /// advances to the next one.
    pub broadcast_interval_ms: u64,

    /// Milliseconds between receiver capture ticks.
    pub scan_interval_ms: u64,

    /// What to do with a fragment whose transfer id differs from the
    /// one being collected.
    pub foreign_nonce: ForeignNoncePolicy,
}

/// Policy for fragments from a different transfer arriving while one
/// is already in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ForeignNoncePolicy {
    /// Drop the fragment. A stray or malicious symbol cannot abort an
    /// in-progress transfer. The default.
    #[default]
    Ignore,

    /// Discard all progress and start collecting the new transfer.
    /// Must be chosen explicitly; never a silent fallback.
    Reset,
}

impl TransferConfig {
    pub fn broadcast_interval(&self) -> Duration {
        Duration::from_millis(self.broadcast_interval_ms)
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_millis(self.scan_interval_ms)
    }
}

// ── Defaults ──────────────────────────────────────────────────────────────

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            chunk_size: 100,
            broadcast_interval_ms: 500,
            scan_interval_ms: 200,
            foreign_nonce: ForeignNoncePolicy::default(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
