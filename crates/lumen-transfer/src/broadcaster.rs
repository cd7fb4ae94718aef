//! The sender's repeating broadcast.
//!
//! Cycles through an immutable fragment list forever at a fixed
//! cadence, handing each line to the renderer. There is no
//! acknowledgment channel and no backpressure; reliability comes from
//! unbounded repetition. The user keeps the broadcast running until the
//! receiving side signals completion.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time;

use lumen_core::wire::Fragment;

use crate::capability::SymbolRenderer;
use crate::control::{stop_channel, StopHandle, StopSignal};
use crate::encoder::EncodedTransfer;

/// Timer-driven index cycle over a precomputed fragment list.
///
/// Restarting after a stop begins a fresh cycle at index 0. Losing the
/// in-flight position is fine: every fragment is re-shown eventually no
/// matter where the cycle stands.
pub struct Broadcaster {
    fragments: Arc<[Fragment]>,
    renderer: Arc<dyn SymbolRenderer>,
    interval: Duration,
    running: Option<(StopHandle, JoinHandle<()>)>,
}

impl Broadcaster {
    pub fn new(
        encoded: EncodedTransfer,
        renderer: Arc<dyn SymbolRenderer>,
        interval: Duration,
    ) -> Self {
        assert!(
            !encoded.fragments.is_empty(),
            "a transfer always has at least one fragment"
        );
        Self {
            fragments: encoded.fragments.into(),
            renderer,
            interval,
            running: None,
        }
    }

    /// Spawn the broadcast loop. A no-op while already running.
    pub fn start(&mut self) {
        if self.running.is_some() {
            return;
        }
        let (handle, signal) = stop_channel();
        let task = tokio::spawn(broadcast_loop(
            self.fragments.clone(),
            self.renderer.clone(),
            self.interval,
            signal,
        ));
        self.running = Some((handle, task));
    }

    /// Halt the loop and release its timer. Idempotent; safe to call
    /// from error paths and after the loop has already been stopped.
    pub fn stop(&mut self) {
        if let Some((handle, _task)) = self.running.take() {
            handle.stop();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }
}

impl Drop for Broadcaster {
    fn drop(&mut self) {
        self.stop();
    }
}

/// One render per tick, fragment `i % total`, forever until stopped.
async fn broadcast_loop(
    fragments: Arc<[Fragment]>,
    renderer: Arc<dyn SymbolRenderer>,
    interval: Duration,
    mut stop: StopSignal,
) {
    let total = fragments.len();
    let mut interval = time::interval(interval);
    let mut cursor: usize = 0;

    tracing::info!(
        transfer = %fragments[0].transfer,
        fragments = total,
        interval_ms = interval.period().as_millis() as u64,
        "broadcast starting"
    );

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let fragment = &fragments[cursor % total];
                renderer.render(&fragment.to_line());
                tracing::trace!(index = fragment.index, "fragment shown");
                cursor = cursor.wrapping_add(1);
            }
            _ = stop.stopped() => {
                tracing::info!(shown = cursor, "broadcast stopped");
                return;
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
