//! Cooperative stop signaling for the two tick loops.
//!
//! Both the broadcast loop and the scan loop run until told otherwise.
//! The handle side may be cloned, kept by UI code, and fired any number
//! of times; every call after the first is a no-op.

use tokio::sync::watch;

/// Create a connected stop handle / stop signal pair.
pub fn stop_channel() -> (StopHandle, StopSignal) {
    let (tx, rx) = watch::channel(false);
    (StopHandle { tx }, StopSignal { rx })
}

/// Requests loop shutdown. Idempotent.
#[derive(Debug, Clone)]
pub struct StopHandle {
    tx: watch::Sender<bool>,
}

impl StopHandle {
    pub fn stop(&self) {
        // receiver may already be gone; stopping twice is fine either way
        let _ = self.tx.send(true);
    }
}

/// The loop-side end. Lives inside a `tokio::select!`.
#[derive(Debug, Clone)]
pub struct StopSignal {
    rx: watch::Receiver<bool>,
}

impl StopSignal {
    /// Resolves once [`StopHandle::stop`] has been called. If the
    /// handle was dropped without stopping, pends forever; the loop
    /// then runs until its own completion condition.
    pub async fn stopped(&mut self) {
        if *self.rx.borrow() {
            return;
        }
        while self.rx.changed().await.is_ok() {
            if *self.rx.borrow() {
                return;
            }
        }
        // sender dropped without signaling
        std::future::pending::<()>().await;
    }

    pub fn is_stopped(&self) -> bool {
        *self.rx.borrow()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
