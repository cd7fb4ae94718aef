//! Receiver-side scan adapter.
//!
//! Per capture tick: ask the symbol decoder for at most one text
//! payload, feed it through the reassembler, report how many lines were
//! newly accepted. A tick that returns 0 produced no new information
//! and should not disturb UI state beyond reaffirming progress.

use std::sync::Arc;
use std::time::Duration;

use tokio::time;

use crate::capability::{CapturedFrame, FrameSource, SymbolDecoder};
use crate::control::StopSignal;
use crate::reassembly::{FinishedPayload, Reassembler, ReceiveError};

/// Couples a [`Reassembler`] to the external symbol-decode capability.
pub struct Scanner {
    reassembler: Reassembler,
    decoder: Arc<dyn SymbolDecoder>,
}

impl Scanner {
    pub fn new(reassembler: Reassembler, decoder: Arc<dyn SymbolDecoder>) -> Self {
        Self {
            reassembler,
            decoder,
        }
    }

    /// Process one captured frame. Returns how many decoded payloads
    /// were newly accepted (0 or 1 with a single-symbol decoder).
    pub fn scan(&mut self, frame: &CapturedFrame) -> Result<usize, ReceiveError> {
        let mut accepted = 0;

        if let Some(text) = self
            .decoder
            .decode(&frame.pixels, frame.width, frame.height)
        {
            if self.reassembler.process_frame(&text)? {
                accepted += 1;
            }
        }

        Ok(accepted)
    }

    pub fn progress(&self) -> (usize, usize) {
        self.reassembler.progress()
    }

    pub fn missing_indices(&self) -> Vec<u32> {
        self.reassembler.missing_indices()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.reassembler.file_name()
    }

    pub fn is_finished(&self) -> bool {
        self.reassembler.is_finished()
    }

    /// Consume the scanner and take the reconstructed file. Same
    /// contract as [`Reassembler::into_finished`].
    pub fn into_finished(self) -> Result<FinishedPayload, ReceiveError> {
        self.reassembler.into_finished()
    }
}

/// Drive a [`Scanner`] from a frame source at a fixed cadence.
///
/// Returns `Ok(Some(payload))` once the transfer completes and
/// `Ok(None)` if stopped first. A `TransferCorrupt` error ends the loop
/// immediately; the caller must restart the whole transfer. All
/// reassembler mutation happens inside this single loop, one tick at a
/// time, so no lock guards the state.
pub async fn scan_loop(
    mut scanner: Scanner,
    mut source: Box<dyn FrameSource>,
    interval: Duration,
    mut stop: StopSignal,
) -> Result<Option<FinishedPayload>, ReceiveError> {
    let mut interval = time::interval(interval);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let Some(frame) = source.capture() else {
                    // camera not ready this tick
                    continue;
                };

                if scanner.scan(&frame)? > 0 {
                    let (received, total) = scanner.progress();
                    tracing::info!(received, total, "fragment accepted");
                }

                if scanner.is_finished() {
                    return Ok(Some(scanner.into_finished()?));
                }
            }
            _ = stop.stopped() => {
                let (received, total) = scanner.progress();
                tracing::info!(received, total, "scan loop stopped before completion");
                return Ok(None);
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
