//! Receiver-side reassembly state machine.
//!
//! `Empty → Collecting → Complete`, driven one scanned line at a time.
//! The machine tolerates anything the optical channel throws at it:
//! unrelated QR content, garbled scans, duplicates, and fragments from
//! a different transfer. Only two things are fatal: decompression
//! failing once every fragment is present (the transfer must restart
//! under a new id) and a caller taking the result before it exists.

use std::collections::BTreeMap;

use bytes::Bytes;

use lumen_core::codec::{Codec, CodecError};
use lumen_core::config::ForeignNoncePolicy;
use lumen_core::wire::{Fragment, ParseError, TransferId};

/// The reconstructed file, produced exactly once per completed transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedPayload {
    pub data: Bytes,
    pub file_name: String,
}

enum State {
    /// No fragment seen yet. The first valid one, whatever its index,
    /// fixes the transfer id, total, and file name.
    Empty,
    /// Fragments are accumulating. `slots` maps index to payload and
    /// never holds more than `total` entries.
    Collecting {
        transfer: TransferId,
        total: u32,
        file_name: String,
        slots: BTreeMap<u32, Bytes>,
    },
    /// Terminal. Read-only until consumed by value.
    Complete {
        payload: FinishedPayload,
        total: u32,
    },
}

/// Accumulates fragments until the original file can be reconstructed.
///
/// One instance serves one transfer. After [`Reassembler::into_finished`]
/// the machine is gone; a new transfer needs a fresh instance.
pub struct Reassembler {
    state: State,
    codec: Box<dyn Codec>,
    policy: ForeignNoncePolicy,
}

impl Reassembler {
    pub fn new(codec: Box<dyn Codec>, policy: ForeignNoncePolicy) -> Self {
        Self {
            state: State::Empty,
            codec,
            policy,
        }
    }

    /// Feed one scanned text payload into the machine.
    ///
    /// `Ok(true)` means the line carried a fragment not seen before;
    /// `Ok(false)` means it added nothing (noise, duplicate, foreign
    /// transfer, a header conflicting with the adopted one, or the
    /// machine is already complete). The only error is
    /// [`ReceiveError::TransferCorrupt`]: all fragments were present
    /// but the concatenated buffer failed to decompress. The machine
    /// then stays in its collecting state; progress reads full, but
    /// the transfer can never finish and must be restarted end to end.
    pub fn process_frame(&mut self, raw: &str) -> Result<bool, ReceiveError> {
        let fragment = match Fragment::parse(raw) {
            Ok(fragment) => fragment,
            Err(error @ ParseError::Malformed(_)) => {
                tracing::trace!(%error, "dropping unrecognized symbol text");
                return Ok(false);
            }
            Err(error @ ParseError::ChecksumMismatch { .. }) => {
                tracing::debug!(%error, "dropping damaged fragment");
                return Ok(false);
            }
        };
        self.accept(fragment)
    }

    fn accept(&mut self, fragment: Fragment) -> Result<bool, ReceiveError> {
        match std::mem::replace(&mut self.state, State::Empty) {
            State::Empty => {
                tracing::info!(
                    transfer = %fragment.transfer,
                    file = %fragment.file_name,
                    fragments = fragment.total,
                    "transfer started"
                );
                self.adopt(fragment)
            }

            State::Collecting {
                transfer,
                total,
                file_name,
                mut slots,
            } => {
                if fragment.transfer != transfer {
                    return match self.policy {
                        ForeignNoncePolicy::Ignore => {
                            tracing::debug!(
                                active = %transfer,
                                foreign = %fragment.transfer,
                                "ignoring fragment from foreign transfer"
                            );
                            self.state = State::Collecting {
                                transfer,
                                total,
                                file_name,
                                slots,
                            };
                            Ok(false)
                        }
                        ForeignNoncePolicy::Reset => {
                            tracing::info!(
                                abandoned = %transfer,
                                adopted = %fragment.transfer,
                                "new transfer id seen, resetting"
                            );
                            self.adopt(fragment)
                        }
                    };
                }

                // The transfer id is visible on the sender's screen, so
                // a matching id proves nothing about the rest of the
                // header. Geometry and name are fixed by the adopted
                // fragment; anything inconsistent is dropped, which
                // also keeps every stored index below `total`.
                if fragment.total != total || fragment.file_name != file_name {
                    tracing::debug!(
                        transfer = %transfer,
                        expected_total = total,
                        claimed_total = fragment.total,
                        "dropping fragment with conflicting header"
                    );
                    self.state = State::Collecting {
                        transfer,
                        total,
                        file_name,
                        slots,
                    };
                    return Ok(false);
                }

                if slots.contains_key(&fragment.index) {
                    // duplicate; re-shown fragments are the normal case
                    self.state = State::Collecting {
                        transfer,
                        total,
                        file_name,
                        slots,
                    };
                    return Ok(false);
                }

                slots.insert(fragment.index, fragment.payload);
                self.seal_or_keep_collecting(transfer, total, file_name, slots)?;
                Ok(true)
            }

            State::Complete { payload, total } => {
                self.state = State::Complete { payload, total };
                Ok(false)
            }
        }
    }

    /// Enter `Collecting` from this fragment's header fields.
    fn adopt(&mut self, fragment: Fragment) -> Result<bool, ReceiveError> {
        let mut slots = BTreeMap::new();
        let (transfer, total, file_name) =
            (fragment.transfer, fragment.total, fragment.file_name);
        slots.insert(fragment.index, fragment.payload);
        self.seal_or_keep_collecting(transfer, total, file_name, slots)?;
        Ok(true)
    }

    /// If every index is present, decompress and go terminal; otherwise
    /// remain collecting. On decompression failure the collected slots
    /// are kept so progress stays observable, but the state can never
    /// seal.
    fn seal_or_keep_collecting(
        &mut self,
        transfer: TransferId,
        total: u32,
        file_name: String,
        slots: BTreeMap<u32, Bytes>,
    ) -> Result<(), ReceiveError> {
        if slots.len() < total as usize {
            self.state = State::Collecting {
                transfer,
                total,
                file_name,
                slots,
            };
            return Ok(());
        }

        // BTreeMap iteration is ascending by index
        let mut compressed = Vec::with_capacity(slots.values().map(Bytes::len).sum());
        for payload in slots.values() {
            compressed.extend_from_slice(payload);
        }

        match self.codec.decompress(&compressed) {
            Ok(data) => {
                tracing::info!(
                    transfer = %transfer,
                    file = %file_name,
                    bytes = data.len(),
                    "transfer complete"
                );
                self.state = State::Complete {
                    payload: FinishedPayload {
                        data: Bytes::from(data),
                        file_name,
                    },
                    total,
                };
                Ok(())
            }
            Err(source) => {
                tracing::error!(
                    transfer = %transfer,
                    error = %source,
                    "all fragments present but decompression failed; \
                     transfer must restart under a new id"
                );
                self.state = State::Collecting {
                    transfer,
                    total,
                    file_name,
                    slots,
                };
                Err(ReceiveError::TransferCorrupt(source))
            }
        }
    }

    /// `(received, total)`. `(0, 0)` until the first fragment arrives.
    pub fn progress(&self) -> (usize, usize) {
        match &self.state {
            State::Empty => (0, 0),
            State::Collecting { total, slots, .. } => (slots.len(), *total as usize),
            State::Complete { total, .. } => (*total as usize, *total as usize),
        }
    }

    /// Indices not yet received, ascending. Empty in `Empty` and
    /// `Complete`.
    pub fn missing_indices(&self) -> Vec<u32> {
        match &self.state {
            State::Collecting { total, slots, .. } => {
                (0..*total).filter(|i| !slots.contains_key(i)).collect()
            }
            _ => Vec::new(),
        }
    }

    /// File name of the active transfer, once known.
    pub fn file_name(&self) -> Option<&str> {
        match &self.state {
            State::Empty => None,
            State::Collecting { file_name, .. } => Some(file_name),
            State::Complete { payload, .. } => Some(&payload.file_name),
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, State::Complete { .. })
    }

    /// Consume the machine and take the reconstructed file.
    ///
    /// Taking by value makes "take twice" unrepresentable; taking
    /// before completion is the one remaining contract violation and
    /// fails with [`ReceiveError::InvalidState`].
    pub fn into_finished(self) -> Result<FinishedPayload, ReceiveError> {
        match self.state {
            State::Complete { payload, .. } => Ok(payload),
            State::Empty => Err(ReceiveError::InvalidState("no transfer seen yet")),
            State::Collecting { .. } => Err(ReceiveError::InvalidState("transfer incomplete")),
        }
    }
}

// ── Errors ────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ReceiveError {
    /// Every fragment arrived and passed its checksum, yet the combined
    /// buffer is not a valid compressed stream. With no return channel
    /// there is nothing to re-request; the whole transfer must restart.
    #[error("reassembled transfer is corrupt")]
    TransferCorrupt(#[source] CodecError),

    /// Caller contract violation, not a transfer failure.
    #[error("invalid state: {0}")]
    InvalidState(&'static str),
}

// ── Tests ─────────────────────────────────────────────────────────────────
