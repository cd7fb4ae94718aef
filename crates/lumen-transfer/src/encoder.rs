//! Sender-side fragmentation.
//!
//! A file becomes one compressed buffer, then a fixed-size split of
//! that buffer, each slice wrapped in a self-describing [`Fragment`].
//! Order of the output is index-ascending, but nothing downstream
//! depends on it; the broadcast repeats forever and the receiver
//! accepts fragments in any order.

use bytes::Bytes;
use lumen_core::codec::Codec;
use lumen_core::config::TransferConfig;
use lumen_core::wire::{Fragment, TransferId};

/// Everything the sender needs to start broadcasting one file.
#[derive(Debug, Clone)]
pub struct EncodedTransfer {
    pub transfer: TransferId,
    pub fragments: Vec<Fragment>,
}

/// Split `data` into broadcast-ready fragments under a fresh transfer id.
///
/// The input is always compressed first, even when compression grows a
/// very small file; one code path beats a size heuristic here. An empty
/// input still yields a single empty fragment, so `total >= 1` holds
/// for every transfer on the wire.
pub fn encode(
    data: &[u8],
    file_name: &str,
    config: &TransferConfig,
    codec: &dyn Codec,
) -> EncodedTransfer {
    assert!(config.chunk_size > 0, "chunk_size must be positive");

    let transfer = TransferId::fresh();
    let compressed = codec.compress(data);

    let mut slices: Vec<&[u8]> = compressed.chunks(config.chunk_size).collect();
    if slices.is_empty() {
        slices.push(&[]);
    }
    let total = slices.len() as u32;

    let fragments = slices
        .into_iter()
        .enumerate()
        .map(|(index, slice)| Fragment {
            transfer,
            index: index as u32,
            total,
            file_name: file_name.to_string(),
            payload: Bytes::copy_from_slice(slice),
        })
        .collect();

    tracing::info!(
        transfer = %transfer,
        file = %file_name,
        raw_bytes = data.len(),
        compressed_bytes = compressed.len(),
        fragments = total,
        "file encoded for broadcast"
    );

    EncodedTransfer {
        transfer,
        fragments,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
