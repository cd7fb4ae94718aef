//! Lumen wire format — the fragment line carried by each QR symbol.
//!
//! This grammar IS the protocol. Every fragment is one printable-ASCII
//! line, fully self-describing: a receiver that catches any single
//! symbol mid-transfer can parse it without prior context. Changing the
//! field order or the delimiter is a breaking change for every deployed
//! sender.
//!
//! Line layout (seven colon-separated fields):
//!
//! ```text
//! LUMEN1:<transfer 16 hex>:<index>:<total>:<file_name b64>:<checksum 8 hex>:<payload b64>
//! ```
//!
//! The file name and payload are base64 (standard alphabet, padded), so
//! the `:` delimiter can never collide with field content.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine as _;
use bytes::Bytes;

/// Magic-plus-version prefix. A receiver seeing any other prefix drops
/// the line as unrelated QR content.
pub const MAGIC: &str = "LUMEN1";

/// Bytes of checksum carried per fragment (prefix of the BLAKE3 hash).
pub const CHECKSUM_LEN: usize = 4;

// ── Transfer identity ─────────────────────────────────────────────────────

/// Identifier grouping all fragments of one logical transfer.
///
/// Chosen at random once per encode invocation. A receiver locks onto
/// the first transfer it sees and, by default, ignores fragments that
/// carry a different id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransferId([u8; 8]);

impl TransferId {
    /// A fresh random id for a new transfer.
    pub fn fresh() -> Self {
        Self(rand::random())
    }

    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }
}

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for TransferId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = hex::decode(s).map_err(|_| ParseError::Malformed("transfer id"))?;
        let raw: [u8; 8] = raw
            .try_into()
            .map_err(|_| ParseError::Malformed("transfer id length"))?;
        Ok(Self(raw))
    }
}

// ── Fragment ──────────────────────────────────────────────────────────────

/// One self-describing slice of a compressed file.
///
/// All fragments of a transfer share `transfer`, `total`, and
/// `file_name`. The payload is `chunk_size` bytes for every index
/// except possibly the last, which may be shorter. The checksum on the
/// wire covers only this fragment's payload; whole-transfer corruption
/// is caught at decompression time instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub transfer: TransferId,
    /// Position of this slice, `0 <= index < total`.
    pub index: u32,
    /// Number of fragments in the transfer. Always at least 1.
    pub total: u32,
    pub file_name: String,
    pub payload: Bytes,
}

/// Per-fragment payload checksum: the first [`CHECKSUM_LEN`] bytes of
/// the BLAKE3 hash. Detects a garbled or truncated scan, nothing more.
pub fn payload_checksum(payload: &[u8]) -> [u8; CHECKSUM_LEN] {
    let hash = blake3::hash(payload);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&hash.as_bytes()[..CHECKSUM_LEN]);
    out
}

impl Fragment {
    /// Render this fragment as its wire line.
    pub fn to_line(&self) -> String {
        self.to_string()
    }

    /// Parse and validate one scanned text payload.
    ///
    /// Returns [`ParseError::Malformed`] when the text does not match
    /// the grammar (stray QR content is expected and routine) and
    /// [`ParseError::ChecksumMismatch`] when the payload arrived
    /// damaged. Both are non-fatal; callers drop the line and continue.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        line.parse()
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}:{}:{}",
            MAGIC,
            self.transfer,
            self.index,
            self.total,
            B64.encode(self.file_name.as_bytes()),
            hex::encode(payload_checksum(&self.payload)),
            B64.encode(&self.payload),
        )
    }
}

impl FromStr for Fragment {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut fields = line.trim_end_matches(['\r', '\n']).split(':');

        if fields.next() != Some(MAGIC) {
            return Err(ParseError::Malformed("magic prefix"));
        }

        let transfer: TransferId = fields
            .next()
            .ok_or(ParseError::Malformed("missing transfer id"))?
            .parse()?;

        let index: u32 = fields
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or(ParseError::Malformed("index"))?;

        let total: u32 = fields
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or(ParseError::Malformed("total"))?;

        if total == 0 || index >= total {
            return Err(ParseError::Malformed("index out of range"));
        }

        let file_name = fields
            .next()
            .and_then(|s| B64.decode(s).ok())
            .and_then(|raw| String::from_utf8(raw).ok())
            .ok_or(ParseError::Malformed("file name"))?;

        let checksum = fields
            .next()
            .and_then(|s| hex::decode(s).ok())
            .and_then(|raw| <[u8; CHECKSUM_LEN]>::try_from(raw).ok())
            .ok_or(ParseError::Malformed("checksum"))?;

        let payload = fields
            .next()
            .and_then(|s| B64.decode(s).ok())
            .ok_or(ParseError::Malformed("payload"))?;

        if fields.next().is_some() {
            return Err(ParseError::Malformed("trailing fields"));
        }

        let actual = payload_checksum(&payload);
        if actual != checksum {
            return Err(ParseError::ChecksumMismatch {
                expected: hex::encode(checksum),
                actual: hex::encode(actual),
            });
        }

        Ok(Fragment {
            transfer,
            index,
            total,
            file_name,
            payload: Bytes::from(payload),
        })
    }
}

// ── Errors ────────────────────────────────────────────────────────────────

/// Why a scanned text payload was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The text does not match the fragment grammar. Expected whenever
    /// the camera picks up an unrelated QR symbol.
    #[error("malformed fragment line: {0}")]
    Malformed(&'static str),

    /// The grammar matched but the payload checksum did not. The scan
    /// was partial or garbled.
    #[error("payload checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },
}

// ── Tests ─────────────────────────────────────────────────────────────────
