//! Payload codec — pluggable compression for the optical channel.
//!
//! Fewer bytes means fewer fragments means fewer symbols the camera has
//! to catch, so the sender always compresses before chunking, even when
//! that grows a very small input. Brotli is the production codec; the
//! identity codec exists for tests that need byte-exact fragments.

use std::io::Write;

/// Byte-buffer compressor/decompressor.
///
/// Intentionally minimal. Streaming is an application concern the
/// optical channel cannot use anyway; a transfer is one buffer.
pub trait Codec: Send + Sync {
    fn compress(&self, input: &[u8]) -> Vec<u8>;

    /// Fails with [`CodecError::CorruptData`] when `input` is not a
    /// valid stream for this codec.
    fn decompress(&self, input: &[u8]) -> Result<Vec<u8>, CodecError>;
}

/// Brotli at maximum quality. A transfer is encoded once and displayed
/// thousands of times, so encode speed is irrelevant.
const BROTLI_BUFFER_SIZE: usize = 4096;
const BROTLI_QUALITY: u32 = 11;
const BROTLI_LG_WINDOW: u32 = 22;

/// The default codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrotliCodec;

impl Codec for BrotliCodec {
    fn compress(&self, input: &[u8]) -> Vec<u8> {
        let mut output = Vec::new();
        {
            let mut writer = brotli::CompressorWriter::new(
                &mut output,
                BROTLI_BUFFER_SIZE,
                BROTLI_QUALITY,
                BROTLI_LG_WINDOW,
            );
            // writing into a Vec cannot fail
            writer.write_all(input).expect("write to Vec");
        }
        output
    }

    fn decompress(&self, input: &[u8]) -> Result<Vec<u8>, CodecError> {
        let mut output = Vec::new();
        brotli::BrotliDecompress(&mut &input[..], &mut output)
            .map_err(|source| CodecError::CorruptData { source })?;
        Ok(output)
    }
}

/// No-op codec. Fragment payloads are the raw file bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityCodec;

impl Codec for IdentityCodec {
    fn compress(&self, input: &[u8]) -> Vec<u8> {
        input.to_vec()
    }

    fn decompress(&self, input: &[u8]) -> Result<Vec<u8>, CodecError> {
        Ok(input.to_vec())
    }
}

/// Decompression failure. At the protocol level this means the
/// whole-transfer invariant was violated even though every per-fragment
/// checksum passed; the transfer cannot be recovered.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("input is not a valid compressed stream")]
    CorruptData { source: std::io::Error },
}

// ── Tests ─────────────────────────────────────────────────────────────────
