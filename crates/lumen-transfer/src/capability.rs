//! Capability traits for the optical boundary.
//!
//! The protocol core never touches pixels. Rendering a symbol, grabbing
//! a camera frame, and finding a QR code inside it are host concerns
//! plugged in through these traits.
//!
//! Intentionally minimal. No lifecycle or negotiation — a renderer
//! shows text, a decoder finds text, a source yields frames.

use bytes::Bytes;

/// Turns one fragment line into a visible symbol.
///
/// Called once per broadcast tick from the sender loop. Implementations
/// should swap the displayed image synchronously; the loop does not
/// wait for confirmation.
pub trait SymbolRenderer: Send + Sync {
    fn render(&self, text: &str);
}

/// Finds at most one QR payload in a captured frame.
///
/// Returning `None` is the common case (no symbol in view, or an
/// undecodable one) and carries no error meaning. A decoder able to
/// find several symbols per frame may be added later; the scan adapter
/// does not assume it.
pub trait SymbolDecoder: Send + Sync {
    fn decode(&self, pixels: &[u8], width: u32, height: u32) -> Option<String>;
}

/// Produces camera frames for the receive loop.
///
/// `capture` is polled once per scan tick and may return `None` when no
/// frame is ready; the tick is simply skipped. The underlying camera
/// resource is released when the source is dropped.
pub trait FrameSource: Send {
    fn capture(&mut self) -> Option<CapturedFrame>;
}

/// One captured camera image, in whatever pixel format the paired
/// [`SymbolDecoder`] expects. The transfer core never inspects it.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    pub width: u32,
    pub height: u32,
    pub pixels: Bytes,
}
