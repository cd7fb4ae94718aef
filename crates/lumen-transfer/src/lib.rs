//! lumen-transfer — sender and receiver halves of the optical link.
//!
//! The sender turns a file into a repeating cycle of fragment lines and
//! hands each one to a [`capability::SymbolRenderer`]. The receiver
//! pulls decoded text out of camera frames via a
//! [`capability::SymbolDecoder`] and folds it into a [`Reassembler`]
//! until the file is whole. Neither half knows anything about pixels;
//! QR rendering and detection live behind the capability traits.

pub mod broadcaster;
pub mod capability;
pub mod control;
pub mod encoder;
pub mod reassembly;
pub mod scanner;

pub use broadcaster::Broadcaster;
pub use capability::{CapturedFrame, FrameSource, SymbolDecoder, SymbolRenderer};
pub use control::{stop_channel, StopHandle, StopSignal};
pub use encoder::{encode, EncodedTransfer};
pub use reassembly::{FinishedPayload, Reassembler, ReceiveError};
pub use scanner::{scan_loop, Scanner};
