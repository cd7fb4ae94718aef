//! lumen-core — wire grammar, checksums, codec, and configuration.
//! Both ends of the optical link depend on this crate.

pub mod codec;
pub mod config;
pub mod wire;

pub use codec::{BrotliCodec, Codec, CodecError, IdentityCodec};
pub use config::{ForeignNoncePolicy, TransferConfig};
pub use wire::{Fragment, ParseError, TransferId};
