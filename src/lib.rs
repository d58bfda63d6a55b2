//! Pure Rust implementation of the apt-X and apt-X HD subband audio
//! encoders, bit-compatible with the reverse-engineered reference library.
//!
//! Both encoders consume 4 PCM samples per channel per call and emit one
//! codeword per channel: 16 bits for [`AptxEncoder`], 24 bits (in the low
//! bytes of a `u32`) for [`AptxHdEncoder`]. The engine is `no_std`,
//! allocation-free and deterministic: identical input always produces an
//! identical codeword stream, including the pseudo-random dither (seeded by
//! codeword history alone) and the embedded 8-codeword sync pattern.
//!
//! A single encoder instance is a chain of in-place state mutations and must
//! not be shared across threads; independent instances are fully isolated.

#![no_std]

pub mod dither;
pub mod hd;
pub mod math;
pub mod params;
pub mod processor;
pub mod quantizer;
pub mod search;
pub mod standard;
pub mod sync;

pub use hd::AptxHdEncoder;
pub use standard::AptxEncoder;

/// Returns the crate's textual version identifier.
#[must_use]
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
