//! apt-X HD variant: 24-bit input samples, 24-bit codewords,
//! 257/33/9/17-entry subband tables.

pub mod encoder;
pub mod qmf;
pub mod quantize;
pub mod tables;

pub use encoder::{AptxHdEncoder, SubbandEncoder, BUILD_NAME, VERSION};
pub use qmf::QmfAnalyzer;
