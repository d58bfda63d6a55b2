//! Standard apt-X variant: 16-bit input samples, 16-bit codewords,
//! 65/9/3/5-entry subband tables.

pub mod encoder;
pub mod qmf;
pub mod quantize;
pub mod tables;

pub use encoder::{AptxEncoder, SubbandEncoder, BUILD_NAME, VERSION};
pub use qmf::QmfAnalyzer;
