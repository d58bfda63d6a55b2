//! Stereo encoder for the HD (24-bit codeword) variant.
//!
//! Identical pipeline to the standard variant (dither, QMF, quantization,
//! cross-channel sync adjustment, local decode, packing), with the HD table
//! set, 24-bit input samples and the 9+6+4+5 bit codeword layout held in the
//! low bytes of a `u32`.
//!
//! The byte-swap option reproduces the reference library's defect: the
//! rotation `(w >> 8) | (w << 8)` was lifted verbatim from the 16-bit
//! variant, which byte-swaps a `u16` but scrambles a 24-bit word (the top
//! byte of the `u32` picks up codeword bits instead of zero). Swapped HD
//! output is therefore faithfully "a bloody mess", as the reference comments
//! put it; downstream consumers depend on the scrambled layout, so it is
//! pinned by tests rather than fixed.

use log::debug;

use crate::dither;
use crate::params::SUBBANDS;
use crate::processor::{process_subband, Processor};
use crate::quantizer::QuantizerState;
use crate::sync::insert_sync;

use super::qmf::QmfAnalyzer;
use super::quantize::quantize_difference;
use super::tables::SUBBAND_PARAMS;

/// Build identifier mirroring the reference library surface.
pub const BUILD_NAME: &str = "bt-aptX-HD-1.0.0";
/// Reference library version this encoder is wire-compatible with.
pub const VERSION: &str = "1.0.0";

/// Subband encoding state for one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubbandEncoder {
    pub processors: [Processor; SUBBANDS],
    pub quantizers: [QuantizerState; SUBBANDS],
    pub codeword_history: i32,
    pub dither_sign: i32,
    pub dither: [i32; SUBBANDS],
}

impl Default for SubbandEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SubbandEncoder {
    pub fn new() -> Self {
        Self {
            processors: [
                Processor::new(&SUBBAND_PARAMS[0]),
                Processor::new(&SUBBAND_PARAMS[1]),
                Processor::new(&SUBBAND_PARAMS[2]),
                Processor::new(&SUBBAND_PARAMS[3]),
            ],
            quantizers: [QuantizerState::default(); SUBBANDS],
            codeword_history: 0,
            dither_sign: 0,
            dither: [0; SUBBANDS],
        }
    }

    /// Dither generation, analysis and quantization for one channel block.
    fn encode(&mut self, analyzer: &mut QmfAnalyzer, samples: &[i32; 4]) {
        let predictions = [
            self.processors[0].filter.predicted,
            self.processors[1].filter.predicted,
            self.processors[2].filter.predicted,
            self.processors[3].filter.predicted,
        ];

        self.codeword_history = dither::fold_history(
            self.codeword_history,
            self.quantizers[0].index,
            self.quantizers[1].index,
            self.quantizers[2].index,
        );
        let dither = dither::generate(self.codeword_history);
        self.dither = dither.words;
        self.dither_sign = dither.sign;

        let residuals = analyzer.analyze(samples, &predictions);
        for subband in 0..SUBBANDS {
            quantize_difference(
                residuals[subband],
                self.dither[subband],
                self.processors[subband].inverter.factor,
                &SUBBAND_PARAMS[subband],
                &mut self.quantizers[subband],
            );
        }
    }

    /// Local decode: replays the (possibly sync-adjusted) indices through
    /// the shadow decoder so the next block predicts from reconstructed
    /// state.
    fn update_predictors(&mut self) {
        for subband in 0..SUBBANDS {
            let processor = &mut self.processors[subband];
            process_subband(
                self.quantizers[subband].index,
                self.dither[subband],
                &SUBBAND_PARAMS[subband],
                &mut processor.filter,
                &mut processor.inverter,
            );
        }
    }

    /// Serializes the channel's four indices into the 9+6+4+5 bit layout,
    /// forcing the HH field's low bit to the channel parity.
    fn pack_codeword(&self) -> u32 {
        let q = &self.quantizers;
        let parity =
            1 & (q[0].index ^ q[1].index ^ q[2].index ^ q[3].index ^ self.dither_sign);
        ((q[0].index & 0x1FF)
            | (q[1].index & 0x3F) << 9
            | (q[2].index & 0x0F) << 15
            | ((q[3].index & 0x1E) | parity) << 19) as u32
    }
}

/// Stereo apt-X HD encoder producing one 24-bit codeword per channel per
/// call, held in the low bytes of a `u32`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AptxHdEncoder {
    channels: [SubbandEncoder; 2],
    analyzers: [QmfAnalyzer; 2],
    rotation: u32,
    sync: i32,
}

impl AptxHdEncoder {
    /// Creates a zero-state encoder. See the module docs before enabling
    /// `swap`: the rotation is the reference library's defective one.
    pub fn new(swap: bool) -> Self {
        debug!("hd encoder init, swap={swap}");
        Self {
            channels: [SubbandEncoder::new(), SubbandEncoder::new()],
            analyzers: [QmfAnalyzer::new(), QmfAnalyzer::new()],
            rotation: if swap { 8 } else { 0 },
            sync: 7,
        }
    }

    /// Encodes one 4-sample stereo block. Samples carry 24 significant bits
    /// in the low end of each word.
    pub fn encode_stereo(&mut self, left: &[i32; 4], right: &[i32; 4]) -> [u32; 2] {
        let [channel_left, channel_right] = &mut self.channels;
        let [analyzer_left, analyzer_right] = &mut self.analyzers;

        channel_left.encode(analyzer_left, left);
        channel_right.encode(analyzer_right, right);

        insert_sync(
            &mut channel_left.quantizers,
            channel_left.dither_sign,
            &mut channel_right.quantizers,
            channel_right.dither_sign,
            &mut self.sync,
        );

        channel_left.update_predictors();
        channel_right.update_predictors();

        let left_word = channel_left.pack_codeword();
        let right_word = channel_right.pack_codeword();
        [self.rotate(left_word), self.rotate(right_word)]
    }

    /// Encodes a run of blocks: `left`/`right` hold `4 * n` samples each and
    /// `codewords` receives `2 * n` words as interleaved left/right pairs.
    /// Returns the number of codewords written.
    pub fn encode_blocks(&mut self, left: &[i32], right: &[i32], codewords: &mut [u32]) -> usize {
        assert_eq!(left.len(), right.len(), "channel lengths must match");
        assert!(left.len() % 4 == 0, "sample count must be a multiple of 4");
        let blocks = left.len() / 4;
        assert!(codewords.len() >= 2 * blocks, "codeword buffer too small");

        for block in 0..blocks {
            let start = 4 * block;
            let mut left_block = [0; 4];
            let mut right_block = [0; 4];
            left_block.copy_from_slice(&left[start..start + 4]);
            right_block.copy_from_slice(&right[start..start + 4]);
            let pair = self.encode_stereo(&left_block, &right_block);
            codewords[2 * block] = pair[0];
            codewords[2 * block + 1] = pair[1];
        }
        2 * blocks
    }

    fn rotate(&self, word: u32) -> u32 {
        (word >> self.rotation) | (word << self.rotation)
    }

    /// Read access to one channel's subband state, for inspection and tests.
    pub fn channel(&self, index: usize) -> &SubbandEncoder {
        &self.channels[index]
    }
}
