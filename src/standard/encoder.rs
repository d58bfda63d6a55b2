//! Stereo encoder for the standard (16-bit codeword) variant.
//!
//! One call consumes 4 PCM samples per channel and emits one 16-bit
//! codeword per channel. The per-block pipeline order is part of the wire
//! contract: dither generation, QMF analysis, quantization, cross-channel
//! sync adjustment, local decode (predictor update), packing, and finally
//! the optional byte rotation. Prediction state only advances after the
//! sync inserter has had its chance to swap an index.

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
pub const BUILD_NAME: &str = "bt-aptX-4.2.2";
/// Reference library version this encoder is wire-compatible with.
pub const VERSION: &str = "4.2.2";

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

    /// Serializes the channel's four indices into the 7+4+2+3 bit layout,
    /// forcing the HH field's low bit to the channel parity.
    fn pack_codeword(&self) -> u16 {
        let q = &self.quantizers;
        let parity =
            1 & (q[0].index ^ q[1].index ^ q[2].index ^ q[3].index ^ self.dither_sign);
        ((q[0].index & 0x7F)
            | (q[1].index & 0x0F) << 7
            | (q[2].index & 0x03) << 11
            | ((q[3].index & 0x06) | parity) << 13) as u16
    }
}

/// Stereo apt-X encoder producing one 16-bit codeword per channel per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AptxEncoder {
    channels: [SubbandEncoder; 2],
    analyzers: [QmfAnalyzer; 2],
    rotation: u32,
    sync: i32,
}

impl AptxEncoder {
    /// Creates a zero-state encoder. With `swap` set, every emitted codeword
    /// is byte-swapped for little-endian transports.
    pub fn new(swap: bool) -> Self {
        debug!("standard encoder init, swap={swap}");
        Self {
            channels: [SubbandEncoder::new(), SubbandEncoder::new()],
            analyzers: [QmfAnalyzer::new(), QmfAnalyzer::new()],
            rotation: if swap { 8 } else { 0 },
            sync: 7,
        }
    }

    /// Encodes one 4-sample stereo block. Samples carry 16 significant bits
    /// in the low end of each word.
    pub fn encode_stereo(&mut self, left: &[i32; 4], right: &[i32; 4]) -> [u16; 2] {
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
    pub fn encode_blocks(&mut self, left: &[i32], right: &[i32], codewords: &mut [u16]) -> usize {
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

    fn rotate(&self, word: u16) -> u16 {
        (word >> self.rotation) | (word << self.rotation)
    }

    /// Read access to one channel's subband state, for inspection and tests.
    pub fn channel(&self, index: usize) -> &SubbandEncoder {
        &self.channels[index]
    }
}

#[cfg(test)]
mod tests {
    use super::AptxEncoder;

    #[test]
    fn first_zero_block_matches_the_fixed_startup_codeword() {
        // On a fresh encoder the dither history is zero, every quantization
        // factor is zero, and the step search therefore saturates at the top
        // of each table: indices 63/7/1/3, all parities even, no sync
        // correction at countdown 7. Packing those indices gives 0x4BBF on
        // both channels.
        let mut encoder = AptxEncoder::new(false);
        let pair = encoder.encode_stereo(&[0; 4], &[0; 4]);
        assert_eq!(pair, [0x4BBF, 0x4BBF]);
    }

    #[test]
    fn swap_flag_byte_swaps_every_codeword() {
        let mut plain = AptxEncoder::new(false);
        let mut swapped = AptxEncoder::new(true);
        for block in 0..64i32 {
            let left = [block * 257, -block * 31, block * 7, 12_345 - block];
            let right = [-block * 129, block * 65, -block, block - 20_000];
            let expected = plain
                .encode_stereo(&left, &right)
                .map(|word| word.rotate_left(8));
            assert_eq!(swapped.encode_stereo(&left, &right), expected);
        }
    }

    #[test]
    fn packed_fields_stay_inside_sixteen_bits() {
        let mut encoder = AptxEncoder::new(false);
        for block in 0..256i32 {
            let left = [
                (block * 1_103) & 0xFFFF,
                (-block * 977) & 0xFFFF,
                (block * 31) & 0xFFFF,
                (block * 7 - 9) & 0xFFFF,
            ];
            let right = [
                (block * 911) & 0xFFFF,
                (block * 13) & 0xFFFF,
                (-block * 3) & 0xFFFF,
                block & 0xFFFF,
            ];
            // u16 return type already enforces the width; this exercises the
            // packer across many index combinations for panics.
            let _ = encoder.encode_stereo(&left, &right);
        }
    }
}
