//! Inverse quantizer and adaptive prediction filter for one subband.
//!
//! This is the encoder's embedded local decoder: after each block the chosen
//! quantization index is run back through the inverse quantizer and the
//! prediction filter, so that the next block's prediction is derived from
//! what a real decoder will reconstruct, not from the source signal. Both
//! encoder variants share this algorithm; only the table bundle differs.
//!
//! The inverse quantizer reconstructs an excitation value from the
//! (sign-magnitude) index, the dither word the quantizer saw, and an
//! adaptive quantization factor driven by a leaky integrator over a log-gain
//! curve. The prediction filter tracks the reconstructed signal with a bank
//! of sign-adapted taps plus a second-order blend of two leaky gain
//! accumulators, producing the prediction subtracted by the next QMF
//! analysis.

use crate::math::{clamp24, rshift1, rshift15, rshift32, rshift8};
use crate::params::SubbandParams;
use crate::quantizer::magnitude;

/// Quantization factor curve: `round(2048 * 2^(i/32)) << 11`, one octave in
/// 32 logarithmic steps. The integrator picks the entry and the octave.
pub const LOG_GAIN_TABLE: [i32; 32] = [
    4194304, 4286464, 4380672, 4476928, 4573184, 4673536, 4775936, 4880384,
    4986880, 5097472, 5208064, 5322752, 5439488, 5558272, 5681152, 5804032,
    5931008, 6062080, 6195200, 6330368, 6467584, 6610944, 6754304, 6903808,
    7053312, 7208960, 7366656, 7528448, 7692288, 7860224, 8032256, 8208384,
];

/// Decay of the step-size integrator per sample (out of 1 << 15).
const FACTOR_DECAY: i64 = 32_620;

/// Maximum number of prediction filter taps across all subbands.
pub const MAX_FILTER_WIDTH: usize = 24;

/// Adaptive inverse-quantizer state for one subband.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Inverter {
    /// Current quantization factor, read by the quantizer's search as well.
    pub factor: i32,
    /// Leaky step-size integrator, bounded to the subband's ceiling.
    pub factor_select: i32,
    /// Most recent reconstructed excitation value.
    pub reconstructed: i32,
}

/// Adaptive prediction filter state for one subband.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionFilter {
    /// Active tap count, fixed at construction from the subband params.
    pub width: usize,
    /// Adaptive tap weights.
    pub taps: [i32; MAX_FILTER_WIDTH],
    /// Sign of the most recent prediction error.
    pub sign1: i32,
    /// Sign of the prediction error before that.
    pub sign2: i32,
    /// Slow gain accumulator (decay 255/256), bounded to the complement of
    /// `gain_short` within ±0x3C0000.
    pub gain_long: i32,
    /// Fast gain accumulator (decay 254/256), bounded to ±0x300000.
    pub gain_short: i32,
    /// Reconstructed excitation history, double-written at `pos` and
    /// `pos + width` so a filter window never wraps.
    pub history: [i32; 2 * MAX_FILTER_WIDTH],
    /// Rolling write cursor, advanced modulo `width`.
    pub pos: usize,
    /// Reconstructed subband value of the previous sample.
    pub previous_reconstructed: i32,
    /// Convolution output of the previous sample.
    pub convolution: i32,
    /// Predicted subband value for the next sample.
    pub predicted: i32,
}

impl PredictionFilter {
    /// Creates the zeroed filter for a subband, with unit signs.
    pub fn new(width: usize) -> Self {
        debug_assert!(width <= MAX_FILTER_WIDTH);
        Self {
            width,
            taps: [0; MAX_FILTER_WIDTH],
            sign1: 1,
            sign2: 1,
            gain_long: 0,
            gain_short: 0,
            history: [0; 2 * MAX_FILTER_WIDTH],
            pos: 0,
            previous_reconstructed: 0,
            convolution: 0,
            predicted: 0,
        }
    }
}

/// Filter and inverter pair covering one subband of one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Processor {
    pub filter: PredictionFilter,
    pub inverter: Inverter,
}

impl Processor {
    pub fn new(params: &SubbandParams) -> Self {
        Self {
            filter: PredictionFilter::new(params.filter_width),
            inverter: Inverter::default(),
        }
    }
}

/// Reconstructs the excitation for a quantization index and advances the
/// adaptive quantization factor.
pub fn invert_quantization(
    index: i32,
    dither: i32,
    params: &SubbandParams,
    inverter: &mut Inverter,
) {
    let entry = (magnitude(index) + 1) as usize;
    let step_sign = if index < 0 { -1 } else { 1 };
    let step = step_sign * params.steps[entry];

    let blended = (i64::from(step) << 31) + i64::from(dither) * i64::from(params.dither_scales[entry]);
    let blended = clamp24(rshift32(blended));
    inverter.reconstructed = clamp24((i64::from(blended) * i64::from(inverter.factor)) >> 19);

    let select = FACTOR_DECAY * i64::from(inverter.factor_select)
        + (i64::from(params.increments[entry]) << 15);
    inverter.factor_select = (rshift15(select) as i32).clamp(0, params.factor_ceiling);

    let shift = -3 - params.gain_shift - (inverter.factor_select >> 8);
    debug_assert!((0..32).contains(&shift));
    inverter.factor = LOG_GAIN_TABLE[(inverter.factor_select >> 3) as usize & 0x1F] >> shift;
}

/// Feeds a reconstructed excitation through the tap bank and updates the
/// prediction.
pub fn prediction_filtering(excitation: i32, filter: &mut PredictionFilter) {
    let reconstructed = clamp24(i64::from(excitation) + i64::from(filter.predicted));

    let blend = i64::from(filter.gain_short) * i64::from(filter.previous_reconstructed)
        + i64::from(reconstructed) * i64::from(filter.gain_long);
    let blend = clamp24(blend >> 22);

    // Tap targets: ±(2^23 ± 128) depending on the sign of the history
    // sample, or 128 for a zero excitation.
    let (toward_negative, toward_positive) = if excitation == 0 {
        (128, 128)
    } else if excitation < 0 {
        (8_388_736, -8_388_480)
    } else {
        (-8_388_480, 8_388_736)
    };

    let mut window = filter.pos + filter.width;
    let mut sum: i64 = 0;
    let mut sample = excitation;
    for tap in filter.taps.iter_mut().take(filter.width) {
        let target = if filter.history[window] >= 0 {
            toward_positive
        } else {
            toward_negative
        };
        let step = target - *tap;
        *tap += (step >> 8) - i32::from(step & 0x1FF == 0x100);
        sum += i64::from(sample) * i64::from(*tap);
        sample = filter.history[window];
        window -= 1;
    }

    filter.previous_reconstructed = reconstructed;
    filter.convolution = clamp24(sum >> 22);
    filter.predicted = clamp24(i64::from(filter.convolution) + i64::from(blend));

    filter.pos = (filter.pos + 1) % filter.width;
    filter.history[filter.pos] = excitation;
    filter.history[filter.pos + filter.width] = excitation;
}

/// Runs the full local decode for one subband sample: inverse quantization,
/// sign tracking, gain adaptation and prediction filtering.
pub fn process_subband(
    index: i32,
    dither: i32,
    params: &SubbandParams,
    filter: &mut PredictionFilter,
    inverter: &mut Inverter,
) {
    invert_quantization(index, dither, params, inverter);

    let mut sign1 = filter.sign1;
    let mut sign2 = filter.sign2;
    let error = filter.convolution + inverter.reconstructed;
    if error < 0 {
        sign1 = -sign1;
        sign2 = -sign2;
        filter.sign2 = filter.sign1;
        filter.sign1 = -1;
    } else if error > 0 {
        filter.sign2 = filter.sign1;
        filter.sign1 = 1;
    } else {
        sign1 = 0;
        sign2 = 0;
        filter.sign2 = filter.sign1;
        filter.sign1 = 1;
    }

    let correction = rshift1(-filter.gain_long * sign1).clamp(-0x10_0000, 0x10_0000);

    filter.gain_short =
        rshift8(254 * filter.gain_short + 0x80_0000 * sign2 + ((correction >> 4) << 8))
            .clamp(-0x30_0000, 0x30_0000);
    let long_bound = 0x3C_0000 - filter.gain_short;
    filter.gain_long =
        rshift8(255 * filter.gain_long + 0xC0_0000 * sign1).clamp(-long_bound, long_bound);

    prediction_filtering(inverter.reconstructed, filter);
}
