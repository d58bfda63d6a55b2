//! Adaptive residual quantization for the standard variant.
//!
//! A residual quantizes in two phases: the step-table search brackets its
//! scaled magnitude, then the dithered cost pass decides whether the
//! bracketed index or its lower neighbour is the better fit and records the
//! loser as the alternate for the sync inserter. The cost combines the
//! dither-energy correction (lambda-weighted), the interpolated step slope
//! and the quantization-factor contribution, and is finally offset by the
//! residual magnitude; the whole pass rounds with the half-down family from
//! [`crate::math`].
//!
//! This variant rounds the factor product with [`rshift32`] and tests
//! negativity on the *rounded* cost; the HD variant truncates and tests the
//! unrounded sum. The divergence is observable one LSB at a time and both
//! behaviours are deliberate.

use crate::math::{abs32, clamp24, rshift23, rshift32};
use crate::params::SubbandParams;
use crate::quantizer::QuantizerState;
use crate::search::step_index;

/// Quantizes one subband residual under the current quantization factor,
/// leaving index, alternate and cost in `state`.
pub fn quantize_difference(
    residual: i32,
    dither: i32,
    factor: i32,
    params: &SubbandParams,
    state: &mut QuantizerState,
) {
    let index = step_index((abs32(residual) >> 4) as u32, factor, params.steps);

    let step_low = params.steps[index];
    let step_high = params.steps[index + 1];
    let slope = (step_high - step_low) * if residual < 0 { -1 } else { 1 };

    let dither_energy = clamp24(rshift32(
        (i64::from(dither) * i64::from(dither)) >> 7,
    ));
    let lambda_term = rshift23(
        i64::from(0x80_0000 - dither_energy) * i64::from(params.lambdas[index]),
    );
    let midpoint = clamp24(
        rshift32(i64::from(dither) * i64::from(slope))
            + i64::from((step_low + step_high) >> 1)
            + lambda_term,
    );

    let weighted = rshift32(
        i64::from(midpoint.wrapping_shl(4)) * i64::from(factor.wrapping_neg().wrapping_shl(8)),
    ) + i64::from(abs32(residual));
    let cost = ((weighted + 4) >> 3) - i64::from(weighted & 7 == 4);

    let mut index = index as i32;
    let mut cost = cost as i32;
    let alternate;
    if cost < 0 {
        alternate = index;
        index -= 1;
        cost = -cost;
    } else {
        alternate = index - 1;
    }

    if residual < 0 {
        index = !index;
        state.alternate = !alternate;
    } else {
        state.alternate = alternate;
    }
    state.index = index;
    state.cost = cost;
}
