//! Adaptive residual quantization for the HD variant.
//!
//! Same two-phase structure as the standard variant: step-table search,
//! then a dithered cost pass that picks the index or its lower neighbour and
//! records the alternate. The arithmetic details differ, though: the
//! residual magnitude is clamped to 24 bits before the search, the factor
//! product is truncated (`>> 32`, no rounding) rather than rounded, the
//! final cost rounds through [`rshift3`], and negativity is tested on the
//! sum *before* that rounding. Each of these differences moves single LSBs
//! and is preserved deliberately.

use crate::math::{abs32, clamp24, rshift23, rshift3, rshift32};
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
    let magnitude = clamp24(i64::from(abs32(residual)));
    let index = step_index((magnitude >> 4) as u32, factor, params.steps);

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

    let weighted =
        (i64::from(midpoint.wrapping_mul(16)) * i64::from(factor.wrapping_mul(-256))) >> 32;
    let cost = rshift3(weighted + i64::from(magnitude));

    let mut index = index as i32;
    let mut cost = cost as i32;
    let alternate;
    if weighted + i64::from(magnitude) < 0 {
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
