//! Quantization index search over a monotonic step-size table.
//!
//! The quantizer inverts a scaled residual magnitude into a table index by a
//! stride-halving search: starting from half the table length, each stride is
//! taken whenever `steps[i + n] * (factor << 8)` still fits below
//! `magnitude << 32`. Because strides only ever add, the result is the
//! largest reachable index whose scaled step does not exceed the magnitude,
//! and it is bounded by the sum of the strides, one less than the table
//! length for the 65/9/5-entry tables, so the caller may always read
//! `steps[index + 1]`.
//!
//! The `factor << 8` is computed in wrapping 32-bit arithmetic before
//! widening, matching the reference behaviour for factors near the top of
//! the 24-bit range.

/// Locates the step-table index for a residual `magnitude` (already shifted
/// right by 4) under the current quantization `factor`.
pub fn step_index(magnitude: u32, factor: i32, steps: &[i32]) -> usize {
    let target = i64::from(magnitude) << 32;
    let scaled = i64::from(factor.wrapping_shl(8));

    let mut index = 0;
    let mut stride = steps.len() / 2;
    while stride > 0 {
        if scaled * i64::from(steps[index + stride]) <= target {
            index += stride;
        }
        stride /= 2;
    }
    index
}
