//! Synchronization bit embedding across the two channels.
//!
//! Every codeword carries one parity bit derived from the channel's four
//! quantization indices and its dither sign. A decoder resynchronizes
//! mid-stream by watching the combined parity of consecutive codeword pairs:
//! over any window of eight pairs it must read exactly one `1` followed by
//! seven `0`s. The encoder enforces that pattern before packing: when the
//! natural parity of a block disagrees with the pattern, it flips the one
//! quantizer whose recorded cost is smallest to that quantizer's alternate
//! index, which differs by a single magnitude step and therefore flips the
//! parity while adding the least quantization error.

use log::trace;

use crate::params::subband;
use crate::quantizer::QuantizerState;

/// Candidate scan order: mid subbands first, HH last. The scan starts on the
/// second channel, so with equal costs the right channel is perturbed.
const SCAN_ORDER: [usize; 4] = [subband::LH, subband::HL, subband::LL, subband::HH];

/// Combined parity bit of both channels' indices and dither signs.
fn stereo_parity(
    first: &[QuantizerState; 4],
    first_dither_sign: i32,
    second: &[QuantizerState; 4],
    second_dither_sign: i32,
) -> i32 {
    let mut parity = first_dither_sign ^ second_dither_sign;
    for subband in 0..4 {
        parity ^= first[subband].index ^ second[subband].index;
    }
    parity & 1
}

/// Adjusts at most one quantizer so the block parity follows the sync
/// pattern, then advances the pattern countdown.
///
/// The countdown cycles 7 → 0; the expected parity is `1` only at zero.
/// Returns the new countdown value.
pub fn insert_sync(
    first: &mut [QuantizerState; 4],
    first_dither_sign: i32,
    second: &mut [QuantizerState; 4],
    second_dither_sign: i32,
    countdown: &mut i32,
) -> i32 {
    let parity = stereo_parity(first, first_dither_sign, second, second_dither_sign);
    let expected = (1 >> *countdown) & 1;

    if parity != expected {
        // Strict comparisons keep the earliest candidate on ties.
        let mut in_second = true;
        let mut chosen = SCAN_ORDER[0];
        let mut cost = second[chosen].cost;
        for subband in SCAN_ORDER {
            if second[subband].cost < cost {
                cost = second[subband].cost;
                chosen = subband;
                in_second = true;
            }
        }
        for subband in SCAN_ORDER {
            if first[subband].cost < cost {
                cost = first[subband].cost;
                chosen = subband;
                in_second = false;
            }
        }

        let quantizer = if in_second {
            &mut second[chosen]
        } else {
            &mut first[chosen]
        };
        trace!(
            "sync correction: subband {chosen} ({}) {} -> {}",
            if in_second { "second channel" } else { "first channel" },
            quantizer.index,
            quantizer.alternate,
        );
        quantizer.index = quantizer.alternate;
    }

    *countdown = (*countdown - 1) & 7;
    *countdown
}
