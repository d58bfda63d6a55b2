//! Pseudo-random dither derivation from codeword history.
//!
//! The encoder decorrelates its quantization error by adding a small dither
//! word to every subband before quantizing. The dither sequence is not a
//! free-running PRNG: it is seeded purely by the quantization indices already
//! emitted, so an encoder and a decoder that agree on the codeword stream
//! derive the same sequence without any side channel.
//!
//! Every step folds four index bits into a rolling 32-bit history word, then
//! expands the history through a fixed 24-bit multiplier into four dither
//! words of decreasing effective precision (23/18/13/8 fractional bits for
//! the LL/LH/HL/HH subbands) plus a single sign bit used by the parity
//! embedding. All arithmetic deliberately wraps; the history word is a bit
//! reservoir, not a number.

/// Multiplier expanding the codeword history into dither bits.
const DITHER_MULTIPLIER: i64 = 0x4F_1BBB;

/// Dither words and sign derived for one 4-sample block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DitherOutput {
    /// Per-subband dither words, ordered LL, LH, HL, HH.
    pub words: [i32; 4],
    /// Sign bit folded into the codeword parity (0 or 1).
    pub sign: i32,
}

/// Folds the low bits of the three least-significant subband indices into
/// the rolling history word.
///
/// The nibble packs one bit of the HL index, one of the LH index and two of
/// the LL index; negative (one's-complement encoded) indices contribute
/// their stored bit patterns unchanged.
#[inline]
pub fn fold_history(history: i32, ll: i32, lh: i32, hl: i32) -> i32 {
    let nibble = 8 * (hl & 1) + 2 * (lh & 2) + (ll & 3);
    history.wrapping_mul(16).wrapping_add(nibble << 8)
}

/// Expands the current history word into the block's dither words and sign.
pub fn generate(history: i32) -> DitherOutput {
    let wide = DITHER_MULTIPLIER * i64::from(history >> 7);
    let folded = (((wide >> 24) & 0xFF_FFFF) as i32).wrapping_add((wide & 0xFF_FFFF) as i32);
    let seed = (((wide & 0xFF_FFFF) >> 22) as i32).wrapping_add(folded.wrapping_mul(4));

    DitherOutput {
        words: [
            seed.wrapping_shl(23),
            seed.wrapping_shl(18),
            seed.wrapping_shl(13),
            seed.wrapping_shl(8),
        ],
        sign: (folded >> 23) & 1,
    }
}
