//! Every inspectable accumulator must stay inside the signed 24-bit sample
//! domain after each block, even under adversarial full-scale input.

use aptx::{AptxEncoder, AptxHdEncoder};

const BOUNDS: core::ops::RangeInclusive<i32> = -8_388_608..=8_388_607;

fn assert_standard_state(encoder: &AptxEncoder, block: usize) {
    for channel in 0..2 {
        let state = encoder.channel(channel);
        for (subband, processor) in state.processors.iter().enumerate() {
            assert!(
                BOUNDS.contains(&processor.inverter.reconstructed),
                "block {block} ch {channel} sb {subband}: reconstructed"
            );
            assert!(
                BOUNDS.contains(&processor.filter.predicted),
                "block {block} ch {channel} sb {subband}: predicted"
            );
            assert!(
                BOUNDS.contains(&processor.filter.convolution),
                "block {block} ch {channel} sb {subband}: convolution"
            );
            assert!(
                BOUNDS.contains(&processor.filter.previous_reconstructed),
                "block {block} ch {channel} sb {subband}: reconstructed sample"
            );
        }
    }
}

#[test]
fn standard_accumulators_hold_the_24_bit_invariant() {
    let mut encoder = AptxEncoder::new(false);
    // Alternating full-scale squares are the harshest stimulus for the
    // predictor: maximal residual energy with constant sign flips.
    let patterns: [[i32; 4]; 4] = [
        [32_767, 32_767, -32_768, -32_768],
        [-32_768, 32_767, -32_768, 32_767],
        [32_767, -32_768, -32_768, 32_767],
        [0, -32_768, 32_767, 0],
    ];
    for block in 0..1_024 {
        let left = patterns[block % 4];
        let right = patterns[(block + 2) % 4];
        encoder.encode_stereo(&left, &right);
        assert_standard_state(&encoder, block);
    }
}

#[test]
fn hd_accumulators_hold_the_24_bit_invariant() {
    let mut encoder = AptxHdEncoder::new(false);
    let patterns: [[i32; 4]; 4] = [
        [8_388_607, 8_388_607, -8_388_608, -8_388_608],
        [-8_388_608, 8_388_607, -8_388_608, 8_388_607],
        [8_388_607, -8_388_608, -8_388_608, 8_388_607],
        [0, -8_388_608, 8_388_607, 0],
    ];
    for block in 0..1_024 {
        let left = patterns[block % 4];
        let right = patterns[(block + 2) % 4];
        encoder.encode_stereo(&left, &right);

        for channel in 0..2 {
            let state = encoder.channel(channel);
            for (subband, processor) in state.processors.iter().enumerate() {
                assert!(
                    BOUNDS.contains(&processor.inverter.reconstructed),
                    "block {block} ch {channel} sb {subband}: reconstructed"
                );
                assert!(
                    BOUNDS.contains(&processor.filter.predicted),
                    "block {block} ch {channel} sb {subband}: predicted"
                );
            }
        }
    }
}

#[test]
fn quantizer_costs_stay_non_negative_under_stress() {
    let mut encoder = AptxEncoder::new(false);
    for block in 0..512i32 {
        let left = [
            (block.wrapping_mul(24_571)) & 0xFFFF,
            (block.wrapping_mul(-31_337)) & 0xFFFF,
            32_767,
            -32_768,
        ];
        let right = [-32_768, 32_767, (block * 3) & 0xFFFF, block & 0xFFFF];
        encoder.encode_stereo(&left, &right);
        for channel in 0..2 {
            for quantizer in &encoder.channel(channel).quantizers {
                assert!(quantizer.cost >= 0, "block {block}");
            }
        }
    }
}
