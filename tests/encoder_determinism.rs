use aptx::{AptxEncoder, AptxHdEncoder};

/// Deterministic PCM generator for stimulus; a plain LCG so the tests need
/// no external randomness.
struct Lcg(u32);

impl Lcg {
    fn next(&mut self) -> u32 {
        self.0 = self.0.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        self.0
    }

    fn sample16(&mut self) -> i32 {
        (self.next() >> 16) as i32 - 0x8000
    }

    fn sample24(&mut self) -> i32 {
        (self.next() >> 8) as i32 - 0x80_0000
    }
}

fn block16(lcg: &mut Lcg) -> [i32; 4] {
    [
        lcg.sample16(),
        lcg.sample16(),
        lcg.sample16(),
        lcg.sample16(),
    ]
}

fn block24(lcg: &mut Lcg) -> [i32; 4] {
    [
        lcg.sample24(),
        lcg.sample24(),
        lcg.sample24(),
        lcg.sample24(),
    ]
}

#[test]
fn standard_streams_are_deterministic() {
    let mut first = AptxEncoder::new(false);
    let mut second = AptxEncoder::new(false);
    let mut lcg_a = Lcg(0x1234_5678);
    let mut lcg_b = Lcg(0x1234_5678);

    for _ in 0..512 {
        let (left_a, right_a) = (block16(&mut lcg_a), block16(&mut lcg_a));
        let (left_b, right_b) = (block16(&mut lcg_b), block16(&mut lcg_b));
        assert_eq!(
            first.encode_stereo(&left_a, &right_a),
            second.encode_stereo(&left_b, &right_b),
        );
    }
}

#[test]
fn hd_streams_are_deterministic() {
    let mut first = AptxHdEncoder::new(true);
    let mut second = AptxHdEncoder::new(true);
    let mut lcg_a = Lcg(0xCAFE_F00D);
    let mut lcg_b = Lcg(0xCAFE_F00D);

    for _ in 0..512 {
        let (left_a, right_a) = (block24(&mut lcg_a), block24(&mut lcg_a));
        let (left_b, right_b) = (block24(&mut lcg_b), block24(&mut lcg_b));
        assert_eq!(
            first.encode_stereo(&left_a, &right_a),
            second.encode_stereo(&left_b, &right_b),
        );
    }
}

#[test]
fn variant_identification_strings_are_exposed() {
    assert_eq!(aptx::standard::VERSION, "4.2.2");
    assert_eq!(aptx::hd::VERSION, "1.0.0");
    assert!(aptx::standard::BUILD_NAME.contains("aptX"));
    assert!(aptx::hd::BUILD_NAME.contains("aptX-HD"));
    assert!(!aptx::version().is_empty());
}

#[test]
fn construction_is_idempotent() {
    assert_eq!(AptxEncoder::new(false), AptxEncoder::new(false));
    assert_eq!(AptxEncoder::new(true), AptxEncoder::new(true));
    assert_eq!(AptxHdEncoder::new(false), AptxHdEncoder::new(false));
    assert_eq!(AptxHdEncoder::new(true), AptxHdEncoder::new(true));
    assert_ne!(AptxEncoder::new(false), AptxEncoder::new(true));
}

#[test]
fn zero_input_startup_sequence_is_reproducible() {
    // The first block of a fresh encoder is fully determined by the
    // zero-initialized dither history and the saturating step search; the
    // blocks after that evolve only through the deterministic dither
    // feedback, so two instances must agree on the whole run.
    let mut encoder = AptxEncoder::new(false);
    let mut reference = AptxEncoder::new(false);

    let first = encoder.encode_stereo(&[0; 4], &[0; 4]);
    assert_eq!(first, [0x4BBF, 0x4BBF]);
    assert_eq!(reference.encode_stereo(&[0; 4], &[0; 4]), first);

    for _ in 0..3 {
        let pair = encoder.encode_stereo(&[0; 4], &[0; 4]);
        assert_eq!(pair, reference.encode_stereo(&[0; 4], &[0; 4]));
        // Left and right channels share identical state on identical input.
        assert_eq!(pair[0], pair[1]);
    }
}

#[test]
fn encode_blocks_matches_per_block_calls() {
    let mut streaming = AptxEncoder::new(false);
    let mut blockwise = AptxEncoder::new(false);
    let mut lcg = Lcg(42);

    let left: Vec<i32> = (0..64).map(|_| lcg.sample16()).collect();
    let right: Vec<i32> = (0..64).map(|_| lcg.sample16()).collect();

    let mut codewords = vec![0u16; 32];
    assert_eq!(streaming.encode_blocks(&left, &right, &mut codewords), 32);

    for block in 0..16 {
        let mut left_block = [0; 4];
        let mut right_block = [0; 4];
        left_block.copy_from_slice(&left[4 * block..4 * block + 4]);
        right_block.copy_from_slice(&right[4 * block..4 * block + 4]);
        let pair = blockwise.encode_stereo(&left_block, &right_block);
        assert_eq!(codewords[2 * block], pair[0]);
        assert_eq!(codewords[2 * block + 1], pair[1]);
    }
}
