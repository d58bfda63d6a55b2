#![no_main]

use aptx::{AptxEncoder, AptxHdEncoder};
use libfuzzer_sys::fuzz_target;

const INT24_MIN: i32 = -8_388_608;
const INT24_MAX: i32 = 8_388_607;

fn read_block(bytes: &[u8], wide: bool) -> [i32; 4] {
    let mut block = [0i32; 4];
    for (slot, chunk) in block.iter_mut().zip(bytes.chunks(4)) {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        let sample = i32::from_le_bytes(word);
        *slot = if wide {
            sample.clamp(INT24_MIN, INT24_MAX)
        } else {
            sample.clamp(i32::from(i16::MIN), i32::from(i16::MAX))
        };
    }
    block
}

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }
    let swap = data[0] & 1 != 0;
    let mut standard = AptxEncoder::new(swap);
    let mut hd = AptxHdEncoder::new(swap);

    for frame in data[1..].chunks(32) {
        let left = read_block(frame, false);
        let right = read_block(&frame[frame.len().min(16)..], false);
        standard.encode_stereo(&left, &right);

        let left = read_block(frame, true);
        let right = read_block(&frame[frame.len().min(16)..], true);
        let pair = hd.encode_stereo(&left, &right);
        if !swap {
            assert_eq!(pair[0] >> 24, 0);
            assert_eq!(pair[1] >> 24, 0);
        }
    }
});
