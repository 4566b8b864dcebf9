//! Frame encoder/decoder tests
use libvadpcm::{
    decode_frame, encode_frame, expand_codebook, FrameHistory, PredictionMatrix, VadpcmError,
};

const REFERENCE_TABLE: [u16; 16] = [
    0xFAE2, 0xFAD0, 0xFE04, 0x014F, 0x0298, 0x01CB, 0x0029, 0xFF03, 0x081C, 0x031A, 0xFDF5,
    0xFBF2, 0xFD32, 0xFFC1, 0x018B, 0x01B9,
];

fn reference_matrix() -> PredictionMatrix {
    let bytes: Vec<u8> = REFERENCE_TABLE.iter().flat_map(|v| v.to_be_bytes()).collect();
    expand_codebook(2, 1, &bytes).unwrap()
}

fn zero_matrix() -> PredictionMatrix {
    expand_codebook(2, 1, &[0; 32]).unwrap()
}

fn sine_block(offset: usize, amplitude: f64) -> [i16; 16] {
    let mut block = [0i16; 16];
    for (i, s) in block.iter_mut().enumerate() {
        let t = (offset + i) as f64;
        *s = (amplitude * (t * 0.07).sin()) as i16;
    }
    block
}

// ============================================================================
// Decoder
// ============================================================================

#[test]
fn test_zero_frame_decodes_to_silence() {
    let frame = decode_frame(&reference_matrix(), &FrameHistory::new(), &[0; 9]).unwrap();
    assert_eq!(frame.samples(), &[0; 16]);
    assert_eq!(frame.consumed, 9);
    assert!(!frame.end_of_stream);
}

#[test]
fn test_decode_is_idempotent() {
    let matrix = reference_matrix();
    let mut history = FrameHistory::new();
    history.0[14] = 1200;
    history.0[15] = -900;
    let input = [0x43, 0x12, 0x9F, 0x70, 0x08, 0xEE, 0x31, 0x5A, 0xC4];

    let a = decode_frame(&matrix, &history, &input).unwrap();
    let b = decode_frame(&matrix, &history, &input).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_residuals_scaled_by_header() {
    // zero predictor: output is just the scaled residuals
    let input = [0x30, 0x7F, 0x80, 0, 0, 0, 0, 0, 0x01];
    let frame = decode_frame(&zero_matrix(), &FrameHistory::new(), &input).unwrap();
    let samples = frame.samples();
    assert_eq!(samples[0], 7 * 8);
    assert_eq!(samples[1], -8);
    assert_eq!(samples[2], -8 * 8);
    assert_eq!(samples[3], 0);
    assert_eq!(samples[15], 8);
}

#[test]
fn test_negative_division_rounds_down() {
    // one feedback coefficient of 1 (1/2048) against a feedback of -1
    let mut table = [0u8; 32];
    table[16..18].copy_from_slice(&1i16.to_be_bytes());
    let matrix = expand_codebook(2, 1, &table).unwrap();

    let mut history = FrameHistory::new();
    history.0[15] = -1;
    let frame = decode_frame(&matrix, &history, &[0; 9]).unwrap();
    // truncation would give 0
    assert_eq!(frame.samples()[0], -1);

    history.0[15] = 1;
    let frame = decode_frame(&matrix, &history, &[0; 9]).unwrap();
    assert_eq!(frame.samples()[0], 0);
}

#[test]
fn test_feedback_uses_previous_frame_tail() {
    let matrix = reference_matrix();
    let mut history = FrameHistory::new();
    history.0[0] = 30000; // outside the feedback window
    let a = decode_frame(&matrix, &history, &[0; 9]).unwrap();
    let b = decode_frame(&matrix, &FrameHistory::new(), &[0; 9]).unwrap();
    assert_eq!(a.samples(), b.samples());
}

#[test]
fn test_unknown_predictor() {
    let result = decode_frame(&reference_matrix(), &FrameHistory::new(), &[0x01; 9]);
    assert!(matches!(result, Err(VadpcmError::UnsupportedFormat(_))));
}

#[test]
fn test_past_end_reads_zero() {
    let frame = decode_frame(&zero_matrix(), &FrameHistory::new(), &[]).unwrap();
    assert!(frame.end_of_stream);
    assert_eq!(frame.consumed, 0);
    assert_eq!(frame.samples(), &[0; 16]);
}

// ============================================================================
// Encoder
// ============================================================================

#[test]
fn test_encoder_matches_decoder() {
    let matrix = reference_matrix();
    let mut enc_history = FrameHistory::new();
    let mut dec_history = FrameHistory::new();

    for n in 0..40 {
        let block = sine_block(n * 16, 9000.0);
        let encoded = encode_frame(&matrix, &enc_history, &block).unwrap();
        let decoded = decode_frame(&matrix, &dec_history, &encoded.bytes).unwrap();

        assert_eq!(decoded.history, encoded.history, "frame {} diverged", n);
        enc_history = encoded.history;
        dec_history = decoded.history;
    }
}

#[test]
fn test_header_byte_layout() {
    let encoded = encode_frame(&zero_matrix(), &FrameHistory::new(), &[100; 16]).unwrap();
    assert_eq!(encoded.bytes[0] >> 4, encoded.scale);
    assert_eq!(encoded.bytes[0] & 0xF, encoded.predictor);
    assert!(encoded.max_clip <= 2);
}

#[test]
fn test_clipping_error_is_fed_back() {
    // a step far bigger than 7 * 2^scale at low scales
    let mut block = [0i16; 16];
    block[8..].fill(20000);
    let matrix = reference_matrix();
    let encoded = encode_frame(&matrix, &FrameHistory::new(), &block).unwrap();
    let decoded = decode_frame(&matrix, &FrameHistory::new(), &encoded.bytes).unwrap();
    assert_eq!(decoded.history, encoded.history);
}

#[test]
fn test_extreme_codebook_saturates() {
    // predictions grow far past i32 with full-scale coefficients
    let mut bytes = vec![0x7F; 32];
    bytes.extend_from_slice(&[0x80; 32]);
    let matrix = expand_codebook(2, 2, &bytes).unwrap();
    let mut enc_history = FrameHistory::new();
    let mut dec_history = FrameHistory::new();

    for n in 0..20 {
        let block = sine_block(n * 16, 32000.0);
        let encoded = encode_frame(&matrix, &enc_history, &block).unwrap();
        assert!(encoded.scale <= 12);
        let decoded = decode_frame(&matrix, &dec_history, &encoded.bytes).unwrap();
        enc_history = encoded.history;
        dec_history = decoded.history;
    }
}

#[test]
fn test_silence_roundtrip_exact() {
    let encoded = encode_frame(&reference_matrix(), &FrameHistory::new(), &[0; 16]).unwrap();
    assert_eq!(encoded.bytes, [0; 9]);
    assert_eq!(encoded.history.samples(), &[0; 16]);
}
