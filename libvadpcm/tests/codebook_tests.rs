//! Codebook expansion tests
use libvadpcm::{expand_codebook, CodebookChunk, VadpcmError};

const REFERENCE_TABLE: [u16; 16] = [
    0xFAE2, 0xFAD0, 0xFE04, 0x014F, 0x0298, 0x01CB, 0x0029, 0xFF03, 0x081C, 0x031A, 0xFDF5,
    0xFBF2, 0xFD32, 0xFFC1, 0x018B, 0x01B9,
];

fn reference_bytes() -> Vec<u8> {
    REFERENCE_TABLE.iter().flat_map(|v| v.to_be_bytes()).collect()
}

// ============================================================================
// Expansion
// ============================================================================

#[test]
fn test_reference_matrix_rows() {
    let matrix = expand_codebook(2, 1, &reference_bytes()).unwrap();
    assert_eq!(matrix.width(), 10);

    let row = |r: usize| -> Vec<u16> { (0..10).map(|c| matrix.get(0, r, c) as u16).collect() };

    assert_eq!(row(0), vec![0xFAE2, 0x081C, 0x0800, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(
        row(7),
        vec![0xFF03, 0x01B9, 0x018B, 0xFFC1, 0xFD32, 0xFBF2, 0xFDF5, 0x031A, 0x081C, 0x0800]
    );
}

#[test]
fn test_first_columns_are_column_major() {
    let matrix = expand_codebook(2, 1, &reference_bytes()).unwrap();
    for row in 0..8 {
        assert_eq!(matrix.get(0, row, 0) as u16, REFERENCE_TABLE[row]);
        assert_eq!(matrix.get(0, row, 1) as u16, REFERENCE_TABLE[8 + row]);
    }
}

#[test]
fn test_expansion_is_deterministic() {
    let a = expand_codebook(2, 1, &reference_bytes()).unwrap();
    let b = expand_codebook(2, 1, &reference_bytes()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_upper_right_is_zero() {
    let matrix = expand_codebook(2, 1, &reference_bytes()).unwrap();
    for row in 0..8 {
        // the diagonal carries 2048, nothing above it
        assert_eq!(matrix.get(0, row, 2 + row), 2048);
        for col in 3 + row..10 {
            assert_eq!(matrix.get(0, row, col), 0);
        }
    }
}

#[test]
fn test_order_one() {
    let coefs: Vec<i16> = (1..=8).map(|i| i * 100).collect();
    let codebook = CodebookChunk::from_coefficients(1, &coefs).unwrap();
    let matrix = codebook.matrix();
    assert_eq!(matrix.width(), 9);
    assert_eq!(matrix.get(0, 3, 0), 400);
    // row 2, residual 0 uses row 1's feedback coefficient
    assert_eq!(matrix.get(0, 2, 1), 200);
}

#[test]
fn test_table_too_short() {
    let result = expand_codebook(2, 1, &[0; 30]);
    assert!(matches!(result, Err(VadpcmError::MalformedContainer(_))));
}

// ============================================================================
// Codebook chunk construction
// ============================================================================

#[test]
fn test_from_coefficients_matches_raw_table() {
    let coefs: Vec<i16> = REFERENCE_TABLE.iter().map(|&v| v as i16).collect();
    let from_coefs = CodebookChunk::from_coefficients(2, &coefs).unwrap();
    let from_bytes = CodebookChunk::new(2, 1, reference_bytes()).unwrap();
    assert_eq!(from_coefs, from_bytes);
    assert_eq!(from_coefs.predictors(), 1);
    assert_eq!(from_coefs.ck_size(), 22 + 32);
}

#[test]
fn test_shape_limits() {
    assert!(matches!(
        CodebookChunk::new(0, 1, vec![]),
        Err(VadpcmError::UnsupportedFormat(_))
    ));
    assert!(matches!(
        CodebookChunk::new(2, 9, vec![0; 2 * 9 * 16]),
        Err(VadpcmError::UnsupportedFormat(_))
    ));
    assert!(matches!(
        CodebookChunk::from_coefficients(2, &[0; 17]),
        Err(VadpcmError::UnsupportedFormat(_))
    ));
    assert!(CodebookChunk::new(8, 8, vec![0; 8 * 8 * 16]).is_ok());
}
