//! VADPCM frame codec
//!
//! Each frame holds 16 samples in 9 bytes: a header byte `(scale << 4) | predictor`
//! then 8 bytes of packed signed nibbles. Prediction runs over two rows of 8
//! samples with a fixed-point (1/2048) coefficient matrix expanded from the codebook.

pub mod codebook;
pub mod decoder;
pub mod encoder;

pub use codebook::{expand_codebook, PredictionMatrix};
pub use decoder::{decode_frame, DecodedFrame, FrameCursor};
pub use encoder::{encode_frame, EncodedFrame};

use crate::core::audio_constants::FRAME_SAMPLES;

/// longest supported feedback window
pub const MAX_ORDER: usize = 8;

/// most predictors a codebook may hold
pub const MAX_PREDICTORS: usize = 8;

/// largest scale exponent the encoder tries
pub const MAX_SCALE: u8 = 12;

/// samples per prediction row
pub const ROW_SAMPLES: usize = 8;

/// fixed-point shift of the coefficient matrix (2048 = 1.0)
pub const COEF_SHIFT: u32 = 11;
pub const COEF_ONE: i32 = 1 << COEF_SHIFT;

/// previous frame's 16 outputs, the feedback is its tail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameHistory(pub [i32; FRAME_SAMPLES]);

impl FrameHistory {
    /// silence, used before frame 0
    pub fn new() -> Self {
        FrameHistory([0; FRAME_SAMPLES])
    }

    /// history seeded from a stored loop state
    pub fn from_state(state: &[i16; FRAME_SAMPLES]) -> Self {
        let mut out = [0i32; FRAME_SAMPLES];
        for (dst, &src) in out.iter_mut().zip(state.iter()) {
            *dst = src as i32;
        }
        FrameHistory(out)
    }

    /// last `order` samples, oldest first
    pub fn feedback(&self, order: usize) -> &[i32] {
        &self.0[FRAME_SAMPLES - order..]
    }

    /// saturated copy for storing in a loop descriptor
    pub fn to_state(&self) -> [i16; FRAME_SAMPLES] {
        let mut out = [0i16; FRAME_SAMPLES];
        for (dst, &src) in out.iter_mut().zip(self.0.iter()) {
            *dst = crate::core::audio_constants::clamp_i16(src);
        }
        out
    }

    pub fn samples(&self) -> &[i32; FRAME_SAMPLES] {
        &self.0
    }
}

/// divide by 2048 rounding toward negative infinity, saturating to i32
#[inline]
pub(crate) fn floor_div_coef(acc: i64) -> i32 {
    acc.div_euclid(COEF_ONE as i64)
        .clamp(i32::MIN as i64, i32::MAX as i64) as i32
}
