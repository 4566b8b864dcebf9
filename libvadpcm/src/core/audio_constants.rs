/// Maximum positive value for 16-bit signed integer (2^15 - 1)
pub const I16_MAX_F32: f32 = 32767.0;

/// Minimum value for 16-bit signed integer (-2^15)
pub const I16_MIN_F32: f32 = -32768.0;

/// Full-scale factor between f32 and i16 samples (2^15)
pub const I16_FULL_SCALE: f32 = 32768.0;

/// samples per vadpcm frame
pub const FRAME_SAMPLES: usize = 16;

/// bytes per encoded vadpcm frame
pub const FRAME_BYTES: usize = 9;

/// bytes per uncompressed sample
pub const PCM_SAMPLE_BYTES: usize = 2;

/// Convert f32 sample to i16, exact inverse of `i16_to_f32`
#[inline]
pub fn f32_to_i16(sample: f32) -> i16 {
    (sample * I16_FULL_SCALE)
        .round()
        .clamp(I16_MIN_F32, I16_MAX_F32) as i16
}

/// Convert i16 sample to f32
#[inline]
pub fn i16_to_f32(sample: i16) -> f32 {
    sample as f32 / I16_FULL_SCALE
}

/// Saturate a wide sample into i16 range
#[inline]
pub fn clamp_i16(sample: i32) -> i16 {
    sample.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

/// number of frames needed to hold `samples`
#[inline]
pub fn frames_for(samples: usize) -> usize {
    samples.div_ceil(FRAME_SAMPLES)
}
