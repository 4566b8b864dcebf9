use crate::core::audio_constants::{FRAME_BYTES, FRAME_SAMPLES};
use crate::core::types::{VadpcmError, VadpcmResult};

use super::codebook::PredictionMatrix;
use super::{floor_div_coef, FrameHistory, MAX_ORDER, MAX_SCALE, ROW_SAMPLES};

/// clip level at which the scale search stops
const ACCEPTABLE_CLIP: i32 = 2;

/// signed 4-bit range
const NIBBLE_MIN: i32 = -8;
const NIBBLE_MAX: i32 = 7;

/// one encoded frame plus the decoder-visible reconstruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedFrame {
    pub bytes: [u8; FRAME_BYTES],
    /// what a decoder will output for this frame
    pub history: FrameHistory,
    pub scale: u8,
    pub predictor: u8,
    /// largest clamping error of the chosen scale
    pub max_clip: i32,
}

/// encode 16 samples against the previous frame's reconstruction
pub fn encode_frame(
    matrix: &PredictionMatrix,
    history: &FrameHistory,
    input: &[i16; FRAME_SAMPLES],
) -> VadpcmResult<EncodedFrame> {
    let mut samples = [0i32; FRAME_SAMPLES];
    for (dst, &src) in samples.iter_mut().zip(input.iter()) {
        *dst = src as i32;
    }

    let predictor = if matrix.predictors() > 1 {
        best_predictor(matrix, history, &samples)
    } else {
        0
    };

    let mut best: Option<Quantized> = None;
    for scale in 0..=MAX_SCALE {
        let candidate = quantize(matrix, predictor, history, &samples, scale);
        let better = match &best {
            Some(b) => candidate.max_clip < b.max_clip,
            None => true,
        };
        let done = candidate.max_clip <= ACCEPTABLE_CLIP;
        if better {
            best = Some(candidate);
        }
        if done {
            break;
        }
    }

    let best = best.ok_or_else(|| {
        VadpcmError::PreconditionViolated("no quantizer scale accepted for frame".to_string())
    })?;

    let mut bytes = [0u8; FRAME_BYTES];
    bytes[0] = (best.scale << 4) | (predictor as u8 & 0xF);
    for i in 0..ROW_SAMPLES {
        let hi = (best.indices[2 * i] as u8) & 0xF;
        let lo = (best.indices[2 * i + 1] as u8) & 0xF;
        bytes[1 + i] = (hi << 4) | lo;
    }

    Ok(EncodedFrame {
        bytes,
        history: FrameHistory(best.output),
        scale: best.scale,
        predictor: predictor as u8,
        max_clip: best.max_clip,
    })
}

/// predictor with the least unquantized residual energy, first one wins ties
fn best_predictor(
    matrix: &PredictionMatrix,
    history: &FrameHistory,
    samples: &[i32; FRAME_SAMPLES],
) -> usize {
    let order = matrix.order();
    let mut best = 0;
    let mut min_error = f64::MAX;

    for p in 0..matrix.predictors() {
        let mut work = [0i32; MAX_ORDER + ROW_SAMPLES];
        let mut error = 0.0f64;

        for half in 0..2 {
            if half == 0 {
                work[..order].copy_from_slice(history.feedback(order));
            } else {
                work[..order].copy_from_slice(&samples[ROW_SAMPLES - order..ROW_SAMPLES]);
            }

            for i in 0..ROW_SAMPLES {
                let prediction = predict(matrix.row(p, i), &work, order + i);
                let residual = samples[half * ROW_SAMPLES + i].saturating_sub(prediction);
                work[order + i] = residual;
                error += residual as f64 * residual as f64;
            }
        }

        if error < min_error {
            min_error = error;
            best = p;
        }
    }

    best
}

struct Quantized {
    scale: u8,
    indices: [i32; FRAME_SAMPLES],
    output: [i32; FRAME_SAMPLES],
    max_clip: i32,
}

/// quantize both rows at one scale, feeding clamped residuals back like the decoder
fn quantize(
    matrix: &PredictionMatrix,
    predictor: usize,
    history: &FrameHistory,
    samples: &[i32; FRAME_SAMPLES],
    scale: u8,
) -> Quantized {
    let order = matrix.order();
    let step = 1i32 << scale;
    let mut indices = [0i32; FRAME_SAMPLES];
    let mut output = [0i32; FRAME_SAMPLES];
    let mut max_clip = 0;

    for half in 0..2 {
        let mut work = [0i32; MAX_ORDER + ROW_SAMPLES];
        if half == 0 {
            work[..order].copy_from_slice(history.feedback(order));
        } else {
            work[..order].copy_from_slice(&output[ROW_SAMPLES - order..ROW_SAMPLES]);
        }

        for i in 0..ROW_SAMPLES {
            let n = half * ROW_SAMPLES + i;
            let prediction = predict(matrix.row(predictor, i), &work, order + i);
            let residual = samples[n].saturating_sub(prediction);
            let wanted = round_div(residual, scale);
            let clamped = wanted.clamp(NIBBLE_MIN, NIBBLE_MAX);
            max_clip = max_clip.max(clamped.abs_diff(wanted).min(i32::MAX as u32) as i32);

            indices[n] = clamped;
            work[order + i] = clamped * step;
            output[n] = prediction.saturating_add(clamped * step);
        }
    }

    Quantized {
        scale,
        indices,
        output,
        max_clip,
    }
}

/// floor(dot(row[..len], work[..len]) / 2048)
#[inline]
fn predict(row: &[i32], work: &[i32], len: usize) -> i32 {
    let acc: i64 = row[..len]
        .iter()
        .zip(&work[..len])
        .map(|(&c, &w)| c as i64 * w as i64)
        .sum();
    floor_div_coef(acc)
}

/// value / 2^shift, halves rounded away from zero
#[inline]
fn round_div(value: i32, shift: u8) -> i32 {
    if shift == 0 {
        return value;
    }
    let value = value as i64;
    let half = 1i64 << (shift - 1);
    let rounded = if value >= 0 {
        (value + half) >> shift
    } else {
        -((-value + half) >> shift)
    };
    rounded as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vadpcm::codebook::expand_codebook;
    use crate::vadpcm::decoder::decode_frame;

    #[test]
    fn test_round_div() {
        assert_eq!(round_div(5, 0), 5);
        assert_eq!(round_div(3, 1), 2);
        assert_eq!(round_div(-3, 1), -2);
        assert_eq!(round_div(5, 2), 1);
        assert_eq!(round_div(6, 2), 2);
        assert_eq!(round_div(-6, 2), -2);
        assert_eq!(round_div(i32::MIN, 1), i32::MIN / 2);
        assert_eq!(round_div(i32::MAX, 1), 1 << 30);
    }

    #[test]
    fn test_silence_encodes_to_zero_frame() {
        let matrix = expand_codebook(2, 1, &[0; 32]).unwrap();
        let frame = encode_frame(&matrix, &FrameHistory::new(), &[0; 16]).unwrap();
        assert_eq!(frame.bytes, [0; 9]);
        assert_eq!(frame.max_clip, 0);
    }

    #[test]
    fn test_small_values_are_exact() {
        let matrix = expand_codebook(2, 1, &[0; 32]).unwrap();
        let input: [i16; 16] = [0, 1, -1, 2, -2, 3, -3, 4, -4, 5, -5, 6, -6, 7, -7, -8];
        let frame = encode_frame(&matrix, &FrameHistory::new(), &input).unwrap();
        assert_eq!(frame.scale, 0);
        for (out, &x) in frame.history.samples().iter().zip(input.iter()) {
            assert_eq!(*out, x as i32);
        }
    }

    #[test]
    fn test_prefers_matching_predictor() {
        // predictor 0 predicts silence, predictor 1 repeats the last sample
        let mut coefs = vec![0i16; 32];
        coefs[16 + 8] = 2048;
        let mut table = Vec::new();
        for c in &coefs {
            table.extend_from_slice(&c.to_be_bytes());
        }
        let matrix = expand_codebook(2, 2, &table).unwrap();

        let mut history = FrameHistory::new();
        history.0[15] = 1000;
        let frame = encode_frame(&matrix, &history, &[1000; 16]).unwrap();
        assert_eq!(frame.predictor, 1);

        let decoded = decode_frame(&matrix, &history, &frame.bytes).unwrap();
        assert_eq!(decoded.history, frame.history);
    }
}
