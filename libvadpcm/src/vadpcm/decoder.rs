use crate::core::audio_constants::{FRAME_BYTES, FRAME_SAMPLES};
use crate::core::types::{VadpcmError, VadpcmResult};

use super::codebook::PredictionMatrix;
use super::{floor_div_coef, FrameHistory, MAX_ORDER, ROW_SAMPLES};

/// result of decoding one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedFrame {
    /// the 16 outputs, also the history for the next frame
    pub history: FrameHistory,
    /// input bytes actually present (9 unless the payload ran out)
    pub consumed: usize,
    /// the frame read past the end of the payload
    pub end_of_stream: bool,
}

impl DecodedFrame {
    pub fn samples(&self) -> &[i32; FRAME_SAMPLES] {
        self.history.samples()
    }
}

/// sequential reader over a compressed payload
#[derive(Debug, Clone, Copy)]
pub struct FrameCursor<'a> {
    data: &'a [u8],
    pos: usize,
    end_of_stream: bool,
}

impl<'a> FrameCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        FrameCursor {
            data,
            pos: 0,
            end_of_stream: false,
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
        self.end_of_stream = false;
    }

    /// true once a frame read past the payload, or nothing is left
    pub fn at_end(&self) -> bool {
        self.end_of_stream || self.pos >= self.data.len()
    }

    /// decode the frame at the cursor and advance
    pub fn next_frame(
        &mut self,
        matrix: &PredictionMatrix,
        history: &FrameHistory,
    ) -> VadpcmResult<DecodedFrame> {
        let input = self.data.get(self.pos..).unwrap_or(&[]);
        let frame = decode_frame(matrix, history, input)?;
        self.pos += FRAME_BYTES;
        self.end_of_stream |= frame.end_of_stream;
        Ok(frame)
    }
}

/// decode one 9-byte frame, bytes missing from `input` read as zero
pub fn decode_frame(
    matrix: &PredictionMatrix,
    history: &FrameHistory,
    input: &[u8],
) -> VadpcmResult<DecodedFrame> {
    let consumed = input.len().min(FRAME_BYTES);
    let byte_at = |i: usize| input.get(i).copied().unwrap_or(0);

    let header = byte_at(0);
    let scale = 1i32 << (header >> 4);
    let predictor = (header & 0xF) as usize;
    if predictor >= matrix.predictors() {
        return Err(VadpcmError::UnsupportedFormat(format!(
            "frame uses predictor {} but the codebook has {}",
            predictor,
            matrix.predictors()
        )));
    }

    let order = matrix.order();
    let mut out = [0i32; FRAME_SAMPLES];

    for half in 0..2 {
        let mut residuals = [0i32; ROW_SAMPLES];
        for i in 0..ROW_SAMPLES / 2 {
            let byte = byte_at(1 + half * 4 + i);
            residuals[2 * i] = nibble(byte >> 4) * scale;
            residuals[2 * i + 1] = nibble(byte & 0xF) * scale;
        }

        // feedback, then the residuals
        let mut work = [0i32; MAX_ORDER + ROW_SAMPLES];
        if half == 0 {
            work[..order].copy_from_slice(history.feedback(order));
        } else {
            work[..order].copy_from_slice(&out[ROW_SAMPLES - order..ROW_SAMPLES]);
        }
        work[order..order + ROW_SAMPLES].copy_from_slice(&residuals);
        let work = &work[..order + ROW_SAMPLES];

        for i in 0..ROW_SAMPLES {
            let acc: i64 = matrix
                .row(predictor, i)
                .iter()
                .zip(work)
                .map(|(&c, &w)| c as i64 * w as i64)
                .sum();
            out[half * ROW_SAMPLES + i] = floor_div_coef(acc);
        }
    }

    Ok(DecodedFrame {
        history: FrameHistory(out),
        consumed,
        end_of_stream: consumed < FRAME_BYTES,
    })
}

/// signed 4-bit value
#[inline]
fn nibble(n: u8) -> i32 {
    if n >= 8 {
        n as i32 - 16
    } else {
        n as i32
    }
}
