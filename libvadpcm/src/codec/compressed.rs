//! VADPCM path with loop replay

use crate::core::{
    frames_for, LoopDescriptor, VadpcmError, VadpcmResult, FRAME_BYTES, FRAME_SAMPLES,
};
use crate::vadpcm::{encode_frame, FrameCursor, FrameHistory, PredictionMatrix};

use super::config::CodecConfig;
use super::PcmSink;

/// encoded payload plus the loop start state, if a loop start was given
pub struct EncodedPayload {
    pub data: Vec<u8>,
    pub loop_state: Option<[i16; FRAME_SAMPLES]>,
}

/// encode every sample, the last frame is zero padded
pub fn encode(
    matrix: &PredictionMatrix,
    samples: &[i16],
    loop_start: Option<u32>,
) -> VadpcmResult<EncodedPayload> {
    let capacity = frames_for(samples.len()) * FRAME_BYTES;
    let mut data = Vec::with_capacity(capacity);
    let mut history = FrameHistory::new();
    let mut loop_state = None;

    for (index, chunk) in samples.chunks(FRAME_SAMPLES).enumerate() {
        if data.len() + FRAME_BYTES > capacity {
            return Err(VadpcmError::BufferExceeded {
                needed: data.len() + FRAME_BYTES,
                capacity,
            });
        }

        let mut block = [0i16; FRAME_SAMPLES];
        block[..chunk.len()].copy_from_slice(chunk);

        let frame = encode_frame(matrix, &history, &block)?;
        data.extend_from_slice(&frame.bytes);
        history = frame.history;

        if let Some(start) = loop_start {
            let frame_end = (index + 1) * FRAME_SAMPLES;
            if loop_state.is_none() && frame_end > start as usize {
                log::debug!(
                    "captured loop state at frame {} for loop start {}",
                    index,
                    start
                );
                loop_state = Some(history.to_state());
            }
        }
    }

    if let (Some(start), None) = (loop_start, loop_state) {
        return Err(VadpcmError::InvalidLoop(format!(
            "encoding ended before reaching loop start {}",
            start
        )));
    }

    Ok(EncodedPayload { data, loop_state })
}

/// decode every frame, replaying the loop region `repeats` extra times
pub fn decode(
    matrix: &PredictionMatrix,
    data: &[u8],
    descriptor: Option<&LoopDescriptor>,
    config: &CodecConfig,
    sink: &mut PcmSink,
) -> VadpcmResult<()> {
    let mut cursor = FrameCursor::new(data);
    let mut history = FrameHistory::new();

    let Some(desc) = descriptor else {
        return decode_to_end(matrix, &mut cursor, history, sink);
    };

    desc.validate(data.len().div_ceil(FRAME_BYTES) * FRAME_SAMPLES)?;
    let repeats = config.loop_repeats(desc)?;
    let end = desc.end as usize;
    log::debug!(
        "vadpcm loop {}..{}, {} extra passes, resume at byte {}",
        desc.start,
        end,
        repeats,
        loop_offset(desc)
    );

    // first pass up to the loop end
    for _ in 0..end / FRAME_SAMPLES {
        let frame = cursor.next_frame(matrix, &history)?;
        sink.extend_i32(frame.samples())?;
        history = frame.history;
    }

    // the frame holding the loop end only contributes samples before the end
    let split = end % FRAME_SAMPLES;
    if split > 0 {
        let frame = cursor.next_frame(matrix, &history)?;
        sink.extend_i32(&frame.samples()[..split])?;
        history = frame.history;
    }

    for _ in 0..repeats {
        replay_loop(matrix, data, desc, sink)?;
    }

    decode_to_end(matrix, &mut cursor, history, sink)
}

/// one pass over start..end seeded from the stored state
fn replay_loop(
    matrix: &PredictionMatrix,
    data: &[u8],
    desc: &LoopDescriptor,
    sink: &mut PcmSink,
) -> VadpcmResult<()> {
    let offset = desc.start as usize % FRAME_SAMPLES;
    let head_end = FRAME_SAMPLES.min(offset + desc.len());
    sink.extend_i16(&desc.state[offset..head_end])?;

    let mut remaining = desc.len() - (head_end - offset);
    let mut history = FrameHistory::from_state(&desc.state);
    let mut cursor = FrameCursor::new(data);
    cursor.seek(loop_offset(desc));

    while remaining > 0 {
        let frame = cursor.next_frame(matrix, &history)?;
        let take = remaining.min(FRAME_SAMPLES);
        sink.extend_i32(&frame.samples()[..take])?;
        remaining -= take;
        history = frame.history;
    }

    Ok(())
}

/// byte offset of the first frame after the one holding the loop start
fn loop_offset(desc: &LoopDescriptor) -> usize {
    ((desc.start as usize >> 4) + 1) * FRAME_BYTES
}

fn decode_to_end(
    matrix: &PredictionMatrix,
    cursor: &mut FrameCursor,
    mut history: FrameHistory,
    sink: &mut PcmSink,
) -> VadpcmResult<()> {
    while !cursor.at_end() {
        let frame = cursor.next_frame(matrix, &history)?;
        sink.extend_i32(frame.samples())?;
        history = frame.history;
    }
    Ok(())
}
