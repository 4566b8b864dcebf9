//! uncompressed big-endian 16-bit path

use crate::core::{LoopDescriptor, VadpcmResult, PCM_SAMPLE_BYTES};

use super::config::CodecConfig;
use super::PcmSink;

/// samples to big-endian bytes
pub fn encode(samples: &[i16]) -> Vec<u8> {
    let mut out = Vec::with_capacity(samples.len() * PCM_SAMPLE_BYTES);
    for s in samples {
        out.extend_from_slice(&s.to_be_bytes());
    }
    out
}

/// big-endian bytes to samples, an odd trailing byte is dropped
pub fn to_samples(data: &[u8]) -> Vec<i16> {
    if data.len() % PCM_SAMPLE_BYTES != 0 {
        log::warn!(
            "pcm payload has odd length {}, dropping the last byte",
            data.len()
        );
    }
    data.chunks_exact(PCM_SAMPLE_BYTES)
        .map(|pair| i16::from_be_bytes([pair[0], pair[1]]))
        .collect()
}

/// decode with the loop region played `repeats + 1` times
pub fn decode(
    data: &[u8],
    descriptor: Option<&LoopDescriptor>,
    config: &CodecConfig,
    sink: &mut PcmSink,
) -> VadpcmResult<()> {
    let samples = to_samples(data);

    let Some(desc) = descriptor else {
        return sink.extend_i16(&samples);
    };

    desc.validate(samples.len())?;
    let repeats = config.loop_repeats(desc)?;
    let start = desc.start as usize;
    let end = desc.end as usize;
    log::debug!(
        "pcm loop {}..{}, {} extra passes over {} samples",
        start,
        end,
        repeats,
        samples.len()
    );

    sink.extend_i16(&samples[..start])?;
    for _ in 0..=repeats {
        sink.extend_i16(&samples[start..end])?;
    }
    sink.extend_i16(&samples[end..])
}
