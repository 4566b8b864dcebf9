//! loop-aware encode/decode on top of the container
//!
//! Uncompressed files loop on exact sample bounds. Compressed files decode
//! frame by frame, and each loop repeat restarts from the decoder state the
//! encoder stored in the loop descriptor.

pub mod compressed;
pub mod config;
pub mod pcm;

pub use config::{CodecConfig, INFLATE_SAFETY_FACTOR};

use crate::core::{
    clamp_i16, AifcFile, CompressionType, VadpcmError, VadpcmResult, FRAME_BYTES, FRAME_SAMPLES,
    PCM_SAMPLE_BYTES,
};

/// bounded output buffer for decoded samples
#[derive(Debug)]
pub struct PcmSink {
    samples: Vec<i16>,
    max_bytes: usize,
}

impl PcmSink {
    pub fn new(max_bytes: usize) -> Self {
        PcmSink {
            samples: Vec::new(),
            max_bytes,
        }
    }

    fn reserve(&mut self, count: usize) -> VadpcmResult<()> {
        let needed = (self.samples.len() + count) * PCM_SAMPLE_BYTES;
        if needed > self.max_bytes {
            return Err(VadpcmError::BufferExceeded {
                needed,
                capacity: self.max_bytes,
            });
        }
        self.samples.reserve(count);
        Ok(())
    }

    pub fn extend_i16(&mut self, samples: &[i16]) -> VadpcmResult<()> {
        self.reserve(samples.len())?;
        self.samples.extend_from_slice(samples);
        Ok(())
    }

    /// decoder output, saturated to 16 bits
    pub fn extend_i32(&mut self, samples: &[i32]) -> VadpcmResult<()> {
        self.reserve(samples.len())?;
        self.samples.extend(samples.iter().map(|&s| clamp_i16(s)));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn into_samples(self) -> Vec<i16> {
        self.samples
    }
}

impl AifcFile {
    /// encode mono 16-bit samples into the sound chunk, returns bytes written
    pub fn encode(&mut self, samples: &[i16]) -> VadpcmResult<usize> {
        self.common().check_layout()?;
        if let Some(desc) = self.loop_descriptor() {
            desc.validate(samples.len())?;
        }

        let (data, loop_state) = match self.compression()? {
            CompressionType::None => (pcm::encode(samples), None),
            CompressionType::Vadpcm => {
                let codebook = self.codebook().ok_or_else(|| {
                    VadpcmError::PreconditionViolated(
                        "compressed output needs a codebook".to_string(),
                    )
                })?;
                let loop_start = self.loop_descriptor().map(|d| d.start);
                let payload = compressed::encode(codebook.matrix(), samples, loop_start)?;
                (payload.data, payload.loop_state)
            }
        };

        if let (Some(state), Some(desc)) = (loop_state, self.loop_descriptor_mut()) {
            desc.state = state;
        }

        let written = data.len();
        self.sound_mut().data = data;
        self.common_mut().num_sample_frames = samples.len() as u32;
        self.form_size = crate::writer::form_size(self) as i32;

        Ok(written)
    }

    /// decode to 16-bit samples, failing if more than `max_bytes` would be produced
    pub fn decode(&self, config: &CodecConfig, max_bytes: usize) -> VadpcmResult<Vec<i16>> {
        self.common().check_layout()?;
        let mut sink = PcmSink::new(max_bytes);
        let descriptor = self.loop_descriptor();

        match self.compression()? {
            CompressionType::None => {
                pcm::decode(self.sound_data(), descriptor, config, &mut sink)?;
            }
            CompressionType::Vadpcm => {
                let codebook = self.codebook().ok_or_else(|| {
                    VadpcmError::UnsupportedFormat(
                        "compressed file has no VADPCMCODES chunk".to_string(),
                    )
                })?;
                compressed::decode(
                    codebook.matrix(),
                    self.sound_data(),
                    descriptor,
                    config,
                    &mut sink,
                )?;
            }
        }

        Ok(sink.into_samples())
    }

    /// decode with a buffer sized from `estimate_inflate_size`
    pub fn decode_all(&self, config: &CodecConfig) -> VadpcmResult<Vec<i16>> {
        self.decode(config, self.estimate_inflate_size(config))
    }

    /// upper bound in bytes for the decoded output
    ///
    /// Saturates instead of overflowing; a loop reaching past the payload is
    /// counted only up to the payload's sample count.
    pub fn estimate_inflate_size(&self, config: &CodecConfig) -> usize {
        let payload = self.sound_data().len();
        let mut size = payload;
        if let Some(desc) = self.loop_descriptor() {
            let repeats = config.loop_repeats(desc).unwrap_or(0);
            let max_samples = payload.div_ceil(FRAME_BYTES) * FRAME_SAMPLES;
            let loop_bytes = desc.len().min(max_samples) * PCM_SAMPLE_BYTES;
            size = size.saturating_add(loop_bytes.saturating_mul(repeats));
        }
        size.saturating_mul(INFLATE_SAFETY_FACTOR)
    }
}
