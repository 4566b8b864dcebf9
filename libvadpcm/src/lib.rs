#![allow(clippy::needless_range_loop)]

use serde::Serialize;
use wasm_bindgen::prelude::*;

pub mod codec;
pub mod core;
pub mod vadpcm;

mod reader;
mod writer;

pub use codec::{CodecConfig, PcmSink, INFLATE_SAFETY_FACTOR};
pub use crate::core::{
    AifcBuilder, AifcFile, ApplicationChunk, Chunk, CodebookChunk, CommonChunk, CompressionType,
    LoopChunk, LoopDescriptor, SoundChunk, SoundTable, TableEntry, VadpcmError, VadpcmResult,
};
pub use reader::Reader;
pub use vadpcm::{decode_frame, encode_frame, expand_codebook, FrameHistory, PredictionMatrix};
pub use writer::Writer;

// file info for the info() function

/// info about an AIFC file
#[wasm_bindgen]
#[derive(Debug, Clone, Serialize)]
pub struct AifcInfo {
    /// "NONE" or "VAPC"
    #[wasm_bindgen(skip)]
    pub compression: String,
    /// Sample rate in Hz, truncated
    pub sample_rate: u32,
    pub channels: i16,
    pub bit_depth: i16,
    /// Sample count from the COMM chunk
    pub total_samples: u32,
    /// Duration in seconds
    pub duration_secs: f64,
    /// File size in bytes
    pub file_size: usize,
    /// Sound chunk payload size
    pub sound_bytes: usize,
    pub is_compressed: bool,
    /// codebook order, 0 when uncompressed
    pub order: u8,
    /// codebook predictor count, 0 when uncompressed
    pub predictors: u8,
    pub has_loop: bool,
    pub loop_start: u32,
    pub loop_end: u32,
    /// -1 = infinite
    pub loop_count: i32,
}

#[wasm_bindgen]
impl AifcInfo {
    #[wasm_bindgen(getter)]
    pub fn compression(&self) -> String {
        self.compression.clone()
    }
}

// result helpers

/// turn an error into js
fn to_js_err(e: VadpcmError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

// plain rust entry points, the wasm functions wrap these

/// build, encode and serialize a file in one go
pub fn encode_file(
    samples: &[i16],
    sample_rate: u32,
    codebook: Option<CodebookChunk>,
    descriptor: Option<LoopDescriptor>,
) -> VadpcmResult<Vec<u8>> {
    let mut builder = AifcBuilder::new(sample_rate);
    if let Some(codebook) = codebook {
        builder = builder.with_codebook(codebook);
    }
    if let Some(descriptor) = descriptor {
        builder = builder.with_loop(descriptor);
    }

    let mut file = builder.build();
    file.encode(samples)?;
    Ok(file.to_bytes())
}

/// parse and decode with a buffer sized from the inflate estimate
pub fn decode_bytes(data: &[u8], config: &CodecConfig) -> VadpcmResult<Vec<i16>> {
    let file = Reader::new().read(data)?;
    file.decode_all(config)
}

/// summary of a parsed file
pub fn file_info(data: &[u8]) -> VadpcmResult<AifcInfo> {
    let file = Reader::new().read(data)?;
    let common = file.common();
    let sample_rate = file.sample_rate_as_integer();
    let duration_secs = if sample_rate > 0 {
        common.num_sample_frames as f64 / file.sample_rate()
    } else {
        0.0
    };

    let (order, predictors) = file
        .codebook()
        .map(|c| (c.order() as u8, c.predictors() as u8))
        .unwrap_or((0, 0));
    let descriptor = file.loop_descriptor().copied();

    Ok(AifcInfo {
        compression: crate::core::fourcc_display(&common.compression_type),
        sample_rate,
        channels: common.channels,
        bit_depth: common.sample_size,
        total_samples: common.num_sample_frames,
        duration_secs,
        file_size: data.len(),
        sound_bytes: file.sound_data().len(),
        is_compressed: common.compression_type == crate::core::VAPC_COMPRESSION,
        order,
        predictors,
        has_loop: descriptor.is_some(),
        loop_start: descriptor.map(|d| d.start).unwrap_or(0),
        loop_end: descriptor.map(|d| d.end).unwrap_or(0),
        loop_count: descriptor.map(|d| d.count).unwrap_or(0),
    })
}

/// check that a file parses and the codec can handle it
pub fn check_file(data: &[u8]) -> VadpcmResult<AifcFile> {
    let file = Reader::new().read(data)?;
    file.common().check_layout()?;

    let total_samples = match file.compression()? {
        CompressionType::None => file.sound_data().len() / crate::core::PCM_SAMPLE_BYTES,
        CompressionType::Vadpcm => {
            if file.codebook().is_none() {
                return Err(VadpcmError::UnsupportedFormat(
                    "compressed file has no VADPCMCODES chunk".to_string(),
                ));
            }
            file.sound_data().len().div_ceil(crate::core::FRAME_BYTES) * crate::core::FRAME_SAMPLES
        }
    };
    if let Some(desc) = file.loop_descriptor() {
        desc.validate(total_samples)?;
    }

    Ok(file)
}

// api functions

/// encode samples as an uncompressed AIFC
///
/// # Arguments
/// * `samples` - Mono 16-bit samples
/// * `sample_rate` - Sample rate in Hz
#[wasm_bindgen]
pub fn encode_pcm(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>, JsValue> {
    encode_file(samples, sample_rate, None, None).map_err(to_js_err)
}

/// encode samples as a VADPCM AIFC
///
/// # Arguments
/// * `samples` - Mono 16-bit samples
/// * `sample_rate` - Sample rate in Hz
/// * `order` - Predictor order of the codebook (usually 2)
/// * `table` - Big-endian coefficient table, `order * 16` bytes per predictor
#[wasm_bindgen]
pub fn encode_vadpcm(
    samples: &[i16],
    sample_rate: u32,
    order: u8,
    table: &[u8],
) -> Result<Vec<u8>, JsValue> {
    let per_predictor = order as usize * 16;
    if per_predictor == 0 || table.len() % per_predictor != 0 {
        return Err(JsValue::from_str("table size does not match the order"));
    }
    let codebook =
        CodebookChunk::new(order as usize, table.len() / per_predictor, table.to_vec())
            .map_err(to_js_err)?;
    encode_file(samples, sample_rate, Some(codebook), None).map_err(to_js_err)
}

/// decode an AIFC file to 16-bit samples
///
/// # Arguments
/// * `data` - AIFC file bytes
/// * `infinite_loop_repeats` - passes to export for an infinite loop
#[wasm_bindgen]
pub fn decode(data: &[u8], infinite_loop_repeats: Option<u32>) -> Result<Vec<i16>, JsValue> {
    let mut config = CodecConfig::new();
    if let Some(repeats) = infinite_loop_repeats {
        config = config.with_infinite_loop_repeats(repeats);
    }
    decode_bytes(data, &config).map_err(to_js_err)
}

/// loop descriptor as a js object, or null
#[wasm_bindgen]
pub fn get_loop(data: &[u8]) -> Result<JsValue, JsValue> {
    let file = Reader::new().read(data).map_err(to_js_err)?;
    match file.loop_descriptor() {
        Some(desc) => serde_wasm_bindgen::to_value(desc)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e))),
        None => Ok(JsValue::NULL),
    }
}

/// Validate an AIFC file
///
/// # Returns
/// true if the file parses and can be decoded
#[wasm_bindgen]
pub fn validate(data: &[u8]) -> Result<bool, JsValue> {
    match check_file(data) {
        Ok(_) => Ok(true),
        Err(e) => {
            log::debug!("validation failed: {}", e);
            Ok(false)
        }
    }
}

/// Get information about an AIFC file
#[wasm_bindgen]
pub fn info(data: &[u8]) -> Result<AifcInfo, JsValue> {
    file_info(data).map_err(to_js_err)
}

/// get lib version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
