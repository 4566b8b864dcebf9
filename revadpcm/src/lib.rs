//! revadpcm - converter between common audio formats and N64 VADPCM AIFC files
//!
//! Input audio is read with symphonia and mixed down to mono 16-bit before
//! encoding. Decoding produces 16-bit PCM WAV.
//!

pub mod audio;

use anyhow::{bail, Context, Result};

pub use libvadpcm::{
    AifcFile, AifcInfo, CodebookChunk, CodecConfig, LoopDescriptor, SoundTable, TableEntry,
};

/// Get information about an AIFC file
pub fn get_aifc_info(data: &[u8]) -> Result<AifcInfo> {
    libvadpcm::file_info(data).context("Failed to read AIFC file")
}

/// Validate an AIFC file
pub fn validate_aifc(data: &[u8]) -> Result<bool> {
    match libvadpcm::check_file(data) {
        Ok(_) => Ok(true),
        Err(e) => {
            log::info!("validation failed: {}", e);
            Ok(false)
        }
    }
}

/// Encoding options for converting audio to AIFC
#[derive(Debug, Clone, Default)]
pub struct EncodeOptions {
    /// Codebook to compress with, None writes uncompressed pcm
    pub codebook: Option<CodebookChunk>,
    /// Loop to embed
    pub loop_descriptor: Option<LoopDescriptor>,
}

impl EncodeOptions {
    /// Options for uncompressed output
    pub fn raw() -> Self {
        Self::default()
    }

    /// Options for VADPCM output with the given codebook
    pub fn vadpcm(codebook: CodebookChunk) -> Self {
        Self {
            codebook: Some(codebook),
            ..Default::default()
        }
    }

    /// Set the loop
    pub fn with_loop(mut self, start: u32, end: u32, count: i32) -> Self {
        self.loop_descriptor = Some(LoopDescriptor::new(start, end, count));
        self
    }
}

/// Order 2 codebook with a single all-zero predictor
pub fn default_codebook() -> Result<CodebookChunk> {
    CodebookChunk::from_coefficients(2, &[0; 16]).context("Failed to build default codebook")
}

/// Borrow the codebook of an existing VADPCM AIFC file
pub fn codebook_from_aifc(data: &[u8]) -> Result<CodebookChunk> {
    let file = libvadpcm::Reader::new()
        .read(data)
        .context("Failed to read codebook source")?;
    match file.codebook() {
        Some(codebook) => Ok(codebook.clone()),
        None => bail!("Codebook source has no VADPCMCODES chunk"),
    }
}

/// Encode audio file bytes to AIFC
///
/// # Arguments
/// * `audio_bytes` - Raw bytes of an audio file (MP3, WAV, FLAC, OGG, etc.)
/// * `options` - Encoding options
///
/// # Returns
/// Raw bytes of the AIFC file
pub fn encode_from_audio(audio_bytes: &[u8], options: EncodeOptions) -> Result<Vec<u8>> {
    let source = audio::read_audio_from_bytes(audio_bytes).context("Failed to read audio file")?;
    encode_from_samples(&source.samples, source.sample_rate, options)
}

/// Encode mono 16-bit samples to AIFC
pub fn encode_from_samples(
    samples: &[i16],
    sample_rate: u32,
    options: EncodeOptions,
) -> Result<Vec<u8>> {
    libvadpcm::encode_file(
        samples,
        sample_rate,
        options.codebook,
        options.loop_descriptor,
    )
    .context("Encoding failed")
}

/// Decode an AIFC file to samples
///
/// # Returns
/// Tuple of (samples, sample_rate)
pub fn decode_to_samples(aifc_bytes: &[u8], config: &CodecConfig) -> Result<(Vec<i16>, u32)> {
    let file = libvadpcm::Reader::new()
        .read(aifc_bytes)
        .context("Invalid AIFC file")?;
    let samples = file.decode_all(config).context("Decoding failed")?;
    Ok((samples, file.sample_rate_as_integer()))
}

/// Decode an AIFC file to WAV format
pub fn decode_to_wav(aifc_bytes: &[u8], config: &CodecConfig) -> Result<Vec<u8>> {
    let (samples, sample_rate) = decode_to_samples(aifc_bytes, config)?;
    audio::write_wav_to_bytes(&samples, sample_rate).context("Failed to write WAV data")
}

/// Pack the sound data of several AIFC files into one table
///
/// # Returns
/// The table bytes and one entry per input, in input order
pub fn build_table(files: &[Vec<u8>]) -> Result<(Vec<u8>, Vec<TableEntry>)> {
    let mut table = SoundTable::new();
    for (i, data) in files.iter().enumerate() {
        let file = libvadpcm::Reader::new()
            .read(data)
            .with_context(|| format!("Invalid AIFC file at input {}", i))?;
        table.insert_file(&file);
    }
    let entries = table.entries().to_vec();
    Ok((table.into_data(), entries))
}
