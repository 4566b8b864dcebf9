//! common types for the vadpcm container

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::extended::{extended_to_f64, f64_to_extended};
use crate::vadpcm::codebook::{expand_codebook, PredictionMatrix};
use crate::vadpcm::{MAX_ORDER, MAX_PREDICTORS};

// constants

/// 4-byte ascii chunk/type identifier
pub type FourCc = [u8; 4];

/// root chunk id "FORM"
pub const FORM_ID: FourCc = *b"FORM";
/// form type "AIFC"
pub const AIFC_ID: FourCc = *b"AIFC";
/// common chunk id
pub const COMM_ID: FourCc = *b"COMM";
/// sound data chunk id
pub const SSND_ID: FourCc = *b"SSND";
/// application chunk id
pub const APPL_ID: FourCc = *b"APPL";

/// application signature used by both vadpcm subtypes
pub const STOC_SIGNATURE: FourCc = *b"stoc";

/// compression types
pub const VAPC_COMPRESSION: FourCc = *b"VAPC";
pub const NONE_COMPRESSION: FourCc = *b"NONE";

/// compression names written by the builder
pub const VADPCM_COMPRESSION_NAME: &[u8] = b"VADPCM ~4-1";
pub const PCM_COMPRESSION_NAME: &[u8] = b"not compressed";

/// application subtype names (11 bytes, not terminated)
pub const CODES_NAME: [u8; 11] = *b"VADPCMCODES";
pub const LOOPS_NAME: [u8; 11] = *b"VADPCMLOOPS";

/// version field of both application subtypes
pub const APPL_VERSION: u16 = 1;

/// root header: id + size + form type
pub const ROOT_HEADER_SIZE: usize = 12;
/// chunk header: id + size
pub const CHUNK_HEADER_SIZE: usize = 8;
/// fixed COMM fields before the compression name
pub const COMM_FIXED_SIZE: usize = 23;
/// longest compression name kept
pub const MAX_COMPRESSION_NAME: usize = 14;
/// signature + reserved + name
pub const APPL_HEADER_SIZE: usize = 16;
/// application header + version + order + nentries
pub const CODES_OVERHEAD: usize = 22;
/// application header + version + nloops
pub const LOOPS_OVERHEAD: usize = 20;
/// start + end + count + state
pub const LOOP_RECORD_SIZE: usize = 44;
/// SSND offset + block size
pub const SSND_OVERHEAD: usize = 8;

// errors

/// everything that can go wrong while parsing, encoding or decoding
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VadpcmError {
    #[error("malformed container: {0}")]
    MalformedContainer(String),
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("invalid loop: {0}")]
    InvalidLoop(String),
    #[error("buffer exceeded: {needed} bytes needed, capacity is {capacity}")]
    BufferExceeded { needed: usize, capacity: usize },
    #[error("precondition violated: {0}")]
    PreconditionViolated(String),
}

/// result type for vadpcm stuff
pub type VadpcmResult<T> = Result<T, VadpcmError>;

// types

/// compression type from the COMM chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompressionType {
    /// big-endian 16-bit pcm
    None,
    /// 9-byte vadpcm frames
    Vadpcm,
}

impl CompressionType {
    pub fn from_fourcc(id: FourCc) -> VadpcmResult<Self> {
        match &id {
            b"NONE" => Ok(CompressionType::None),
            b"VAPC" => Ok(CompressionType::Vadpcm),
            _ => Err(VadpcmError::UnsupportedFormat(format!(
                "compression type {}",
                fourcc_display(&id)
            ))),
        }
    }

    pub fn fourcc(self) -> FourCc {
        match self {
            CompressionType::None => NONE_COMPRESSION,
            CompressionType::Vadpcm => VAPC_COMPRESSION,
        }
    }

    fn default_name(self) -> &'static [u8] {
        match self {
            CompressionType::None => PCM_COMPRESSION_NAME,
            CompressionType::Vadpcm => VADPCM_COMPRESSION_NAME,
        }
    }
}

/// printable form of a fourcc for messages
pub fn fourcc_display(id: &[u8]) -> String {
    id.iter()
        .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '?' })
        .collect()
}

// chunks

/// COMM chunk
#[derive(Debug, Clone, PartialEq)]
pub struct CommonChunk {
    pub channels: i16,
    pub num_sample_frames: u32,
    pub sample_size: i16,
    /// 80-bit extended float, file byte order
    pub sample_rate: [u8; 10],
    pub compression_type: FourCc,
    /// byte before the name, holds the name length
    pub compression_name_len: u8,
    pub compression_name: Vec<u8>,
    /// declared chunk size, the name is zero padded up to it
    pub ck_size: i32,
}

impl CommonChunk {
    pub fn new(sample_rate: f64, compression: CompressionType) -> Self {
        let name = compression.default_name();
        let mut ck_size = COMM_FIXED_SIZE + name.len();
        if ck_size % 2 == 1 {
            ck_size += 1;
        }

        CommonChunk {
            channels: 1,
            num_sample_frames: 0,
            sample_size: 16,
            sample_rate: f64_to_extended(sample_rate),
            compression_type: compression.fourcc(),
            compression_name_len: name.len() as u8,
            compression_name: name.to_vec(),
            ck_size: ck_size as i32,
        }
    }

    /// parsed compression type, fails on anything but NONE/VAPC
    pub fn compression(&self) -> VadpcmResult<CompressionType> {
        CompressionType::from_fourcc(self.compression_type)
    }

    pub fn sample_rate(&self) -> f64 {
        extended_to_f64(&self.sample_rate)
    }

    /// mono 16-bit is all the codec handles
    pub fn check_layout(&self) -> VadpcmResult<()> {
        if self.channels != 1 {
            return Err(VadpcmError::UnsupportedFormat(format!(
                "{} channels",
                self.channels
            )));
        }
        if self.sample_size != 16 {
            return Err(VadpcmError::UnsupportedFormat(format!(
                "{} bits per sample",
                self.sample_size
            )));
        }
        Ok(())
    }
}

/// SSND chunk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SoundChunk {
    pub offset: u32,
    pub block_size: u32,
    pub data: Vec<u8>,
}

/// APPL chunk with a subtype we don't handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationChunk {
    pub signature: FourCc,
    pub reserved: u8,
    pub name: [u8; 11],
    pub payload: Vec<u8>,
}

/// VADPCMCODES application chunk, owns the expanded prediction matrix
#[derive(Debug, Clone, PartialEq)]
pub struct CodebookChunk {
    pub(crate) reserved: u8,
    pub(crate) version: u16,
    order: usize,
    predictors: usize,
    table: Vec<u8>,
    matrix: PredictionMatrix,
}

impl CodebookChunk {
    /// codebook from raw big-endian coefficient bytes
    pub fn new(order: usize, predictors: usize, table: Vec<u8>) -> VadpcmResult<Self> {
        check_codebook_shape(order, predictors)?;
        let matrix = expand_codebook(order, predictors, &table)?;

        Ok(CodebookChunk {
            reserved: 0,
            version: APPL_VERSION,
            order,
            predictors,
            table,
            matrix,
        })
    }

    /// codebook from coefficients, `order * 8` per predictor
    pub fn from_coefficients(order: usize, coefficients: &[i16]) -> VadpcmResult<Self> {
        if order == 0 || coefficients.is_empty() || coefficients.len() % (order * 8) != 0 {
            return Err(VadpcmError::UnsupportedFormat(format!(
                "{} coefficients do not fill order {} predictors",
                coefficients.len(),
                order
            )));
        }

        let predictors = coefficients.len() / (order * 8);
        let table = coefficients
            .iter()
            .flat_map(|c| c.to_be_bytes())
            .collect();
        Self::new(order, predictors, table)
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn predictors(&self) -> usize {
        self.predictors
    }

    pub fn version(&self) -> u16 {
        self.version
    }

    pub fn table(&self) -> &[u8] {
        &self.table
    }

    pub fn matrix(&self) -> &PredictionMatrix {
        &self.matrix
    }

    /// replace the raw table, the matrix is rebuilt from it
    pub fn set_table(&mut self, table: Vec<u8>) -> VadpcmResult<()> {
        self.matrix = expand_codebook(self.order, self.predictors, &table)?;
        self.table = table;
        Ok(())
    }

    /// payload size after the chunk header
    pub fn ck_size(&self) -> usize {
        CODES_OVERHEAD + self.table.len()
    }
}

pub(crate) fn check_codebook_shape(order: usize, predictors: usize) -> VadpcmResult<()> {
    if !(1..=MAX_ORDER).contains(&order) {
        return Err(VadpcmError::UnsupportedFormat(format!(
            "predictor order {}",
            order
        )));
    }
    if !(1..=MAX_PREDICTORS).contains(&predictors) {
        return Err(VadpcmError::UnsupportedFormat(format!(
            "{} predictors",
            predictors
        )));
    }
    Ok(())
}

/// the single supported loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopDescriptor {
    /// first looped sample
    pub start: u32,
    /// sample the loop jumps back from
    pub end: u32,
    /// extra passes, -1 = infinite
    pub count: i32,
    /// decoded frame containing `start`, last `order` values are the feedback
    pub state: [i16; 16],
}

impl LoopDescriptor {
    pub fn new(start: u32, end: u32, count: i32) -> Self {
        LoopDescriptor {
            start,
            end,
            count,
            state: [0; 16],
        }
    }

    pub fn is_infinite(&self) -> bool {
        self.count == -1
    }

    /// loop length in samples
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// bounds check against the number of samples available
    pub fn validate(&self, total_samples: usize) -> VadpcmResult<()> {
        if self.start >= self.end {
            return Err(VadpcmError::InvalidLoop(format!(
                "start {} is not before end {}",
                self.start, self.end
            )));
        }
        if self.end as usize > total_samples {
            return Err(VadpcmError::InvalidLoop(format!(
                "end {} is past the {} available samples",
                self.end, total_samples
            )));
        }
        Ok(())
    }
}

/// VADPCMLOOPS application chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopChunk {
    pub reserved: u8,
    pub version: u16,
    pub descriptor: Option<LoopDescriptor>,
}

impl LoopChunk {
    pub fn new(descriptor: Option<LoopDescriptor>) -> Self {
        LoopChunk {
            reserved: 0,
            version: APPL_VERSION,
            descriptor,
        }
    }

    pub fn nloops(&self) -> i16 {
        i16::from(self.descriptor.is_some())
    }

    /// payload size after the chunk header
    pub fn ck_size(&self) -> usize {
        LOOPS_OVERHEAD + LOOP_RECORD_SIZE * self.nloops() as usize
    }
}

/// any chunk the container keeps, discriminated once at parse time
#[derive(Debug, Clone, PartialEq)]
pub enum Chunk {
    Common(CommonChunk),
    Sound(SoundChunk),
    Codebook(CodebookChunk),
    Loop(LoopChunk),
    Application(ApplicationChunk),
}

impl Chunk {
    pub fn fourcc(&self) -> FourCc {
        match self {
            Chunk::Common(_) => COMM_ID,
            Chunk::Sound(_) => SSND_ID,
            Chunk::Codebook(_) | Chunk::Loop(_) | Chunk::Application(_) => APPL_ID,
        }
    }
}

// container

/// complete parsed or constructed AIFC file
#[derive(Debug, Clone, PartialEq)]
pub struct AifcFile {
    pub(crate) form_size: i32,
    pub(crate) chunks: Vec<Chunk>,
    common: usize,
    sound: usize,
    codebook: Option<usize>,
    loops: Option<usize>,
}

impl AifcFile {
    /// empty uncompressed file, no samples and no loop
    pub fn new() -> Self {
        AifcBuilder::new(0).build()
    }

    /// wire up the convenience references, the last occurrence of each kind wins
    pub(crate) fn from_chunks(form_size: i32, chunks: Vec<Chunk>) -> VadpcmResult<Self> {
        let mut common = None;
        let mut sound = None;
        let mut codebook = None;
        let mut loops = None;

        for (i, chunk) in chunks.iter().enumerate() {
            let slot = match chunk {
                Chunk::Common(_) => &mut common,
                Chunk::Sound(_) => &mut sound,
                Chunk::Codebook(_) => &mut codebook,
                Chunk::Loop(_) => &mut loops,
                Chunk::Application(_) => continue,
            };
            if slot.is_some() {
                log::warn!(
                    "duplicate {} chunk at index {}, last one wins",
                    fourcc_display(&chunk.fourcc()),
                    i
                );
            }
            *slot = Some(i);
        }

        let common = common
            .ok_or_else(|| VadpcmError::MalformedContainer("missing COMM chunk".to_string()))?;
        let sound = sound
            .ok_or_else(|| VadpcmError::MalformedContainer("missing SSND chunk".to_string()))?;

        Ok(AifcFile {
            form_size,
            chunks,
            common,
            sound,
            codebook,
            loops,
        })
    }

    /// every chunk in file order, duplicates included
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// root size field as read (or as last written)
    pub fn form_size(&self) -> i32 {
        self.form_size
    }

    pub fn common(&self) -> &CommonChunk {
        match &self.chunks[self.common] {
            Chunk::Common(c) => c,
            _ => unreachable!("common index points at a COMM chunk"),
        }
    }

    pub(crate) fn common_mut(&mut self) -> &mut CommonChunk {
        match &mut self.chunks[self.common] {
            Chunk::Common(c) => c,
            _ => unreachable!("common index points at a COMM chunk"),
        }
    }

    pub fn sound(&self) -> &SoundChunk {
        match &self.chunks[self.sound] {
            Chunk::Sound(s) => s,
            _ => unreachable!("sound index points at a SSND chunk"),
        }
    }

    pub(crate) fn sound_mut(&mut self) -> &mut SoundChunk {
        match &mut self.chunks[self.sound] {
            Chunk::Sound(s) => s,
            _ => unreachable!("sound index points at a SSND chunk"),
        }
    }

    pub fn codebook(&self) -> Option<&CodebookChunk> {
        match self.codebook.map(|i| &self.chunks[i]) {
            Some(Chunk::Codebook(c)) => Some(c),
            _ => None,
        }
    }

    pub fn codebook_mut(&mut self) -> Option<&mut CodebookChunk> {
        match self.codebook.map(|i| &mut self.chunks[i]) {
            Some(Chunk::Codebook(c)) => Some(c),
            _ => None,
        }
    }

    pub fn loop_chunk(&self) -> Option<&LoopChunk> {
        match self.loops.map(|i| &self.chunks[i]) {
            Some(Chunk::Loop(l)) => Some(l),
            _ => None,
        }
    }

    /// the loop descriptor, if the file loops
    pub fn loop_descriptor(&self) -> Option<&LoopDescriptor> {
        self.loop_chunk().and_then(|l| l.descriptor.as_ref())
    }

    pub(crate) fn loop_descriptor_mut(&mut self) -> Option<&mut LoopDescriptor> {
        match self.loops.map(|i| &mut self.chunks[i]) {
            Some(Chunk::Loop(l)) => l.descriptor.as_mut(),
            _ => None,
        }
    }

    pub fn compression(&self) -> VadpcmResult<CompressionType> {
        self.common().compression()
    }

    pub fn sample_rate(&self) -> f64 {
        self.common().sample_rate()
    }

    /// sample rate truncated to whole hertz
    pub fn sample_rate_as_integer(&self) -> u32 {
        let rate = self.sample_rate();
        if rate.is_finite() && rate > 0.0 {
            rate as u32
        } else {
            0
        }
    }

    /// raw SSND payload, used to build the sound table
    pub fn sound_data(&self) -> &[u8] {
        &self.sound().data
    }

    /// serialize to bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        crate::Writer::new().write(self)
    }
}

impl Default for AifcFile {
    fn default() -> Self {
        Self::new()
    }
}

/// builder for files that are about to be encoded
#[derive(Debug, Clone)]
pub struct AifcBuilder {
    sample_rate: f64,
    codebook: Option<CodebookChunk>,
    loop_descriptor: Option<LoopDescriptor>,
}

impl AifcBuilder {
    pub fn new(sample_rate: u32) -> Self {
        AifcBuilder {
            sample_rate: sample_rate as f64,
            codebook: None,
            loop_descriptor: None,
        }
    }

    /// compress with this codebook, otherwise the file stays raw pcm
    pub fn with_codebook(mut self, codebook: CodebookChunk) -> Self {
        self.codebook = Some(codebook);
        self
    }

    pub fn with_loop(mut self, descriptor: LoopDescriptor) -> Self {
        self.loop_descriptor = Some(descriptor);
        self
    }

    pub fn build(self) -> AifcFile {
        let compression = if self.codebook.is_some() {
            CompressionType::Vadpcm
        } else {
            CompressionType::None
        };

        let mut chunks = vec![Chunk::Common(CommonChunk::new(
            self.sample_rate,
            compression,
        ))];
        let mut codebook = None;
        let mut loops = None;

        if let Some(book) = self.codebook {
            codebook = Some(chunks.len());
            chunks.push(Chunk::Codebook(book));
        }

        // raw files keep an empty loop chunk so there is always an APPL chunk
        if self.loop_descriptor.is_some() || compression == CompressionType::None {
            loops = Some(chunks.len());
            chunks.push(Chunk::Loop(LoopChunk::new(self.loop_descriptor)));
        }

        let sound = chunks.len();
        chunks.push(Chunk::Sound(SoundChunk::default()));

        let mut file = AifcFile {
            form_size: 0,
            chunks,
            common: 0,
            sound,
            codebook,
            loops,
        };
        file.form_size = crate::writer::form_size(&file) as i32;
        file
    }
}
