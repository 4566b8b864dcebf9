use crate::core::{
    fourcc_display, AifcFile, ApplicationChunk, Chunk, CodebookChunk, CommonChunk, FourCc,
    LoopChunk, LoopDescriptor, SoundChunk, VadpcmError, VadpcmResult, AIFC_ID, APPL_HEADER_SIZE,
    APPL_ID, APPL_VERSION, CHUNK_HEADER_SIZE, CODES_NAME, COMM_FIXED_SIZE, COMM_ID, FORM_ID,
    LOOPS_NAME, MAX_COMPRESSION_NAME, ROOT_HEADER_SIZE, SSND_ID, STOC_SIGNATURE,
};

/// fewest recognized chunks a usable file has (COMM, APPL, SSND)
const MIN_CHUNKS: usize = 3;

/// binary reader for AIFC files
pub struct Reader;

impl Reader {
    /// new reader
    pub fn new() -> Self {
        Reader
    }

    /// read and parse an AIFC file
    pub fn read(&self, data: &[u8]) -> VadpcmResult<AifcFile> {
        if data.len() < ROOT_HEADER_SIZE {
            return Err(VadpcmError::MalformedContainer(format!(
                "file is {} bytes, shorter than the root header",
                data.len()
            )));
        }

        let mut cursor = Cursor::new(data);

        // root
        let form_id = cursor.read_fourcc()?;
        let form_size = cursor.read_i32_be()?;
        let form_type = cursor.read_fourcc()?;
        if form_id != FORM_ID {
            return Err(VadpcmError::MalformedContainer(format!(
                "bad root id {}",
                fourcc_display(&form_id)
            )));
        }
        if form_type != AIFC_ID {
            return Err(VadpcmError::MalformedContainer(format!(
                "bad form type {}",
                fourcc_display(&form_type)
            )));
        }

        let mut chunks = Vec::new();

        while cursor.remaining() >= CHUNK_HEADER_SIZE {
            let id = cursor.read_fourcc()?;
            let size = cursor.read_i32_be()?;
            if size < 0 {
                return Err(VadpcmError::MalformedContainer(format!(
                    "{} chunk has negative size {}",
                    fourcc_display(&id),
                    size
                )));
            }
            let size = size as usize;

            match id {
                COMM_ID => {
                    let body = cursor.read_slice(size, "COMM")?;
                    chunks.push(Chunk::Common(self.read_common(body)?));
                }
                SSND_ID => {
                    let body = cursor.read_slice(size, "SSND")?;
                    chunks.push(Chunk::Sound(self.read_sound(body)?));
                }
                APPL_ID => {
                    let body = cursor.read_slice(size, "APPL")?;
                    chunks.push(self.read_application(body)?);
                }
                _ => {
                    log::debug!(
                        "skipping unknown {} chunk ({} bytes)",
                        fourcc_display(&id),
                        size
                    );
                    cursor.skip(size);
                }
            }
        }

        if chunks.len() < MIN_CHUNKS {
            return Err(VadpcmError::MalformedContainer(format!(
                "only {} recognized chunks, need at least {}",
                chunks.len(),
                MIN_CHUNKS
            )));
        }
        let has_application = chunks.iter().any(|c| {
            matches!(
                c,
                Chunk::Codebook(_) | Chunk::Loop(_) | Chunk::Application(_)
            )
        });
        if !has_application {
            return Err(VadpcmError::MalformedContainer(
                "missing APPL chunk".to_string(),
            ));
        }

        AifcFile::from_chunks(form_size, chunks)
    }

    fn read_common(&self, body: &[u8]) -> VadpcmResult<CommonChunk> {
        if body.len() < COMM_FIXED_SIZE {
            return Err(VadpcmError::MalformedContainer(format!(
                "COMM chunk is {} bytes, needs {}",
                body.len(),
                COMM_FIXED_SIZE
            )));
        }

        let mut cursor = Cursor::new(body);
        let channels = cursor.read_i16_be()?;
        let num_sample_frames = cursor.read_u32_be()?;
        let sample_size = cursor.read_i16_be()?;
        let mut sample_rate = [0u8; 10];
        sample_rate.copy_from_slice(cursor.read_slice(10, "COMM")?);
        let compression_type = cursor.read_fourcc()?;
        let compression_name_len = cursor.read_u8()?;

        let name_len = (body.len() - COMM_FIXED_SIZE).min(MAX_COMPRESSION_NAME);
        let compression_name = cursor.read_slice(name_len, "COMM")?.to_vec();

        Ok(CommonChunk {
            channels,
            num_sample_frames,
            sample_size,
            sample_rate,
            compression_type,
            compression_name_len,
            compression_name,
            ck_size: body.len() as i32,
        })
    }

    fn read_sound(&self, body: &[u8]) -> VadpcmResult<SoundChunk> {
        let mut cursor = Cursor::new(body);
        let offset = cursor.read_u32_be()?;
        let block_size = cursor.read_u32_be()?;

        Ok(SoundChunk {
            offset,
            block_size,
            data: cursor.rest().to_vec(),
        })
    }

    fn read_application(&self, body: &[u8]) -> VadpcmResult<Chunk> {
        if body.len() < APPL_HEADER_SIZE {
            return Err(VadpcmError::MalformedContainer(format!(
                "APPL chunk is {} bytes, shorter than its header",
                body.len()
            )));
        }

        let mut cursor = Cursor::new(body);
        let signature = cursor.read_fourcc()?;
        let reserved = cursor.read_u8()?;
        let mut name = [0u8; 11];
        name.copy_from_slice(cursor.read_slice(11, "APPL")?);

        if signature == STOC_SIGNATURE && name == CODES_NAME {
            return Ok(Chunk::Codebook(self.read_codebook(&mut cursor, reserved)?));
        }
        if signature == STOC_SIGNATURE && name == LOOPS_NAME {
            return Ok(Chunk::Loop(self.read_loops(&mut cursor, reserved)?));
        }

        log::debug!(
            "keeping unhandled application chunk {}/{}",
            fourcc_display(&signature),
            fourcc_display(&name)
        );
        Ok(Chunk::Application(ApplicationChunk {
            signature,
            reserved,
            name,
            payload: cursor.rest().to_vec(),
        }))
    }

    fn read_codebook(&self, cursor: &mut Cursor, reserved: u8) -> VadpcmResult<CodebookChunk> {
        let version = cursor.read_u16_be()?;
        let order = cursor.read_i16_be()?;
        let predictors = cursor.read_u16_be()?;
        check_version("VADPCMCODES", version);

        if order < 0 {
            return Err(VadpcmError::UnsupportedFormat(format!(
                "predictor order {}",
                order
            )));
        }

        let mut codebook =
            CodebookChunk::new(order as usize, predictors as usize, cursor.rest().to_vec())?;
        codebook.reserved = reserved;
        codebook.version = version;
        Ok(codebook)
    }

    fn read_loops(&self, cursor: &mut Cursor, reserved: u8) -> VadpcmResult<LoopChunk> {
        let version = cursor.read_u16_be()?;
        let nloops = cursor.read_i16_be()?;
        check_version("VADPCMLOOPS", version);

        let descriptor = match nloops {
            0 => None,
            1 => {
                let start = cursor.read_u32_be()?;
                let end = cursor.read_u32_be()?;
                let count = cursor.read_i32_be()?;
                let mut state = [0i16; 16];
                for s in state.iter_mut() {
                    *s = cursor.read_i16_be()?;
                }
                Some(LoopDescriptor {
                    start,
                    end,
                    count,
                    state,
                })
            }
            n => {
                return Err(VadpcmError::InvalidLoop(format!(
                    "{} loops, only one is supported",
                    n
                )))
            }
        };

        Ok(LoopChunk {
            reserved,
            version,
            descriptor,
        })
    }
}

impl Default for Reader {
    fn default() -> Self {
        Self::new()
    }
}

fn check_version(name: &str, version: u16) {
    if version != APPL_VERSION {
        log::warn!(
            "{} chunk has version {}, expected {}",
            name,
            version,
            APPL_VERSION
        );
    }
}

// cursor helper, everything big-endian

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Cursor { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_slice(&mut self, count: usize, what: &str) -> VadpcmResult<&'a [u8]> {
        if count > self.remaining() {
            return Err(VadpcmError::MalformedContainer(format!(
                "{} chunk truncated: {} bytes needed, {} left",
                what,
                count,
                self.remaining()
            )));
        }
        let bytes = &self.data[self.pos..self.pos + count];
        self.pos += count;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> VadpcmResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_slice(N, "field")?);
        Ok(out)
    }

    fn rest(&mut self) -> &'a [u8] {
        let bytes = &self.data[self.pos..];
        self.pos = self.data.len();
        bytes
    }

    fn skip(&mut self, count: usize) {
        self.pos = (self.pos + count).min(self.data.len());
    }

    fn read_fourcc(&mut self) -> VadpcmResult<FourCc> {
        self.read_array()
    }

    fn read_u8(&mut self) -> VadpcmResult<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    fn read_u16_be(&mut self) -> VadpcmResult<u16> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    fn read_i16_be(&mut self) -> VadpcmResult<i16> {
        Ok(i16::from_be_bytes(self.read_array()?))
    }

    fn read_u32_be(&mut self) -> VadpcmResult<u32> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    fn read_i32_be(&mut self) -> VadpcmResult<i32> {
        Ok(i32::from_be_bytes(self.read_array()?))
    }
}
