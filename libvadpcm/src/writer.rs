use crate::core::{
    AifcFile, Chunk, CodebookChunk, CommonChunk, FourCc, LoopChunk, SoundChunk, AIFC_ID,
    APPL_ID, CHUNK_HEADER_SIZE, CODES_NAME, COMM_FIXED_SIZE, COMM_ID, FORM_ID,
    LOOPS_NAME, SSND_ID, SSND_OVERHEAD, STOC_SIGNATURE,
};

/// binary writer for AIFC files
pub struct Writer {
    buffer: Vec<u8>,
}

impl Writer {
    /// new writer
    pub fn new() -> Self {
        Writer { buffer: Vec::new() }
    }

    /// serialize every chunk in list order, unhandled APPL chunks are dropped
    pub fn write(mut self, file: &AifcFile) -> Vec<u8> {
        let form_size = form_size(file);
        self.buffer.reserve(form_size + CHUNK_HEADER_SIZE);

        self.write_fourcc(FORM_ID);
        self.write_i32(form_size as i32);
        self.write_fourcc(AIFC_ID);

        for chunk in file.chunks() {
            match chunk {
                Chunk::Common(c) => self.write_common(c),
                Chunk::Sound(s) => self.write_sound(s),
                Chunk::Codebook(c) => self.write_codebook(c),
                Chunk::Loop(l) => self.write_loops(l),
                Chunk::Application(_) => {}
            }
        }

        self.buffer
    }

    fn write_common(&mut self, common: &CommonChunk) {
        let ck_size = common_size(common);
        self.write_fourcc(COMM_ID);
        self.write_i32(ck_size as i32);

        self.buffer.extend_from_slice(&common.channels.to_be_bytes());
        self.buffer
            .extend_from_slice(&common.num_sample_frames.to_be_bytes());
        self.buffer.extend_from_slice(&common.sample_size.to_be_bytes());
        self.buffer.extend_from_slice(&common.sample_rate);
        self.write_fourcc(common.compression_type);
        self.buffer.push(common.compression_name_len);

        // name zero-padded to the declared size
        let name_space = ck_size - COMM_FIXED_SIZE;
        let name = &common.compression_name[..common.compression_name.len().min(name_space)];
        self.buffer.extend_from_slice(name);
        self.buffer
            .resize(self.buffer.len() + (name_space - name.len()), 0);
    }

    fn write_sound(&mut self, sound: &SoundChunk) {
        self.write_fourcc(SSND_ID);
        self.write_i32((SSND_OVERHEAD + sound.data.len()) as i32);
        self.buffer.extend_from_slice(&sound.offset.to_be_bytes());
        self.buffer.extend_from_slice(&sound.block_size.to_be_bytes());
        self.buffer.extend_from_slice(&sound.data);
    }

    fn write_codebook(&mut self, codebook: &CodebookChunk) {
        self.write_appl_header(codebook.ck_size(), codebook.reserved, &CODES_NAME);
        self.buffer
            .extend_from_slice(&codebook.version().to_be_bytes());
        self.buffer
            .extend_from_slice(&(codebook.order() as i16).to_be_bytes());
        self.buffer
            .extend_from_slice(&(codebook.predictors() as u16).to_be_bytes());
        self.buffer.extend_from_slice(codebook.table());
    }

    fn write_loops(&mut self, loops: &LoopChunk) {
        self.write_appl_header(loops.ck_size(), loops.reserved, &LOOPS_NAME);
        self.buffer.extend_from_slice(&loops.version.to_be_bytes());
        self.buffer.extend_from_slice(&loops.nloops().to_be_bytes());

        if let Some(desc) = &loops.descriptor {
            self.buffer.extend_from_slice(&desc.start.to_be_bytes());
            self.buffer.extend_from_slice(&desc.end.to_be_bytes());
            self.buffer.extend_from_slice(&desc.count.to_be_bytes());
            for s in &desc.state {
                self.buffer.extend_from_slice(&s.to_be_bytes());
            }
        }
    }

    fn write_appl_header(&mut self, ck_size: usize, reserved: u8, name: &[u8; 11]) {
        self.write_fourcc(APPL_ID);
        self.write_i32(ck_size as i32);
        self.write_fourcc(STOC_SIGNATURE);
        self.buffer.push(reserved);
        self.buffer.extend_from_slice(name);
    }

    fn write_fourcc(&mut self, id: FourCc) {
        self.buffer.extend_from_slice(&id);
    }

    fn write_i32(&mut self, value: i32) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

/// COMM payload size, never smaller than the fixed fields plus the name
fn common_size(common: &CommonChunk) -> usize {
    let declared = common.ck_size.max(0) as usize;
    declared.max(COMM_FIXED_SIZE + common.compression_name.len())
}

/// root size field: form type plus every chunk that gets written
pub(crate) fn form_size(file: &AifcFile) -> usize {
    let chunks: usize = file
        .chunks()
        .iter()
        .map(|chunk| match chunk {
            Chunk::Common(c) => CHUNK_HEADER_SIZE + common_size(c),
            Chunk::Sound(s) => CHUNK_HEADER_SIZE + SSND_OVERHEAD + s.data.len(),
            Chunk::Codebook(c) => CHUNK_HEADER_SIZE + c.ck_size(),
            Chunk::Loop(l) => CHUNK_HEADER_SIZE + l.ck_size(),
            Chunk::Application(_) => 0,
        })
        .sum();
    4 + chunks
}
