use crate::core::{LoopDescriptor, VadpcmError, VadpcmResult};

/// output buffers are sized at this multiple of the estimate
pub const INFLATE_SAFETY_FACTOR: usize = 4;

/// caller-supplied codec settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CodecConfig {
    infinite_loop_repeats: Option<u32>,
}

impl CodecConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// how many times an infinite loop (count -1) is played when exporting
    pub fn with_infinite_loop_repeats(mut self, repeats: u32) -> Self {
        self.infinite_loop_repeats = Some(repeats);
        self
    }

    pub fn infinite_loop_repeats(&self) -> Option<u32> {
        self.infinite_loop_repeats
    }

    /// extra passes for a loop; -1 needs the configured export count
    pub fn loop_repeats(&self, descriptor: &LoopDescriptor) -> VadpcmResult<usize> {
        match descriptor.count {
            -1 => self
                .infinite_loop_repeats
                .map(|n| n as usize)
                .ok_or_else(|| {
                    VadpcmError::PreconditionViolated(
                        "infinite loop but no loop repeat count configured".to_string(),
                    )
                }),
            n if n < 0 => Ok(0),
            n => Ok(n as usize),
        }
    }
}
