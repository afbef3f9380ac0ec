use crate::buffer::BufferContents;

pub const DEFAULT_COPY_SIZE: u64 = 256 * 1024 * 1024;
pub const DEFAULT_ITERATIONS: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyBufferArguments {
    /// Bytes copied per iteration.
    pub size: u64,
    pub iterations: u32,
    pub contents: BufferContents,
    /// Tag samples as device-event timing instead of host wall-clock.
    pub use_events: bool,
}

impl Default for CopyBufferArguments {
    fn default() -> Self {
        Self {
            size: DEFAULT_COPY_SIZE,
            iterations: DEFAULT_ITERATIONS,
            contents: BufferContents::Zeros,
            use_events: false,
        }
    }
}
