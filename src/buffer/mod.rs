mod contents;
mod memory;
mod resource;
mod spec;

pub use contents::{BufferContents, DEFAULT_RANDOM_SEED};
pub use resource::DeviceBuffer;
pub use spec::BufferSpec;
