mod pool;
mod slot;

pub use pool::{CommandPool, DEFAULT_POOL_DEPTH};
pub use slot::EndEncoding;
