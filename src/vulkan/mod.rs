mod config;
mod context;
mod debug;
mod device;
mod device_context;
pub mod device_info;
mod instance;
pub mod loader;
mod physical;
mod product;

pub use config::{Engine, QueueConfiguration};

pub use context::VulkanContext;

pub use device_context::DeviceContext;
