mod ash_driver;
#[cfg(test)]
pub mod mock;

use std::ffi::c_void;

use ash::{prelude::VkResult, vk};

pub use ash_driver::AshDriver;

/// The native device calls issued by the command pool and device buffers.
///
/// Handles passed in must have been produced by the same driver.
pub trait Driver: Send + Sync {
    fn device_handle(&self) -> vk::Device;

    fn memory_properties(&self) -> vk::PhysicalDeviceMemoryProperties;

    fn create_command_pool(&self, queue_family_index: u32) -> VkResult<vk::CommandPool>;

    fn allocate_command_buffers(
        &self,
        pool: vk::CommandPool,
        level: vk::CommandBufferLevel,
        count: u32,
    ) -> VkResult<Vec<vk::CommandBuffer>>;

    fn destroy_command_pool(&self, pool: vk::CommandPool, command_buffers: &[vk::CommandBuffer]);

    fn begin_command_buffer(
        &self,
        command_buffer: vk::CommandBuffer,
        flags: vk::CommandBufferUsageFlags,
    ) -> VkResult<()>;

    fn end_command_buffer(&self, command_buffer: vk::CommandBuffer) -> VkResult<()>;

    fn cmd_copy_buffer(
        &self,
        command_buffer: vk::CommandBuffer,
        src: vk::Buffer,
        dst: vk::Buffer,
        region: vk::BufferCopy,
    );

    fn queue_submit(
        &self,
        queue: vk::Queue,
        command_buffer: vk::CommandBuffer,
        fence: vk::Fence,
    ) -> VkResult<()>;

    fn queue_wait_idle(&self, queue: vk::Queue) -> VkResult<()>;

    fn create_fence(&self) -> VkResult<vk::Fence>;

    fn wait_for_fence(&self, fence: vk::Fence, timeout_ns: u64) -> VkResult<()>;

    fn destroy_fence(&self, fence: vk::Fence);

    fn create_buffer(
        &self,
        size: vk::DeviceSize,
        usage: vk::BufferUsageFlags,
        sharing_mode: vk::SharingMode,
    ) -> VkResult<vk::Buffer>;

    fn buffer_memory_requirements(&self, buffer: vk::Buffer) -> vk::MemoryRequirements;

    fn allocate_memory(
        &self,
        size: vk::DeviceSize,
        memory_type_index: u32,
    ) -> VkResult<vk::DeviceMemory>;

    fn bind_buffer_memory(&self, buffer: vk::Buffer, memory: vk::DeviceMemory) -> VkResult<()>;

    fn map_memory(
        &self,
        memory: vk::DeviceMemory,
        offset: vk::DeviceSize,
        size: vk::DeviceSize,
    ) -> VkResult<*mut c_void>;

    fn unmap_memory(&self, memory: vk::DeviceMemory);

    fn destroy_buffer(&self, buffer: vk::Buffer);

    fn free_memory(&self, memory: vk::DeviceMemory);

    /// Attaches a debug name when debug utils are enabled; a no-op otherwise.
    fn name_object(&self, _object_type: vk::ObjectType, _raw_handle: u64, _name: &str) -> VkResult<()> {
        Ok(())
    }
}
