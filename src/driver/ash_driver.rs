use std::ffi::{CString, c_void};

use ash::{prelude::VkResult, vk};

use super::Driver;

/// Forwards every call to a live `ash::Device` and destroys the device when dropped.
pub struct AshDriver {
    device: ash::Device,
    memory_properties: vk::PhysicalDeviceMemoryProperties,
    debug_utils: Option<ash::ext::debug_utils::Device>,
}

impl AshDriver {
    pub fn new(
        instance: &ash::Instance,
        physical_device: vk::PhysicalDevice,
        device: ash::Device,
        debug_names: bool,
    ) -> Self {
        let memory_properties =
            unsafe { instance.get_physical_device_memory_properties(physical_device) };
        let debug_utils =
            debug_names.then(|| ash::ext::debug_utils::Device::new(instance, &device));

        Self {
            device,
            memory_properties,
            debug_utils,
        }
    }
}

impl Drop for AshDriver {
    fn drop(&mut self) {
        log::trace!("Destroying logical device");
        unsafe {
            if let Err(e) = self.device.device_wait_idle() {
                log::warn!("device_wait_idle failed before destroying device: {e}");
            }
            self.device.destroy_device(None);
        }
    }
}

impl Driver for AshDriver {
    fn device_handle(&self) -> vk::Device {
        self.device.handle()
    }

    fn memory_properties(&self) -> vk::PhysicalDeviceMemoryProperties {
        self.memory_properties
    }

    fn create_command_pool(&self, queue_family_index: u32) -> VkResult<vk::CommandPool> {
        let pool_info = vk::CommandPoolCreateInfo::default()
            .queue_family_index(queue_family_index)
            .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);
        unsafe { self.device.create_command_pool(&pool_info, None) }
    }

    fn allocate_command_buffers(
        &self,
        pool: vk::CommandPool,
        level: vk::CommandBufferLevel,
        count: u32,
    ) -> VkResult<Vec<vk::CommandBuffer>> {
        let alloc_info = vk::CommandBufferAllocateInfo::default()
            .command_pool(pool)
            .level(level)
            .command_buffer_count(count);
        unsafe { self.device.allocate_command_buffers(&alloc_info) }
    }

    fn destroy_command_pool(&self, pool: vk::CommandPool, command_buffers: &[vk::CommandBuffer]) {
        unsafe {
            if !command_buffers.is_empty() {
                self.device.free_command_buffers(pool, command_buffers);
            }
            self.device.destroy_command_pool(pool, None);
        }
    }

    fn begin_command_buffer(
        &self,
        command_buffer: vk::CommandBuffer,
        flags: vk::CommandBufferUsageFlags,
    ) -> VkResult<()> {
        let begin_info = vk::CommandBufferBeginInfo::default().flags(flags);
        unsafe { self.device.begin_command_buffer(command_buffer, &begin_info) }
    }

    fn end_command_buffer(&self, command_buffer: vk::CommandBuffer) -> VkResult<()> {
        unsafe { self.device.end_command_buffer(command_buffer) }
    }

    fn cmd_copy_buffer(
        &self,
        command_buffer: vk::CommandBuffer,
        src: vk::Buffer,
        dst: vk::Buffer,
        region: vk::BufferCopy,
    ) {
        unsafe {
            self.device
                .cmd_copy_buffer(command_buffer, src, dst, std::slice::from_ref(&region));
        }
    }

    fn queue_submit(
        &self,
        queue: vk::Queue,
        command_buffer: vk::CommandBuffer,
        fence: vk::Fence,
    ) -> VkResult<()> {
        let command_buffers = [command_buffer];
        let submit_info = vk::SubmitInfo::default().command_buffers(&command_buffers);
        unsafe { self.device.queue_submit(queue, &[submit_info], fence) }
    }

    fn queue_wait_idle(&self, queue: vk::Queue) -> VkResult<()> {
        unsafe { self.device.queue_wait_idle(queue) }
    }

    fn create_fence(&self) -> VkResult<vk::Fence> {
        let create_info = vk::FenceCreateInfo::default();
        unsafe { self.device.create_fence(&create_info, None) }
    }

    fn wait_for_fence(&self, fence: vk::Fence, timeout_ns: u64) -> VkResult<()> {
        unsafe { self.device.wait_for_fences(&[fence], true, timeout_ns) }
    }

    fn destroy_fence(&self, fence: vk::Fence) {
        unsafe { self.device.destroy_fence(fence, None) }
    }

    fn create_buffer(
        &self,
        size: vk::DeviceSize,
        usage: vk::BufferUsageFlags,
        sharing_mode: vk::SharingMode,
    ) -> VkResult<vk::Buffer> {
        let create_info = vk::BufferCreateInfo::default()
            .size(size)
            .usage(usage)
            .sharing_mode(sharing_mode);
        unsafe { self.device.create_buffer(&create_info, None) }
    }

    fn buffer_memory_requirements(&self, buffer: vk::Buffer) -> vk::MemoryRequirements {
        unsafe { self.device.get_buffer_memory_requirements(buffer) }
    }

    fn allocate_memory(
        &self,
        size: vk::DeviceSize,
        memory_type_index: u32,
    ) -> VkResult<vk::DeviceMemory> {
        let alloc_info = vk::MemoryAllocateInfo::default()
            .allocation_size(size)
            .memory_type_index(memory_type_index);
        unsafe { self.device.allocate_memory(&alloc_info, None) }
    }

    fn bind_buffer_memory(&self, buffer: vk::Buffer, memory: vk::DeviceMemory) -> VkResult<()> {
        unsafe { self.device.bind_buffer_memory(buffer, memory, 0) }
    }

    fn map_memory(
        &self,
        memory: vk::DeviceMemory,
        offset: vk::DeviceSize,
        size: vk::DeviceSize,
    ) -> VkResult<*mut c_void> {
        unsafe {
            self.device
                .map_memory(memory, offset, size, vk::MemoryMapFlags::empty())
        }
    }

    fn unmap_memory(&self, memory: vk::DeviceMemory) {
        unsafe { self.device.unmap_memory(memory) }
    }

    fn destroy_buffer(&self, buffer: vk::Buffer) {
        unsafe { self.device.destroy_buffer(buffer, None) }
    }

    fn free_memory(&self, memory: vk::DeviceMemory) {
        unsafe { self.device.free_memory(memory, None) }
    }

    fn name_object(&self, object_type: vk::ObjectType, raw_handle: u64, name: &str) -> VkResult<()> {
        let Some(debug) = &self.debug_utils else {
            return Ok(());
        };

        let Ok(cname) = CString::new(name) else {
            log::warn!("skipping debug name with interior null byte: {name:?}");
            return Ok(());
        };

        let mut name_info = vk::DebugUtilsObjectNameInfoEXT::default().object_name(&cname);
        name_info.object_type = object_type;
        name_info.object_handle = raw_handle;

        unsafe { debug.set_debug_utils_object_name(&name_info) }
    }
}
