use ash::vk;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BufferSpec {
    pub size: vk::DeviceSize,
    pub usage: vk::BufferUsageFlags,
    pub sharing_mode: vk::SharingMode,
    pub memory_properties: vk::MemoryPropertyFlags,
    pub debug_name: Option<String>,
}

impl BufferSpec {
    pub fn new(
        size: vk::DeviceSize,
        usage: vk::BufferUsageFlags,
        sharing_mode: vk::SharingMode,
        memory_properties: vk::MemoryPropertyFlags,
    ) -> Self {
        Self {
            size,
            usage,
            sharing_mode,
            memory_properties,
            debug_name: None,
        }
    }

    pub fn device_local(size: vk::DeviceSize, usage: vk::BufferUsageFlags) -> Self {
        Self::new(
            size,
            usage,
            vk::SharingMode::EXCLUSIVE,
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
        )
    }

    pub fn host_visible(size: vk::DeviceSize, usage: vk::BufferUsageFlags) -> Self {
        Self::new(
            size,
            usage,
            vk::SharingMode::EXCLUSIVE,
            vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT,
        )
    }

    /// The fixed layout of the intermediate buffer used by `fill`.
    pub fn staging(size: vk::DeviceSize) -> Self {
        Self::host_visible(size, vk::BufferUsageFlags::TRANSFER_SRC)
    }

    pub fn with_debug_name(mut self, name: impl Into<String>) -> Self {
        self.debug_name = Some(name.into());
        self
    }
}
