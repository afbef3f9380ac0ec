//! Host-side driver used by tests: memory lives in `Vec<u8>`s and recorded
//! copies execute at submit time.

use std::{
    collections::{HashMap, HashSet},
    ffi::c_void,
    sync::{Mutex, MutexGuard, PoisonError},
};

use ash::{
    prelude::VkResult,
    vk::{self, Handle},
};

use super::Driver;

pub const MOCK_ALIGNMENT: vk::DeviceSize = 256;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MockStats {
    pub begins: u32,
    pub ends: u32,
    pub submits: u32,
    pub fenced_submits: u32,
    pub failed_submits: u32,
    pub fences_created: u32,
    pub fences_destroyed: u32,
    pub queue_idles: u32,
    pub maps: u32,
    pub unmaps: u32,
    pub copies_executed: u32,
    pub buffers_created: u32,
    pub buffers_destroyed: u32,
    pub allocations: u32,
    pub frees: u32,
    pub pools_destroyed: u32,
}

struct RecordedCopy {
    src: vk::Buffer,
    dst: vk::Buffer,
    region: vk::BufferCopy,
}

#[derive(Default)]
struct MockState {
    next_handle: u64,
    buffer_sizes: HashMap<u64, vk::DeviceSize>,
    buffer_memory: HashMap<u64, u64>,
    memories: HashMap<u64, Vec<u8>>,
    recorded: HashMap<u64, Vec<RecordedCopy>>,
    live_fences: HashSet<u64>,
    fail_submit: HashSet<u64>,
    fail_fence_waits: bool,
    stats: MockStats,
}

impl MockState {
    fn handle<H: Handle>(&mut self) -> H {
        self.next_handle += 1;
        H::from_raw(self.next_handle)
    }

    fn execute(&mut self, copy: &RecordedCopy) {
        let (Some(&src_mem), Some(&dst_mem)) = (
            self.buffer_memory.get(&copy.src.as_raw()),
            self.buffer_memory.get(&copy.dst.as_raw()),
        ) else {
            panic!("copy between unbound buffers");
        };

        let src = copy.region.src_offset as usize;
        let dst = copy.region.dst_offset as usize;
        let len = copy.region.size as usize;

        let bytes = self.memories[&src_mem][src..src + len].to_vec();
        let target = self
            .memories
            .get_mut(&dst_mem)
            .expect("destination memory freed");
        target[dst..dst + len].copy_from_slice(&bytes);
        self.stats.copies_executed += 1;
    }
}

pub struct MockDriver {
    device: vk::Device,
    state: Mutex<MockState>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self {
            device: vk::Device::from_raw(0xD15C),
            state: Mutex::new(MockState::default()),
        }
    }

    pub fn with_null_device() -> Self {
        Self {
            device: vk::Device::null(),
            state: Mutex::new(MockState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn stats(&self) -> MockStats {
        self.state().stats
    }

    /// Makes every later submit of `command_buffer` fail with `ERROR_DEVICE_LOST`.
    pub fn fail_submits_of(&self, command_buffer: vk::CommandBuffer) {
        self.state().fail_submit.insert(command_buffer.as_raw());
    }

    /// Makes every later fence wait fail with `ERROR_DEVICE_LOST`.
    pub fn fail_fence_waits(&self) {
        self.state().fail_fence_waits = true;
    }

    pub fn live_memory_count(&self) -> usize {
        self.state().memories.len()
    }
}

impl Driver for MockDriver {
    fn device_handle(&self) -> vk::Device {
        self.device
    }

    /// Type 0 is device-local, type 1 host-visible/coherent, type 2 both.
    fn memory_properties(&self) -> vk::PhysicalDeviceMemoryProperties {
        let mut props = vk::PhysicalDeviceMemoryProperties {
            memory_type_count: 3,
            ..Default::default()
        };
        let host = vk::MemoryPropertyFlags::HOST_VISIBLE | vk::MemoryPropertyFlags::HOST_COHERENT;
        props.memory_types[0].property_flags = vk::MemoryPropertyFlags::DEVICE_LOCAL;
        props.memory_types[1].property_flags = host;
        props.memory_types[2].property_flags = vk::MemoryPropertyFlags::DEVICE_LOCAL | host;
        props
    }

    fn create_command_pool(&self, _queue_family_index: u32) -> VkResult<vk::CommandPool> {
        Ok(self.state().handle())
    }

    fn allocate_command_buffers(
        &self,
        _pool: vk::CommandPool,
        _level: vk::CommandBufferLevel,
        count: u32,
    ) -> VkResult<Vec<vk::CommandBuffer>> {
        let mut state = self.state();
        Ok((0..count).map(|_| state.handle()).collect())
    }

    fn destroy_command_pool(&self, _pool: vk::CommandPool, _command_buffers: &[vk::CommandBuffer]) {
        self.state().stats.pools_destroyed += 1;
    }

    fn begin_command_buffer(
        &self,
        command_buffer: vk::CommandBuffer,
        _flags: vk::CommandBufferUsageFlags,
    ) -> VkResult<()> {
        let mut state = self.state();
        state.stats.begins += 1;
        state.recorded.insert(command_buffer.as_raw(), Vec::new());
        Ok(())
    }

    fn end_command_buffer(&self, _command_buffer: vk::CommandBuffer) -> VkResult<()> {
        self.state().stats.ends += 1;
        Ok(())
    }

    fn cmd_copy_buffer(
        &self,
        command_buffer: vk::CommandBuffer,
        src: vk::Buffer,
        dst: vk::Buffer,
        region: vk::BufferCopy,
    ) {
        self.state()
            .recorded
            .entry(command_buffer.as_raw())
            .or_default()
            .push(RecordedCopy { src, dst, region });
    }

    fn queue_submit(
        &self,
        _queue: vk::Queue,
        command_buffer: vk::CommandBuffer,
        fence: vk::Fence,
    ) -> VkResult<()> {
        let mut state = self.state();
        if state.fail_submit.contains(&command_buffer.as_raw()) {
            state.stats.failed_submits += 1;
            return Err(vk::Result::ERROR_DEVICE_LOST);
        }

        state.stats.submits += 1;
        if fence != vk::Fence::null() {
            assert!(state.live_fences.contains(&fence.as_raw()), "submit with dead fence");
            state.stats.fenced_submits += 1;
        }

        let copies = state
            .recorded
            .get_mut(&command_buffer.as_raw())
            .map(std::mem::take)
            .unwrap_or_default();
        for copy in &copies {
            state.execute(copy);
        }
        Ok(())
    }

    fn queue_wait_idle(&self, _queue: vk::Queue) -> VkResult<()> {
        self.state().stats.queue_idles += 1;
        Ok(())
    }

    fn create_fence(&self) -> VkResult<vk::Fence> {
        let mut state = self.state();
        let fence: vk::Fence = state.handle();
        state.live_fences.insert(fence.as_raw());
        state.stats.fences_created += 1;
        Ok(fence)
    }

    fn wait_for_fence(&self, fence: vk::Fence, _timeout_ns: u64) -> VkResult<()> {
        let state = self.state();
        assert!(state.live_fences.contains(&fence.as_raw()), "wait on dead fence");
        if state.fail_fence_waits {
            return Err(vk::Result::ERROR_DEVICE_LOST);
        }
        Ok(())
    }

    fn destroy_fence(&self, fence: vk::Fence) {
        let mut state = self.state();
        state.live_fences.remove(&fence.as_raw());
        state.stats.fences_destroyed += 1;
    }

    fn create_buffer(
        &self,
        size: vk::DeviceSize,
        _usage: vk::BufferUsageFlags,
        _sharing_mode: vk::SharingMode,
    ) -> VkResult<vk::Buffer> {
        let mut state = self.state();
        let buffer: vk::Buffer = state.handle();
        state.buffer_sizes.insert(buffer.as_raw(), size);
        state.stats.buffers_created += 1;
        Ok(buffer)
    }

    fn buffer_memory_requirements(&self, buffer: vk::Buffer) -> vk::MemoryRequirements {
        let size = self.state().buffer_sizes[&buffer.as_raw()];
        vk::MemoryRequirements {
            size: size.div_ceil(MOCK_ALIGNMENT) * MOCK_ALIGNMENT,
            alignment: MOCK_ALIGNMENT,
            memory_type_bits: 0b111,
        }
    }

    fn allocate_memory(
        &self,
        size: vk::DeviceSize,
        _memory_type_index: u32,
    ) -> VkResult<vk::DeviceMemory> {
        let mut state = self.state();
        let memory: vk::DeviceMemory = state.handle();
        state.memories.insert(memory.as_raw(), vec![0xCD; size as usize]);
        state.stats.allocations += 1;
        Ok(memory)
    }

    fn bind_buffer_memory(&self, buffer: vk::Buffer, memory: vk::DeviceMemory) -> VkResult<()> {
        self.state()
            .buffer_memory
            .insert(buffer.as_raw(), memory.as_raw());
        Ok(())
    }

    fn map_memory(
        &self,
        memory: vk::DeviceMemory,
        offset: vk::DeviceSize,
        _size: vk::DeviceSize,
    ) -> VkResult<*mut c_void> {
        let mut state = self.state();
        state.stats.maps += 1;
        let bytes = state
            .memories
            .get_mut(&memory.as_raw())
            .ok_or(vk::Result::ERROR_MEMORY_MAP_FAILED)?;
        Ok(unsafe { bytes.as_mut_ptr().add(offset as usize) }.cast())
    }

    fn unmap_memory(&self, _memory: vk::DeviceMemory) {
        self.state().stats.unmaps += 1;
    }

    fn destroy_buffer(&self, buffer: vk::Buffer) {
        let mut state = self.state();
        state.buffer_memory.remove(&buffer.as_raw());
        state.buffer_sizes.remove(&buffer.as_raw());
        state.stats.buffers_destroyed += 1;
    }

    fn free_memory(&self, memory: vk::DeviceMemory) {
        let mut state = self.state();
        state.memories.remove(&memory.as_raw());
        state.stats.frees += 1;
    }
}
