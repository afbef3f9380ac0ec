use std::ops::{Deref, DerefMut};

use ash::vk;

use crate::{
    buffer::{contents::BufferContents, memory::find_memory_type, spec::BufferSpec},
    command::EndEncoding,
    driver::Driver,
    error::{BenchError, Result, VkResultExt},
    vulkan::DeviceContext,
};

/// One buffer object bound to its own dedicated allocation.
///
/// Device-local buffers are initialized through a host-visible staging buffer
/// that is built on the first [`DeviceBuffer::fill`] and cached until
/// discarded.
pub struct DeviceBuffer<'ctx> {
    context: &'ctx DeviceContext,
    buffer: vk::Buffer,
    memory: vk::DeviceMemory,
    spec: BufferSpec,
    actual_size: vk::DeviceSize,
    staging: Option<Box<DeviceBuffer<'ctx>>>,
    staging_writes: u32,
}

impl<'ctx> DeviceBuffer<'ctx> {
    /// Creates and binds the buffer. Every failure here is fatal: it means the
    /// device cannot host the requested configuration.
    pub fn new(context: &'ctx DeviceContext, spec: &BufferSpec) -> Result<Self> {
        let driver = context.driver();

        let buffer = driver
            .create_buffer(spec.size, spec.usage, spec.sharing_mode)
            .or_fatal("vkCreateBuffer")?;

        let requirements = driver.buffer_memory_requirements(buffer);
        let memory = match allocate_for(driver, &requirements, spec.memory_properties) {
            Ok(memory) => memory,
            Err(e) => {
                driver.destroy_buffer(buffer);
                return Err(e);
            }
        };

        if let Err(result) = driver.bind_buffer_memory(buffer, memory) {
            driver.destroy_buffer(buffer);
            driver.free_memory(memory);
            return Err(BenchError::Configuration(format!(
                "vkBindBufferMemory failed: {result}"
            )));
        }

        if let Some(name) = spec.debug_name.as_deref() {
            if let Err(e) = context.name_object(buffer, name) {
                log::warn!("failed to name buffer {name}: {e}");
            }
        }

        log::trace!(
            "Created buffer of {} bytes ({} allocated), usage {:?}, memory {:?}",
            spec.size,
            requirements.size,
            spec.usage,
            spec.memory_properties
        );

        Ok(Self {
            context,
            buffer,
            memory,
            spec: spec.clone(),
            actual_size: requirements.size,
            staging: None,
            staging_writes: 0,
        })
    }

    pub fn requested_size(&self) -> vk::DeviceSize {
        self.spec.size
    }

    /// Size of the backing allocation, at least the requested size.
    pub fn actual_size(&self) -> vk::DeviceSize {
        self.actual_size
    }

    #[cfg(test)]
    pub fn has_staging_buffer(&self) -> bool {
        self.staging.is_some()
    }

    /// How many times staging memory has been written by [`DeviceBuffer::fill`].
    pub fn staging_write_count(&self) -> u32 {
        self.staging_writes
    }

    /// Uploads `contents` through the staging buffer and waits for the copy.
    ///
    /// A cached staging buffer is reused as-is; `contents` only matters when
    /// the staging buffer has to be built.
    pub fn fill(&mut self, contents: BufferContents, discard_staging_after: bool) -> Result<()> {
        if self.staging.is_none() {
            let staging = self.build_staging_buffer(contents)?;
            self.staging = Some(Box::new(staging));
        }

        if let Some(staging) = self.staging.as_deref() {
            self.copy_from(staging, 0, 0, self.requested_size(), true)?;
        }

        if discard_staging_after {
            self.staging = None;
        }
        Ok(())
    }

    fn build_staging_buffer(&mut self, contents: BufferContents) -> Result<DeviceBuffer<'ctx>> {
        let size = self.requested_size();
        let mut spec = BufferSpec::staging(size);
        if let Some(name) = self.spec.debug_name.as_deref() {
            spec = spec.with_debug_name(format!("{name} (staging)"));
        }

        let mut staging = DeviceBuffer::new(self.context, &spec)?;
        let mut mapped = staging.map(0, size)?;
        contents.write(&mut mapped);
        mapped.unmap();
        self.staging_writes += 1;
        Ok(staging)
    }

    pub fn copy_from(
        &self,
        source: &DeviceBuffer<'_>,
        src_offset: vk::DeviceSize,
        dst_offset: vk::DeviceSize,
        size: vk::DeviceSize,
        wait_for_complete: bool,
    ) -> Result<()> {
        #[cfg(feature = "tracing")]
        let _span = tracy_client::span!("copy_buffer");

        let mut pool = self.context.pool();
        let (index, command_buffer) = pool.acquire()?;

        let region = vk::BufferCopy::default()
            .src_offset(src_offset)
            .dst_offset(dst_offset)
            .size(size);
        self.context
            .driver()
            .cmd_copy_buffer(command_buffer, source.buffer, self.buffer, region);

        pool.end_encoding(index, EndEncoding::from_wait(wait_for_complete))
    }

    /// Maps `size` bytes at `offset`; `vk::WHOLE_SIZE` maps to the end of the
    /// allocation. The range is unmapped when the guard drops.
    pub fn map(
        &mut self,
        offset: vk::DeviceSize,
        size: vk::DeviceSize,
    ) -> Result<MappedMemory<'_>> {
        let size = if size == vk::WHOLE_SIZE {
            self.actual_size.saturating_sub(offset)
        } else {
            size
        };
        let in_bounds = offset
            .checked_add(size)
            .is_some_and(|end| end <= self.actual_size);
        if !in_bounds {
            return Err(BenchError::MapRange {
                offset,
                size,
                capacity: self.actual_size,
            });
        }

        let len = usize::try_from(size).map_err(|_| BenchError::MapRange {
            offset,
            size,
            capacity: self.actual_size,
        })?;

        let driver = self.context.driver();
        let ptr = driver
            .map_memory(self.memory, offset, size)
            .or_operational("vkMapMemory")?;
        let bytes = unsafe { std::slice::from_raw_parts_mut(ptr.cast::<u8>(), len) };

        Ok(MappedMemory {
            driver,
            memory: self.memory,
            bytes,
        })
    }
}

impl Drop for DeviceBuffer<'_> {
    fn drop(&mut self) {
        self.staging = None;
        let driver = self.context.driver();
        driver.destroy_buffer(self.buffer);
        driver.free_memory(self.memory);
    }
}

fn allocate_for(
    driver: &dyn Driver,
    requirements: &vk::MemoryRequirements,
    properties: vk::MemoryPropertyFlags,
) -> Result<vk::DeviceMemory> {
    let memory_type_index = find_memory_type(
        &driver.memory_properties(),
        requirements.memory_type_bits,
        properties,
    )
    .ok_or_else(|| {
        BenchError::Configuration(format!(
            "failed to find suitable memory type (filter {:#x}, flags {properties:?})",
            requirements.memory_type_bits
        ))
    })?;

    driver
        .allocate_memory(requirements.size, memory_type_index)
        .or_fatal("vkAllocateMemory")
}

/// Host view of a mapped range, unmapped on drop.
pub struct MappedMemory<'a> {
    driver: &'a dyn Driver,
    memory: vk::DeviceMemory,
    bytes: &'a mut [u8],
}

impl MappedMemory<'_> {
    pub fn unmap(self) {}
}

impl Deref for MappedMemory<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.bytes
    }
}

impl DerefMut for MappedMemory<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        self.bytes
    }
}

impl Drop for MappedMemory<'_> {
    fn drop(&mut self) {
        self.driver.unmap_memory(self.memory);
    }
}
