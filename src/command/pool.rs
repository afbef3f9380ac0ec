use std::sync::Arc;

use ash::vk;
use smallvec::SmallVec;

use crate::{
    command::slot::{CommandSlot, EndEncoding, SlotState},
    driver::Driver,
    error::{BenchError, Result, VkResultExt},
};

pub const DEFAULT_POOL_DEPTH: u32 = 3;

const FENCE_TIMEOUT_NS: u64 = u64::MAX;

/// A fixed ring of command buffers bound to one queue.
///
/// Callers obtain slots through [`CommandPool::acquire`] and never track which
/// slots are still open: an open slot picked by the cursor is flushed and
/// reopened in place.
pub struct CommandPool {
    driver: Arc<dyn Driver>,
    queue: vk::Queue,
    command_pool: vk::CommandPool,
    slots: SmallVec<[CommandSlot; 4]>,
    cursor: usize,
    auto_flushes: u64,
}

impl CommandPool {
    pub fn new(
        driver: Arc<dyn Driver>,
        queue: vk::Queue,
        slot_count: u32,
        queue_family_index: u32,
        level: vk::CommandBufferLevel,
    ) -> Result<Self> {
        if driver.device_handle() == vk::Device::null() {
            return Err(BenchError::configuration("command pool needs a valid device"));
        }
        if slot_count == 0 {
            return Err(BenchError::configuration(
                "command pool needs at least one command buffer",
            ));
        }

        let command_pool = driver
            .create_command_pool(queue_family_index)
            .or_fatal("vkCreateCommandPool")?;

        let command_buffers = match driver.allocate_command_buffers(command_pool, level, slot_count)
        {
            Ok(buffers) => buffers,
            Err(result) => {
                driver.destroy_command_pool(command_pool, &[]);
                return Err(BenchError::Configuration(format!(
                    "vkAllocateCommandBuffers failed: {result}"
                )));
            }
        };

        let slots = command_buffers
            .into_iter()
            .map(CommandSlot::new)
            .collect();

        log::trace!(
            "Created command pool with {slot_count} {level:?} command buffers on family {queue_family_index}"
        );

        Ok(Self {
            driver,
            queue,
            command_pool,
            slots,
            cursor: 0,
            auto_flushes: 0,
        })
    }

    pub fn len(&self) -> u32 {
        self.slots.len() as u32
    }

    /// Number of open slots flushed by [`CommandPool::acquire`] so far.
    pub fn auto_flush_count(&self) -> u64 {
        self.auto_flushes
    }

    #[cfg(test)]
    pub fn command_buffer_at(&self, index: u32) -> Result<vk::CommandBuffer> {
        Ok(self.slot(index)?.command_buffer)
    }

    #[cfg(test)]
    pub fn state(&self, index: u32) -> Result<SlotState> {
        Ok(self.slot(index)?.state)
    }

    fn slot(&self, index: u32) -> Result<&CommandSlot> {
        self.slots.get(index as usize).ok_or(BenchError::SlotOutOfRange {
            index,
            count: self.len(),
        })
    }

    fn slot_mut(&mut self, index: u32) -> Result<&mut CommandSlot> {
        let count = self.len();
        self.slots
            .get_mut(index as usize)
            .ok_or(BenchError::SlotOutOfRange { index, count })
    }

    pub fn begin_primary(
        &mut self,
        index: u32,
        flags: vk::CommandBufferUsageFlags,
    ) -> Result<vk::CommandBuffer> {
        let (state, command_buffer) = {
            let slot = self.slot(index)?;
            (slot.state, slot.command_buffer)
        };

        match state {
            SlotState::Recording => return Err(BenchError::SlotAlreadyOpen(index)),
            SlotState::Pending => {
                log::trace!("Draining queue before re-recording pending slot {index}");
                self.driver
                    .queue_wait_idle(self.queue)
                    .or_operational("vkQueueWaitIdle")?;
            }
            SlotState::Idle | SlotState::Executable => {}
        }

        self.driver
            .begin_command_buffer(command_buffer, flags)
            .or_operational("vkBeginCommandBuffer")?;

        self.slot_mut(index)?.state = SlotState::Recording;
        Ok(command_buffer)
    }

    pub fn end(&mut self, index: u32) -> Result<()> {
        let slot = self.slot(index)?;
        if !slot.is_recording() {
            return Err(BenchError::SlotNotOpen(index));
        }

        self.driver
            .end_command_buffer(slot.command_buffer)
            .or_operational("vkEndCommandBuffer")?;

        self.slot_mut(index)?.state = SlotState::Executable;
        Ok(())
    }

    /// Ends the slot if it is recording and submits it to the bound queue.
    ///
    /// Without `wait_for_complete` the submission is fire-and-forget: the slot
    /// stays `Pending` and resources it references must not be reused until a
    /// later waiting flush.
    pub fn flush(&mut self, index: u32, wait_for_complete: bool) -> Result<()> {
        #[cfg(feature = "tracing")]
        let _span = tracy_client::span!("command_pool_flush");

        let state = self.slot(index)?.state;
        match state {
            SlotState::Recording => self.end(index)?,
            SlotState::Executable => {}
            SlotState::Idle => {
                log::trace!("Slot {index} has no recorded work, nothing to flush");
                return Ok(());
            }
            SlotState::Pending => {
                if wait_for_complete {
                    self.driver
                        .queue_wait_idle(self.queue)
                        .or_operational("vkQueueWaitIdle")?;
                    self.slot_mut(index)?.state = SlotState::Idle;
                }
                return Ok(());
            }
        }

        let command_buffer = self.slot(index)?.command_buffer;

        if !wait_for_complete {
            self.driver
                .queue_submit(self.queue, command_buffer, vk::Fence::null())
                .or_operational("vkQueueSubmit")?;
            self.slot_mut(index)?.state = SlotState::Pending;
            return Ok(());
        }

        let fence = self.driver.create_fence().or_operational("vkCreateFence")?;
        if let Err(e) = self
            .driver
            .queue_submit(self.queue, command_buffer, fence)
            .or_operational("vkQueueSubmit")
        {
            self.driver.destroy_fence(fence);
            return Err(e);
        }

        // The work is on the queue from here on, even if the wait fails.
        self.slot_mut(index)?.state = SlotState::Pending;
        let waited = self
            .driver
            .wait_for_fence(fence, FENCE_TIMEOUT_NS)
            .or_operational("vkWaitForFences");
        self.driver.destroy_fence(fence);
        waited?;

        self.slot_mut(index)?.state = SlotState::Idle;
        Ok(())
    }

    /// Flushes every slot in index order, stopping at the first failure.
    pub fn flush_all(&mut self, wait_for_complete: bool) -> Result<()> {
        for index in 0..self.len() {
            self.flush(index, wait_for_complete)
                .map_err(|source| BenchError::FlushFailed {
                    index,
                    source: Box::new(source),
                })?;
        }
        Ok(())
    }

    /// Opens the next slot in the ring for recording.
    pub fn acquire(&mut self) -> Result<(u32, vk::CommandBuffer)> {
        let index = self.cursor as u32;
        self.cursor = (self.cursor + 1) % self.slots.len();

        let flags = vk::CommandBufferUsageFlags::SIMULTANEOUS_USE;
        match self.begin_primary(index, flags) {
            Err(BenchError::SlotAlreadyOpen(_)) => {
                log::debug!("Slot {index} still open, flushing before reuse");
                self.flush(index, true)?;
                self.auto_flushes += 1;
                let command_buffer = self.begin_primary(index, flags)?;
                Ok((index, command_buffer))
            }
            other => other.map(|command_buffer| (index, command_buffer)),
        }
    }

    pub fn end_encoding(&mut self, index: u32, end: EndEncoding) -> Result<()> {
        match end {
            #[cfg(test)]
            EndEncoding::None => self.end(index),
            EndEncoding::Flush => self.flush(index, false),
            EndEncoding::Finish => self.flush(index, true),
        }
    }
}

impl Drop for CommandPool {
    fn drop(&mut self) {
        log::trace!("Destroying command pool");
        if self.slots.iter().any(|s| s.state == SlotState::Pending) {
            if let Err(e) = self.driver.queue_wait_idle(self.queue) {
                log::warn!("failed to drain queue before destroying command pool: {e}");
            }
        }
        let command_buffers = self
            .slots
            .drain(..)
            .map(|s| s.command_buffer)
            .collect::<Vec<_>>();
        self.driver
            .destroy_command_pool(self.command_pool, &command_buffers);
    }
}
