use ash::vk;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// Nothing recorded, or the last submission is known to be complete.
    Idle,
    Recording,
    /// Ended but not submitted yet.
    Executable,
    /// Submitted without waiting; the device may still be executing it.
    Pending,
}

#[derive(Debug)]
pub struct CommandSlot {
    pub command_buffer: vk::CommandBuffer,
    pub state: SlotState,
}

impl CommandSlot {
    pub fn new(command_buffer: vk::CommandBuffer) -> Self {
        Self {
            command_buffer,
            state: SlotState::Idle,
        }
    }

    #[inline]
    pub fn is_recording(&self) -> bool {
        self.state == SlotState::Recording
    }
}

/// What to do with a slot once the caller has finished recording into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndEncoding {
    /// End recording, do not submit.
    #[cfg(test)]
    None,
    /// End recording and submit without waiting.
    Flush,
    /// End recording, submit and wait for completion.
    Finish,
}

impl EndEncoding {
    pub fn from_wait(wait_for_complete: bool) -> Self {
        if wait_for_complete {
            EndEncoding::Finish
        } else {
            EndEncoding::Flush
        }
    }
}
