use ash::vk;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BenchError>;

#[derive(Debug, Error)]
pub enum BenchError {
    /// The environment or driver cannot support the requested setup.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("command buffer slot {0} is already open")]
    SlotAlreadyOpen(u32),

    #[error("command buffer slot {0} was never opened")]
    SlotNotOpen(u32),

    #[error("command buffer slot {index} is out of range (pool holds {count})")]
    SlotOutOfRange { index: u32, count: u32 },

    #[error("failed to flush command buffer slot {index}")]
    FlushFailed {
        index: u32,
        #[source]
        source: Box<BenchError>,
    },

    #[error("mapping {size} bytes at offset {offset} exceeds allocation of {capacity} bytes")]
    MapRange {
        offset: vk::DeviceSize,
        size: vk::DeviceSize,
        capacity: vk::DeviceSize,
    },

    #[error("{call} failed: {result}")]
    Vulkan {
        call: &'static str,
        result: vk::Result,
    },
}

impl BenchError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Fatal errors end the run; everything else only fails the current test case.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Configuration(_) => true,
            Self::FlushFailed { source, .. } => source.is_fatal(),
            _ => false,
        }
    }
}

pub(crate) trait VkResultExt<T> {
    /// Steady-state failure, reported to the caller.
    fn or_operational(self, call: &'static str) -> Result<T>;
    /// One-time setup failure, fatal for the run.
    fn or_fatal(self, call: &'static str) -> Result<T>;
}

impl<T> VkResultExt<T> for ash::prelude::VkResult<T> {
    fn or_operational(self, call: &'static str) -> Result<T> {
        self.map_err(|result| BenchError::Vulkan { call, result })
    }

    fn or_fatal(self, call: &'static str) -> Result<T> {
        self.map_err(|result| BenchError::Configuration(format!("{call} failed: {result}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_configuration_errors_are_fatal() {
        assert!(BenchError::configuration("no memory type").is_fatal());
        assert!(!BenchError::SlotAlreadyOpen(1).is_fatal());
        assert!(
            !BenchError::Vulkan {
                call: "vkQueueSubmit",
                result: vk::Result::ERROR_DEVICE_LOST,
            }
            .is_fatal()
        );
    }

    #[test]
    fn flush_failure_inherits_severity() {
        let err = BenchError::FlushFailed {
            index: 2,
            source: Box::new(BenchError::Vulkan {
                call: "vkQueueSubmit",
                result: vk::Result::ERROR_OUT_OF_DEVICE_MEMORY,
            }),
        };
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("slot 2"));
    }

    #[test]
    fn vk_result_mapping_picks_severity() {
        let failed: ash::prelude::VkResult<()> = Err(vk::Result::ERROR_INITIALIZATION_FAILED);
        assert!(failed.or_fatal("vkCreateCommandPool").unwrap_err().is_fatal());
        assert!(!failed.or_operational("vkEndCommandBuffer").unwrap_err().is_fatal());
    }
}
