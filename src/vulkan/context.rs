use std::sync::Arc;

use ash::vk;

use super::{
    config::QueueConfiguration,
    device::create_logical_device,
    device_context::DeviceContext,
    instance::{DebugMessenger, create_instance},
    physical::{find_queue_family, pick_physical_device},
};
use crate::{
    driver::AshDriver,
    error::{BenchError, Result},
};

/// Instance, selected physical device and, unless disabled, the device
/// context holding the queue and the default command pool.
pub struct VulkanContext {
    device_context: Option<DeviceContext>,
    physical_device: vk::PhysicalDevice,
    debug_messenger: Option<DebugMessenger>,
    instance: ash::Instance,
}

impl VulkanContext {
    pub fn new(config: &QueueConfiguration) -> Result<Self> {
        let (instance, debug_messenger) = create_instance(config)?;

        // From here on the instance is owned by `context`, so early returns
        // clean up through Drop.
        let mut context = Self {
            device_context: None,
            physical_device: vk::PhysicalDevice::null(),
            debug_messenger,
            instance,
        };

        context.physical_device =
            pick_physical_device(&context.instance, config.selected_device_index())?;

        if config.creates_queue() {
            context.device_context = Some(context.create_device_context(config)?);
        }

        Ok(context)
    }

    fn create_device_context(&self, config: &QueueConfiguration) -> Result<DeviceContext> {
        let queue_family = find_queue_family(
            &self.instance,
            self.physical_device,
            config.selected_engine(),
        )?;
        if config.is_profiling() && queue_family.timestamp_valid_bits == 0 {
            log::warn!(
                "queue family {} has no timestamp support, profiling falls back to host timing",
                queue_family.index
            );
        }

        let (device, queue) =
            create_logical_device(&self.instance, self.physical_device, queue_family)?;
        let driver = Arc::new(AshDriver::new(
            &self.instance,
            self.physical_device,
            device,
            config.wants_debug_utils() && self.debug_messenger.is_some(),
        ));

        DeviceContext::new(driver, queue, queue_family.index)
    }

    pub fn device_context(&self) -> Result<&DeviceContext> {
        self.device_context
            .as_ref()
            .ok_or_else(|| BenchError::configuration("Vulkan context was created without a queue"))
    }
}

impl Drop for VulkanContext {
    fn drop(&mut self) {
        log::trace!("Destroying Vulkan Context");
        // Pool and device go before the instance.
        self.device_context = None;

        if let Some((debug_utils, messenger)) = &self.debug_messenger {
            log::trace!("  Destroying debug messenger");
            unsafe {
                debug_utils.destroy_debug_utils_messenger(*messenger, None);
            }
        }
        log::trace!("  Destroying Instance");
        unsafe {
            self.instance.destroy_instance(None);
        }
        log::trace!("Vulkan Context Destroyed");
    }
}
