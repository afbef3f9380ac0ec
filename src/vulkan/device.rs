use ash::vk;

use super::physical::SelectedQueueFamily;
use crate::error::{Result, VkResultExt};

pub fn create_logical_device(
    instance: &ash::Instance,
    physical_device: vk::PhysicalDevice,
    queue_family: SelectedQueueFamily,
) -> Result<(ash::Device, vk::Queue)> {
    let queue_priorities = [1.0f32];
    let queue_create_infos = [vk::DeviceQueueCreateInfo::default()
        .queue_family_index(queue_family.index)
        .queue_priorities(&queue_priorities)];

    let device_features = vk::PhysicalDeviceFeatures::default();
    let device_create_info = vk::DeviceCreateInfo::default()
        .queue_create_infos(&queue_create_infos)
        .enabled_features(&device_features);

    let device = unsafe { instance.create_device(physical_device, &device_create_info, None) }
        .or_fatal("vkCreateDevice")?;
    let queue = unsafe { device.get_device_queue(queue_family.index, 0) };

    log::trace!("Created logical device with one queue on family {}", queue_family.index);

    Ok((device, queue))
}
