use ash::vk;

use super::config::Engine;
use crate::error::{BenchError, Result, VkResultExt};

#[derive(Clone, Copy, Debug)]
pub struct SelectedQueueFamily {
    pub index: u32,
    pub timestamp_valid_bits: u32,
}

pub fn enumerate_physical_devices(instance: &ash::Instance) -> Result<Vec<vk::PhysicalDevice>> {
    unsafe { instance.enumerate_physical_devices() }.or_fatal("vkEnumeratePhysicalDevices")
}

pub fn pick_physical_device(
    instance: &ash::Instance,
    requested_index: u32,
) -> Result<vk::PhysicalDevice> {
    let devices = enumerate_physical_devices(instance)?;
    let device = select_by_index(&devices, requested_index)?;

    let props = unsafe { instance.get_physical_device_properties(device) };
    log::debug!(
        "Selected physical device {requested_index}: {:?}",
        props.device_name_as_c_str().unwrap_or_default()
    );
    Ok(device)
}

fn select_by_index<T: Copy>(devices: &[T], requested_index: u32) -> Result<T> {
    devices
        .get(requested_index as usize)
        .copied()
        .ok_or_else(|| {
            BenchError::Configuration(format!(
                "invalid physical device index {requested_index}, {} device(s) available",
                devices.len()
            ))
        })
}

pub fn find_queue_family(
    instance: &ash::Instance,
    device: vk::PhysicalDevice,
    engine: Engine,
) -> Result<SelectedQueueFamily> {
    let families = unsafe { instance.get_physical_device_queue_family_properties(device) };
    select_queue_family(&families, engine).ok_or_else(|| {
        BenchError::configuration("physical device exposes no transfer-capable queue family")
    })
}

/// Prefers a family dedicated to `engine`, then the first family able to
/// record copies.
pub fn select_queue_family(
    families: &[vk::QueueFamilyProperties],
    engine: Engine,
) -> Option<SelectedQueueFamily> {
    let usable = |flags: vk::QueueFlags| {
        flags.intersects(vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE | vk::QueueFlags::TRANSFER)
    };
    let find = |pred: &dyn Fn(vk::QueueFlags) -> bool| {
        families
            .iter()
            .zip(0u32..)
            .find(|(family, _)| family.queue_count > 0 && pred(family.queue_flags))
            .map(|(family, index)| SelectedQueueFamily {
                index,
                timestamp_valid_bits: family.timestamp_valid_bits,
            })
    };

    let preferred = match engine {
        Engine::Bcs => find(&|f: vk::QueueFlags| {
            f.contains(vk::QueueFlags::TRANSFER)
                && !f.intersects(vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE)
        }),
        Engine::Ccs => {
            find(&|f: vk::QueueFlags| f.contains(vk::QueueFlags::COMPUTE) && !f.contains(vk::QueueFlags::GRAPHICS))
        }
        Engine::Rcs | Engine::Unknown => find(&|f: vk::QueueFlags| f.contains(vk::QueueFlags::GRAPHICS)),
    };

    preferred.or_else(|| {
        log::warn!("no dedicated queue family for {engine:?}, falling back");
        find(&usable)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn family(flags: vk::QueueFlags, timestamp_valid_bits: u32) -> vk::QueueFamilyProperties {
        vk::QueueFamilyProperties {
            queue_flags: flags,
            queue_count: 1,
            timestamp_valid_bits,
            ..Default::default()
        }
    }

    fn typical() -> Vec<vk::QueueFamilyProperties> {
        vec![
            family(
                vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE | vk::QueueFlags::TRANSFER,
                64,
            ),
            family(vk::QueueFlags::COMPUTE | vk::QueueFlags::TRANSFER, 64),
            family(vk::QueueFlags::TRANSFER, 0),
        ]
    }

    #[test]
    fn engines_map_to_dedicated_families() {
        let families = typical();
        assert_eq!(select_queue_family(&families, Engine::Unknown).unwrap().index, 0);
        assert_eq!(select_queue_family(&families, Engine::Rcs).unwrap().index, 0);
        assert_eq!(select_queue_family(&families, Engine::Ccs).unwrap().index, 1);
        let copy = select_queue_family(&families, Engine::Bcs).unwrap();
        assert_eq!(copy.index, 2);
        assert_eq!(copy.timestamp_valid_bits, 0);
    }

    #[test]
    fn missing_dedicated_family_falls_back() {
        let families = vec![family(
            vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE | vk::QueueFlags::TRANSFER,
            64,
        )];
        assert_eq!(select_queue_family(&families, Engine::Bcs).unwrap().index, 0);
        assert_eq!(select_queue_family(&families, Engine::Ccs).unwrap().index, 0);
    }

    #[test]
    fn empty_families_are_skipped() {
        let mut families = typical();
        families[0].queue_count = 0;
        assert_eq!(select_queue_family(&families, Engine::Unknown).unwrap().index, 1);
        assert!(select_queue_family(&[], Engine::Unknown).is_none());
    }

    #[test]
    fn device_index_out_of_range_reports_both_counts() {
        let devices = [10u32, 11];
        assert_eq!(select_by_index(&devices, 1).unwrap(), 11);
        let err = select_by_index(&devices, 5).unwrap_err();
        assert!(err.is_fatal());
        let message = err.to_string();
        assert!(message.contains('5') && message.contains("2 device(s)"), "{message}");
    }
}
