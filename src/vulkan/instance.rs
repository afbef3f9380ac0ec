use std::ffi::{CStr, CString};

use ash::{ext::debug_utils, vk};

use super::{
    config::QueueConfiguration,
    debug::{
        check_validation_layer_support, create_debug_create_info, setup_debug_messenger,
        validation_layer_names,
    },
    loader,
};
use crate::error::{BenchError, Result, VkResultExt};

pub type DebugMessenger = (debug_utils::Instance, vk::DebugUtilsMessengerEXT);

fn required_instance_extensions() -> [&'static CStr; 1] {
    [ash::khr::get_physical_device_properties2::NAME]
}

pub fn create_instance(
    config: &QueueConfiguration,
) -> Result<(ash::Instance, Option<DebugMessenger>)> {
    let entry = loader::entry()?;

    let available = unsafe { entry.enumerate_instance_extension_properties(None) }
        .or_fatal("vkEnumerateInstanceExtensionProperties")?;
    let supports = |wanted: &CStr| {
        available
            .iter()
            .any(|ext| ext.extension_name_as_c_str().is_ok_and(|name| name == wanted))
    };

    let mut extension_names = Vec::new();
    for required in required_instance_extensions() {
        if !supports(required) {
            return Err(BenchError::Configuration(format!(
                "Vulkan instance is missing required extension {}. \
                 Do you have a compatible Vulkan installable client driver (ICD) installed?",
                required.to_string_lossy()
            )));
        }
        extension_names.push(required.as_ptr());
    }

    let portability = ash::khr::portability_enumeration::NAME;
    let create_flags = if supports(portability) {
        extension_names.push(portability.as_ptr());
        vk::InstanceCreateFlags::ENUMERATE_PORTABILITY_KHR
    } else {
        vk::InstanceCreateFlags::default()
    };

    let debug_utils_enabled = config.wants_debug_utils() && supports(debug_utils::NAME);
    if config.wants_debug_utils() && !debug_utils_enabled {
        log::warn!("VK_EXT_debug_utils not available, validation output will be lost");
    }
    if debug_utils_enabled {
        extension_names.push(debug_utils::NAME.as_ptr());
    }

    let app_name = CString::new("vkbench").map_err(|e| BenchError::configuration(e.to_string()))?;
    let app_info = vk::ApplicationInfo::default()
        .api_version(vk::API_VERSION_1_3)
        .application_name(app_name.as_c_str())
        .application_version(vk::make_api_version(0, 1, 0, 0))
        .engine_version(vk::make_api_version(0, 1, 0, 0));

    let (_layer_names, layer_names_ptrs) = validation_layer_names();
    let mut debug_create_info = create_debug_create_info(config.wants_debug_layer());
    let mut instance_create_info = vk::InstanceCreateInfo::default()
        .application_info(&app_info)
        .enabled_extension_names(&extension_names)
        .flags(create_flags);
    if config.wants_validation() {
        check_validation_layer_support(entry)?;
        instance_create_info = instance_create_info.enabled_layer_names(&layer_names_ptrs);
    }
    if debug_utils_enabled {
        instance_create_info = instance_create_info.push_next(&mut debug_create_info);
    }

    let instance = unsafe { entry.create_instance(&instance_create_info, None) }
        .or_fatal("vkCreateInstance")?;
    log::trace!("Created Vulkan instance");

    let debug_messenger = if debug_utils_enabled {
        setup_debug_messenger(entry, &instance, config.wants_debug_layer())
    } else {
        None
    };

    Ok((instance, debug_messenger))
}
