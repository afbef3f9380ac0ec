use std::ffi::{CStr, CString, c_char, c_void};

use ash::{Entry, ext::debug_utils, vk};

use crate::error::{BenchError, Result, VkResultExt};

const VALIDATION_LAYER: &str = "VK_LAYER_KHRONOS_validation";

unsafe extern "system" fn vulkan_debug_callback(
    flag: vk::DebugUtilsMessageSeverityFlagsEXT,
    typ: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _: *mut c_void,
) -> vk::Bool32 {
    unsafe {
        use vk::DebugUtilsMessageSeverityFlagsEXT as Flag;

        let message = CStr::from_ptr((*p_callback_data).p_message);
        match flag {
            Flag::VERBOSE => log::debug!("{:?} - {:?}", typ, message),
            Flag::INFO => log::info!("{:?} - {:?}", typ, message),
            Flag::WARNING => log::warn!("{:?} - {:?}", typ, message),
            _ => log::error!("{:?} - {:?}", typ, message),
        }
        vk::FALSE
    }
}

pub fn validation_layer_names() -> (Vec<CString>, Vec<*const c_char>) {
    let layer_names = CString::new(VALIDATION_LAYER)
        .map(|name| vec![name])
        .unwrap_or_default();
    let layer_names_ptrs = layer_names
        .iter()
        .map(|name| name.as_ptr())
        .collect::<Vec<_>>();
    (layer_names, layer_names_ptrs)
}

pub fn check_validation_layer_support(entry: &Entry) -> Result<()> {
    let supported_layers =
        unsafe { entry.enumerate_instance_layer_properties() }
            .or_fatal("vkEnumerateInstanceLayerProperties")?;

    let found = supported_layers.iter().any(|layer| {
        layer
            .layer_name_as_c_str()
            .is_ok_and(|name| name.to_bytes() == VALIDATION_LAYER.as_bytes())
    });

    if !found {
        return Err(BenchError::Configuration(format!(
            "validation layer not supported: {VALIDATION_LAYER}"
        )));
    }
    Ok(())
}

pub fn setup_debug_messenger(
    entry: &Entry,
    instance: &ash::Instance,
    verbose: bool,
) -> Option<(debug_utils::Instance, vk::DebugUtilsMessengerEXT)> {
    let create_info = create_debug_create_info(verbose);
    let debug_utils = debug_utils::Instance::new(entry, instance);
    let debug_utils_messenger = unsafe {
        match debug_utils.create_debug_utils_messenger(&create_info, None) {
            Ok(m) => m,
            Err(e) => {
                log::warn!("failed to create debug_utils_messenger: {:?}", e);
                return None;
            }
        }
    };

    Some((debug_utils, debug_utils_messenger))
}

/// Warnings and errors always; info and verbose messages with the debug layer.
pub fn create_debug_create_info(verbose: bool) -> vk::DebugUtilsMessengerCreateInfoEXT<'static> {
    let mut severity =
        vk::DebugUtilsMessageSeverityFlagsEXT::ERROR | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING;
    if verbose {
        severity |= vk::DebugUtilsMessageSeverityFlagsEXT::INFO
            | vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE;
    }

    vk::DebugUtilsMessengerCreateInfoEXT::default()
        .flags(vk::DebugUtilsMessengerCreateFlagsEXT::empty())
        .message_severity(severity)
        .message_type(
            vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        )
        .pfn_user_callback(Some(vulkan_debug_callback))
}
