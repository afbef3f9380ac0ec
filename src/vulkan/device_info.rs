use std::fmt::Write;

use ash::vk;

use super::{
    config::QueueConfiguration,
    instance::create_instance,
    physical::enumerate_physical_devices,
    product::{INTEL_VENDOR_ID, IntelProduct},
};
use crate::error::Result;

pub struct DeviceReport {
    pub name: String,
    pub vendor_id: u32,
    pub device_id: u32,
    pub device_type: vk::PhysicalDeviceType,
    pub driver_version: u32,
    pub api_version: u32,
    pub driver_name: String,
    pub driver_info: String,
}

impl DeviceReport {
    fn query(instance: &ash::Instance, device: vk::PhysicalDevice) -> Self {
        let mut driver_props = vk::PhysicalDeviceDriverProperties::default();
        let mut props2 = vk::PhysicalDeviceProperties2::default().push_next(&mut driver_props);
        unsafe { instance.get_physical_device_properties2(device, &mut props2) };
        let props = props2.properties;

        let text = |s: std::result::Result<&std::ffi::CStr, _>| {
            s.map(|c| c.to_string_lossy().into_owned()).unwrap_or_default()
        };

        Self {
            name: text(props.device_name_as_c_str()),
            vendor_id: props.vendor_id,
            device_id: props.device_id,
            device_type: props.device_type,
            driver_version: props.driver_version,
            api_version: props.api_version,
            driver_name: text(driver_props.driver_name_as_c_str()),
            driver_info: text(driver_props.driver_info_as_c_str()),
        }
    }

    pub fn is_intel(&self) -> bool {
        self.vendor_id == INTEL_VENDOR_ID
    }
}

pub fn device_type_name(device_type: vk::PhysicalDeviceType) -> &'static str {
    match device_type {
        vk::PhysicalDeviceType::OTHER => "Other",
        vk::PhysicalDeviceType::INTEGRATED_GPU => "Integrated GPU",
        vk::PhysicalDeviceType::DISCRETE_GPU => "Discrete GPU",
        vk::PhysicalDeviceType::VIRTUAL_GPU => "Virtual GPU",
        vk::PhysicalDeviceType::CPU => "CPU",
        _ => "Unknown",
    }
}

/// Vendor-style `major.minor.build` split of the packed driver version.
pub fn driver_version_string(version: u32) -> String {
    format!(
        "{}.{}.{}",
        (version & 0xFF00_0000) >> 24,
        (version & 0x00FF_0000) >> 16,
        version & 0x0000_FFFF
    )
}

pub fn format_detailed(report: &DeviceReport) -> String {
    let product = IntelProduct::from_device_id(report.device_id);
    let mut out = String::new();
    let _ = writeln!(out, "\tDevice: {}", report.name);
    let _ = writeln!(out, "\t\tvendorId:      {:#x}", report.vendor_id);
    let _ = writeln!(
        out,
        "\t\tdeviceId:      {:#x} (intelProduct={product}, intelGen={})",
        report.device_id,
        product.generation()
    );
    let _ = writeln!(out, "\t\tdeviceType:    {}", device_type_name(report.device_type));
    let _ = writeln!(out, "\t\tdriverName:    {}", report.driver_name);
    let _ = writeln!(out, "\t\tdriverInfo:    {}", report.driver_info);
    let _ = writeln!(
        out,
        "\t\tdriverVersion: {}",
        driver_version_string(report.driver_version)
    );
    out
}

pub fn format_summary(index: usize, report: &DeviceReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Device Type:    {}", device_type_name(report.device_type));
    let _ = writeln!(out, "Device Name:    {}", report.name);
    let _ = writeln!(out, "Vendor ID:      {:#x}", report.vendor_id);
    let _ = writeln!(out, "Device ID:      {:#x}", report.device_id);
    let _ = writeln!(
        out,
        "Driver Version: {:#x} ({})",
        report.driver_version,
        driver_version_string(report.driver_version)
    );
    let _ = writeln!(
        out,
        "VK API Version: {}.{}.{}",
        vk::api_version_major(report.api_version),
        vk::api_version_minor(report.api_version),
        vk::api_version_patch(report.api_version)
    );
    if report.is_intel() {
        let product = IntelProduct::from_device_id(report.device_id);
        let _ = writeln!(out, "Intel Product:  {product}");
        let _ = writeln!(out, "Intel Gen:      {}", product.generation());
    }
    let _ = writeln!(
        out,
        "Note: select this device with --vk-physical-device-index={index}"
    );
    out
}

fn query_all() -> Result<Vec<DeviceReport>> {
    let (instance, _messenger) = create_instance(&QueueConfiguration::new().disable())?;
    let reports = enumerate_physical_devices(&instance).map(|devices| {
        devices
            .into_iter()
            .map(|device| DeviceReport::query(&instance, device))
            .collect()
    });
    unsafe { instance.destroy_instance(None) };
    reports
}

/// Detailed information for every recognized Intel device.
pub fn print_device_info() -> Result<()> {
    for report in query_all()?.iter().filter(|r| r.is_intel()) {
        print!("{}", format_detailed(report));
    }
    println!();
    Ok(())
}

pub fn print_available_devices() -> Result<()> {
    let reports = query_all()?;
    println!("Available Vulkan Physical Devices: {}", reports.len());
    for (index, report) in reports.iter().enumerate() {
        println!("{}", format_summary(index, report));
    }
    Ok(())
}
