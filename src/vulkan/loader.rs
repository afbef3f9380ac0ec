use std::sync::OnceLock;

use crate::error::{BenchError, Result};

static ENTRY: OnceLock<ash::Entry> = OnceLock::new();

/// Loads the Vulkan loader and its global function table. Idempotent; must run
/// before any other Vulkan call.
pub fn initialize() -> Result<&'static ash::Entry> {
    if let Some(entry) = ENTRY.get() {
        return Ok(entry);
    }

    let entry = unsafe { ash::Entry::load() }.map_err(|e| {
        BenchError::Configuration(format!(
            "failed to load the Vulkan loader: {e}. Is a Vulkan driver (ICD) installed?"
        ))
    })?;
    log::debug!("Vulkan loader initialized");

    Ok(ENTRY.get_or_init(|| entry))
}

pub fn entry() -> Result<&'static ash::Entry> {
    ENTRY.get().ok_or_else(|| {
        BenchError::configuration("Vulkan used before vulkan::loader::initialize()")
    })
}
