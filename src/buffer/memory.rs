use ash::vk;

/// First memory type allowed by `type_filter` whose flags contain `required`.
pub fn find_memory_type(
    memory_properties: &vk::PhysicalDeviceMemoryProperties,
    type_filter: u32,
    required: vk::MemoryPropertyFlags,
) -> Option<u32> {
    (0..memory_properties.memory_type_count).find(|&index| {
        let allowed = type_filter & (1 << index) != 0;
        let flags = memory_properties.memory_types[index as usize].property_flags;
        allowed && flags.contains(required)
    })
}
