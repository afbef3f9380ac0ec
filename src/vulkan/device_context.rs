use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ash::vk;

use crate::{
    command::{CommandPool, DEFAULT_POOL_DEPTH},
    driver::Driver,
    error::{Result, VkResultExt},
};

/// Everything a buffer needs from the device: the driver and the shared
/// recording pool bound to one queue.
///
/// The pool sits behind one mutex; a record/submit sequence holds the lock for
/// its whole duration.
pub struct DeviceContext {
    pool: Mutex<CommandPool>,
    driver: Arc<dyn Driver>,
    queue_family_index: u32,
}

impl DeviceContext {
    pub fn new(driver: Arc<dyn Driver>, queue: vk::Queue, queue_family_index: u32) -> Result<Self> {
        Self::with_pool_depth(driver, queue, queue_family_index, DEFAULT_POOL_DEPTH)
    }

    pub fn with_pool_depth(
        driver: Arc<dyn Driver>,
        queue: vk::Queue,
        queue_family_index: u32,
        depth: u32,
    ) -> Result<Self> {
        let pool = CommandPool::new(
            driver.clone(),
            queue,
            depth,
            queue_family_index,
            vk::CommandBufferLevel::PRIMARY,
        )?;

        Ok(Self {
            pool: Mutex::new(pool),
            driver,
            queue_family_index,
        })
    }

    pub fn driver(&self) -> &dyn Driver {
        self.driver.as_ref()
    }

    pub fn queue_family_index(&self) -> u32 {
        self.queue_family_index
    }

    pub fn pool(&self) -> MutexGuard<'_, CommandPool> {
        self.pool.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn name_object<T>(&self, handle: T, debug_name: impl AsRef<str>) -> Result<()>
    where
        T: vk::Handle,
    {
        self.driver
            .name_object(T::TYPE, handle.as_raw(), debug_name.as_ref())
            .or_operational("vkSetDebugUtilsObjectNameEXT")
    }
}
