use ash::vk;

use super::{
    Api, Backend, CopyBufferArguments, TestCase,
    statistics::{MeasurementFields, MeasurementType, MeasurementUnit, Statistics},
    timer::Timer,
};
use crate::{
    buffer::{BufferSpec, DeviceBuffer},
    error::{BenchError, Result},
    vulkan::{DeviceContext, QueueConfiguration, VulkanContext},
};

pub const NAME: &str = "CopyBuffer";

/// Device-local to device-local buffer copy throughput.
pub struct CopyBufferVulkan {
    template: QueueConfiguration,
    context: Option<VulkanContext>,
}

impl CopyBufferVulkan {
    pub fn new(template: QueueConfiguration) -> Self {
        Self {
            template,
            context: None,
        }
    }
}

pub fn test_case(
    arguments: CopyBufferArguments,
    template: QueueConfiguration,
) -> TestCase<CopyBufferArguments> {
    TestCase::new(NAME, arguments).with_backend(Box::new(CopyBufferVulkan::new(template)))
}

fn measurement_fields(arguments: &CopyBufferArguments) -> MeasurementFields {
    let kind = if arguments.use_events {
        MeasurementType::Gpu
    } else {
        MeasurementType::Cpu
    };
    MeasurementFields::new(MeasurementUnit::GigabytesPerSecond, kind)
}

impl Backend for CopyBufferVulkan {
    type Arguments = CopyBufferArguments;

    fn api(&self) -> Api {
        Api::Vulkan
    }

    fn measurement(&self, arguments: &CopyBufferArguments) -> MeasurementFields {
        measurement_fields(arguments)
    }

    fn setup(&mut self, arguments: &CopyBufferArguments) -> Result<bool> {
        let config = self.template.clone().profiling(arguments.use_events);
        match VulkanContext::new(&config) {
            Ok(context) => {
                self.context = Some(context);
                Ok(true)
            }
            Err(e) if !config.requires_creation_success() => {
                log::warn!("{NAME}: device context unavailable: {e}");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    fn run(&mut self, arguments: &CopyBufferArguments, statistics: &mut Statistics) -> Result<()> {
        let context = match &self.context {
            Some(context) => context.device_context()?,
            None => return Err(BenchError::configuration("copy buffer run without setup")),
        };
        measure_copies(context, arguments, statistics)
    }

    fn teardown(&mut self) {
        if let Some(Ok(device)) = self.context.as_ref().map(VulkanContext::device_context) {
            if let Err(e) = device.pool().flush_all(true) {
                log::error!("{NAME}: failed to drain the queue before teardown: {e}");
            }
        }
        self.context = None;
    }
}

/// Fills a source and a destination buffer, then times `iterations` waited
/// copies of `size` bytes between them.
pub fn measure_copies(
    context: &DeviceContext,
    arguments: &CopyBufferArguments,
    statistics: &mut Statistics,
) -> Result<()> {
    let fields = measurement_fields(arguments);
    let size = arguments.size;

    let mut source = DeviceBuffer::new(
        context,
        &BufferSpec::device_local(
            size,
            vk::BufferUsageFlags::TRANSFER_SRC
                | vk::BufferUsageFlags::TRANSFER_DST
                | vk::BufferUsageFlags::STORAGE_BUFFER,
        )
        .with_debug_name("copy source"),
    )?;
    let mut destination = DeviceBuffer::new(
        context,
        &BufferSpec::device_local(
            size,
            vk::BufferUsageFlags::TRANSFER_DST | vk::BufferUsageFlags::STORAGE_BUFFER,
        )
        .with_debug_name("copy destination"),
    )?;

    // Both fills also warm up the queue and the slot ring.
    source.fill(arguments.contents, true)?;
    destination.fill(arguments.contents, true)?;
    log::debug!(
        "{NAME}: {} iteration(s) of {size} byte(s) ({} allocated) on queue family {}, measured as {fields}",
        arguments.iterations,
        destination.actual_size(),
        context.queue_family_index()
    );

    let mut timer = Timer::new();
    for _ in 0..arguments.iterations {
        timer.measure_start();
        destination.copy_from(&source, 0, 0, size, true)?;
        timer.measure_end();

        statistics.push_value(timer.get(), size, fields.unit, fields.kind);

        #[cfg(feature = "tracing")]
        if let Some(sample) = statistics.samples().last() {
            tracy_client::plot!("copy throughput", *sample);
        }
    }

    log::debug!(
        "{NAME}: {} staging write(s), {} auto-flush(es)",
        source.staging_write_count() + destination.staging_write_count(),
        context.pool().auto_flush_count()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ash::vk::Handle;

    use super::*;
    use crate::{buffer::BufferContents, driver::mock::MockDriver};

    fn context() -> (Arc<MockDriver>, DeviceContext) {
        let mock = Arc::new(MockDriver::new());
        let context = DeviceContext::new(mock.clone(), vk::Queue::from_raw(7), 0).unwrap();
        (mock, context)
    }

    fn arguments(iterations: u32) -> CopyBufferArguments {
        CopyBufferArguments {
            size: 4096,
            iterations,
            contents: BufferContents::IncreasingBytes,
            use_events: false,
        }
    }

    #[test]
    fn one_sample_per_iteration() {
        let (mock, context) = context();
        let mut stats = Statistics::new();
        measure_copies(&context, &arguments(5), &mut stats).unwrap();

        assert_eq!(stats.samples().len(), 5);
        assert!(stats.samples().iter().all(|s| *s >= 0.0));
        // Two staged fills plus one waited copy per iteration.
        assert_eq!(mock.stats().fenced_submits, 7);
    }

    #[test]
    fn buffers_are_released_after_measuring() {
        let (mock, context) = context();
        let mut stats = Statistics::new();
        measure_copies(&context, &arguments(2), &mut stats).unwrap();

        assert_eq!(mock.live_memory_count(), 0);
        assert_eq!(mock.stats().buffers_created, mock.stats().buffers_destroyed);
    }

    #[test]
    fn events_flag_tags_samples_as_gpu() {
        let backend = CopyBufferVulkan::new(QueueConfiguration::new());
        let args = CopyBufferArguments {
            use_events: true,
            ..arguments(1)
        };
        assert_eq!(backend.measurement(&args).kind, MeasurementType::Gpu);
        assert_eq!(backend.measurement(&arguments(1)).kind, MeasurementType::Cpu);
    }

    #[test]
    fn submit_failure_is_operational() {
        let (mock, context) = context();
        let command_buffer = context.pool().command_buffer_at(0).unwrap();
        mock.fail_submits_of(command_buffer);

        let mut stats = Statistics::new();
        let err = measure_copies(&context, &arguments(1), &mut stats).unwrap_err();
        assert!(!err.is_fatal(), "{err}");
        assert!(matches!(err, BenchError::Vulkan { .. } | BenchError::FlushFailed { .. }));
    }

    #[test]
    fn waited_copies_never_wrap_the_ring() {
        let (_mock, context) = context();
        let mut stats = Statistics::new();
        measure_copies(&context, &arguments(8), &mut stats).unwrap();
        assert_eq!(context.pool().auto_flush_count(), 0);
    }

    #[test]
    fn teardown_without_setup_is_harmless() {
        let mut backend = CopyBufferVulkan::new(QueueConfiguration::new());
        backend.teardown();
        assert!(backend.context.is_none());
    }

    #[test]
    fn run_without_setup_is_rejected() {
        let mut backend = CopyBufferVulkan::new(QueueConfiguration::new());
        let mut stats = Statistics::new();
        assert!(backend.run(&arguments(1), &mut stats).is_err());
    }
}
