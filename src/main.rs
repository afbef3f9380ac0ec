use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use crate::{
    app::{App, AppState},
    benchmark::{CopyBufferArguments, Registry, arguments, copy_buffer},
    buffer::{BufferContents, DEFAULT_RANDOM_SEED},
    vulkan::{Engine, QueueConfiguration},
};

mod app;
mod benchmark;
mod buffer;
mod command;
mod driver;
mod error;
mod vulkan;

/// GPU memory-copy micro-benchmarks over Vulkan.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Print detailed information about the installed Intel GPUs and exit.
    #[arg(long)]
    info: bool,

    /// List every Vulkan physical device and exit.
    #[arg(long)]
    list: bool,

    /// Run only the test case with this name.
    #[arg(long)]
    test: Option<String>,

    /// Report every case as nooped without touching the device.
    #[arg(long)]
    noop: bool,

    #[arg(long = "vk-physical-device-index", default_value_t = 0)]
    physical_device_index: u32,

    /// Enable the Khronos validation layer.
    #[arg(long)]
    validation: bool,

    /// Enable debug-utils object names and the debug messenger.
    #[arg(long)]
    debug_layer: bool,

    #[arg(long, value_enum, default_value_t = Engine::Unknown)]
    engine: Engine,

    /// Shorthand for `--engine bcs`.
    #[arg(long)]
    force_blitter: bool,

    /// Bytes copied per iteration.
    #[arg(long, default_value_t = arguments::DEFAULT_COPY_SIZE,
          value_parser = clap::value_parser!(u64).range(1..))]
    size: u64,

    #[arg(long, default_value_t = arguments::DEFAULT_ITERATIONS)]
    iterations: u32,

    /// Initial buffer contents: zeros, increasing or random.
    #[arg(long, default_value = "zeros")]
    contents: String,

    /// Seed for random contents.
    #[arg(long, default_value_t = DEFAULT_RANDOM_SEED)]
    seed: u64,

    /// Tag samples as device-event timing.
    #[arg(long)]
    use_events: bool,

    /// Don't fail the run when the device context cannot be created.
    #[arg(long)]
    allow_creation_fail: bool,

    #[arg(long, default_value = "log4rs.yml")]
    log_config: PathBuf,
}

impl Cli {
    fn queue_configuration(&self) -> QueueConfiguration {
        let config = QueueConfiguration::new()
            .engine(self.engine)
            .force_blitter(self.force_blitter)
            .validation(self.validation)
            .debug_layer(self.debug_layer)
            .device_index(self.physical_device_index);
        if self.allow_creation_fail {
            config.allow_creation_fail()
        } else {
            config
        }
    }

    fn copy_buffer_arguments(&self) -> CopyBufferArguments {
        CopyBufferArguments {
            size: self.size,
            iterations: self.iterations,
            contents: BufferContents::parse_lossy(&self.contents, self.seed),
            use_events: self.use_events,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    log4rs::init_file(&cli.log_config, Default::default())
        .context("failed to load logging config file")?;

    vulkan::loader::initialize().context("failed to initialize Vulkan")?;

    if cli.info {
        return vulkan::device_info::print_device_info().context("failed to query devices");
    }
    if cli.list {
        return vulkan::device_info::print_available_devices()
            .context("failed to enumerate devices");
    }

    let mut registry = Registry::new();
    registry.register(copy_buffer::test_case(
        cli.copy_buffer_arguments(),
        cli.queue_configuration(),
    ));
    log::debug!("registered test cases: {:?}", registry.names().collect::<Vec<_>>());

    let mut application = App::new(registry, cli.test.clone(), cli.noop);
    application.run();
    application.log_results();

    if let AppState::FatalError(e) = application.app_state {
        log::error!("{:?}", e);
        return Err(e);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_become_configuration_and_arguments() {
        let cli = Cli::parse_from([
            "vkbench",
            "--engine",
            "bcs",
            "--vk-physical-device-index",
            "1",
            "--size",
            "4096",
            "--contents",
            "random",
            "--seed",
            "9",
            "--use-events",
        ]);
        let config = cli.queue_configuration();
        assert_eq!(config.selected_engine(), Engine::Bcs);
        assert_eq!(config.selected_device_index(), 1);
        assert!(config.requires_creation_success());

        let args = cli.copy_buffer_arguments();
        assert_eq!(args.size, 4096);
        assert_eq!(args.contents, BufferContents::Random(9));
        assert!(args.use_events);
    }

    #[test]
    fn zero_size_is_rejected() {
        assert!(Cli::try_parse_from(["vkbench", "--size", "0"]).is_err());
    }
}
