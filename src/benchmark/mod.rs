pub mod arguments;
pub mod copy_buffer;
pub mod registry;
pub mod statistics;
mod timer;

use std::fmt;

use crate::error::Result;
use statistics::{MeasurementFields, Statistics};

pub use arguments::CopyBufferArguments;
pub use registry::{CaseReport, Registry, TestCase};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Api {
    Vulkan,
}

impl fmt::Display for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Api::Vulkan => f.write_str("Vulkan"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestResult {
    Success,
    Nooped,
    DeviceNotCapable,
    Error,
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TestResult::Success => "Success",
            TestResult::Nooped => "Nooped",
            TestResult::DeviceNotCapable => "DeviceNotCapable",
            TestResult::Error => "Error",
        };
        f.write_str(name)
    }
}

/// One API implementation of a test case.
pub trait Backend {
    type Arguments;

    fn api(&self) -> Api;

    fn measurement(&self, arguments: &Self::Arguments) -> MeasurementFields;

    /// Brings up whatever the run needs. `Ok(false)` means the device cannot
    /// run this case and nothing was left behind.
    fn setup(&mut self, arguments: &Self::Arguments) -> Result<bool>;

    fn run(&mut self, arguments: &Self::Arguments, statistics: &mut Statistics) -> Result<()>;

    fn teardown(&mut self);
}

/// Runs one backend through setup, run and teardown.
///
/// Fatal errors propagate after teardown; operational errors are logged and
/// reported as [`TestResult::Error`].
pub fn execute<B>(
    backend: &mut B,
    arguments: &B::Arguments,
    statistics: &mut Statistics,
    noop: bool,
) -> Result<TestResult>
where
    B: Backend + ?Sized,
{
    let fields = backend.measurement(arguments);
    statistics.push_unit_and_type(fields.unit, fields.kind);

    if noop {
        return Ok(TestResult::Nooped);
    }

    match backend.setup(arguments) {
        Ok(true) => {}
        Ok(false) => return Ok(TestResult::DeviceNotCapable),
        Err(e) if e.is_fatal() => return Err(e),
        Err(e) => {
            log::error!("{} setup failed: {e}", backend.api());
            backend.teardown();
            return Ok(TestResult::Error);
        }
    }

    let outcome = backend.run(arguments, statistics);
    backend.teardown();

    match outcome {
        Ok(()) => Ok(TestResult::Success),
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            log::error!("{} run failed: {e}", backend.api());
            Ok(TestResult::Error)
        }
    }
}
