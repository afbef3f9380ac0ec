use anyhow::Context;

use crate::benchmark::{CaseReport, Registry};

#[derive(Default)]
pub enum AppState {
    #[default]
    Running,
    Finished,
    FatalError(anyhow::Error),
}

pub struct App {
    registry: Registry,
    filter: Option<String>,
    noop: bool,
    reports: Vec<CaseReport>,
    pub app_state: AppState,
}

impl App {
    pub fn new(registry: Registry, filter: Option<String>, noop: bool) -> Self {
        Self {
            registry,
            filter,
            noop,
            reports: Vec::new(),
            app_state: AppState::default(),
        }
    }

    /// Runs every selected test case. A fatal error stops the remaining
    /// cases and is kept in `app_state`.
    pub fn run(&mut self) {
        let noop = self.noop;
        let mut selected = 0;

        for case in self.registry.selected_mut(self.filter.as_deref()) {
            selected += 1;
            match case
                .run(noop)
                .with_context(|| format!("{} failed fatally", case.name()))
            {
                Ok(reports) => self.reports.extend(reports),
                Err(e) => {
                    self.app_state = AppState::FatalError(e);
                    return;
                }
            }
        }

        if selected == 0 {
            if let Some(filter) = &self.filter {
                log::warn!("no test case named {filter}");
            }
        }
        self.app_state = AppState::Finished;
    }

    pub fn reports(&self) -> &[CaseReport] {
        &self.reports
    }

    pub fn log_results(&self) {
        for report in self.reports() {
            let unit = report
                .statistics
                .fields()
                .map(|f| f.to_string())
                .unwrap_or_default();
            match report.statistics.summary() {
                Some(summary) => log::info!(
                    "{} [{}]: {} {summary} {unit}",
                    report.name,
                    report.api,
                    report.result
                ),
                None => log::info!("{} [{}]: {} {unit}", report.name, report.api, report.result),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        benchmark::{
            Api, Backend, TestCase, TestResult,
            statistics::{MeasurementFields, MeasurementType, MeasurementUnit, Statistics},
        },
        error::{BenchError, Result},
    };

    struct Outcome(Option<BenchError>);

    impl Backend for Outcome {
        type Arguments = ();

        fn api(&self) -> Api {
            Api::Vulkan
        }

        fn measurement(&self, _: &()) -> MeasurementFields {
            MeasurementFields::new(MeasurementUnit::GigabytesPerSecond, MeasurementType::Cpu)
        }

        fn setup(&mut self, _: &()) -> Result<bool> {
            Ok(true)
        }

        fn run(&mut self, _: &(), _: &mut Statistics) -> Result<()> {
            match self.0.take() {
                Some(e) => Err(e),
                None => Ok(()),
            }
        }

        fn teardown(&mut self) {}
    }

    fn registry(cases: Vec<(&'static str, Option<BenchError>)>) -> Registry {
        let mut registry = Registry::new();
        for (name, error) in cases {
            registry.register(TestCase::new(name, ()).with_backend(Box::new(Outcome(error))));
        }
        registry
    }

    #[test]
    fn runs_every_case() {
        let mut app = App::new(registry(vec![("A", None), ("B", None)]), None, false);
        app.run();

        assert!(matches!(app.app_state, AppState::Finished));
        assert_eq!(app.reports().len(), 2);
        assert!(app.reports().iter().all(|r| r.result == TestResult::Success));
    }

    #[test]
    fn operational_failure_continues_with_next_case() {
        let lost = BenchError::Vulkan {
            call: "vkQueueSubmit",
            result: ash::vk::Result::ERROR_DEVICE_LOST,
        };
        let mut app = App::new(registry(vec![("A", Some(lost)), ("B", None)]), None, false);
        app.run();

        assert!(matches!(app.app_state, AppState::Finished));
        assert_eq!(app.reports()[0].result, TestResult::Error);
        assert_eq!(app.reports()[1].result, TestResult::Success);
    }

    #[test]
    fn fatal_failure_stops_the_run() {
        let fatal = BenchError::configuration("invalid physical device index 4");
        let mut app = App::new(registry(vec![("A", Some(fatal)), ("B", None)]), None, false);
        app.run();

        assert!(matches!(app.app_state, AppState::FatalError(_)));
        assert!(app.reports().is_empty());
    }

    #[test]
    fn noop_reports_nooped() {
        let mut app = App::new(registry(vec![("A", None)]), Some("a".into()), true);
        app.run();
        assert_eq!(app.reports()[0].result, TestResult::Nooped);
    }
}
