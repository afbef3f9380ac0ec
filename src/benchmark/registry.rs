use super::{Api, Backend, TestResult, execute, statistics::Statistics};
use crate::error::Result;

/// Outcome of one backend of one test case.
#[derive(Debug)]
pub struct CaseReport {
    pub name: &'static str,
    pub api: Api,
    pub result: TestResult,
    pub statistics: Statistics,
}

/// A named test case with its arguments and one backend per API.
pub struct TestCase<A> {
    name: &'static str,
    arguments: A,
    backends: Vec<Box<dyn Backend<Arguments = A>>>,
}

impl<A> TestCase<A> {
    pub fn new(name: &'static str, arguments: A) -> Self {
        Self {
            name,
            arguments,
            backends: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_backend(mut self, backend: Box<dyn Backend<Arguments = A>>) -> Self {
        if self.backends.iter().any(|b| b.api() == backend.api()) {
            log::warn!(
                "{}: replacing the already registered {} backend",
                self.name,
                backend.api()
            );
            self.backends.retain(|b| b.api() != backend.api());
        }
        self.backends.push(backend);
        self
    }
}

/// Object-safe view of a [`TestCase`], hiding its argument type.
pub trait RunnableTestCase {
    fn name(&self) -> &'static str;

    fn run(&mut self, noop: bool) -> Result<Vec<CaseReport>>;
}

impl<A> RunnableTestCase for TestCase<A> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn run(&mut self, noop: bool) -> Result<Vec<CaseReport>> {
        let mut reports = Vec::with_capacity(self.backends.len());
        for backend in &mut self.backends {
            let api = backend.api();
            log::debug!("running {} [{api}]", self.name);

            let mut statistics = Statistics::new();
            let result = execute(backend.as_mut(), &self.arguments, &mut statistics, noop)?;
            reports.push(CaseReport {
                name: self.name,
                api,
                result,
                statistics,
            });
        }
        Ok(reports)
    }
}

#[derive(Default)]
pub struct Registry {
    cases: Vec<Box<dyn RunnableTestCase>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<A: 'static>(&mut self, case: TestCase<A>) {
        self.cases.push(Box::new(case));
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.cases.iter().map(|c| c.name())
    }

    /// Cases whose name matches `filter` case-insensitively, or all of them.
    pub fn selected_mut<'a>(
        &'a mut self,
        filter: Option<&'a str>,
    ) -> impl Iterator<Item = &'a mut Box<dyn RunnableTestCase>> + 'a {
        self.cases
            .iter_mut()
            .filter(move |c| filter.is_none_or(|f| c.name().eq_ignore_ascii_case(f)))
    }
}
