//! Test definitions
//!
//! A definition is a bundle of optional lifecycle hooks. Only `run` is needed
//! for a test to execute; a definition without it can still be registered
//! and is skipped at run time.

use std::fmt;
use std::sync::Arc;

use crate::executor::Sandbox;

/// A lifecycle hook. Returning `Err` aborts the run and surfaces to the caller.
pub type Hook = Arc<dyn Fn(&Sandbox) -> anyhow::Result<()> + Send + Sync>;

/// Prepare / run / cleanup hooks for one test
#[derive(Clone, Default)]
pub struct TestDefinition {
    prepare: Option<Hook>,
    run: Option<Hook>,
    cleanup: Option<Hook>,
}

impl TestDefinition {
    /// Create an empty definition
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a definition with only a `run` hook
    pub fn with_run<F>(run: F) -> Self
    where
        F: Fn(&Sandbox) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self::new().on_run(run)
    }

    /// Hook called once before `run`
    pub fn on_prepare<F>(mut self, prepare: F) -> Self
    where
        F: Fn(&Sandbox) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.prepare = Some(Arc::new(prepare));
        self
    }

    /// Test body. May return before the test completes; completion is
    /// signalled through `Sandbox::done`, `pass` or `fail`.
    pub fn on_run<F>(mut self, run: F) -> Self
    where
        F: Fn(&Sandbox) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.run = Some(Arc::new(run));
        self
    }

    /// Hook called once after completion, before archiving
    pub fn on_cleanup<F>(mut self, cleanup: F) -> Self
    where
        F: Fn(&Sandbox) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.cleanup = Some(Arc::new(cleanup));
        self
    }

    pub fn prepare_hook(&self) -> Option<&Hook> {
        self.prepare.as_ref()
    }

    pub fn run_hook(&self) -> Option<&Hook> {
        self.run.as_ref()
    }

    pub fn cleanup_hook(&self) -> Option<&Hook> {
        self.cleanup.as_ref()
    }

    /// Whether the definition has a `run` hook
    pub fn is_runnable(&self) -> bool {
        self.run.is_some()
    }
}

impl fmt::Debug for TestDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestDefinition")
            .field("prepare", &self.prepare.is_some())
            .field("run", &self.run.is_some())
            .field("cleanup", &self.cleanup.is_some())
            .finish()
    }
}
