//! Test suite and run lifecycle
//!
//! A run goes through prepare → run → (wait for completion) → flush →
//! cleanup → archive → `finish` event → callback, then releases its sandbox.
//! Only one run may be in flight per suite.

use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use super::sandbox::{
    MessageHandler, ReleaseOnDrop, Sandbox, SandboxController, VerdictHook,
};
use crate::config::HarnessConfig;
use crate::error::{HookStage, SuiteError};
use crate::events::{EventSink, LogSink, NullSink, SuiteEvent, TracingLogSink};
use crate::models::{
    is_present, ArchivedResult, Disposition, Message, RunOutcome, TestDefinition,
};
use crate::registry::{Registry, RegistryEntry};

/// Called once with the outcome after a run finishes
pub type FinishCallback = Box<dyn FnOnce(&RunOutcome) + Send>;

/// Per-run options
#[derive(Default)]
pub struct RunOptions {
    on_message: Option<MessageHandler>,
    on_finish: Option<FinishCallback>,
    on_pass: Option<VerdictHook>,
    on_fail: Option<VerdictHook>,
    timeout: Option<Duration>,
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe every message of the run. Returning `Disposition::Suppress`
    /// drops the default log line and the suite event for that message.
    pub fn on_message<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Message) -> Disposition + Send + Sync + 'static,
    {
        self.on_message = Some(Arc::new(handler));
        self
    }

    /// Called at most once, after cleanup and archival
    pub fn on_finish<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(&RunOutcome) + Send + 'static,
    {
        self.on_finish = Some(Box::new(callback));
        self
    }

    pub fn on_pass<F>(mut self, hook: F) -> Self
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.on_pass = Some(Arc::new(hook));
        self
    }

    pub fn on_fail<F>(mut self, hook: F) -> Self
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.on_fail = Some(Arc::new(hook));
        self
    }

    /// Give up waiting for completion after `timeout`
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Values collected from the message stream while a test runs
#[derive(Debug, Default)]
struct RunState {
    last_status: Option<Value>,
    passed: Option<bool>,
}

/// Clears the in-flight flag when the run ends
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Registry of named tests plus the machinery to run them one at a time
pub struct TestSuite {
    registry: RwLock<Registry>,
    events: Arc<dyn EventSink>,
    log_sink: Arc<dyn LogSink>,
    default_timeout: Option<Duration>,
    in_flight: AtomicBool,
}

impl TestSuite {
    /// Create an empty suite that logs through `tracing` and discards events
    pub fn new() -> Self {
        Self {
            registry: RwLock::new(Registry::new()),
            events: Arc::new(NullSink),
            log_sink: Arc::new(TracingLogSink),
            default_timeout: None,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Create a suite using the run timeout from `config`
    pub fn from_config(config: &HarnessConfig) -> Self {
        let suite = Self::new();
        match config.run_timeout() {
            Some(timeout) => suite.with_default_timeout(timeout),
            None => suite,
        }
    }

    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn with_log_sink(mut self, log_sink: Arc<dyn LogSink>) -> Self {
        self.log_sink = log_sink;
        self
    }

    /// Timeout applied to runs that do not set their own
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }

    fn read(&self) -> RwLockReadGuard<'_, Registry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Registry> {
        self.registry.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a test, replacing any test whose name normalizes the same.
    ///
    /// Replacing a test while it runs does not stop that run; its results
    /// are archived into the new entry's history.
    pub fn add(&self, name: impl Into<String>, test: TestDefinition) {
        self.write().add(name, test);
    }

    /// Snapshot of a registered entry. Hooks are shared, not copied.
    pub fn get(&self, name: &str) -> Option<RegistryEntry> {
        self.read().get(name).cloned()
    }

    /// Display names of every registered test, in no particular order
    pub fn get_list(&self) -> Vec<String> {
        self.read().get_list()
    }

    /// Archived results for a test, oldest first
    pub fn history(&self, name: &str) -> Vec<ArchivedResult> {
        self.read()
            .get(name)
            .map(|entry| entry.results.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Whether a run is currently in flight
    pub fn is_running(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Run the test registered under `name`.
    ///
    /// Returns `Ok(None)` without side effects when no such test exists or
    /// it has no `run` hook. A test that never completes keeps this future
    /// pending unless a timeout is configured.
    pub async fn run(
        &self,
        name: &str,
        options: RunOptions,
    ) -> Result<Option<RunOutcome>, SuiteError> {
        let found = self
            .read()
            .get(name)
            .map(|entry| (entry.name.clone(), entry.test.clone()));
        let Some((name, test)) = found else {
            debug!("No test registered as {:?}", name);
            return Ok(None);
        };
        let Some(run_hook) = test.run_hook().cloned() else {
            debug!("tests[{:?}] has no run hook, skipping", name);
            return Ok(None);
        };

        let _in_flight = InFlight::acquire(&self.in_flight)
            .ok_or_else(|| SuiteError::RunInProgress(name.clone()))?;

        let RunOptions {
            on_message,
            on_finish,
            on_pass,
            on_fail,
            timeout,
        } = options;
        let started = Instant::now();

        let state = Arc::new(Mutex::new(RunState::default()));
        let (finish_tx, finish_rx) = oneshot::channel();
        let controller = SandboxController::new(name.clone(), finish_tx, Arc::clone(&self.log_sink))
            .with_message_handler(self.message_adapter(&name, Arc::clone(&state), on_message))
            .with_verdict_hooks(on_pass, on_fail);
        let sandbox = Sandbox::new(controller);
        let _release = ReleaseOnDrop(sandbox.clone());

        info!("Running tests[{:?}]", name);

        if let Some(prepare) = test.prepare_hook() {
            prepare(&sandbox).map_err(|e| SuiteError::hook(&name, HookStage::Prepare, e))?;
        }
        run_hook(&sandbox).map_err(|e| SuiteError::hook(&name, HookStage::Run, e))?;

        let results = self
            .wait_for_completion(&name, finish_rx, timeout.or(self.default_timeout))
            .await?;
        flush_pending_messages().await;

        if is_present(&results) {
            sandbox.dispatch(&Message::Status(results.clone()));
        }

        if let Some(cleanup) = test.cleanup_hook() {
            cleanup(&sandbox).map_err(|e| SuiteError::hook(&name, HookStage::Cleanup, e))?;
        }

        let (last_status, passed) = {
            let state = state.lock().unwrap_or_else(PoisonError::into_inner);
            (state.last_status.clone(), state.passed)
        };
        let result = if is_present(&results) {
            Some(results.clone())
        } else if let Some(cached) = sandbox.results().filter(is_present) {
            Some(cached)
        } else {
            last_status
        };

        if is_present(&results) && !self.write().archive(&name, ArchivedResult::now(results)) {
            warn!("tests[{:?}] was removed before its results could be archived", name);
        }

        self.events.emit(&SuiteEvent::Finish {
            name: name.clone(),
            result: result.clone(),
            passed,
        });

        let outcome = RunOutcome {
            name,
            result,
            passed,
            duration_ms: started.elapsed().as_millis() as u64,
        };
        if let Some(callback) = on_finish {
            callback(&outcome);
        }
        sandbox.destroy();

        info!("  {}", outcome);
        Ok(Some(outcome))
    }

    async fn wait_for_completion(
        &self,
        name: &str,
        finish_rx: oneshot::Receiver<Value>,
        timeout: Option<Duration>,
    ) -> Result<Value, SuiteError> {
        let received = match timeout {
            Some(limit) => tokio::time::timeout(limit, finish_rx)
                .await
                .map_err(|_| SuiteError::TimedOut {
                    name: name.to_string(),
                    after_ms: limit.as_millis() as u64,
                })?,
            None => finish_rx.await,
        };
        received.map_err(|_| SuiteError::SandboxClosed(name.to_string()))
    }

    /// Wraps the caller's handler. Status and verdict messages update the
    /// run state; status and log messages are forwarded as suite events
    /// unless suppressed. Verdicts reach the caller's handler but are never
    /// forwarded or logged.
    fn message_adapter(
        &self,
        name: &str,
        state: Arc<Mutex<RunState>>,
        handler: Option<MessageHandler>,
    ) -> MessageHandler {
        let name = name.to_string();
        let events = Arc::clone(&self.events);

        Arc::new(move |message: &Message| {
            {
                let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
                match message {
                    Message::Status(value) => state.last_status = Some(value.clone()),
                    Message::Result(passed) => state.passed = Some(*passed),
                    Message::Log(_) => {}
                }
            }

            let disposition = handler
                .as_ref()
                .map(|handler| handler(message))
                .unwrap_or_default();

            if let Message::Result(_) = message {
                return Disposition::Suppress;
            }
            if disposition == Disposition::Forward {
                events.emit(&SuiteEvent::Message {
                    name: name.clone(),
                    message: message.clone(),
                });
            }
            disposition
        })
    }
}

impl Default for TestSuite {
    fn default() -> Self {
        Self::new()
    }
}

/// Give messages emitted alongside the completion signal one scheduler tick
/// to land before the run finishes.
async fn flush_pending_messages() {
    tokio::task::yield_now().await;
}
