//! Per-run sandbox
//!
//! A [`Sandbox`] is the only thing a test body sees. It relays status, log
//! and verdict messages to the suite and signals completion. Every run gets
//! a fresh sandbox; once the run finishes the controller behind it is
//! released and every call on any clone of the handle becomes a no-op.

use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;

use crate::events::LogSink;
use crate::models::{Disposition, Message};

/// Receives every message a sandbox emits, in emission order
pub type MessageHandler = Arc<dyn Fn(&Message) -> Disposition + Send + Sync>;

/// Called with the verdict when a test passes or fails
pub type VerdictHook = Arc<dyn Fn(bool) + Send + Sync>;

/// Run-scoped state behind a sandbox handle
pub(crate) struct SandboxController {
    test_name: String,
    message_handler: Option<MessageHandler>,
    on_finish: Option<oneshot::Sender<Value>>,
    on_pass: Option<VerdictHook>,
    on_fail: Option<VerdictHook>,
    results: Option<Value>,
    log_sink: Arc<dyn LogSink>,
}

impl SandboxController {
    pub(crate) fn new(
        test_name: impl Into<String>,
        on_finish: oneshot::Sender<Value>,
        log_sink: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            test_name: test_name.into(),
            message_handler: None,
            on_finish: Some(on_finish),
            on_pass: None,
            on_fail: None,
            results: None,
            log_sink,
        }
    }

    pub(crate) fn with_message_handler(mut self, handler: MessageHandler) -> Self {
        self.message_handler = Some(handler);
        self
    }

    pub(crate) fn with_verdict_hooks(
        mut self,
        on_pass: Option<VerdictHook>,
        on_fail: Option<VerdictHook>,
    ) -> Self {
        self.on_pass = on_pass;
        self.on_fail = on_fail;
        self
    }
}

/// Handle given to a running test
#[derive(Clone)]
pub struct Sandbox {
    controller: Arc<Mutex<Option<SandboxController>>>,
}

impl Sandbox {
    pub(crate) fn new(controller: SandboxController) -> Self {
        Self {
            controller: Arc::new(Mutex::new(Some(controller))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<SandboxController>> {
        self.controller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // Handlers are cloned out so no lock is held while user code runs.
    fn with_controller<R>(&self, f: impl FnOnce(&mut SandboxController) -> R) -> Option<R> {
        self.lock().as_mut().map(f)
    }

    /// Report progress. The latest status is the fallback final result.
    pub fn status(&self, message: impl Into<Value>) {
        self.post(Message::Status(message.into()));
    }

    /// Emit a log line
    pub fn log(&self, message: impl Into<String>) {
        self.post(Message::Log(message.into()));
    }

    /// Signal completion. Only the first call on a run counts.
    ///
    /// `null`, `false`, `0` and `""` mean "no results": nothing is archived
    /// and the final result falls back to sandbox results or the last status.
    pub fn done(&self, results: impl Into<Value>) {
        let results = results.into();
        if let Some(Some(sender)) = self.with_controller(|c| c.on_finish.take()) {
            // The run may have been dropped by its caller
            let _ = sender.send(results);
        }
    }

    /// Record a passing verdict, then complete with `results`
    pub fn pass(&self, results: impl Into<Value>) {
        self.verdict(true, results.into());
    }

    /// Record a failing verdict, then complete with `results`
    pub fn fail(&self, results: impl Into<Value>) {
        self.verdict(false, results.into());
    }

    /// Cache results on the sandbox. Used as the final result when `done`
    /// carries none.
    pub fn set_results(&self, results: impl Into<Value>) {
        let results = results.into();
        self.with_controller(|c| c.results = Some(results));
    }

    /// Whether the run owning this sandbox is still in progress
    pub fn is_active(&self) -> bool {
        self.lock().is_some()
    }

    /// Display name of the running test, `None` once released
    pub fn test_name(&self) -> Option<String> {
        self.with_controller(|c| c.test_name.clone())
    }

    fn verdict(&self, passed: bool, results: Value) {
        let Some((handler, hook)) = self.with_controller(|c| {
            let hook = if passed { &c.on_pass } else { &c.on_fail };
            (c.message_handler.clone(), hook.clone())
        }) else {
            return;
        };

        if let Some(handler) = handler {
            handler(&Message::Result(passed));
        }
        if let Some(hook) = hook {
            hook(passed);
        }
        self.done(results);
    }

    fn post(&self, message: Message) {
        let Some((handler, log_sink, name)) = self.with_controller(|c| {
            (
                c.message_handler.clone(),
                Arc::clone(&c.log_sink),
                c.test_name.clone(),
            )
        }) else {
            return;
        };

        let disposition = handler
            .map(|handler| handler(&message))
            .unwrap_or_default();
        if disposition == Disposition::Forward {
            log_sink.log(&format!("tests[\"{name}\"] >> {message}"));
        }
    }

    /// Deliver a message to the handler without the default log line
    pub(crate) fn dispatch(&self, message: &Message) -> Disposition {
        match self.with_controller(|c| c.message_handler.clone()) {
            Some(Some(handler)) => handler(message),
            _ => Disposition::Forward,
        }
    }

    pub(crate) fn results(&self) -> Option<Value> {
        self.with_controller(|c| c.results.clone()).flatten()
    }

    /// Release the controller. Later calls on any clone are no-ops.
    pub(crate) fn destroy(&self) {
        self.lock().take();
    }
}

impl fmt::Debug for Sandbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sandbox")
            .field("test_name", &self.test_name())
            .field("active", &self.is_active())
            .finish()
    }
}

/// Releases a sandbox when dropped, whichever way the run ends
pub(crate) struct ReleaseOnDrop(pub(crate) Sandbox);

impl Drop for ReleaseOnDrop {
    fn drop(&mut self) {
        self.0.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MemoryLogSink;
    use serde_json::json;

    fn recording_sandbox(
        disposition: Disposition,
    ) -> (
        Sandbox,
        Arc<Mutex<Vec<Message>>>,
        Arc<MemoryLogSink>,
        oneshot::Receiver<Value>,
    ) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::new(MemoryLogSink::new());
        let (tx, rx) = oneshot::channel();
        let recorder = Arc::clone(&seen);
        let handler: MessageHandler = Arc::new(move |m: &Message| {
            recorder.lock().unwrap().push(m.clone());
            disposition
        });
        let controller = SandboxController::new("Echo", tx, sink.clone() as Arc<dyn LogSink>)
            .with_message_handler(handler);
        (Sandbox::new(controller), seen, sink, rx)
    }

    #[test]
    fn test_log_forwarded_and_logged() {
        let (sandbox, seen, sink, _rx) = recording_sandbox(Disposition::Forward);
        sandbox.log("hello");
        sandbox.status("working");

        assert_eq!(
            *seen.lock().unwrap(),
            vec![Message::Log("hello".into()), Message::Status(json!("working"))]
        );
        assert_eq!(
            sink.lines(),
            vec!["tests[\"Echo\"] >> hello", "tests[\"Echo\"] >> working"]
        );
    }

    #[test]
    fn test_suppress_skips_log_line() {
        let (sandbox, seen, sink, _rx) = recording_sandbox(Disposition::Suppress);
        sandbox.log("quiet");
        assert_eq!(seen.lock().unwrap().len(), 1);
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn test_no_handler_still_logs() {
        let sink = Arc::new(MemoryLogSink::new());
        let (tx, _rx) = oneshot::channel();
        let sandbox = Sandbox::new(SandboxController::new("Bare", tx, sink.clone()));
        sandbox.log("line");
        assert_eq!(sink.lines(), vec!["tests[\"Bare\"] >> line"]);
    }

    #[test]
    fn test_pass_emits_result_then_completes() {
        let (sandbox, seen, sink, mut rx) = recording_sandbox(Disposition::Forward);
        sandbox.pass("ok");

        assert_eq!(*seen.lock().unwrap(), vec![Message::Result(true)]);
        assert!(sink.lines().is_empty());
        assert_eq!(rx.try_recv().unwrap(), json!("ok"));
    }

    #[test]
    fn test_verdict_hooks() {
        let verdicts = Arc::new(Mutex::new(Vec::new()));
        let (tx, _rx) = oneshot::channel();
        let pass_log = Arc::clone(&verdicts);
        let fail_log = Arc::clone(&verdicts);
        let controller = SandboxController::new("Hooked", tx, Arc::new(MemoryLogSink::new()))
            .with_verdict_hooks(
                Some(Arc::new(move |p: bool| pass_log.lock().unwrap().push(("pass", p)))),
                Some(Arc::new(move |p: bool| fail_log.lock().unwrap().push(("fail", p)))),
            );
        let sandbox = Sandbox::new(controller);
        sandbox.fail(Value::Null);

        assert_eq!(*verdicts.lock().unwrap(), vec![("fail", false)]);
    }

    #[test]
    fn test_second_done_is_ignored() {
        let (sandbox, _seen, _sink, mut rx) = recording_sandbox(Disposition::Forward);
        sandbox.done(1);
        sandbox.done(2);
        assert_eq!(rx.try_recv().unwrap(), json!(1));
    }

    #[test]
    fn test_destroyed_sandbox_is_inert() {
        let (sandbox, seen, sink, _rx) = recording_sandbox(Disposition::Forward);
        let leaked = sandbox.clone();
        sandbox.destroy();

        leaked.log("late");
        leaked.status("late");
        leaked.pass("late");
        leaked.done("late");
        leaked.set_results("late");

        assert!(!leaked.is_active());
        assert!(leaked.test_name().is_none());
        assert!(leaked.results().is_none());
        assert!(seen.lock().unwrap().is_empty());
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn test_set_results() {
        let (sandbox, _seen, _sink, _rx) = recording_sandbox(Disposition::Forward);
        assert!(sandbox.results().is_none());
        sandbox.set_results(json!({"count": 3}));
        assert_eq!(sandbox.results(), Some(json!({"count": 3})));
    }

    #[test]
    fn test_release_on_drop() {
        let (sandbox, _seen, _sink, _rx) = recording_sandbox(Disposition::Forward);
        {
            let _release = ReleaseOnDrop(sandbox.clone());
            assert!(sandbox.is_active());
        }
        assert!(!sandbox.is_active());
    }
}
