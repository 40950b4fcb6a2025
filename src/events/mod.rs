//! Lifecycle events and log sinks
//!
//! The suite publishes `finish` and forwarded message events through an
//! [`EventSink`] and writes sandbox log lines through a [`LogSink`]. Both are
//! fire-and-forget.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Mutex, PoisonError};
use tokio::sync::broadcast;
use tracing::{info, trace};

use crate::models::Message;

/// Default broadcast buffer size
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Event published by a suite
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SuiteEvent {
    /// A `status` or `log` message forwarded from a running test
    Message { name: String, message: Message },
    /// A run finished
    Finish {
        name: String,
        result: Option<Value>,
        passed: Option<bool>,
    },
}

impl SuiteEvent {
    /// Event name: the message type for forwarded messages, else `"finish"`
    pub fn event_name(&self) -> &'static str {
        match self {
            SuiteEvent::Message { message, .. } => message.kind(),
            SuiteEvent::Finish { .. } => "finish",
        }
    }

    pub fn test_name(&self) -> &str {
        match self {
            SuiteEvent::Message { name, .. } | SuiteEvent::Finish { name, .. } => name,
        }
    }
}

/// Publish primitive for suite events
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &SuiteEvent);
}

/// Process-wide logging capability
pub trait LogSink: Send + Sync {
    fn log(&self, line: &str);
}

/// Broadcast-backed event sink
#[derive(Clone, Debug)]
pub struct EventBus {
    sender: broadcast::Sender<SuiteEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Receive every event published after this call
    pub fn subscribe(&self) -> broadcast::Receiver<SuiteEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl EventSink for EventBus {
    fn emit(&self, event: &SuiteEvent) {
        // No subscribers is not an error
        if self.sender.send(event.clone()).is_err() {
            trace!("Dropped {} event for {}", event.event_name(), event.test_name());
        }
    }
}

/// Event sink that discards everything
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: &SuiteEvent) {}
}

/// Log sink that writes through `tracing`
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn log(&self, line: &str) {
        info!("{line}");
    }
}

/// Log sink that keeps every line in memory
#[derive(Debug, Default)]
pub struct MemoryLogSink {
    lines: Mutex<Vec<String>>,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl LogSink for MemoryLogSink {
    fn log(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_names() {
        let log = SuiteEvent::Message {
            name: "Echo".into(),
            message: Message::Log("a".into()),
        };
        let finish = SuiteEvent::Finish {
            name: "Echo".into(),
            result: Some(json!("ok")),
            passed: Some(true),
        };
        assert_eq!(log.event_name(), "log");
        assert_eq!(finish.event_name(), "finish");
        assert_eq!(finish.test_name(), "Echo");
    }

    #[test]
    fn test_bus_without_subscribers() {
        let bus = EventBus::default();
        assert_eq!(bus.subscriber_count(), 0);
        bus.emit(&SuiteEvent::Finish {
            name: "x".into(),
            result: None,
            passed: None,
        });
    }

    #[tokio::test]
    async fn test_bus_delivers_to_subscriber() {
        let bus = EventBus::new(4);
        let mut rx = bus.subscribe();
        bus.emit(&SuiteEvent::Message {
            name: "Echo".into(),
            message: Message::Status(json!("working")),
        });

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_name(), "status");
    }

    #[test]
    fn test_memory_log_sink() {
        let sink = MemoryLogSink::new();
        sink.log("one");
        sink.log("two");
        assert_eq!(sink.lines(), vec!["one", "two"]);
    }
}
