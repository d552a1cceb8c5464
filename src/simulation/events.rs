//! Structured event reporting
//!
//! Transporters and tasks describe what they do each turn as an [`Event`]:
//! a message plus key/value fields. Where the events end up is decided by
//! the [`EventSink`] the caller plugs in. The simulation never reads events
//! back, so any sink (including [`NoopSink`]) yields identical outcomes.

use std::fmt;
use std::sync::{Arc, Mutex};

use log::info;

/// One structured event
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub message: String,
    pub fields: Vec<(&'static str, String)>,
}

impl Event {
    /// Value of the first field with the given key
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Renders as `[Time 3, Truck] Loading : carry=5`
impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let time = self.field("time").map(|t| format!("Time {t}"));
        let name = self.field("name");
        let header = match (time, name) {
            (Some(t), Some(n)) => format!("{t}, {n}"),
            (Some(t), None) => t,
            (None, Some(n)) => format!(", {n}"),
            (None, None) => String::new(),
        };

        let rest: Vec<String> = self
            .fields
            .iter()
            .filter(|(k, _)| *k != "time" && *k != "name")
            .map(|(k, v)| format!("{k}={v}"))
            .collect();

        write!(f, "[{}] {} : {}", header, self.message, rest.join("  "))
    }
}

/// Destination for structured events
pub trait EventSink: Send + Sync {
    fn emit(&self, event: Event);
}

/// Forwards rendered events to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: Event) {
        info!(target: "freight_sim::events", "{}", event);
    }
}

/// Drops every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn emit(&self, _event: Event) {}
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<Event>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything captured so far
    pub fn events(&self) -> Vec<Event> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Captured events whose message contains `needle`
    pub fn matching(&self, needle: &str) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| e.message.contains(needle))
            .collect()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: Event) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}

/// A sink plus context fields attached to every event it emits
#[derive(Clone)]
pub struct EventLogger {
    sink: Arc<dyn EventSink>,
    context: Vec<(&'static str, String)>,
}

impl EventLogger {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            sink,
            context: Vec::new(),
        }
    }

    pub fn noop() -> Self {
        Self::new(Arc::new(NoopSink))
    }

    /// New logger with one more context field
    pub fn bind(&self, key: &'static str, value: impl fmt::Display) -> Self {
        let mut context = self.context.clone();
        context.retain(|(k, _)| *k != key);
        context.push((key, value.to_string()));
        Self {
            sink: Arc::clone(&self.sink),
            context,
        }
    }

    pub fn info(&self, message: impl Into<String>, fields: &[(&'static str, String)]) {
        let mut all = self.context.clone();
        for (key, value) in fields {
            all.retain(|(k, _)| k != key);
            all.push((key, value.clone()));
        }
        self.sink.emit(Event {
            message: message.into(),
            fields: all,
        });
    }
}

impl Default for EventLogger {
    fn default() -> Self {
        Self::noop()
    }
}

impl fmt::Debug for EventLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLogger")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}
