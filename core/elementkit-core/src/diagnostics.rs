//! Diagnostic channel shared by a document and its host nodes.
//!
//! Deprecation notices, slot warnings and reported errors all land here with
//! a uniform `[tag] message` shape. Each entry is also emitted through
//! `tracing`. Error listeners are the "bubbling error event": tooling
//! subscribes once per document and sees every failure of every component.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::error::ComponentError;
use crate::settings::DEFAULT_DIAGNOSTIC_HISTORY_LIMIT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Notice,
    Warning,
    Error,
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticLevel::Notice => write!(f, "notice"),
            DiagnosticLevel::Warning => write!(f, "warning"),
            DiagnosticLevel::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub tag: String,
    pub message: String,
    pub recorded_at: DateTime<Utc>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.tag, self.message)
    }
}

/// Structured failure notification delivered to error listeners.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorEvent {
    pub tag: String,
    pub message: String,
    pub error: ComponentError,
    pub bubbles: bool,
}

impl ErrorEvent {
    pub fn new(tag: impl Into<String>, message: impl Into<String>, error: ComponentError) -> Self {
        Self {
            tag: tag.into(),
            message: message.into(),
            error,
            bubbles: true,
        }
    }
}

type ErrorListener = Arc<dyn Fn(&ErrorEvent) + Send + Sync>;

struct Inner {
    entries: VecDeque<Diagnostic>,
    limit: usize,
    listeners: Vec<ErrorListener>,
}

impl Inner {
    fn push(&mut self, entry: Diagnostic) {
        if self.limit == 0 {
            return;
        }
        while self.entries.len() >= self.limit {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }
}

/// Cheaply clonable handle; clones share the same history and listeners.
#[derive(Clone)]
pub struct Diagnostics {
    inner: Arc<Mutex<Inner>>,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::with_limit(DEFAULT_DIAGNOSTIC_HISTORY_LIMIT)
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("Diagnostics")
            .field("entries", &inner.entries.len())
            .field("limit", &inner.limit)
            .field("listeners", &inner.listeners.len())
            .finish()
    }
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                entries: VecDeque::new(),
                limit,
                listeners: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // Recover from poisoning - a panicking listener must not silence the channel
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, level: DiagnosticLevel, tag: &str, message: String) {
        self.lock().push(Diagnostic {
            level,
            tag: tag.to_string(),
            message,
            recorded_at: Utc::now(),
        });
    }

    /// Advisory notice, e.g. a deprecated attribute read.
    pub fn notice(&self, tag: &str, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(tag, "[{}] {}", tag, message);
        self.record(DiagnosticLevel::Notice, tag, message);
    }

    pub fn warn(&self, tag: &str, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(tag, "[{}] {}", tag, message);
        self.record(DiagnosticLevel::Warning, tag, message);
    }

    /// Records the event and delivers it to every subscribed listener.
    pub fn report(&self, event: ErrorEvent) {
        tracing::error!(tag = %event.tag, error = %event.error, "[{}] {}", event.tag, event.message);
        self.record(
            DiagnosticLevel::Error,
            &event.tag,
            format!("{}: {}", event.message, event.error),
        );

        // Listeners run outside the lock so they may use the channel themselves
        let listeners = self.lock().listeners.clone();
        for listener in listeners {
            listener(&event);
        }
    }

    pub fn subscribe(&self, listener: impl Fn(&ErrorEvent) + Send + Sync + 'static) {
        self.lock().listeners.push(Arc::new(listener));
    }

    /// Moves another channel's history and listeners into this one.
    /// Nothing happens when both handles already share a channel.
    pub fn absorb(&self, other: &Diagnostics) {
        if self.same_channel(other) {
            return;
        }
        let (entries, listeners) = {
            let mut theirs = other.lock();
            (std::mem::take(&mut theirs.entries), theirs.listeners.clone())
        };
        let mut inner = self.lock();
        for entry in entries {
            inner.push(entry);
        }
        inner.listeners.extend(listeners);
    }

    pub fn entries(&self) -> Vec<Diagnostic> {
        self.lock().entries.iter().cloned().collect()
    }

    pub fn entries_at(&self, level: DiagnosticLevel) -> Vec<Diagnostic> {
        self.lock()
            .entries
            .iter()
            .filter(|d| d.level == level)
            .cloned()
            .collect()
    }

    /// Reported errors still in history.
    pub fn errors(&self) -> Vec<Diagnostic> {
        self.entries_at(DiagnosticLevel::Error)
    }

    /// Whether two handles share the same channel.
    pub fn same_channel(&self, other: &Diagnostics) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
