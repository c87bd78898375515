//! Reporting capability handed to the aggregator and distance engine.
//!
//! Nothing in the library calls the `log` macros directly; callers decide
//! where messages go by choosing a [`Reporter`].

use log::Level;
use std::fmt;
use std::sync::{Arc, Mutex};

pub trait Reporter: Send + Sync {
    fn report(&self, level: Level, message: fmt::Arguments<'_>);

    fn debug(&self, message: fmt::Arguments<'_>) {
        self.report(Level::Debug, message);
    }

    fn info(&self, message: fmt::Arguments<'_>) {
        self.report(Level::Info, message);
    }

    fn warn(&self, message: fmt::Arguments<'_>) {
        self.report(Level::Warn, message);
    }
}

impl<R: Reporter + ?Sized> Reporter for &R {
    fn report(&self, level: Level, message: fmt::Arguments<'_>) {
        (**self).report(level, message);
    }
}

impl<R: Reporter + ?Sized> Reporter for Arc<R> {
    fn report(&self, level: Level, message: fmt::Arguments<'_>) {
        (**self).report(level, message);
    }
}

/// Forwards to whatever logger the process installed (env_logger in the CLI).
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&self, level: Level, message: fmt::Arguments<'_>) {
        log::log!(target: "trendline", level, "{}", message);
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn report(&self, _level: Level, _message: fmt::Arguments<'_>) {}
}

/// Keeps every message in memory. Used by tests to assert on reporting.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    entries: Mutex<Vec<(Level, String)>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    pub fn count_at(&self, level: Level) -> usize {
        self.entries().iter().filter(|(l, _)| *l == level).count()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.entries().iter().any(|(_, msg)| msg.contains(needle))
    }
}

impl Reporter for MemoryReporter {
    fn report(&self, level: Level, message: fmt::Arguments<'_>) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((level, message.to_string()));
        }
    }
}
