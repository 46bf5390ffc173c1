//! Structured logging for integration tests.
//!
//! Each test creates a [`TestLogger`] that stamps its messages with the test
//! name, the current phase, and the elapsed time. Output goes to stderr,
//! which `cargo test` captures per test and replays on failure, so passing
//! runs stay quiet while a failing test shows its full timeline.
//!
//! `TEST_LOG_LEVEL` (debug, info, warn, error) adjusts the threshold;
//! `NO_COLOR` disables the level colors.
#![allow(dead_code)]

use std::env;
use std::fmt;
use std::sync::{Mutex, OnceLock};
use std::time::Instant;

/// Message severity, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "trace" | "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    const fn color(self) -> &'static str {
        match self {
            Self::Debug => "\x1b[36m",
            Self::Info => "\x1b[32m",
            Self::Warn => "\x1b[33m",
            Self::Error => "\x1b[31m",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        };
        write!(f, "{s}")
    }
}

fn min_level() -> Level {
    static MIN: OnceLock<Level> = OnceLock::new();
    *MIN.get_or_init(|| {
        env::var("TEST_LOG_LEVEL")
            .ok()
            .and_then(|s| Level::parse(&s))
            .unwrap_or(Level::Info)
    })
}

fn use_color() -> bool {
    static COLOR: OnceLock<bool> = OnceLock::new();
    *COLOR.get_or_init(|| env::var("NO_COLOR").is_err())
}

/// Per-test logger tracking the current phase and elapsed time.
///
/// ```rust,ignore
/// let log = TestLogger::new("my_test");
/// log.phase("setup");
/// // ...
/// log.phase("execute");
/// // ...
/// log.phase("verify");
/// log.finish_ok();
/// ```
pub struct TestLogger {
    name: &'static str,
    started: Instant,
    phase: Mutex<&'static str>,
}

impl TestLogger {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        let logger = Self {
            name,
            started: Instant::now(),
            phase: Mutex::new("init"),
        };
        logger.emit(Level::Info, "starting");
        logger
    }

    /// Mark the start of a phase ("setup", "execute", "verify").
    pub fn phase(&self, phase: &'static str) {
        if let Ok(mut current) = self.phase.lock() {
            *current = phase;
        }
        self.emit(Level::Debug, &format!("phase: {phase}"));
    }

    pub fn debug(&self, message: &str) {
        self.emit(Level::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.emit(Level::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.emit(Level::Warn, message);
    }

    /// Mark the test as passed.
    pub fn finish_ok(&self) {
        let elapsed = self.started.elapsed().as_millis();
        self.emit(Level::Info, &format!("passed in {elapsed}ms"));
    }

    /// Mark the test as failed before panicking with the real assertion.
    pub fn finish_err(&self, reason: &str) {
        let elapsed = self.started.elapsed().as_millis();
        self.emit(Level::Error, &format!("FAILED: {reason} ({elapsed}ms)"));
    }

    fn emit(&self, level: Level, message: &str) {
        if level < min_level() {
            return;
        }
        let phase = self.phase.lock().map_or("?", |p| *p);
        let elapsed = self.started.elapsed().as_millis();
        if use_color() {
            eprintln!(
                "[{}{level}\x1b[0m] [{}/{phase}] +{elapsed}ms {message}",
                level.color(),
                self.name
            );
        } else {
            eprintln!("[{level}] [{}/{phase}] +{elapsed}ms {message}", self.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_parsing_accepts_aliases() {
        assert_eq!(Level::parse("debug"), Some(Level::Debug));
        assert_eq!(Level::parse("TRACE"), Some(Level::Debug));
        assert_eq!(Level::parse("Info"), Some(Level::Info));
        assert_eq!(Level::parse("warning"), Some(Level::Warn));
        assert_eq!(Level::parse("error"), Some(Level::Error));
        assert_eq!(Level::parse("loud"), None);
    }

    #[test]
    fn levels_order_by_severity() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
    }

    #[test]
    fn logger_tracks_phases() {
        let log = TestLogger::new("logger_tracks_phases");
        log.phase("setup");
        log.debug("building fixtures");
        log.phase("execute");
        log.info("running");
        log.phase("verify");
        log.finish_ok();
    }
}
