//! Script log
//!
//! Lines a script logs are kept in a bounded ring buffer stored in the
//! active instance's log slot, where the engine's debug window reads them.
//! Each line is also forwarded to `tracing`.

use crate::error::Result;
use crate::instance::ScriptInstance;
use crate::object::ScriptObject;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Severity of a script log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub level: LogLevel,
    pub message: String,
}

/// Log buffer kept in the log slot
#[derive(Debug)]
pub struct LogData {
    lines: VecDeque<LogLine>,
    capacity: usize,
}

impl LogData {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    fn push(&mut self, line: LogLine) {
        if self.capacity == 0 {
            return;
        }
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    pub fn lines(&self) -> impl Iterator<Item = &LogLine> {
        self.lines.iter()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Logging entry points for scripts
pub struct ScriptLog;

impl ScriptLog {
    pub fn info(message: &str) -> Result<()> {
        Self::log(LogLevel::Info, message)
    }

    pub fn warning(message: &str) -> Result<()> {
        Self::log(LogLevel::Warning, message)
    }

    pub fn error(message: &str) -> Result<()> {
        Self::log(LogLevel::Error, message)
    }

    /// Snapshot of the active instance's log
    pub fn lines() -> Result<Vec<LogLine>> {
        ScriptObject::with_log_slot(|slot| {
            slot.as_ref()
                .and_then(|data| data.downcast_ref::<LogData>())
                .map(|data| data.lines().cloned().collect())
                .unwrap_or_default()
        })
    }

    fn log(level: LogLevel, message: &str) -> Result<()> {
        let instance = ScriptObject::active_instance()?;
        let id = instance.id();

        match level {
            LogLevel::Info => tracing::info!(instance = %id, "{}", message),
            LogLevel::Warning => tracing::warn!(instance = %id, "{}", message),
            LogLevel::Error => tracing::error!(instance = %id, "{}", message),
        }

        Self::append(
            &instance,
            LogLine {
                level,
                message: message.to_string(),
            },
        );
        Ok(())
    }

    fn append(instance: &ScriptInstance, line: LogLine) {
        let capacity = instance.config().log_capacity;
        instance.with_context(|ctx| {
            let slot = ctx.log_slot();
            if !slot.as_ref().is_some_and(|data| data.is::<LogData>()) {
                if slot.is_some() {
                    tracing::warn!("Replacing foreign value in log slot of instance {}", instance.id());
                }
                *slot = Some(Box::new(LogData::new(capacity)));
            }

            if let Some(data) = slot.as_mut().and_then(|data| data.downcast_mut::<LogData>()) {
                data.push(line);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::active::ActiveInstance;
    use crate::error::ScriptError;
    use crate::test_support::TestEngine;

    #[test]
    fn test_log_needs_active_instance() {
        assert!(matches!(ScriptLog::info("hello"), Err(ScriptError::NoActiveInstance)));
    }

    #[test]
    fn test_lines_are_kept_in_order() {
        let engine = TestEngine::new();
        let instance = engine.instance(1);
        let _active = ActiveInstance::new(&instance);

        assert!(ScriptLog::lines().unwrap().is_empty());
        ScriptLog::info("building depot").unwrap();
        ScriptLog::error("no money").unwrap();

        let lines = ScriptLog::lines().unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].level, LogLevel::Info);
        assert_eq!(lines[1].message, "no money");
    }

    #[test]
    fn test_ring_buffer_drops_oldest() {
        let mut engine = TestEngine::new();
        engine.config.log_capacity = 2;
        let instance = engine.instance(1);
        let _active = ActiveInstance::new(&instance);

        ScriptLog::info("one").unwrap();
        ScriptLog::warning("two").unwrap();
        ScriptLog::info("three").unwrap();

        let messages: Vec<_> = ScriptLog::lines()
            .unwrap()
            .into_iter()
            .map(|line| line.message)
            .collect();
        assert_eq!(messages, vec!["two", "three"]);
    }

    #[test]
    fn test_logs_are_per_instance() {
        let engine = TestEngine::new();
        let first = engine.instance(1);
        let second = engine.instance(2);

        let _outer = ActiveInstance::new(&first);
        ScriptLog::info("first").unwrap();
        {
            let _inner = ActiveInstance::new(&second);
            assert!(ScriptLog::lines().unwrap().is_empty());
        }
        assert_eq!(ScriptLog::lines().unwrap().len(), 1);
    }
}
