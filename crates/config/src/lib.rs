//! Script API Configuration
//!
//! Loads the per-instance script settings from a `scriptoptions.txt` style
//! file (`key = value`, `#` comments). Missing keys keep their defaults.

use scriptapi_core::ScriptApiError;
use std::fs;
use std::path::Path;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

impl From<ConfigError> for ScriptApiError {
    fn from(err: ConfigError) -> Self {
        ScriptApiError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Settings applied to every script instance at creation
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptConfig {
    /// Number of callback scratch slots (from "max_callback_vars", default: 8)
    pub max_callback_vars: usize,
    /// Ticks a script sleeps after a command (from "command_delay", default: 1)
    pub command_delay: u32,
    /// Whether commands are allowed when an instance starts (from "allow_do_command")
    pub allow_do_command: bool,
    /// Lines kept in the script log ring buffer (from "log_capacity", default: 400)
    pub log_capacity: usize,
    /// Events kept before the oldest is dropped (from "event_queue_capacity", default: 256)
    pub event_queue_capacity: usize,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            max_callback_vars: 8,
            command_delay: 1,
            allow_do_command: true,
            log_capacity: 400,
            event_queue_capacity: 256,
        }
    }
}

impl ScriptConfig {
    /// Load configuration from an options file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse options file content
    ///
    /// Unknown keys are ignored with a warning. Values that fail to parse
    /// are rejected so a typo never silently changes engine behaviour.
    pub fn parse(content: &str) -> Result<Self> {
        let mut config = Self::default();

        for line in content.lines() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(eq_pos) = line.find('=') {
                let key = line[..eq_pos].trim();
                let value = line[eq_pos + 1..].trim();

                config.parse_option(key, value)?;
            }
        }

        Ok(config)
    }

    fn parse_option(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "max_callback_vars" => self.max_callback_vars = parse_value(key, value)?,
            "command_delay" => self.command_delay = parse_value(key, value)?,
            "allow_do_command" => self.allow_do_command = parse_value(key, value)?,
            "log_capacity" => self.log_capacity = parse_value(key, value)?,
            "event_queue_capacity" => self.event_queue_capacity = parse_value(key, value)?,
            _ => {
                tracing::warn!("Ignoring unknown script option '{}'", key);
            }
        }
        Ok(())
    }

    /// Display configuration summary
    pub fn display(&self) {
        tracing::info!("Script configuration:");
        tracing::info!("  Callback slots: {}", self.max_callback_vars);
        tracing::info!("  Command delay: {} ticks", self.command_delay);
        tracing::info!("  Commands allowed at start: {}", self.allow_do_command);
        tracing::info!("  Log capacity: {} lines", self.log_capacity);
        tracing::info!("  Event queue capacity: {}", self.event_queue_capacity);
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
