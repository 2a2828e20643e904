//! Process logging configuration.
use serde::Deserialize;
use serde::Serialize;

/// Format of the emitted logs.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogMode {
    /// Human readable terminal output.
    #[default]
    Term,

    /// One JSON object per line.
    Json,
}

/// Enumerate valid log verbosity levels.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Critical,
    Error,
    #[default]
    Warning,
    Info,
    Debug,
}

/// Logging configuration options.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct LoggingConf {
    /// Flush logs asynchronously.
    #[serde(default = "LoggingConf::default_async", rename = "async")]
    pub async_flush: bool,

    /// Minimum level of logged events.
    #[serde(default)]
    pub level: LogLevel,

    /// Format of the emitted logs.
    #[serde(default)]
    pub mode: LogMode,
}

impl Default for LoggingConf {
    fn default() -> Self {
        LoggingConf {
            async_flush: Self::default_async(),
            level: LogLevel::default(),
            mode: LogMode::default(),
        }
    }
}

impl LoggingConf {
    fn default_async() -> bool {
        true
    }
}
