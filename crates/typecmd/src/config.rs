use std::env;
use std::path::PathBuf;

pub const DEFAULT_LOG_LEVEL: &str = "warn";

const LOG_LEVEL_VAR: &str = "TYPECMD_LOG_LEVEL";
const LOG_FILE_VAR: &str = "TYPECMD_LOG";

/// Where diagnostics of the library itself go. User-facing output never
/// passes through here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    pub level: String,
    pub log_file: Option<PathBuf>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl TelemetryConfig {
    pub fn from_env() -> Self {
        Self {
            level: env::var(LOG_LEVEL_VAR)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            log_file: env::var(LOG_FILE_VAR)
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        }
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }
}
