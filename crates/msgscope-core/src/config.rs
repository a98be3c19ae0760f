use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use msgscope_types::{Severity, Visibility};

use crate::error::ConsoleError;

/// Default cap on displayed entries
pub const DEFAULT_MAX_DISPLAYED: usize = 100;

/// Default cap on retained entries per severity
pub const DEFAULT_MAX_RETAINED: usize = 100;

/// Default session log location, relative to the working directory
pub const DEFAULT_LOG_FILE: &str = "msgscope-session.log";

/// Per-severity retention caps that replace `max_retained` for one class
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetentionOverrides {
    pub debug: Option<usize>,
    pub info: Option<usize>,
    pub warning: Option<usize>,
    pub critical: Option<usize>,
}

impl RetentionOverrides {
    fn get(&self, severity: Severity) -> Option<usize> {
        match severity {
            Severity::Debug => self.debug,
            Severity::Info => self.info,
            Severity::Warning => self.warning,
            Severity::Critical => self.critical,
            Severity::Fatal => None,
        }
    }
}

/// Console configuration, supplied once when the session starts
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Maximum number of entries in the displayed list
    pub max_displayed: usize,

    /// Maximum number of retained records per severity
    pub max_retained: usize,

    /// Optional per-severity retention caps
    pub retention: RetentionOverrides,

    /// Session transcript path (truncated on every start)
    pub log_file: PathBuf,

    /// Initial show/hide state per severity
    pub visible: Visibility,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            max_displayed: DEFAULT_MAX_DISPLAYED,
            max_retained: DEFAULT_MAX_RETAINED,
            retention: RetentionOverrides::default(),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            visible: Visibility::default(),
        }
    }
}

impl ConsoleConfig {
    /// Load a config from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConsoleError> {
        let content = fs::read_to_string(path).map_err(|source| ConsoleError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConsoleError::ParseConfig {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Retention cap for one severity
    pub fn capacity_for(&self, severity: Severity) -> usize {
        self.retention.get(severity).unwrap_or(self.max_retained)
    }

    /// Replace unusable values with defaults, warning about each one
    pub fn sanitized(mut self) -> Self {
        if self.max_displayed == 0 {
            warn!(
                default = DEFAULT_MAX_DISPLAYED,
                "max_displayed must be positive, using default"
            );
            self.max_displayed = DEFAULT_MAX_DISPLAYED;
        }
        if self.max_retained == 0 {
            warn!(
                default = DEFAULT_MAX_RETAINED,
                "max_retained must be positive, using default"
            );
            self.max_retained = DEFAULT_MAX_RETAINED;
        }
        for severity in Severity::RETAINED {
            if self.retention.get(severity) == Some(0) {
                warn!(%severity, "retention override must be positive, ignoring it");
                match severity {
                    Severity::Debug => self.retention.debug = None,
                    Severity::Info => self.retention.info = None,
                    Severity::Warning => self.retention.warning = None,
                    Severity::Critical => self.retention.critical = None,
                    Severity::Fatal => {}
                }
            }
        }
        self
    }
}
