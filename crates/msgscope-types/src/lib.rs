//! Shared types for msgscope
//!
//! This crate contains the message record and severity types used across the
//! msgscope crates.

use chrono::{DateTime, Local};
use ratatui::style::Color;
use serde::Deserialize;
use std::fmt;

// ============================================================================
// Severity
// ============================================================================

/// Message severity class
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Info,
    #[serde(alias = "warn")]
    Warning,
    #[serde(alias = "error")]
    Critical,
    Fatal,
}

impl Severity {
    /// Severities that are retained and can be shown or hidden, in lane order.
    /// Fatal is never retained.
    pub const RETAINED: [Severity; 4] = [
        Severity::Debug,
        Severity::Info,
        Severity::Warning,
        Severity::Critical,
    ];

    /// Index into severity-indexed tables, `None` for Fatal
    pub fn lane(&self) -> Option<usize> {
        match self {
            Self::Debug => Some(0),
            Self::Info => Some(1),
            Self::Warning => Some(2),
            Self::Critical => Some(3),
            Self::Fatal => None,
        }
    }

    /// Parse a severity from common spellings
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "debug" | "dbg" | "trace" => Some(Self::Debug),
            "info" | "inf" => Some(Self::Info),
            "warning" | "warn" | "wrn" => Some(Self::Warning),
            "critical" | "crit" | "error" | "err" => Some(Self::Critical),
            "fatal" | "ftl" | "panic" => Some(Self::Fatal),
            _ => None,
        }
    }

    /// Lowercase name, as used in the session transcript
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Critical => "critical",
            Self::Fatal => "fatal",
        }
    }

    /// Capitalized name for dialogs and headers
    pub fn label(&self) -> &'static str {
        match self {
            Self::Debug => "Debug",
            Self::Info => "Info",
            Self::Warning => "Warning",
            Self::Critical => "Critical",
            Self::Fatal => "Fatal",
        }
    }

    /// Short display string (3 chars)
    pub fn short(&self) -> &'static str {
        match self {
            Self::Debug => "DBG",
            Self::Info => "INF",
            Self::Warning => "WRN",
            Self::Critical => "CRT",
            Self::Fatal => "FTL",
        }
    }

    /// Get display color for this severity
    pub fn color(&self) -> Color {
        match self {
            Self::Debug => Color::Cyan,
            Self::Info => Color::LightGreen,
            Self::Warning => Color::Yellow,
            Self::Critical => Color::Red,
            Self::Fatal => Color::Magenta,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// ============================================================================
// Message records
// ============================================================================

/// Session-wide sequence number of a message. The first message is 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SeqId(pub u64);

impl fmt::Display for SeqId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Where a message was emitted from
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Provenance {
    pub file: String,
    pub line: u32,
    pub function: String,
    pub category: String,
}

impl Provenance {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
            ..Default::default()
        }
    }

    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = function.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}

/// A single log event. Immutable once created.
#[derive(Clone, Debug)]
pub struct MessageRecord {
    id: SeqId,
    severity: Severity,
    timestamp: DateTime<Local>,
    provenance: Provenance,
    body: String,
}

impl MessageRecord {
    pub fn new(
        id: SeqId,
        severity: Severity,
        timestamp: DateTime<Local>,
        provenance: Provenance,
        body: String,
    ) -> Self {
        Self {
            id,
            severity,
            timestamp,
            provenance,
            body,
        }
    }

    pub fn id(&self) -> SeqId {
        self.id
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    pub fn source_file(&self) -> &str {
        &self.provenance.file
    }

    pub fn source_line(&self) -> u32 {
        self.provenance.line
    }

    pub fn function_name(&self) -> &str {
        &self.provenance.function
    }

    pub fn category(&self) -> &str {
        &self.provenance.category
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// First line of the body, used for single-row display
    pub fn headline(&self) -> &str {
        self.body.lines().next().unwrap_or("")
    }

    /// Number of body lines beyond the first
    pub fn extra_lines(&self) -> usize {
        self.body.lines().count().saturating_sub(1)
    }

    /// Timestamp in ISO-8601 with milliseconds
    pub fn iso_time(&self) -> String {
        iso_millis(&self.timestamp)
    }
}

/// Format a timestamp as ISO-8601 with milliseconds
pub fn iso_millis(ts: &DateTime<Local>) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S%.3f").to_string()
}

// ============================================================================
// Visibility
// ============================================================================

/// Show/hide toggle per retained severity. All shown by default.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Visibility {
    pub debug: bool,
    pub info: bool,
    pub warning: bool,
    pub critical: bool,
}

impl Default for Visibility {
    fn default() -> Self {
        Self {
            debug: true,
            info: true,
            warning: true,
            critical: true,
        }
    }
}

impl Visibility {
    /// Whether a severity starts out shown. Fatal is never shown.
    pub fn get(&self, severity: Severity) -> bool {
        match severity {
            Severity::Debug => self.debug,
            Severity::Info => self.info,
            Severity::Warning => self.warning,
            Severity::Critical => self.critical,
            Severity::Fatal => false,
        }
    }

    pub fn set(&mut self, severity: Severity, shown: bool) {
        match severity {
            Severity::Debug => self.debug = shown,
            Severity::Info => self.info = shown,
            Severity::Warning => self.warning = shown,
            Severity::Critical => self.critical = shown,
            Severity::Fatal => {}
        }
    }

    /// Everything hidden
    pub fn none() -> Self {
        Self {
            debug: false,
            info: false,
            warning: false,
            critical: false,
        }
    }
}
