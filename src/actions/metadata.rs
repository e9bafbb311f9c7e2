//! Metadata actions (msg, logdata, severity, tag, rev, ver).

use super::{Action, ActionGroup, RuleMetadata};
use crate::actions::expand_macros;
use crate::engine::Transaction;
use crate::error::{Error, Result};

/// Severity levels as defined in ModSecurity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Severity {
    /// System is unusable.
    Emergency = 0,
    /// Immediate action required.
    Alert = 1,
    /// Critical conditions.
    Critical = 2,
    /// Error conditions.
    Error = 3,
    /// Warning conditions.
    Warning = 4,
    /// Normal but significant.
    Notice = 5,
    /// Informational.
    Info = 6,
    /// Debug-level messages.
    Debug = 7,
}

impl From<u8> for Severity {
    fn from(value: u8) -> Self {
        match value {
            0 => Severity::Emergency,
            1 => Severity::Alert,
            2 => Severity::Critical,
            3 => Severity::Error,
            4 => Severity::Warning,
            5 => Severity::Notice,
            6 => Severity::Info,
            _ => Severity::Debug,
        }
    }
}

impl Severity {
    /// Get severity name.
    pub fn name(&self) -> &'static str {
        match self {
            Severity::Emergency => "EMERGENCY",
            Severity::Alert => "ALERT",
            Severity::Critical => "CRITICAL",
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Notice => "NOTICE",
            Severity::Info => "INFO",
            Severity::Debug => "DEBUG",
        }
    }

    /// Parse a numeric (0-7) or named severity.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Ok(n) = value.parse::<u8>() {
            return (n <= 7).then(|| Severity::from(n));
        }
        (0..=7u8)
            .map(Severity::from)
            .find(|s| s.name().eq_ignore_ascii_case(value))
    }
}

impl RuleMetadata {
    /// Get severity as enum.
    pub fn severity_level(&self) -> Option<Severity> {
        self.severity.map(Severity::from)
    }

    /// Format as a log line.
    pub fn format_log(&self) -> String {
        let mut parts = Vec::new();

        if let Some(id) = self.id {
            parts.push(format!("[id \"{}\"]", id));
        }

        if let Some(ref msg) = self.msg {
            parts.push(format!("[msg \"{}\"]", msg));
        }

        if let Some(ref data) = self.logdata {
            parts.push(format!("[data \"{}\"]", data));
        }

        if let Some(sev) = self.severity_level() {
            parts.push(format!("[severity \"{}\"]", sev.name()));
        }

        for tag in &self.tags {
            parts.push(format!("[tag \"{}\"]", tag));
        }

        if let Some(ref rev) = self.rev {
            parts.push(format!("[rev \"{}\"]", rev));
        }

        if let Some(ref ver) = self.ver {
            parts.push(format!("[ver \"{}\"]", ver));
        }

        parts.join(" ")
    }
}

/// Which metadata field an action sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataKind {
    /// msg
    Msg,
    /// logdata
    LogData,
    /// severity
    Severity,
    /// tag (accumulates)
    Tag,
    /// rev
    Rev,
    /// ver
    Ver,
}

/// An action that annotates the running rule's metadata on the transaction.
#[derive(Debug, Clone)]
pub struct MetadataAction {
    kind: MetadataKind,
    value: String,
}

impl MetadataAction {
    /// Create a metadata action. Severity values are validated here.
    pub fn new(kind: MetadataKind, value: &str) -> Result<Self> {
        if kind == MetadataKind::Severity && Severity::parse(value).is_none() {
            return Err(Error::action_argument(
                "severity",
                format!("unknown severity '{}'", value),
            ));
        }
        Ok(Self {
            kind,
            value: value.to_string(),
        })
    }
}

impl Action for MetadataAction {
    fn name(&self) -> &'static str {
        match self.kind {
            MetadataKind::Msg => "msg",
            MetadataKind::LogData => "logdata",
            MetadataKind::Severity => "severity",
            MetadataKind::Tag => "tag",
            MetadataKind::Rev => "rev",
            MetadataKind::Ver => "ver",
        }
    }

    fn value(&self) -> &str {
        &self.value
    }

    fn group(&self) -> ActionGroup {
        ActionGroup::MetaData
    }

    fn execute(&self, tx: &mut Transaction) {
        let expanded = match self.kind {
            MetadataKind::Msg | MetadataKind::LogData => expand_macros(&self.value, tx),
            _ => self.value.clone(),
        };
        let metadata = tx.rule_metadata_mut();
        match self.kind {
            MetadataKind::Msg => metadata.msg = Some(expanded),
            MetadataKind::LogData => metadata.logdata = Some(expanded),
            MetadataKind::Severity => {
                metadata.severity = Severity::parse(&expanded).map(|s| s as u8)
            }
            MetadataKind::Tag => metadata.tags.push(expanded),
            MetadataKind::Rev => metadata.rev = Some(expanded),
            MetadataKind::Ver => metadata.ver = Some(expanded),
        }
    }
}
