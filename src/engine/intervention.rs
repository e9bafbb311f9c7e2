//! Intervention tracking for disrupted transactions.

use super::phase::Phase;
use crate::actions::RuleMetadata;

/// An intervention (blocking decision) recorded by a disruptive action.
#[derive(Debug, Clone)]
pub struct Intervention {
    /// HTTP status code to return.
    pub status: u16,
    /// Redirect URL (if applicable).
    pub url: Option<String>,
    /// Log message.
    pub log: Option<String>,
    /// Rule IDs that triggered the intervention.
    pub rule_ids: Vec<u64>,
    /// Phase in which intervention occurred.
    pub phase: Phase,
    /// Whether to drop the connection.
    pub drop_connection: bool,
    /// Matched rule metadata.
    pub metadata: Vec<RuleMetadata>,
}

impl Intervention {
    /// Create a new intervention.
    pub fn new(status: u16, phase: Phase) -> Self {
        Self {
            status,
            url: None,
            log: None,
            rule_ids: Vec::new(),
            phase,
            drop_connection: false,
            metadata: Vec::new(),
        }
    }

    /// Add metadata from a matched rule.
    pub fn add_metadata(&mut self, metadata: RuleMetadata) {
        if let Some(id) = metadata.id {
            self.rule_ids.push(id);
        }
        if self.log.is_none() {
            self.log = metadata.msg.clone();
        }
        self.metadata.push(metadata);
    }

    /// Format as a log entry.
    pub fn format_log(&self) -> String {
        let mut parts = vec![format!("[status {}]", self.status)];

        if !self.rule_ids.is_empty() {
            let ids: Vec<String> = self.rule_ids.iter().map(|id| id.to_string()).collect();
            parts.push(format!("[rule_ids: {}]", ids.join(", ")));
        }

        if let Some(ref log) = self.log {
            parts.push(format!("[msg: {}]", log));
        }

        if let Some(ref url) = self.url {
            parts.push(format!("[redirect: {}]", url));
        }

        parts.push(format!("[phase: {}]", self.phase.name()));

        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_metadata() {
        let mut intervention = Intervention::new(403, Phase::RequestHeaders);
        intervention.add_metadata(RuleMetadata {
            id: Some(12345),
            msg: Some("first".to_string()),
            ..Default::default()
        });
        intervention.add_metadata(RuleMetadata {
            id: Some(12346),
            msg: Some("second".to_string()),
            ..Default::default()
        });
        assert_eq!(intervention.rule_ids, vec![12345, 12346]);
        assert_eq!(intervention.log.as_deref(), Some("first"));
    }

    #[test]
    fn test_format_log() {
        let mut intervention = Intervention::new(403, Phase::RequestBody);
        intervention.add_metadata(RuleMetadata::for_rule(942100));
        let log = intervention.format_log();
        assert!(log.contains("[status 403]"));
        assert!(log.contains("942100"));
        assert!(log.contains("[phase: REQUEST_BODY]"));
    }
}
