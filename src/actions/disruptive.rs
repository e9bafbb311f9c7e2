//! Disruptive actions (deny, block, drop, redirect, allow, pass).

use tracing::info;

use super::{Action, ActionGroup};
use crate::engine::intervention::Intervention;
use crate::engine::{RuleEngineMode, Transaction};
use crate::error::{Error, Result};

/// What a disruptive action does to the transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disruption {
    /// Deny with an explicit status, or the transaction default.
    Deny(Option<u16>),
    /// Deny with the transaction default status.
    Block,
    /// Drop the connection.
    Drop,
    /// Redirect to URL.
    Redirect(String),
    /// Stop evaluating rules, let the request through.
    Allow,
    /// Continue processing.
    Pass,
}

impl Disruption {
    /// Determine the HTTP status code for this disruption.
    pub fn status(&self, default_status: u16) -> u16 {
        match self {
            Disruption::Deny(status) => status.unwrap_or(default_status),
            Disruption::Block => default_status,
            Disruption::Drop => 444, // nginx-style connection drop
            Disruption::Redirect(_) => 302,
            Disruption::Allow | Disruption::Pass => 200,
        }
    }

    /// Check if this disruption ends the transaction.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Disruption::Deny(_) | Disruption::Block | Disruption::Drop | Disruption::Redirect(_)
        )
    }
}

/// A disruptive action.
#[derive(Debug, Clone)]
pub struct DisruptiveAction {
    disruption: Disruption,
    value: String,
}

impl DisruptiveAction {
    /// Create an action without a value.
    pub fn new(disruption: Disruption) -> Self {
        Self {
            disruption,
            value: String::new(),
        }
    }

    /// `deny` or `deny:STATUS`.
    pub fn deny(value: &str) -> Result<Self> {
        let value = value.trim();
        let status = if value.is_empty() {
            None
        } else {
            match value.parse::<u16>() {
                Ok(s) if (100..=599).contains(&s) => Some(s),
                _ => {
                    return Err(Error::action_argument(
                        "deny",
                        format!("invalid status '{}'", value),
                    ))
                }
            }
        };
        Ok(Self {
            disruption: Disruption::Deny(status),
            value: value.to_string(),
        })
    }

    /// `redirect:URL`.
    pub fn redirect(value: &str) -> Result<Self> {
        let url = value.trim();
        if url.is_empty() {
            return Err(Error::action_argument("redirect", "missing URL"));
        }
        Ok(Self {
            disruption: Disruption::Redirect(url.to_string()),
            value: value.to_string(),
        })
    }

    /// The configured disruption.
    pub fn disruption(&self) -> &Disruption {
        &self.disruption
    }
}

impl Action for DisruptiveAction {
    fn name(&self) -> &'static str {
        match self.disruption {
            Disruption::Deny(_) => "deny",
            Disruption::Block => "block",
            Disruption::Drop => "drop",
            Disruption::Redirect(_) => "redirect",
            Disruption::Allow => "allow",
            Disruption::Pass => "pass",
        }
    }

    fn value(&self) -> &str {
        &self.value
    }

    fn group(&self) -> ActionGroup {
        ActionGroup::Disruptive
    }

    fn execute(&self, tx: &mut Transaction) {
        match &self.disruption {
            Disruption::Pass => {}
            Disruption::Allow => tx.allow(),
            terminal => {
                let status = terminal.status(tx.default_status());
                if tx.mode() != RuleEngineMode::On {
                    info!(
                        rule_id = ?tx.rule_metadata().id,
                        status,
                        "detection only, not disrupting"
                    );
                    return;
                }

                let mut intervention = Intervention::new(status, tx.phase());
                if let Disruption::Redirect(url) = terminal {
                    intervention.url = Some(url.clone());
                }
                intervention.drop_connection = matches!(terminal, Disruption::Drop);
                intervention.add_metadata(tx.rule_metadata().clone());
                tx.intervene(intervention);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineConfig, Phase};

    #[test]
    fn test_status_for_disruption() {
        assert_eq!(Disruption::Deny(Some(406)).status(403), 406);
        assert_eq!(Disruption::Deny(None).status(418), 418);
        assert_eq!(Disruption::Block.status(403), 403);
        assert_eq!(Disruption::Drop.status(403), 444);
        assert!(Disruption::Redirect("/x".into()).is_terminal());
        assert!(!Disruption::Allow.is_terminal());
    }

    #[test]
    fn test_deny_aborts_and_intervenes() {
        let mut tx = Transaction::new();
        tx.enter_phase(Phase::RequestHeaders);
        tx.begin_rule(42);
        tx.rule_metadata_mut().msg = Some("blocked".to_string());

        DisruptiveAction::deny("406").unwrap().execute(&mut tx);

        assert!(tx.is_aborted());
        let intervention = tx.intervention().unwrap();
        assert_eq!(intervention.status, 406);
        assert_eq!(intervention.phase, Phase::RequestHeaders);
        assert_eq!(intervention.rule_ids, vec![42]);
        assert_eq!(intervention.log.as_deref(), Some("blocked"));
    }

    #[test]
    fn test_redirect_and_drop() {
        let mut tx = Transaction::new();
        DisruptiveAction::redirect("https://example.com/blocked")
            .unwrap()
            .execute(&mut tx);
        let intervention = tx.intervention().unwrap();
        assert_eq!(intervention.status, 302);
        assert_eq!(intervention.url.as_deref(), Some("https://example.com/blocked"));

        let mut tx = Transaction::new();
        DisruptiveAction::new(Disruption::Drop).execute(&mut tx);
        assert!(tx.intervention().unwrap().drop_connection);
    }

    #[test]
    fn test_detection_only_does_not_abort() {
        let config = EngineConfig::default().with_mode(RuleEngineMode::DetectionOnly);
        let mut tx = Transaction::with_config(&config);
        DisruptiveAction::new(Disruption::Block).execute(&mut tx);
        assert!(!tx.is_aborted());
        assert!(tx.intervention().is_none());
    }

    #[test]
    fn test_allow_and_pass() {
        let mut tx = Transaction::new();
        DisruptiveAction::new(Disruption::Pass).execute(&mut tx);
        assert!(!tx.is_allowed());
        DisruptiveAction::new(Disruption::Allow).execute(&mut tx);
        assert!(tx.is_allowed());
        assert!(!tx.is_aborted());
    }
}
