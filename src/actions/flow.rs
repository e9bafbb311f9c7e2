//! Flow control actions (skip, skipAfter).
//!
//! Flow actions do not move anything themselves: they leave a
//! [`FlowDirective`] on the transaction, and the loop driving
//! [`crate::engine::SecRuleSet::process`] decides the next offset from it.

use super::{Action, ActionGroup};
use crate::engine::Transaction;
use crate::error::{Error, Result};

/// Requested change to the next rule offset within the current phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowDirective {
    /// Skip the next N rules.
    Skip(usize),
    /// Continue at the named marker.
    SkipAfter(String),
}

/// A flow control action.
#[derive(Debug, Clone)]
pub struct FlowAction {
    directive: FlowDirective,
    value: String,
}

impl FlowAction {
    /// `skip:N`, N >= 1.
    pub fn skip(value: &str) -> Result<Self> {
        let n: usize = value
            .trim()
            .parse()
            .map_err(|_| Error::action_argument("skip", format!("invalid count '{}'", value)))?;
        if n == 0 {
            return Err(Error::action_argument("skip", "count must be at least 1"));
        }
        Ok(Self {
            directive: FlowDirective::Skip(n),
            value: value.to_string(),
        })
    }

    /// `skipAfter:MARKER`.
    pub fn skip_after(value: &str) -> Result<Self> {
        let marker = value.trim();
        if marker.is_empty() {
            return Err(Error::action_argument("skipAfter", "missing marker name"));
        }
        Ok(Self {
            directive: FlowDirective::SkipAfter(marker.to_string()),
            value: value.to_string(),
        })
    }

    /// The directive this action leaves on the transaction.
    pub fn directive(&self) -> &FlowDirective {
        &self.directive
    }
}

impl Action for FlowAction {
    fn name(&self) -> &'static str {
        match self.directive {
            FlowDirective::Skip(_) => "skip",
            FlowDirective::SkipAfter(_) => "skipAfter",
        }
    }

    fn value(&self) -> &str {
        &self.value
    }

    fn group(&self) -> ActionGroup {
        ActionGroup::Flow
    }

    fn execute(&self, tx: &mut Transaction) {
        tx.set_flow(self.directive.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_parse() {
        assert_eq!(FlowAction::skip("2").unwrap().directive(), &FlowDirective::Skip(2));
        assert!(FlowAction::skip("0").is_err());
        assert!(FlowAction::skip("x").is_err());
        assert!(FlowAction::skip_after(" ").is_err());
    }

    #[test]
    fn test_flow_action_sets_directive() {
        let mut tx = Transaction::new();
        FlowAction::skip_after("END_CHECKS").unwrap().execute(&mut tx);
        assert_eq!(
            tx.take_flow(),
            Some(FlowDirective::SkipAfter("END_CHECKS".to_string()))
        );
        assert_eq!(tx.take_flow(), None);
    }
}
