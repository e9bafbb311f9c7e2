//! Action capability and the built-in actions.
//!
//! Every action belongs to exactly one [`ActionGroup`]. The engine runs a
//! rule's actions group by group (see [`crate::engine::dispatch`]), so an
//! action's group decides when its side effect happens relative to the others.

mod data;
mod disruptive;
mod flow;
mod logging;
mod metadata;

pub use data::{apply_setvar, expand_macros, SetVarAction, SetVarOp, SetVarOperation};
pub use disruptive::{Disruption, DisruptiveAction};
pub use flow::{FlowAction, FlowDirective};
pub use logging::LogAction;
pub use metadata::{MetadataAction, MetadataKind, Severity};

use crate::engine::Transaction;
use crate::error::{Error, Result};
use std::sync::Arc;

/// Priority class of an action. Groups run in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ActionGroup {
    /// Rule metadata (msg, tag, severity, ...).
    MetaData = 0,
    /// Transaction data changes (setvar).
    Data = 1,
    /// Side effects that do not stop processing (log).
    NonDisruptive = 2,
    /// Actions that may stop processing (deny, drop, allow, ...).
    Disruptive = 3,
    /// Flow control (skip, skipAfter).
    Flow = 4,
}

impl ActionGroup {
    /// Number of action groups.
    pub const COUNT: usize = 5;

    /// All groups in execution order.
    pub fn all() -> &'static [ActionGroup] {
        &[
            ActionGroup::MetaData,
            ActionGroup::Data,
            ActionGroup::NonDisruptive,
            ActionGroup::Disruptive,
            ActionGroup::Flow,
        ]
    }

    /// Slot index for group-indexed tables.
    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// Trait for all actions.
///
/// `execute` never reports failure to the engine; anything that can go wrong
/// is either rejected when the action is built or logged by the action itself.
pub trait Action: Send + Sync {
    /// Get the action name.
    fn name(&self) -> &'static str;

    /// The configured value (empty when the action takes none).
    fn value(&self) -> &str;

    /// Priority class, fixed at construction.
    fn group(&self) -> ActionGroup;

    /// Perform the side effect.
    fn execute(&self, tx: &mut Transaction);
}

impl std::fmt::Debug for dyn Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.value().is_empty() {
            write!(f, "{}", self.name())
        } else {
            write!(f, "{}:{}", self.name(), self.value())
        }
    }
}

/// Metadata of the rule whose actions are currently running.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleMetadata {
    /// Rule ID.
    pub id: Option<u64>,
    /// Rule message.
    pub msg: Option<String>,
    /// Log data (macros already expanded).
    pub logdata: Option<String>,
    /// Severity (0-7).
    pub severity: Option<u8>,
    /// Tags.
    pub tags: Vec<String>,
    /// Revision.
    pub rev: Option<String>,
    /// Version.
    pub ver: Option<String>,
}

impl RuleMetadata {
    /// Fresh metadata for a rule id.
    pub fn for_rule(id: u64) -> Self {
        Self {
            id: Some(id),
            ..Default::default()
        }
    }
}

/// Create an action from a name and value.
pub fn create_action(name: &str, value: &str) -> Result<Arc<dyn Action>> {
    match name.to_ascii_lowercase().as_str() {
        // Metadata
        "msg" => Ok(Arc::new(MetadataAction::new(MetadataKind::Msg, value)?)),
        "logdata" => Ok(Arc::new(MetadataAction::new(MetadataKind::LogData, value)?)),
        "severity" => Ok(Arc::new(MetadataAction::new(MetadataKind::Severity, value)?)),
        "tag" => Ok(Arc::new(MetadataAction::new(MetadataKind::Tag, value)?)),
        "rev" => Ok(Arc::new(MetadataAction::new(MetadataKind::Rev, value)?)),
        "ver" => Ok(Arc::new(MetadataAction::new(MetadataKind::Ver, value)?)),

        // Data
        "setvar" => Ok(Arc::new(SetVarAction::new(value)?)),

        // Non-disruptive
        "log" => Ok(Arc::new(LogAction)),

        // Disruptive
        "deny" => Ok(Arc::new(DisruptiveAction::deny(value)?)),
        "block" => Ok(Arc::new(DisruptiveAction::new(Disruption::Block))),
        "drop" => Ok(Arc::new(DisruptiveAction::new(Disruption::Drop))),
        "redirect" => Ok(Arc::new(DisruptiveAction::redirect(value)?)),
        "allow" => Ok(Arc::new(DisruptiveAction::new(Disruption::Allow))),
        "pass" => Ok(Arc::new(DisruptiveAction::new(Disruption::Pass))),

        // Flow
        "skip" => Ok(Arc::new(FlowAction::skip(value)?)),
        "skipafter" => Ok(Arc::new(FlowAction::skip_after(value)?)),

        _ => Err(Error::UnknownAction { name: name.to_string() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_order() {
        let groups = ActionGroup::all();
        assert_eq!(groups.len(), ActionGroup::COUNT);
        for (i, g) in groups.iter().enumerate() {
            assert_eq!(g.index(), i);
        }
        assert!(ActionGroup::MetaData < ActionGroup::Flow);
    }

    #[test]
    fn test_create_action_groups() {
        let cases = [
            ("msg", "hi", ActionGroup::MetaData),
            ("setvar", "tx.a=1", ActionGroup::Data),
            ("log", "", ActionGroup::NonDisruptive),
            ("deny", "403", ActionGroup::Disruptive),
            ("skipAfter", "END", ActionGroup::Flow),
        ];
        for (name, value, group) in cases {
            let action = create_action(name, value).unwrap();
            assert_eq!(action.group(), group, "{}", name);
            assert_eq!(action.value(), value);
        }
    }

    #[test]
    fn test_create_action_errors() {
        assert!(matches!(
            create_action("exec", "/bin/sh"),
            Err(Error::UnknownAction { .. })
        ));
        assert!(matches!(
            create_action("deny", "abc"),
            Err(Error::InvalidActionArgument { .. })
        ));
        assert!(matches!(
            create_action("skip", "-1"),
            Err(Error::InvalidActionArgument { .. })
        ));
    }

    #[test]
    fn test_debug_format() {
        let action = create_action("tag", "attack-sqli").unwrap();
        assert_eq!(format!("{:?}", action), "tag:attack-sqli");
        let action = create_action("log", "").unwrap();
        assert_eq!(format!("{:?}", action), "log");
    }
}
