//! Non-disruptive logging action.

use tracing::info;

use super::{Action, ActionGroup};
use crate::engine::Transaction;

/// `log`: append the running rule's metadata to the transaction audit log.
#[derive(Debug, Clone, Copy)]
pub struct LogAction;

impl Action for LogAction {
    fn name(&self) -> &'static str {
        "log"
    }

    fn value(&self) -> &str {
        ""
    }

    fn group(&self) -> ActionGroup {
        ActionGroup::NonDisruptive
    }

    fn execute(&self, tx: &mut Transaction) {
        let line = tx.rule_metadata().format_log();
        info!(rule_id = ?tx.rule_metadata().id, phase = %tx.phase(), "{}", line);
        tx.push_audit_log(line);
    }
}
