//! Group-ordered action dispatch.

use std::sync::Arc;

use super::transaction::Transaction;
use crate::actions::{Action, ActionGroup};

/// Execute actions group by group: MetaData, Data, NonDisruptive, Disruptive, Flow.
///
/// Order within a group is the input order. Every action runs; the abort flag
/// is not consulted here.
pub fn execute_actions(tx: &mut Transaction, actions: &[Arc<dyn Action>]) {
    let mut buckets: [Vec<&dyn Action>; ActionGroup::COUNT] = Default::default();
    for action in actions {
        buckets[action.group().index()].push(action.as_ref());
    }

    for action in buckets.iter().flatten() {
        action.execute(tx);
    }
}
