//! Phase-indexed rule set with stepped execution.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::dispatch::execute_actions;
use super::phase::{Phase, PHASE_SLOTS};
use super::rule::SecRule;
use super::transaction::Transaction;
use crate::actions::Action;

/// Rules grouped by phase, plus phase-level default actions and markers.
///
/// Built once, then shared read-only (typically behind an `Arc`) by every
/// transaction. Within a phase, rules keep registration order and are
/// addressed by offset.
pub struct SecRuleSet {
    /// Rules per phase slot, indexed by phase number.
    phases: [Vec<SecRule>; PHASE_SLOTS],
    /// Actions run by [`execute_default_actions`](Self::execute_default_actions).
    default_actions: Vec<Arc<dyn Action>>,
    /// Markers for skipAfter: name -> (phase, offset of the next rule).
    markers: HashMap<String, (Phase, usize)>,
}

impl SecRuleSet {
    /// Create an empty rule set.
    pub fn new() -> Self {
        Self {
            phases: Default::default(),
            default_actions: Vec::new(),
            markers: HashMap::new(),
        }
    }

    /// Register rules in their phases.
    ///
    /// Rules whose phase is a sentinel (`Begin`/`End`) are dropped without error.
    pub fn add_rules(&mut self, rules: impl IntoIterator<Item = SecRule>) {
        for rule in rules {
            if !rule.phase.accepts_rules() {
                debug!(rule_id = rule.id, phase = %rule.phase, "dropping rule with invalid phase");
                continue;
            }
            self.phases[rule.phase.index()].push(rule);
        }
    }

    /// Register one rule. Same rules as [`add_rules`](Self::add_rules).
    pub fn add_rule(&mut self, rule: SecRule) {
        self.add_rules(std::iter::once(rule));
    }

    /// Append phase-level default actions.
    pub fn add_default_actions(&mut self, actions: impl IntoIterator<Item = Arc<dyn Action>>) {
        self.default_actions.extend(actions);
    }

    /// Dispatch the default actions against a transaction.
    pub fn execute_default_actions(&self, tx: &mut Transaction) {
        execute_actions(tx, &self.default_actions);
    }

    /// Record a marker at the current end of `phase`.
    ///
    /// `skipAfter` to this marker continues with the next rule added to the phase.
    pub fn add_marker(&mut self, name: impl Into<String>, phase: Phase) {
        let name = name.into();
        if !phase.accepts_rules() {
            debug!(marker = %name, phase = %phase, "dropping marker with invalid phase");
            return;
        }
        let offset = self.phases[phase.index()].len();
        self.markers.insert(name, (phase, offset));
    }

    /// Run exactly one rule: the one at `offset` in `phase`.
    ///
    /// An empty phase or an out-of-range offset is a no-op.
    pub fn process(&self, tx: &mut Transaction, phase: Phase, offset: usize) {
        debug!(phase = %phase, offset, "running phase rule");
        if let Some(rule) = self.phases[phase.index()].get(offset) {
            rule.execute(tx);
        }
    }

    /// Get rules for a phase, in registration order.
    pub fn rules_for_phase(&self, phase: Phase) -> &[SecRule] {
        &self.phases[phase.index()]
    }

    /// Number of rules in a phase.
    pub fn phase_len(&self, phase: Phase) -> usize {
        self.phases[phase.index()].len()
    }

    /// Get total rule count.
    pub fn rule_count(&self) -> usize {
        self.phases.iter().map(|p| p.len()).sum()
    }

    /// Default actions, in registration order.
    pub fn default_actions(&self) -> &[Arc<dyn Action>] {
        &self.default_actions
    }

    /// Get marker position.
    pub fn marker(&self, name: &str) -> Option<(Phase, usize)> {
        self.markers.get(name).copied()
    }
}

impl Default for SecRuleSet {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SecRuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let per_phase: Vec<(Phase, usize)> = Phase::all()
            .iter()
            .map(|p| (*p, self.phase_len(*p)))
            .filter(|(_, n)| *n > 0)
            .collect();
        f.debug_struct("SecRuleSet")
            .field("phases", &per_phase)
            .field("default_actions", &self.default_actions)
            .field("markers", &self.markers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::create_action;
    use crate::operators::create_operator;
    use crate::variables::{create_variable, Collection};

    fn counting_rule(id: u64, phase: Phase) -> SecRule {
        SecRule::new(id, phase)
            .with_variable(create_variable("REQUEST_URI").unwrap())
            .with_action(create_action("setvar", &format!("tx.rule_{}=+1", id)).unwrap())
    }

    #[test]
    fn test_add_rules_by_phase() {
        let mut rules = SecRuleSet::new();
        rules.add_rules(vec![
            counting_rule(1, Phase::RequestHeaders),
            counting_rule(2, Phase::RequestBody),
            counting_rule(3, Phase::RequestHeaders),
        ]);

        assert_eq!(rules.rule_count(), 3);
        let ids: Vec<u64> = rules
            .rules_for_phase(Phase::RequestHeaders)
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(rules.phase_len(Phase::RequestBody), 1);
        assert_eq!(rules.phase_len(Phase::Logging), 0);
    }

    #[test]
    fn test_sentinel_phases_are_dropped() {
        let mut rules = SecRuleSet::new();
        rules.add_rules(vec![
            counting_rule(1, Phase::Begin),
            counting_rule(2, Phase::End),
        ]);
        assert_eq!(rules.rule_count(), 0);

        let mut tx = Transaction::new();
        for phase in [Phase::Begin, Phase::End] {
            for offset in 0..3 {
                rules.process(&mut tx, phase, offset);
            }
        }
        assert!(tx.matched_rules().is_empty());
    }

    #[test]
    fn test_process_runs_exactly_one_rule() {
        let mut rules = SecRuleSet::new();
        rules.add_rules(vec![
            counting_rule(1, Phase::RequestHeaders),
            counting_rule(2, Phase::RequestHeaders),
        ]);

        let mut tx = Transaction::new();
        rules.process(&mut tx, Phase::RequestHeaders, 1);
        assert_eq!(tx.matched_rules(), &[2]);
        assert_eq!(tx.tx().get("rule_1"), None);
        assert_eq!(tx.tx().get("rule_2"), Some(vec!["1"]));
    }

    #[test]
    fn test_process_out_of_range_is_noop() {
        let empty = SecRuleSet::new();
        let mut tx = Transaction::new();
        empty.process(&mut tx, Phase::RequestHeaders, 0);

        let mut rules = SecRuleSet::new();
        rules.add_rule(counting_rule(1, Phase::RequestHeaders));
        rules.process(&mut tx, Phase::RequestHeaders, 1);
        rules.process(&mut tx, Phase::RequestBody, 0);
        assert!(tx.matched_rules().is_empty());
    }

    #[test]
    fn test_default_actions() {
        let mut rules = SecRuleSet::new();
        rules.add_default_actions(vec![
            create_action("deny", "").unwrap(),
            create_action("setvar", "tx.defaults=1").unwrap(),
        ]);
        assert_eq!(rules.default_actions().len(), 2);

        let mut tx = Transaction::new();
        rules.execute_default_actions(&mut tx);
        assert_eq!(tx.tx().get("defaults"), Some(vec!["1"]));
        assert!(tx.is_aborted());
    }

    #[test]
    fn test_markers() {
        let mut rules = SecRuleSet::new();
        rules.add_rule(counting_rule(1, Phase::RequestHeaders));
        rules.add_marker("AFTER_ONE", Phase::RequestHeaders);
        rules.add_rule(counting_rule(2, Phase::RequestHeaders));
        rules.add_marker("NOWHERE", Phase::End);

        assert_eq!(rules.marker("AFTER_ONE"), Some((Phase::RequestHeaders, 1)));
        assert_eq!(rules.marker("NOWHERE"), None);
    }

    #[test]
    fn test_shared_across_threads() {
        let mut rules = SecRuleSet::new();
        rules.add_rule(
            SecRule::new(1, Phase::RequestHeaders)
                .with_variable(create_variable("REQUEST_URI").unwrap())
                .with_operator(create_operator("contains", "/admin").unwrap())
                .with_action(create_action("deny", "").unwrap()),
        );
        let rules = Arc::new(rules);

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let rules = Arc::clone(&rules);
                std::thread::spawn(move || {
                    let mut tx = Transaction::new();
                    let uri = if i % 2 == 0 { "/admin" } else { "/home" };
                    tx.process_uri(uri, "GET", "HTTP/1.1");
                    rules.process(&mut tx, Phase::RequestHeaders, 0);
                    tx.is_aborted()
                })
            })
            .collect();

        let results: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results, vec![true, false, true, false]);
    }
}
