//! A single evaluatable rule.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, trace};

use super::dispatch::execute_actions;
use super::phase::Phase;
use super::transaction::Transaction;
use crate::actions::Action;
use crate::operators::{Operator, UnconditionalMatchOperator};
use crate::transformations::{Transformation, TransformationPipeline};
use crate::variables::Variable;

/// A rule: variables to fetch, transformations to apply, one operator to test
/// and actions to run on match, plus optional chained sub-rules.
///
/// Rules are configured once and then only read. Evaluation mutates the
/// [`Transaction`], never the rule.
pub struct SecRule {
    /// Rule ID. Uniqueness is the loader's concern.
    pub id: u64,
    /// Phase the rule runs in.
    pub phase: Phase,
    /// Variables, in fetch order.
    pub variables: Vec<Box<dyn Variable>>,
    /// Transformations applied to every fetched value.
    pub transformations: TransformationPipeline,
    /// Operator testing each transformed value.
    pub operator: Arc<dyn Operator>,
    /// Whether the operator verdict is inverted.
    pub negated: bool,
    /// Actions to execute on match.
    pub actions: Vec<Arc<dyn Action>>,
    /// Free-form annotations, not interpreted by the engine.
    pub metadata: HashMap<String, Vec<String>>,
    /// Chained rules that must all match too.
    pub sub_rules: Vec<SecRule>,
}

impl SecRule {
    /// Create a rule with no variables and an unconditional operator.
    pub fn new(id: u64, phase: Phase) -> Self {
        Self {
            id,
            phase,
            variables: Vec::new(),
            transformations: TransformationPipeline::new(),
            operator: Arc::new(UnconditionalMatchOperator),
            negated: false,
            actions: Vec::new(),
            metadata: HashMap::new(),
            sub_rules: Vec::new(),
        }
    }

    /// Append variables.
    pub fn append_variables(&mut self, variables: impl IntoIterator<Item = Box<dyn Variable>>) {
        self.variables.extend(variables);
    }

    /// Append transformations.
    pub fn append_transformations(
        &mut self,
        transformations: impl IntoIterator<Item = Arc<dyn Transformation>>,
    ) {
        for t in transformations {
            self.transformations.add(t);
        }
    }

    /// Replace the operator.
    pub fn set_operator(&mut self, operator: Arc<dyn Operator>) {
        self.operator = operator;
    }

    /// Set whether the operator verdict is inverted.
    pub fn set_negated(&mut self, negated: bool) {
        self.negated = negated;
    }

    /// Append actions.
    pub fn append_actions(&mut self, actions: impl IntoIterator<Item = Arc<dyn Action>>) {
        self.actions.extend(actions);
    }

    /// Append chained sub-rules.
    pub fn append_sub_rules(&mut self, rules: impl IntoIterator<Item = SecRule>) {
        self.sub_rules.extend(rules);
    }

    /// Add an annotation value under a key.
    pub fn add_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.entry(key.into()).or_default().push(value.into());
    }

    /// Builder form of [`append_variables`](Self::append_variables) for one variable.
    pub fn with_variable(mut self, variable: Box<dyn Variable>) -> Self {
        self.variables.push(variable);
        self
    }

    /// Builder form of [`append_transformations`](Self::append_transformations) for one transformation.
    pub fn with_transformation(mut self, transformation: Arc<dyn Transformation>) -> Self {
        self.transformations.add(transformation);
        self
    }

    /// Builder form of [`set_operator`](Self::set_operator).
    pub fn with_operator(mut self, operator: Arc<dyn Operator>) -> Self {
        self.operator = operator;
        self
    }

    /// Builder form of [`set_negated`](Self::set_negated)`(true)`.
    pub fn negated(mut self) -> Self {
        self.negated = true;
        self
    }

    /// Builder form of [`append_actions`](Self::append_actions) for one action.
    pub fn with_action(mut self, action: Arc<dyn Action>) -> Self {
        self.actions.push(action);
        self
    }

    /// Builder form of [`append_sub_rules`](Self::append_sub_rules) for one rule.
    pub fn with_sub_rule(mut self, rule: SecRule) -> Self {
        self.sub_rules.push(rule);
        self
    }

    /// Apply the transformations to one value.
    pub fn transform_string(&self, tx: &Transaction, value: &str) -> String {
        self.transformations.apply(tx, value).into_owned()
    }

    /// Fetch one variable and transform each of its values.
    pub fn transform_variable(&self, tx: &Transaction, variable: &dyn Variable) -> Vec<String> {
        variable
            .fetch(tx)
            .iter()
            .map(|v| self.transform_string(tx, v))
            .collect()
    }

    /// All transformed values, variable by variable, in fetch order.
    pub fn fetch_all_transformed(&self, tx: &Transaction) -> Vec<String> {
        self.variables
            .iter()
            .flat_map(|v| self.transform_variable(tx, v.as_ref()))
            .collect()
    }

    /// Test this rule alone (sub-rules are not consulted).
    ///
    /// Returns true on the first value whose (possibly negated) verdict holds.
    /// An aborted transaction never matches.
    pub fn is_match(&self, tx: &Transaction) -> bool {
        for value in self.fetch_all_transformed(tx) {
            if tx.is_aborted() {
                return false;
            }
            let verdict = self.operator.matches(tx, &value);
            trace!(
                rule_id = self.id,
                operator = self.operator.name(),
                verdict,
                negated = self.negated,
                "tested value"
            );
            if self.negated != verdict {
                return true;
            }
        }
        false
    }

    /// Evaluate the rule and its chain, running actions on overall match.
    ///
    /// Sub-rules are checked with their own `is_match` only; their own
    /// sub-rules are not followed. On match, this rule's actions run first,
    /// then each sub-rule's actions in order.
    pub fn execute(&self, tx: &mut Transaction) {
        debug!(rule_id = self.id, phase = %self.phase, "running rule");

        if !self.is_match(tx) {
            return;
        }
        if let Some(sub) = self.sub_rules.iter().find(|sub| !sub.is_match(tx)) {
            trace!(rule_id = self.id, sub_rule_id = sub.id, "chain broken");
            return;
        }

        debug!(rule_id = self.id, "rule matched");
        tx.begin_rule(self.id);
        execute_actions(tx, &self.actions);
        for sub in &self.sub_rules {
            execute_actions(tx, &sub.actions);
        }
    }
}

impl std::fmt::Debug for SecRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecRule")
            .field("id", &self.id)
            .field("phase", &self.phase)
            .field(
                "variables",
                &self.variables.iter().map(|v| v.name()).collect::<Vec<_>>(),
            )
            .field("transformations", &self.transformations)
            .field("operator", &self.operator.name())
            .field("negated", &self.negated)
            .field("actions", &self.actions)
            .field("sub_rules", &self.sub_rules.len())
            .finish()
    }
}
