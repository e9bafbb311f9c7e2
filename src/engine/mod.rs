//! Rule evaluation engine: rules, rule sets, transactions and the phase driver.

pub mod dispatch;
pub mod intervention;
pub mod phase;
pub mod rule;
pub mod ruleset;
pub mod transaction;

pub use dispatch::execute_actions;
pub use intervention::Intervention;
pub use phase::Phase;
pub use rule::SecRule;
pub use ruleset::SecRuleSet;
pub use transaction::Transaction;

use crate::actions::FlowDirective;
use crate::error::{Error, Result};
use std::sync::Arc;
use tracing::{debug, warn};

/// How disruptive actions behave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuleEngineMode {
    /// Rules run and disruptive actions take effect.
    #[default]
    On,
    /// Rules run, disruptive actions are only logged.
    DetectionOnly,
    /// No rules run.
    Off,
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Rule engine mode.
    pub mode: RuleEngineMode,
    /// Status code for `block` and `deny` without a status.
    pub default_status: u16,
    /// Run the rule set's default actions at the start of every phase.
    pub apply_default_actions: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mode: RuleEngineMode::On,
            default_status: 403,
            apply_default_actions: true,
        }
    }
}

impl EngineConfig {
    /// Set the rule engine mode.
    pub fn with_mode(mut self, mode: RuleEngineMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the default block status code.
    pub fn with_default_status(mut self, status: u16) -> Self {
        self.default_status = status;
        self
    }

    /// Enable or disable per-phase default actions.
    pub fn with_default_actions(mut self, enabled: bool) -> Self {
        self.apply_default_actions = enabled;
        self
    }
}

/// Main engine: a frozen rule set plus configuration.
///
/// Cheap to share; every request gets its own [`Transaction`].
pub struct Engine {
    /// Shared rule set.
    ruleset: Arc<SecRuleSet>,
    /// Configuration applied to new transactions.
    config: EngineConfig,
}

impl Engine {
    /// Create an engine with the default configuration.
    pub fn new(ruleset: SecRuleSet) -> Self {
        Self::with_config(ruleset, EngineConfig::default())
    }

    /// Create an engine with a configuration.
    pub fn with_config(ruleset: SecRuleSet, config: EngineConfig) -> Self {
        debug!(
            rules = ruleset.rule_count(),
            mode = ?config.mode,
            "engine created"
        );
        Self {
            ruleset: Arc::new(ruleset),
            config,
        }
    }

    /// Create a new transaction for processing a request.
    pub fn new_transaction(&self) -> Transaction {
        Transaction::with_config(&self.config)
    }

    /// Get the rule set.
    pub fn ruleset(&self) -> &Arc<SecRuleSet> {
        &self.ruleset
    }

    /// Get the configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get the number of rules.
    pub fn rule_count(&self) -> usize {
        self.ruleset.rule_count()
    }

    /// Run every rule of `phase` against the transaction.
    ///
    /// Phases must be driven in increasing order. Rules are stepped one
    /// offset at a time so `skip` and `skipAfter` can move the cursor; the
    /// loop stops once the transaction is aborted or allowed.
    pub fn process_phase(&self, tx: &mut Transaction, phase: Phase) -> Result<()> {
        if !phase.accepts_rules() || phase <= tx.phase() {
            return Err(Error::PhaseOrder {
                current: tx.phase(),
                requested: phase,
            });
        }
        tx.enter_phase(phase);

        if tx.mode() == RuleEngineMode::Off {
            debug!(phase = %phase, "rule engine off");
            return Ok(());
        }
        if tx.is_aborted() || tx.is_allowed() {
            return Ok(());
        }

        if self.config.apply_default_actions {
            self.ruleset.execute_default_actions(tx);
            // Flow directives only steer rule offsets.
            if let Some(directive) = tx.take_flow() {
                debug!(?directive, phase = %phase, "ignoring flow directive from default actions");
            }
        }

        let len = self.ruleset.phase_len(phase);
        let mut offset = 0;
        while offset < len {
            if tx.is_aborted() || tx.is_allowed() {
                break;
            }
            self.ruleset.process(tx, phase, offset);

            offset = match tx.take_flow() {
                None => offset + 1,
                Some(FlowDirective::Skip(n)) => offset.saturating_add(1).saturating_add(n),
                Some(FlowDirective::SkipAfter(marker)) => match self.ruleset.marker(&marker) {
                    Some((p, target)) if p == phase && target > offset => target,
                    _ => {
                        warn!(marker = %marker, phase = %phase, "skipAfter marker not ahead in this phase");
                        len
                    }
                },
            };
        }

        Ok(())
    }

    /// Process request headers.
    pub fn process_request_headers(&self, tx: &mut Transaction) -> Result<()> {
        self.process_phase(tx, Phase::RequestHeaders)
    }

    /// Process request body. Parses an urlencoded body into `ARGS_POST` first.
    pub fn process_request_body(&self, tx: &mut Transaction) -> Result<()> {
        tx.request_mut().parse_form_body();
        self.process_phase(tx, Phase::RequestBody)
    }

    /// Process response headers.
    pub fn process_response_headers(&self, tx: &mut Transaction) -> Result<()> {
        self.process_phase(tx, Phase::ResponseHeaders)
    }

    /// Process response body.
    pub fn process_response_body(&self, tx: &mut Transaction) -> Result<()> {
        self.process_phase(tx, Phase::ResponseBody)
    }

    /// Process logging.
    pub fn process_logging(&self, tx: &mut Transaction) -> Result<()> {
        self.process_phase(tx, Phase::Logging)
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("rule_count", &self.ruleset.rule_count())
            .field("config", &self.config)
            .finish()
    }
}
