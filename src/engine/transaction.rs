//! Per-request transaction state.

use super::intervention::Intervention;
use super::phase::Phase;
use super::{EngineConfig, RuleEngineMode};
use crate::actions::{FlowDirective, RuleMetadata};
use crate::variables::{RequestData, ResponseData, TxCollection};

/// State of one request as it moves through the phases.
///
/// Variables read from it, actions write to it. A transaction belongs to a
/// single request flow and is never shared.
pub struct Transaction {
    /// Request data.
    request: RequestData,
    /// Response data.
    response: ResponseData,
    /// TX collection (mutable variables).
    tx: TxCollection,
    /// Current phase.
    phase: Phase,
    /// Engine mode captured at creation.
    mode: RuleEngineMode,
    /// Status used by block / bare deny.
    default_status: u16,
    /// Set by disruptive actions; checked before every value comparison.
    aborted: bool,
    /// Set by `allow`; the driver stops running rules.
    allowed: bool,
    /// First intervention (if any).
    intervention: Option<Intervention>,
    /// Rules that matched, in match order.
    matched_rules: Vec<u64>,
    /// Metadata of the rule whose actions are running.
    rule_metadata: RuleMetadata,
    /// Lines written by the `log` action.
    audit_log: Vec<String>,
    /// Pending flow change for the driving loop.
    flow: Option<FlowDirective>,
}

impl Transaction {
    /// Create a transaction with the default configuration.
    pub fn new() -> Self {
        Self::with_config(&EngineConfig::default())
    }

    /// Create a transaction for an engine configuration.
    pub fn with_config(config: &EngineConfig) -> Self {
        Self {
            request: RequestData::new(),
            response: ResponseData::new(),
            tx: TxCollection::new(),
            phase: Phase::Begin,
            mode: config.mode,
            default_status: config.default_status,
            aborted: false,
            allowed: false,
            intervention: None,
            matched_rules: Vec::new(),
            rule_metadata: RuleMetadata::default(),
            audit_log: Vec::new(),
            flow: None,
        }
    }

    /// Set the request line.
    pub fn process_uri(&mut self, uri: &str, method: &str, protocol: &str) {
        self.request.set_uri(uri);
        self.request.set_method(method);
        self.request.set_protocol(protocol);
    }

    /// Set the client address.
    pub fn process_connection(&mut self, client_ip: &str, client_port: u16) {
        self.request.set_client(client_ip, client_port);
    }

    /// Add a request header.
    pub fn add_request_header(&mut self, name: &str, value: &str) {
        self.request.add_header(name, value);
    }

    /// Append data to request body.
    pub fn append_request_body(&mut self, data: &[u8]) {
        self.request.append_body(data);
    }

    /// Set the response status.
    pub fn set_response_status(&mut self, status: u16) {
        self.response.set_status(status);
    }

    /// Add a response header.
    pub fn add_response_header(&mut self, name: &str, value: &str) {
        self.response.add_header(name, value);
    }

    /// Append data to response body.
    pub fn append_response_body(&mut self, data: &[u8]) {
        self.response.append_body(data);
    }

    /// Request data.
    pub fn request(&self) -> &RequestData {
        &self.request
    }

    /// Mutable request data.
    pub fn request_mut(&mut self) -> &mut RequestData {
        &mut self.request
    }

    /// Response data.
    pub fn response(&self) -> &ResponseData {
        &self.response
    }

    /// Get the TX collection.
    pub fn tx(&self) -> &TxCollection {
        &self.tx
    }

    /// Get mutable TX collection.
    pub fn tx_mut(&mut self) -> &mut TxCollection {
        &mut self.tx
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub(crate) fn enter_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    /// Engine mode captured at creation.
    pub fn mode(&self) -> RuleEngineMode {
        self.mode
    }

    /// Status used by `block` and bare `deny`.
    pub fn default_status(&self) -> u16 {
        self.default_status
    }

    /// Raise the abort flag.
    pub fn abort(&mut self) {
        self.aborted = true;
    }

    /// Whether the transaction has been aborted.
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Mark the transaction as allowed.
    pub fn allow(&mut self) {
        self.allowed = true;
    }

    /// Whether an `allow` action ran.
    pub fn is_allowed(&self) -> bool {
        self.allowed
    }

    /// Record an intervention and abort. Only the first intervention is kept.
    pub fn intervene(&mut self, intervention: Intervention) {
        if self.intervention.is_none() {
            self.intervention = Some(intervention);
        }
        self.abort();
    }

    /// Get current intervention (if any).
    pub fn intervention(&self) -> Option<&Intervention> {
        self.intervention.as_ref()
    }

    /// Check if there's an intervention.
    pub fn has_intervention(&self) -> bool {
        self.intervention.is_some()
    }

    /// Get matched rule IDs.
    pub fn matched_rules(&self) -> &[u64] {
        &self.matched_rules
    }

    /// Start running the actions of a matched rule.
    pub(crate) fn begin_rule(&mut self, id: u64) {
        self.matched_rules.push(id);
        self.rule_metadata = RuleMetadata::for_rule(id);
    }

    /// Metadata of the rule whose actions are running.
    pub fn rule_metadata(&self) -> &RuleMetadata {
        &self.rule_metadata
    }

    /// Mutable metadata of the running rule.
    pub fn rule_metadata_mut(&mut self) -> &mut RuleMetadata {
        &mut self.rule_metadata
    }

    /// Append a line to the audit log.
    pub fn push_audit_log(&mut self, line: String) {
        self.audit_log.push(line);
    }

    /// Lines written by `log` actions.
    pub fn audit_log(&self) -> &[String] {
        &self.audit_log
    }

    /// Leave a flow directive for the driving loop. A later directive replaces an earlier one.
    pub fn set_flow(&mut self, directive: FlowDirective) {
        self.flow = Some(directive);
    }

    /// Take the pending flow directive.
    pub fn take_flow(&mut self) -> Option<FlowDirective> {
        self.flow.take()
    }
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("phase", &self.phase)
            .field("aborted", &self.aborted)
            .field("allowed", &self.allowed)
            .field("has_intervention", &self.intervention.is_some())
            .field("matched_rules", &self.matched_rules)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_transaction() {
        let tx = Transaction::new();
        assert_eq!(tx.phase(), Phase::Begin);
        assert_eq!(tx.mode(), RuleEngineMode::On);
        assert_eq!(tx.default_status(), 403);
        assert!(!tx.is_aborted());
        assert!(!tx.has_intervention());
    }

    #[test]
    fn test_first_intervention_wins() {
        let mut tx = Transaction::new();
        tx.intervene(Intervention::new(403, Phase::RequestHeaders));
        tx.intervene(Intervention::new(500, Phase::RequestHeaders));
        assert!(tx.is_aborted());
        assert_eq!(tx.intervention().unwrap().status, 403);
    }

    #[test]
    fn test_begin_rule_resets_metadata() {
        let mut tx = Transaction::new();
        tx.begin_rule(1);
        tx.rule_metadata_mut().tags.push("x".to_string());
        tx.begin_rule(2);
        assert_eq!(tx.rule_metadata(), &RuleMetadata::for_rule(2));
        assert_eq!(tx.matched_rules(), &[1, 2]);
    }

    #[test]
    fn test_request_accessors() {
        let mut tx = Transaction::new();
        tx.process_uri("/x?a=1", "GET", "HTTP/1.1");
        tx.process_connection("10.0.0.1", 5555);
        tx.add_request_header("Host", "h");
        tx.append_request_body(b"body");
        assert_eq!(tx.request().path, "/x");
        assert_eq!(tx.request().client_ip, "10.0.0.1");
        assert_eq!(tx.request().body_str(), "body");
    }
}
