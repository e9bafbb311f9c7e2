//! Operator capability and the built-in operators.

mod comparison;
mod network;
mod pattern;

pub use comparison::{
    BeginsWithOperator, Comparison, ContainsOperator, EndsWithOperator, NumericOperator,
    StreqOperator, WithinOperator,
};
pub use network::IpMatchOperator;
pub use pattern::{PmOperator, RxOperator};

use crate::engine::Transaction;
use crate::error::{Error, Result};
use std::sync::Arc;

/// Trait for all operators.
///
/// An operator tests one already-transformed value and returns a plain verdict.
/// Negation is the rule's concern, not the operator's.
pub trait Operator: Send + Sync {
    /// Get the operator name.
    fn name(&self) -> &'static str;

    /// The configured argument, for introspection and logging.
    fn args(&self) -> &str;

    /// Test a value.
    fn matches(&self, tx: &Transaction, value: &str) -> bool;
}

/// Create an operator from a name and argument string.
pub fn create_operator(name: &str, argument: &str) -> Result<Arc<dyn Operator>> {
    let name = name.strip_prefix('@').unwrap_or(name);
    match name.to_ascii_lowercase().as_str() {
        "rx" => Ok(Arc::new(RxOperator::new(argument)?)),
        "pm" => Ok(Arc::new(PmOperator::new(argument)?)),
        "contains" => Ok(Arc::new(ContainsOperator::new(argument))),
        "beginswith" => Ok(Arc::new(BeginsWithOperator::new(argument))),
        "endswith" => Ok(Arc::new(EndsWithOperator::new(argument))),
        "streq" => Ok(Arc::new(StreqOperator::new(argument))),
        "within" => Ok(Arc::new(WithinOperator::new(argument))),
        "eq" => Ok(Arc::new(NumericOperator::new(Comparison::Eq, argument))),
        "gt" => Ok(Arc::new(NumericOperator::new(Comparison::Gt, argument))),
        "lt" => Ok(Arc::new(NumericOperator::new(Comparison::Lt, argument))),
        "ge" => Ok(Arc::new(NumericOperator::new(Comparison::Ge, argument))),
        "le" => Ok(Arc::new(NumericOperator::new(Comparison::Le, argument))),
        "ipmatch" => Ok(Arc::new(IpMatchOperator::new(argument)?)),
        "unconditionalmatch" => Ok(Arc::new(UnconditionalMatchOperator)),
        "nomatch" => Ok(Arc::new(NoMatchOperator)),
        _ => Err(Error::UnknownOperator { name: name.to_string() }),
    }
}

/// Operator that never matches.
pub struct NoMatchOperator;

impl Operator for NoMatchOperator {
    fn name(&self) -> &'static str {
        "noMatch"
    }

    fn args(&self) -> &str {
        ""
    }

    fn matches(&self, _tx: &Transaction, _value: &str) -> bool {
        false
    }
}

/// Operator that always matches.
pub struct UnconditionalMatchOperator;

impl Operator for UnconditionalMatchOperator {
    fn name(&self) -> &'static str {
        "unconditionalMatch"
    }

    fn args(&self) -> &str {
        ""
    }

    fn matches(&self, _tx: &Transaction, _value: &str) -> bool {
        true
    }
}
