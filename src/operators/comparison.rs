//! String and numeric comparison operators.

use super::Operator;
use crate::actions::expand_macros;
use crate::engine::Transaction;

/// Contains operator (@contains).
pub struct ContainsOperator {
    needle: String,
}

impl ContainsOperator {
    /// Create a new contains operator.
    pub fn new(needle: &str) -> Self {
        Self {
            needle: needle.to_string(),
        }
    }
}

impl Operator for ContainsOperator {
    fn name(&self) -> &'static str {
        "contains"
    }

    fn args(&self) -> &str {
        &self.needle
    }

    fn matches(&self, _tx: &Transaction, value: &str) -> bool {
        value.contains(&self.needle)
    }
}

/// BeginsWith operator (@beginsWith).
pub struct BeginsWithOperator {
    prefix: String,
}

impl BeginsWithOperator {
    /// Create a new prefix operator.
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
        }
    }
}

impl Operator for BeginsWithOperator {
    fn name(&self) -> &'static str {
        "beginsWith"
    }

    fn args(&self) -> &str {
        &self.prefix
    }

    fn matches(&self, _tx: &Transaction, value: &str) -> bool {
        value.starts_with(&self.prefix)
    }
}

/// EndsWith operator (@endsWith).
pub struct EndsWithOperator {
    suffix: String,
}

impl EndsWithOperator {
    /// Create a new suffix operator.
    pub fn new(suffix: &str) -> Self {
        Self {
            suffix: suffix.to_string(),
        }
    }
}

impl Operator for EndsWithOperator {
    fn name(&self) -> &'static str {
        "endsWith"
    }

    fn args(&self) -> &str {
        &self.suffix
    }

    fn matches(&self, _tx: &Transaction, value: &str) -> bool {
        value.ends_with(&self.suffix)
    }
}

/// String equals operator (@streq).
pub struct StreqOperator {
    expected: String,
}

impl StreqOperator {
    /// Create a new string equality operator.
    pub fn new(expected: &str) -> Self {
        Self {
            expected: expected.to_string(),
        }
    }
}

impl Operator for StreqOperator {
    fn name(&self) -> &'static str {
        "streq"
    }

    fn args(&self) -> &str {
        &self.expected
    }

    fn matches(&self, _tx: &Transaction, value: &str) -> bool {
        value == self.expected
    }
}

/// Within operator (@within): the value equals one of a space-separated list.
pub struct WithinOperator {
    argument: String,
    values: Vec<String>,
}

impl WithinOperator {
    /// Create a new within operator.
    pub fn new(values: &str) -> Self {
        Self {
            argument: values.to_string(),
            values: values.split_whitespace().map(|s| s.to_string()).collect(),
        }
    }
}

impl Operator for WithinOperator {
    fn name(&self) -> &'static str {
        "within"
    }

    fn args(&self) -> &str {
        &self.argument
    }

    fn matches(&self, _tx: &Transaction, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }
}

/// Numeric comparison kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// @eq
    Eq,
    /// @gt
    Gt,
    /// @lt
    Lt,
    /// @ge
    Ge,
    /// @le
    Le,
}

/// Numeric comparison operator (@eq, @gt, @lt, @ge, @le).
///
/// The argument may reference transaction variables (`%{TX.threshold}`); it is
/// resolved against the transaction each time a value is tested. Values or
/// arguments that do not parse as integers never match.
pub struct NumericOperator {
    comparison: Comparison,
    arg: String,
}

impl NumericOperator {
    /// Create a new numeric operator.
    pub fn new(comparison: Comparison, arg: &str) -> Self {
        Self {
            comparison,
            arg: arg.trim().to_string(),
        }
    }

    fn target_value(&self, tx: &Transaction) -> Option<i64> {
        if self.arg.contains("%{") {
            expand_macros(&self.arg, tx).trim().parse().ok()
        } else {
            self.arg.parse().ok()
        }
    }
}

impl Operator for NumericOperator {
    fn name(&self) -> &'static str {
        match self.comparison {
            Comparison::Eq => "eq",
            Comparison::Gt => "gt",
            Comparison::Lt => "lt",
            Comparison::Ge => "ge",
            Comparison::Le => "le",
        }
    }

    fn args(&self) -> &str {
        &self.arg
    }

    fn matches(&self, tx: &Transaction, value: &str) -> bool {
        let (Some(target), Ok(n)) = (self.target_value(tx), value.trim().parse::<i64>()) else {
            return false;
        };
        match self.comparison {
            Comparison::Eq => n == target,
            Comparison::Gt => n > target,
            Comparison::Lt => n < target,
            Comparison::Ge => n >= target,
            Comparison::Le => n <= target,
        }
    }
}
