//! Pattern matching operators (@rx, @pm).

use super::Operator;
use crate::engine::Transaction;
use crate::error::{Error, Result};
use aho_corasick::AhoCorasick;
use regex::Regex;

/// Regex operator (@rx).
///
/// The pattern is compiled when the operator is built, so a bad pattern is a
/// configuration error rather than a silent non-match.
pub struct RxOperator {
    pattern: String,
    regex: Regex,
}

impl RxOperator {
    /// Create a new regex operator.
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| Error::RegexCompile {
            pattern: pattern.to_string(),
            source: e,
        })?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }
}

impl Operator for RxOperator {
    fn name(&self) -> &'static str {
        "rx"
    }

    fn args(&self) -> &str {
        &self.pattern
    }

    fn matches(&self, _tx: &Transaction, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

/// Phrase match operator (@pm), case-insensitive.
pub struct PmOperator {
    argument: String,
    automaton: AhoCorasick,
}

impl PmOperator {
    /// Create a new phrase match operator from space-separated patterns.
    pub fn new(patterns_str: &str) -> Result<Self> {
        let patterns: Vec<&str> = patterns_str.split_whitespace().collect();

        if patterns.is_empty() {
            return Err(Error::PatternSet {
                message: "empty pattern list".to_string(),
            });
        }

        let automaton = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(&patterns)
            .map_err(|e| Error::PatternSet {
                message: e.to_string(),
            })?;

        Ok(Self {
            argument: patterns_str.to_string(),
            automaton,
        })
    }
}

impl Operator for PmOperator {
    fn name(&self) -> &'static str {
        "pm"
    }

    fn args(&self) -> &str {
        &self.argument
    }

    fn matches(&self, _tx: &Transaction, value: &str) -> bool {
        self.automaton.is_match(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rx_simple() {
        let tx = Transaction::new();
        let op = RxOperator::new("^admin").unwrap();
        assert!(op.matches(&tx, "admin"));
        assert!(!op.matches(&tx, "user"));
    }

    #[test]
    fn test_rx_invalid() {
        assert!(matches!(
            RxOperator::new("(unclosed"),
            Err(Error::RegexCompile { .. })
        ));
    }

    #[test]
    fn test_pm_simple() {
        let tx = Transaction::new();
        let op = PmOperator::new("admin root user").unwrap();
        assert!(op.matches(&tx, "the admin user"));
        assert!(!op.matches(&tx, "guest"));
    }

    #[test]
    fn test_pm_case_insensitive() {
        let tx = Transaction::new();
        let op = PmOperator::new("ADMIN").unwrap();
        assert!(op.matches(&tx, "Admin"));
    }

    #[test]
    fn test_pm_empty() {
        assert!(matches!(PmOperator::new("  "), Err(Error::PatternSet { .. })));
    }
}
