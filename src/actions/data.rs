//! Data actions (setvar) and macro expansion.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::{Action, ActionGroup};
use crate::engine::Transaction;
use crate::error::{Error, Result};
use crate::variables::{Collection, MutableCollection};

static MACRO_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"%\{([A-Za-z_]+)\.([^}]+)\}").expect("macro pattern is valid")
});

/// Variable set operation.
#[derive(Debug, Clone, PartialEq)]
pub struct SetVarOp {
    /// Collection name (always "TX" for now).
    pub collection: String,
    /// Variable name.
    pub name: String,
    /// Operation to perform.
    pub operation: SetVarOperation,
}

/// Type of setvar operation.
#[derive(Debug, Clone, PartialEq)]
pub enum SetVarOperation {
    /// Set to value (macros expanded at execution).
    Set(String),
    /// Increment by value.
    Increment(i64),
    /// Decrement by value.
    Decrement(i64),
    /// Delete the variable.
    Delete,
}

impl SetVarOp {
    /// Parse `tx.k=v`, `tx.k=+n`, `tx.k=-n`, `!tx.k` or bare `tx.k` (sets "1").
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        if let Some(var) = input.strip_prefix('!') {
            let (collection, name) = parse_var_name(var)?;
            return Ok(Self {
                collection,
                name,
                operation: SetVarOperation::Delete,
            });
        }

        let (var, value) = match input.split_once('=') {
            Some((var, value)) => (var, Some(value)),
            None => (input, None),
        };
        let (collection, name) = parse_var_name(var)?;

        let operation = match value {
            None => SetVarOperation::Set("1".to_string()),
            Some(v) => {
                if let Some(n) = v.strip_prefix('+') {
                    SetVarOperation::Increment(parse_amount(n)?)
                } else if let Some(n) = v.strip_prefix('-') {
                    SetVarOperation::Decrement(parse_amount(n)?)
                } else {
                    SetVarOperation::Set(v.to_string())
                }
            }
        };

        Ok(Self {
            collection,
            name,
            operation,
        })
    }
}

fn parse_var_name(var: &str) -> Result<(String, String)> {
    let (collection, name) = var
        .trim()
        .split_once('.')
        .ok_or_else(|| Error::action_argument("setvar", format!("expected COLLECTION.name, got '{}'", var)))?;

    if !collection.eq_ignore_ascii_case("tx") {
        return Err(Error::action_argument(
            "setvar",
            format!("unsupported collection '{}'", collection),
        ));
    }
    if name.is_empty() {
        return Err(Error::action_argument("setvar", "empty variable name"));
    }

    Ok(("TX".to_string(), name.to_ascii_lowercase()))
}

fn parse_amount(s: &str) -> Result<i64> {
    s.trim()
        .parse()
        .map_err(|_| Error::action_argument("setvar", format!("invalid amount '{}'", s)))
}

/// Apply a setvar operation to a collection, expanding macros in set values.
pub fn apply_setvar<C: MutableCollection>(collection: &mut C, op: &SetVarOp, value: Option<String>) {
    match &op.operation {
        SetVarOperation::Set(raw) => {
            collection.set(op.name.clone(), value.unwrap_or_else(|| raw.clone()));
        }
        SetVarOperation::Increment(delta) => {
            collection.increment(&op.name, *delta);
        }
        SetVarOperation::Decrement(delta) => {
            collection.decrement(&op.name, *delta);
        }
        SetVarOperation::Delete => {
            collection.delete(&op.name);
        }
    }
}

/// Expand macro references in a value.
///
/// Supported macros:
/// - `%{TX.varname}` - first value of a transaction variable
/// - `%{RULE.id}`, `%{RULE.msg}` - metadata of the running rule
///
/// Unknown references expand to the empty string.
pub fn expand_macros(value: &str, tx: &Transaction) -> String {
    if !value.contains("%{") {
        return value.to_string();
    }

    MACRO_RE
        .replace_all(value, |caps: &Captures| {
            let collection = &caps[1];
            let key = &caps[2];
            if collection.eq_ignore_ascii_case("tx") {
                tx.tx()
                    .get(key)
                    .and_then(|v| v.first().map(|s| s.to_string()))
                    .unwrap_or_default()
            } else if collection.eq_ignore_ascii_case("rule") {
                let meta = tx.rule_metadata();
                match key.to_ascii_lowercase().as_str() {
                    "id" => meta.id.map(|id| id.to_string()).unwrap_or_default(),
                    "msg" => meta.msg.clone().unwrap_or_default(),
                    _ => String::new(),
                }
            } else {
                String::new()
            }
        })
        .into_owned()
}

/// `setvar` action.
#[derive(Debug, Clone)]
pub struct SetVarAction {
    raw: String,
    op: SetVarOp,
}

impl SetVarAction {
    /// Create a setvar action from its value.
    pub fn new(value: &str) -> Result<Self> {
        Ok(Self {
            raw: value.to_string(),
            op: SetVarOp::parse(value)?,
        })
    }

    /// The parsed operation.
    pub fn op(&self) -> &SetVarOp {
        &self.op
    }
}

impl Action for SetVarAction {
    fn name(&self) -> &'static str {
        "setvar"
    }

    fn value(&self) -> &str {
        &self.raw
    }

    fn group(&self) -> ActionGroup {
        ActionGroup::Data
    }

    fn execute(&self, tx: &mut Transaction) {
        let value = match &self.op.operation {
            SetVarOperation::Set(raw) => Some(expand_macros(raw, tx)),
            _ => None,
        };
        apply_setvar(tx.tx_mut(), &self.op, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variables::KeyValueCollection;

    #[test]
    fn test_parse_setvar() {
        let op = SetVarOp::parse("tx.score=+5").unwrap();
        assert_eq!(op.name, "score");
        assert_eq!(op.operation, SetVarOperation::Increment(5));

        let op = SetVarOp::parse("TX.Score=-2").unwrap();
        assert_eq!(op.name, "score");
        assert_eq!(op.operation, SetVarOperation::Decrement(2));

        let op = SetVarOp::parse("!tx.score").unwrap();
        assert_eq!(op.operation, SetVarOperation::Delete);

        let op = SetVarOp::parse("tx.flag").unwrap();
        assert_eq!(op.operation, SetVarOperation::Set("1".to_string()));

        let op = SetVarOp::parse("tx.msg=a=b").unwrap();
        assert_eq!(op.operation, SetVarOperation::Set("a=b".to_string()));
    }

    #[test]
    fn test_parse_setvar_errors() {
        assert!(SetVarOp::parse("score=1").is_err());
        assert!(SetVarOp::parse("ip.score=1").is_err());
        assert!(SetVarOp::parse("tx.=1").is_err());
        assert!(SetVarOp::parse("tx.score=+x").is_err());
    }

    #[test]
    fn test_setvar_increment() {
        let mut c = KeyValueCollection::new();
        c.set("score".to_string(), "10".to_string());
        let op = SetVarOp::parse("tx.score=+5").unwrap();
        apply_setvar(&mut c, &op, None);
        assert_eq!(c.get("score"), Some(vec!["15"]));
    }

    #[test]
    fn test_setvar_action_expands_macros() {
        let mut tx = Transaction::new();
        tx.tx_mut().set("anomaly_score".to_string(), "25".to_string());
        tx.begin_rule(100);

        SetVarAction::new("tx.note=score %{TX.anomaly_score} by %{RULE.id}")
            .unwrap()
            .execute(&mut tx);
        assert_eq!(tx.tx().get("note"), Some(vec!["score 25 by 100"]));
    }

    #[test]
    fn test_setvar_action_saturates() {
        let mut tx = Transaction::new();
        let action = SetVarAction::new("tx.n=+9223372036854775807").unwrap();
        action.execute(&mut tx);
        action.execute(&mut tx);
        assert_eq!(tx.tx().get("n"), Some(vec!["9223372036854775807"]));
    }

    #[test]
    fn test_macro_expansion_unknown() {
        let tx = Transaction::new();
        assert_eq!(expand_macros("[%{TX.missing}][%{ENV.x}]", &tx), "[][]");
        assert_eq!(expand_macros("plain", &tx), "plain");
    }
}
