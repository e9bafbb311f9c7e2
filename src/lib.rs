//! # zentinel-secrule
//!
//! Phase-indexed SecRule evaluation core in pure Rust.
//!
//! Rules combine pluggable [`Variable`]s, [`Transformation`]s, one
//! [`Operator`] and a list of [`Action`]s. A [`SecRuleSet`] groups rules by
//! [`Phase`] and runs them one offset at a time against a per-request
//! [`Transaction`]; the [`Engine`] drives the offsets so `skip`/`skipAfter`
//! can move the cursor.
//!
//! Parsing rule files is left to the host. Rules are built programmatically.
//!
//! ## Quick Start
//!
//! ```ignore
//! use zentinel_secrule::{Engine, Phase, SecRule, SecRuleSet};
//! use zentinel_secrule::{actions, operators, variables};
//!
//! let mut rules = SecRuleSet::new();
//! rules.add_rules(vec![SecRule::new(1001, Phase::RequestHeaders)
//!     .with_variable(variables::create_variable("REQUEST_URI")?)
//!     .with_operator(operators::create_operator("contains", "/admin")?)
//!     .with_action(actions::create_action("deny", "403")?)]);
//!
//! let engine = Engine::new(rules);
//! let mut tx = engine.new_transaction();
//! tx.process_uri("/admin/users", "GET", "HTTP/1.1");
//! engine.process_request_headers(&mut tx)?;
//!
//! if let Some(intervention) = tx.intervention() {
//!     println!("Blocked: status={}", intervention.status);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod actions;
pub mod engine;
pub mod error;
pub mod operators;
pub mod transformations;
pub mod variables;

// Re-export main types at crate root
pub use actions::Action;
pub use engine::{
    Engine, EngineConfig, Intervention, Phase, RuleEngineMode, SecRule, SecRuleSet, Transaction,
};
pub use error::{Error, Result};
pub use operators::Operator;
pub use transformations::Transformation;
pub use variables::Variable;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
