//! Error types for zentinel-secrule.
//!
//! Errors are raised while configuring rules (registry lookups, variable
//! selectors) and by the phase driver. Rule evaluation itself never fails.

use thiserror::Error;

use crate::engine::phase::Phase;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for zentinel-secrule operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A variable include/exclude selector could not be applied.
    #[error("invalid selector '{selector}' for variable {variable}: {message}")]
    InvalidSelector {
        /// Variable the selector was applied to.
        variable: String,
        /// The selector text.
        selector: String,
        /// Error message.
        message: String,
    },

    /// Error compiling a regex pattern.
    #[error("invalid regex pattern '{pattern}': {source}")]
    RegexCompile {
        /// The pattern that failed to compile.
        pattern: String,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },

    /// Error compiling an Aho-Corasick pattern set.
    #[error("invalid pattern set: {message}")]
    PatternSet {
        /// Error message.
        message: String,
    },

    /// Error parsing an IP address or network.
    #[error("invalid IP address or network '{value}': {message}")]
    InvalidIp {
        /// The value that failed to parse.
        value: String,
        /// Error message.
        message: String,
    },

    /// Unknown variable name.
    #[error("unknown variable: {name}")]
    UnknownVariable {
        /// The unknown variable name.
        name: String,
    },

    /// Unknown operator name.
    #[error("unknown operator: @{name}")]
    UnknownOperator {
        /// The unknown operator name.
        name: String,
    },

    /// Unknown transformation name.
    #[error("unknown transformation: t:{name}")]
    UnknownTransformation {
        /// The unknown transformation name.
        name: String,
    },

    /// Unknown action name.
    #[error("unknown action: {name}")]
    UnknownAction {
        /// The unknown action name.
        name: String,
    },

    /// Invalid action argument.
    #[error("invalid argument for action '{action}': {message}")]
    InvalidActionArgument {
        /// The action name.
        action: String,
        /// Error message.
        message: String,
    },

    /// The driver was asked to run a phase out of order.
    #[error("cannot process phase {requested:?} after {current:?}")]
    PhaseOrder {
        /// Phase the transaction is currently in.
        current: Phase,
        /// Phase that was requested.
        requested: Phase,
    },

    /// A phase number outside 0..=7.
    #[error("invalid phase number: {value}")]
    InvalidPhase {
        /// The rejected number.
        value: u8,
    },
}

impl Error {
    /// Create an invalid selector error.
    pub fn selector(
        variable: impl Into<String>,
        selector: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidSelector {
            variable: variable.into(),
            selector: selector.into(),
            message: message.into(),
        }
    }

    /// Create an invalid action argument error.
    pub fn action_argument(action: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidActionArgument {
            action: action.into(),
            message: message.into(),
        }
    }
}
