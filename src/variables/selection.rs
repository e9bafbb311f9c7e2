//! Multi-valued variables with include/exclude selectors.

use regex::{Regex, RegexBuilder};

use super::collection::Collection;
use super::Variable;
use crate::engine::Transaction;
use crate::error::{Error, Result};

/// A key selector: an exact (case-insensitive) key or a `/regex/`.
#[derive(Debug, Clone)]
pub enum Selector {
    /// Exact key, stored lowercased.
    Key(String),
    /// Case-insensitive regex applied to the key.
    Pattern(Regex),
}

impl Selector {
    /// Parse a selector for `variable`.
    pub fn parse(variable: &str, selector: &str) -> Result<Self> {
        let selector = selector.trim();
        if selector.is_empty() {
            return Err(Error::selector(variable, selector, "empty selector"));
        }

        if selector.len() >= 2 && selector.starts_with('/') && selector.ends_with('/') {
            let pattern = &selector[1..selector.len() - 1];
            let re = RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| Error::RegexCompile {
                    pattern: pattern.to_string(),
                    source: e,
                })?;
            return Ok(Selector::Pattern(re));
        }

        Ok(Selector::Key(selector.to_ascii_lowercase()))
    }

    /// Check whether a (lowercased) key is selected.
    pub fn matches(&self, key: &str) -> bool {
        match self {
            Selector::Key(k) => k == key,
            Selector::Pattern(re) => re.is_match(key),
        }
    }
}

/// Which collection a [`CollectionVariable`] reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionSource {
    /// REQUEST_HEADERS
    RequestHeaders,
    /// ARGS (GET then POST)
    Args,
    /// ARGS_GET
    ArgsGet,
    /// ARGS_POST
    ArgsPost,
    /// RESPONSE_HEADERS
    ResponseHeaders,
    /// TX
    Tx,
}

impl CollectionSource {
    /// Get the variable name.
    pub fn name(&self) -> &'static str {
        match self {
            CollectionSource::RequestHeaders => "REQUEST_HEADERS",
            CollectionSource::Args => "ARGS",
            CollectionSource::ArgsGet => "ARGS_GET",
            CollectionSource::ArgsPost => "ARGS_POST",
            CollectionSource::ResponseHeaders => "RESPONSE_HEADERS",
            CollectionSource::Tx => "TX",
        }
    }

    fn pairs<'a>(&self, tx: &'a Transaction) -> Vec<(&'a str, &'a str)> {
        match self {
            CollectionSource::RequestHeaders => tx.request().headers.all(),
            CollectionSource::Args => tx.request().all_args(),
            CollectionSource::ArgsGet => tx.request().args_get.all(),
            CollectionSource::ArgsPost => tx.request().args_post.all(),
            CollectionSource::ResponseHeaders => tx.response().headers.all(),
            CollectionSource::Tx => tx.tx().all(),
        }
    }
}

/// A variable over a key-value collection.
///
/// With no includes every entry is fetched; excludes always win.
#[derive(Debug, Clone)]
pub struct CollectionVariable {
    source: CollectionSource,
    includes: Vec<Selector>,
    excludes: Vec<Selector>,
}

impl CollectionVariable {
    /// Create a collection variable that fetches every entry.
    pub fn new(source: CollectionSource) -> Self {
        Self {
            source,
            includes: Vec::new(),
            excludes: Vec::new(),
        }
    }

    fn selected(&self, key: &str) -> bool {
        let included = self.includes.is_empty() || self.includes.iter().any(|s| s.matches(key));
        included && !self.excludes.iter().any(|s| s.matches(key))
    }
}

impl Variable for CollectionVariable {
    fn name(&self) -> &str {
        self.source.name()
    }

    fn include(&mut self, selector: &str) -> Result<()> {
        self.includes.push(Selector::parse(self.source.name(), selector)?);
        Ok(())
    }

    fn exclude(&mut self, selector: &str) -> Result<()> {
        self.excludes.push(Selector::parse(self.source.name(), selector)?);
        Ok(())
    }

    fn fetch(&self, tx: &Transaction) -> Vec<String> {
        self.source
            .pairs(tx)
            .into_iter()
            .filter(|(k, _)| self.selected(k))
            .map(|(_, v)| v.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx_with_headers() -> Transaction {
        let mut tx = Transaction::new();
        tx.add_request_header("Host", "example.com");
        tx.add_request_header("User-Agent", "curl/8.0");
        tx.add_request_header("X-Forwarded-For", "10.0.0.1");
        tx
    }

    #[test]
    fn test_fetch_all_in_order() {
        let tx = tx_with_headers();
        let v = CollectionVariable::new(CollectionSource::RequestHeaders);
        assert_eq!(v.fetch(&tx), vec!["example.com", "curl/8.0", "10.0.0.1"]);
    }

    #[test]
    fn test_include_key_case_insensitive() {
        let tx = tx_with_headers();
        let mut v = CollectionVariable::new(CollectionSource::RequestHeaders);
        v.include("user-AGENT").unwrap();
        assert_eq!(v.fetch(&tx), vec!["curl/8.0"]);
    }

    #[test]
    fn test_include_regex_and_exclude() {
        let tx = tx_with_headers();
        let mut v = CollectionVariable::new(CollectionSource::RequestHeaders);
        v.include("/^(host|x-)/").unwrap();
        v.exclude("host").unwrap();
        assert_eq!(v.fetch(&tx), vec!["10.0.0.1"]);
    }

    #[test]
    fn test_regex_selector_ignores_case() {
        let tx = tx_with_headers();
        let mut v = CollectionVariable::new(CollectionSource::RequestHeaders);
        v.include("/^X-Forwarded/").unwrap();
        assert_eq!(v.fetch(&tx), vec!["10.0.0.1"]);
    }

    #[test]
    fn test_bad_selectors() {
        let mut v = CollectionVariable::new(CollectionSource::Args);
        assert!(matches!(v.include(""), Err(Error::InvalidSelector { .. })));
        assert!(matches!(v.exclude("/(/"), Err(Error::RegexCompile { .. })));
    }
}
