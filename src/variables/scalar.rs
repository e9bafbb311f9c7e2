//! Single-valued variables.

use super::Variable;
use crate::engine::Transaction;
use crate::error::{Error, Result};

/// Where a scalar variable reads its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarSource {
    /// REQUEST_URI
    RequestUri,
    /// REQUEST_METHOD
    RequestMethod,
    /// REQUEST_PROTOCOL
    RequestProtocol,
    /// QUERY_STRING
    QueryString,
    /// REQUEST_BODY
    RequestBody,
    /// REMOTE_ADDR
    RemoteAddr,
    /// RESPONSE_STATUS
    ResponseStatus,
    /// RESPONSE_BODY
    ResponseBody,
}

impl ScalarSource {
    /// Get the variable name.
    pub fn name(&self) -> &'static str {
        match self {
            ScalarSource::RequestUri => "REQUEST_URI",
            ScalarSource::RequestMethod => "REQUEST_METHOD",
            ScalarSource::RequestProtocol => "REQUEST_PROTOCOL",
            ScalarSource::QueryString => "QUERY_STRING",
            ScalarSource::RequestBody => "REQUEST_BODY",
            ScalarSource::RemoteAddr => "REMOTE_ADDR",
            ScalarSource::ResponseStatus => "RESPONSE_STATUS",
            ScalarSource::ResponseBody => "RESPONSE_BODY",
        }
    }
}

/// A variable that always yields exactly one value.
#[derive(Debug, Clone)]
pub struct ScalarVariable {
    source: ScalarSource,
}

impl ScalarVariable {
    /// Create a scalar variable.
    pub fn new(source: ScalarSource) -> Self {
        Self { source }
    }
}

impl Variable for ScalarVariable {
    fn name(&self) -> &str {
        self.source.name()
    }

    fn include(&mut self, selector: &str) -> Result<()> {
        Err(Error::selector(
            self.source.name(),
            selector,
            "scalar variables take no selector",
        ))
    }

    fn exclude(&mut self, selector: &str) -> Result<()> {
        Err(Error::selector(
            self.source.name(),
            selector,
            "scalar variables take no selector",
        ))
    }

    fn fetch(&self, tx: &Transaction) -> Vec<String> {
        let request = tx.request();
        let response = tx.response();
        let value = match self.source {
            ScalarSource::RequestUri => request.uri.clone(),
            ScalarSource::RequestMethod => request.method.clone(),
            ScalarSource::RequestProtocol => request.protocol.clone(),
            ScalarSource::QueryString => request.query_string.clone(),
            ScalarSource::RequestBody => request.body_str(),
            ScalarSource::RemoteAddr => request.client_ip.clone(),
            ScalarSource::ResponseStatus => response.status.to_string(),
            ScalarSource::ResponseBody => response.body_str(),
        };
        vec![value]
    }
}
