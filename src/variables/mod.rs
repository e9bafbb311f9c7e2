//! Variable capability and the built-in variable sources.
//!
//! A [`Variable`] fetches zero or more string values from a transaction at call
//! time. Composite sources (headers, arguments, TX) can be narrowed with
//! `include`/`exclude` selectors while a rule is being configured.

mod collection;
mod request;
mod response;
mod scalar;
mod selection;

pub use collection::{Collection, KeyValueCollection, MutableCollection, TxCollection};
pub use request::RequestData;
pub use response::ResponseData;
pub use scalar::{ScalarSource, ScalarVariable};
pub use selection::{CollectionSource, CollectionVariable, Selector};

use crate::engine::Transaction;
use crate::error::{Error, Result};

/// Trait for all variable sources.
pub trait Variable: Send + Sync {
    /// Get the variable name.
    fn name(&self) -> &str;

    /// Restrict fetching to sub-values matching `selector`.
    fn include(&mut self, selector: &str) -> Result<()>;

    /// Never fetch sub-values matching `selector`.
    fn exclude(&mut self, selector: &str) -> Result<()>;

    /// Fetch the current values from the transaction. Nothing is cached between calls.
    fn fetch(&self, tx: &Transaction) -> Vec<String>;
}

/// Create a built-in variable from a name.
///
/// `NAME:selector` is accepted as a shorthand for creating `NAME` and calling
/// `include(selector)` on it.
pub fn create_variable(name: &str) -> Result<Box<dyn Variable>> {
    let (base, selector) = match name.split_once(':') {
        Some((base, selector)) => (base, Some(selector)),
        None => (name, None),
    };

    let mut variable: Box<dyn Variable> = match base.to_ascii_uppercase().as_str() {
        "REQUEST_URI" => Box::new(ScalarVariable::new(ScalarSource::RequestUri)),
        "REQUEST_METHOD" => Box::new(ScalarVariable::new(ScalarSource::RequestMethod)),
        "REQUEST_PROTOCOL" => Box::new(ScalarVariable::new(ScalarSource::RequestProtocol)),
        "QUERY_STRING" => Box::new(ScalarVariable::new(ScalarSource::QueryString)),
        "REQUEST_BODY" => Box::new(ScalarVariable::new(ScalarSource::RequestBody)),
        "REMOTE_ADDR" => Box::new(ScalarVariable::new(ScalarSource::RemoteAddr)),
        "RESPONSE_STATUS" => Box::new(ScalarVariable::new(ScalarSource::ResponseStatus)),
        "RESPONSE_BODY" => Box::new(ScalarVariable::new(ScalarSource::ResponseBody)),
        "REQUEST_HEADERS" => Box::new(CollectionVariable::new(CollectionSource::RequestHeaders)),
        "ARGS" => Box::new(CollectionVariable::new(CollectionSource::Args)),
        "ARGS_GET" => Box::new(CollectionVariable::new(CollectionSource::ArgsGet)),
        "ARGS_POST" => Box::new(CollectionVariable::new(CollectionSource::ArgsPost)),
        "RESPONSE_HEADERS" => Box::new(CollectionVariable::new(CollectionSource::ResponseHeaders)),
        "TX" => Box::new(CollectionVariable::new(CollectionSource::Tx)),
        _ => return Err(Error::UnknownVariable { name: name.to_string() }),
    };

    if let Some(selector) = selector {
        variable.include(selector)?;
    }
    Ok(variable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_variable() {
        let v = create_variable("request_uri").unwrap();
        assert_eq!(v.name(), "REQUEST_URI");

        let v = create_variable("REQUEST_HEADERS:User-Agent").unwrap();
        assert_eq!(v.name(), "REQUEST_HEADERS");

        assert!(matches!(
            create_variable("NOPE"),
            Err(Error::UnknownVariable { .. })
        ));
        assert!(matches!(
            create_variable("REQUEST_URI:foo"),
            Err(Error::InvalidSelector { .. })
        ));
    }

    #[test]
    fn test_fetch_from_transaction() {
        let mut tx = Transaction::new();
        tx.process_uri("/a?x=1&y=2", "GET", "HTTP/1.1");
        tx.add_request_header("Host", "example.com");

        let uri = create_variable("REQUEST_URI").unwrap();
        assert_eq!(uri.fetch(&tx), vec!["/a?x=1&y=2".to_string()]);

        let args = create_variable("ARGS:y").unwrap();
        assert_eq!(args.fetch(&tx), vec!["2".to_string()]);
    }
}
