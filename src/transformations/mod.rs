//! Transformation capability and the built-in transformations.

mod decode;
mod normalize;
mod pipeline;

pub use decode::*;
pub use normalize::*;
pub use pipeline::TransformationPipeline;

use crate::engine::Transaction;
use crate::error::{Error, Result};
use std::borrow::Cow;
use std::sync::Arc;

/// Trait for transformations.
///
/// Implementations must be safe to apply repeatedly and may only read the
/// transaction; they never produce side effects.
pub trait Transformation: Send + Sync {
    /// Apply the transformation.
    fn transform<'a>(&self, tx: &Transaction, input: &'a str) -> Cow<'a, str>;

    /// Get the transformation name.
    fn name(&self) -> &'static str;
}

/// Create a transformation from a name.
pub fn create_transformation(name: &str) -> Result<Arc<dyn Transformation>> {
    match name.to_lowercase().as_str() {
        // Decoding
        "urldecode" => Ok(Arc::new(UrlDecode)),
        "urldecodeuni" => Ok(Arc::new(UrlDecodeUni)),
        "base64decode" => Ok(Arc::new(Base64Decode)),

        // Normalization
        "lowercase" => Ok(Arc::new(Lowercase)),
        "uppercase" => Ok(Arc::new(Uppercase)),
        "compresswhitespace" => Ok(Arc::new(CompressWhitespace)),
        "removenulls" => Ok(Arc::new(RemoveNulls)),
        "trim" => Ok(Arc::new(Trim)),

        // Special
        "length" => Ok(Arc::new(Length)),

        _ => Err(Error::UnknownTransformation { name: name.to_string() }),
    }
}

/// Length transformation (returns the byte length of the input).
pub struct Length;

impl Transformation for Length {
    fn transform<'a>(&self, _tx: &Transaction, input: &'a str) -> Cow<'a, str> {
        Cow::Owned(input.len().to_string())
    }

    fn name(&self) -> &'static str {
        "length"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_transformation() {
        let t = create_transformation("urlDecodeUni").unwrap();
        assert_eq!(t.name(), "urlDecodeUni");
        assert!(matches!(
            create_transformation("rot13"),
            Err(Error::UnknownTransformation { .. })
        ));
    }

    #[test]
    fn test_length() {
        let tx = Transaction::new();
        assert_eq!(Length.transform(&tx, "héllo"), "6");
    }
}
