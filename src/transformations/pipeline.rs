//! Transformation pipeline.

use super::{create_transformation, Transformation};
use crate::engine::Transaction;
use crate::error::Result;
use std::borrow::Cow;
use std::sync::Arc;

/// An ordered list of transformations applied left to right.
///
/// For transformations `[a, b]` the result is `b(a(value))`.
#[derive(Clone)]
pub struct TransformationPipeline {
    transformations: Vec<Arc<dyn Transformation>>,
}

impl TransformationPipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self {
            transformations: Vec::new(),
        }
    }

    /// Create a pipeline from transformation names.
    ///
    /// `none` clears everything listed before it.
    pub fn from_names(names: &[&str]) -> Result<Self> {
        let mut transformations = Vec::new();

        for name in names {
            if name.eq_ignore_ascii_case("none") {
                transformations.clear();
                continue;
            }
            transformations.push(create_transformation(name)?);
        }

        Ok(Self { transformations })
    }

    /// Add a transformation to the end of the pipeline.
    pub fn add(&mut self, transformation: Arc<dyn Transformation>) {
        self.transformations.push(transformation);
    }

    /// Apply all transformations in sequence.
    pub fn apply<'a>(&self, tx: &Transaction, input: &'a str) -> Cow<'a, str> {
        let mut current: Cow<str> = Cow::Borrowed(input);

        for t in &self.transformations {
            current = match current {
                Cow::Borrowed(s) => t.transform(tx, s),
                Cow::Owned(s) => Cow::Owned(t.transform(tx, &s).into_owned()),
            };
        }

        current
    }

    /// Names of the transformations, in application order.
    pub fn names(&self) -> Vec<&'static str> {
        self.transformations.iter().map(|t| t.name()).collect()
    }

    /// Check if the pipeline is empty.
    pub fn is_empty(&self) -> bool {
        self.transformations.is_empty()
    }

    /// Get the number of transformations.
    pub fn len(&self) -> usize {
        self.transformations.len()
    }
}

impl Default for TransformationPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TransformationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformationPipeline")
            .field("transformations", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pipeline() {
        let tx = Transaction::new();
        let pipeline = TransformationPipeline::new();
        assert!(matches!(pipeline.apply(&tx, "hello"), Cow::Borrowed("hello")));
    }

    #[test]
    fn test_multiple_transformations() {
        let tx = Transaction::new();
        let pipeline = TransformationPipeline::from_names(&["urlDecode", "lowercase"]).unwrap();
        assert_eq!(pipeline.apply(&tx, "HELLO%20WORLD"), "hello world");
    }

    #[test]
    fn test_order_is_left_to_right() {
        let tx = Transaction::new();
        // length then trim: "  ab " has length 5
        let a = TransformationPipeline::from_names(&["length", "trim"]).unwrap();
        assert_eq!(a.apply(&tx, "  ab "), "5");
        // trim then length: "ab" has length 2
        let b = TransformationPipeline::from_names(&["trim", "length"]).unwrap();
        assert_eq!(b.apply(&tx, "  ab "), "2");
    }

    #[test]
    fn test_borrowed_subslice_of_owned_is_kept() {
        let tx = Transaction::new();
        let pipeline = TransformationPipeline::from_names(&["lowercase", "trim"]).unwrap();
        assert_eq!(pipeline.apply(&tx, "  AB  "), "ab");
    }

    #[test]
    fn test_none_clears_pipeline() {
        let tx = Transaction::new();
        let pipeline =
            TransformationPipeline::from_names(&["lowercase", "none", "uppercase"]).unwrap();
        assert_eq!(pipeline.apply(&tx, "hello"), "HELLO");
        assert_eq!(pipeline.names(), vec!["uppercase"]);
    }
}
