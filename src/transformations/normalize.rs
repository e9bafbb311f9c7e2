//! Normalization transformations.

use super::Transformation;
use crate::engine::Transaction;
use std::borrow::Cow;

/// Lowercase transformation.
pub struct Lowercase;

impl Transformation for Lowercase {
    fn transform<'a>(&self, _tx: &Transaction, input: &'a str) -> Cow<'a, str> {
        let lower = input.to_lowercase();
        if lower == input {
            Cow::Borrowed(input)
        } else {
            Cow::Owned(lower)
        }
    }

    fn name(&self) -> &'static str {
        "lowercase"
    }
}

/// Uppercase transformation.
pub struct Uppercase;

impl Transformation for Uppercase {
    fn transform<'a>(&self, _tx: &Transaction, input: &'a str) -> Cow<'a, str> {
        let upper = input.to_uppercase();
        if upper == input {
            Cow::Borrowed(input)
        } else {
            Cow::Owned(upper)
        }
    }

    fn name(&self) -> &'static str {
        "uppercase"
    }
}

/// Collapse runs of whitespace into a single space.
pub struct CompressWhitespace;

impl Transformation for CompressWhitespace {
    fn transform<'a>(&self, _tx: &Transaction, input: &'a str) -> Cow<'a, str> {
        let mut result = String::with_capacity(input.len());
        let mut last_was_space = false;

        for c in input.chars() {
            if c.is_whitespace() {
                if !last_was_space {
                    result.push(' ');
                }
                last_was_space = true;
            } else {
                result.push(c);
                last_was_space = false;
            }
        }

        if result == input {
            Cow::Borrowed(input)
        } else {
            Cow::Owned(result)
        }
    }

    fn name(&self) -> &'static str {
        "compressWhitespace"
    }
}

/// Remove NUL characters.
pub struct RemoveNulls;

impl Transformation for RemoveNulls {
    fn transform<'a>(&self, _tx: &Transaction, input: &'a str) -> Cow<'a, str> {
        if input.contains('\0') {
            Cow::Owned(input.replace('\0', ""))
        } else {
            Cow::Borrowed(input)
        }
    }

    fn name(&self) -> &'static str {
        "removeNulls"
    }
}

/// Trim leading and trailing whitespace.
pub struct Trim;

impl Transformation for Trim {
    fn transform<'a>(&self, _tx: &Transaction, input: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(input.trim())
    }

    fn name(&self) -> &'static str {
        "trim"
    }
}
