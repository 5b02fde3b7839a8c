//! Formatting of mathematical notation embedded in card text.
//!
//! Formatting is advisory: callers log a failure and fall back to the raw
//! text, so a broken formula never stops a card from being shown.

pub mod unicode;

pub use unicode::UnicodeMath;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MathError {
    #[error("unterminated math delimiter {delimiter:?} at byte {offset}")]
    UnterminatedDelimiter {
        delimiter: &'static str,
        offset: usize,
    },
    #[error("unbalanced braces in {0:?}")]
    UnbalancedBraces(String),
    #[error("missing argument for \\{0}")]
    MissingArgument(String),
    #[error("math nested deeper than {0} levels")]
    TooDeep(usize),
}

pub trait MathFormatter {
    fn format(&self, text: &str) -> Result<String, MathError>;
}

/// Leaves text untouched. Used when math rendering is disabled.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainText;

impl MathFormatter for PlainText {
    fn format(&self, text: &str) -> Result<String, MathError> {
        Ok(text.to_string())
    }
}

/// Picks the formatter for the `math` config switch.
pub fn formatter(enabled: bool) -> Box<dyn MathFormatter + Send> {
    if enabled {
        Box::new(UnicodeMath)
    } else {
        Box::new(PlainText)
    }
}
