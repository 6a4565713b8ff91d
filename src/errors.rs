//! Fatal error taxonomy for the conversion pipeline.
//!
//! Everything here aborts the `convert` call and propagates to the caller.
//! Recoverable issues go through [`crate::diagnostics`] instead.

use std::fmt;

use miette::Diagnostic;
use thiserror::Error;

// ============================================================================
// PARSE ERRORS
// ============================================================================

/// An unrecoverable syntax problem in the source document.
///
/// Line and column are 1-based and advisory; a parser that cannot locate the
/// problem precisely leaves them unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
            column: None,
        }
    }

    pub fn at(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            line: Some(line),
            column: Some(column),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, self.column) {
            (Some(line), Some(column)) => {
                write!(f, "Line {line}, Col {column}: {}", self.message)
            }
            (Some(line), None) => write!(f, "Line {line}: {}", self.message),
            _ => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ParseError {}

// ============================================================================
// ERROR TAXONOMY
// ============================================================================

/// Unified fatal error type for every conversion failure mode.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// A requested source or target format is not one of the four dialects.
    #[error("unsupported format: {format}")]
    UnsupportedFormat { format: String },

    /// The source could not be turned into an IR tree.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The validator collected one or more violations.
    #[error("validation failed: {}", .violations.join(", "))]
    Validation { violations: Vec<String> },

    /// A generator was handed something other than a template root.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

impl ConvertError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Stable machine-readable code for this error.
    pub const fn code_str(&self) -> &'static str {
        match self {
            Self::UnsupportedFormat { .. } => "any2any::unsupported_format",
            Self::Parse(_) => "any2any::parse",
            Self::Validation { .. } => "any2any::validation",
            Self::InvalidInput { .. } => "any2any::invalid_input",
        }
    }
}

impl Diagnostic for ConvertError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.code_str()))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Self::UnsupportedFormat { .. } => Some(Box::new(
                "supported formats are erb, haml, slim and phlex",
            )),
            Self::Validation { .. } | Self::Parse(_) | Self::InvalidInput { .. } => None,
        }
    }
}
