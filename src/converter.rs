//! The conversion pipeline: parse into the shared IR, run the optional
//! transform passes, then generate the target dialect. This module is the
//! only public entry point for whole conversions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::diagnostics::{Warning, WarningCollector};
use crate::errors::ConvertError;
use crate::generators;
use crate::ir::Node;
use crate::parsers;
use crate::transform::{normalize, optimize, validate};

// ============================================================================
// FORMATS
// ============================================================================

/// The four template dialects the pipeline understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Erb,
    Haml,
    Slim,
    Phlex,
}

impl Format {
    pub const ALL: [Format; 4] = [Format::Erb, Format::Haml, Format::Slim, Format::Phlex];

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Erb => "erb",
            Format::Haml => "haml",
            Format::Slim => "slim",
            Format::Phlex => "phlex",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Format {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "erb" => Ok(Format::Erb),
            "haml" => Ok(Format::Haml),
            "slim" => Ok(Format::Slim),
            "phlex" => Ok(Format::Phlex),
            other => Err(ConvertError::UnsupportedFormat {
                format: other.to_string(),
            }),
        }
    }
}

// ============================================================================
// OPTIONS AND RESULT
// ============================================================================

/// Pipeline switches. Both passes are off by default; parsing and generation
/// always run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertOptions {
    /// Run normalize and optimize between parse and generate.
    pub optimize: bool,
    /// Fail with [`ConvertError::Validation`] on a malformed tree.
    pub validate: bool,
}

/// A finished conversion: the output text plus everything the parser and
/// generator wanted the caller to know.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    pub output: String,
    pub parser_warnings: Vec<Warning>,
    pub generator_warnings: Vec<Warning>,
}

// ============================================================================
// PIPELINE
// ============================================================================

/// Converts a template between two dialects.
pub fn convert(
    source: &str,
    from: Format,
    to: Format,
    options: &ConvertOptions,
) -> Result<Conversion, ConvertError> {
    let mut parser_warnings = WarningCollector::new();
    let mut root = parse(source, from, &mut parser_warnings)?;

    if options.optimize {
        root = optimize(normalize(root));
    }
    if options.validate {
        validate(&root)?;
    }

    let mut generator_warnings = WarningCollector::new();
    let output = generate(&root, to, &mut generator_warnings)?;

    Ok(Conversion {
        output,
        parser_warnings: parser_warnings.into_vec(),
        generator_warnings: generator_warnings.into_vec(),
    })
}

/// Converts with format names. Both names resolve before any parsing, so an
/// unknown target fails fast even when the source is unparsable.
pub fn convert_str(
    source: &str,
    from: &str,
    to: &str,
    options: &ConvertOptions,
) -> Result<Conversion, ConvertError> {
    let from = Format::from_str(from)?;
    let to = Format::from_str(to)?;
    convert(source, from, to, options)
}

fn parse(
    source: &str,
    format: Format,
    warnings: &mut WarningCollector,
) -> Result<Node, ConvertError> {
    let root = match format {
        Format::Erb => parsers::erb::parse(source, warnings)?,
        Format::Haml => parsers::haml::parse(source, warnings)?,
        Format::Slim => parsers::slim::parse(source, warnings)?,
        Format::Phlex => parsers::phlex::parse(source, warnings)?,
    };
    Ok(root)
}

fn generate(
    root: &Node,
    format: Format,
    warnings: &mut WarningCollector,
) -> Result<String, ConvertError> {
    match format {
        Format::Erb => generators::erb::generate(root, warnings),
        Format::Haml => generators::haml::generate(root, warnings),
        Format::Slim => generators::slim::generate(root, warnings),
        Format::Phlex => generators::phlex::generate(root, warnings),
    }
}
