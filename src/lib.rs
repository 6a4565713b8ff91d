//! any2any converts view templates between four dialects (ERB, Haml, Slim
//! and Phlex components) through one shared intermediate representation.
//!
//! Most callers only need [`convert`] or [`convert_str`]; the parser,
//! transform and generator modules are public for tools that want to work
//! with the IR directly.

pub use crate::converter::{convert, convert_str, Conversion, ConvertOptions, Format};
pub use crate::diagnostics::{Severity, Warning, WarningCollector};
pub use crate::errors::{ConvertError, ParseError};
pub use crate::ir::{AttrMap, Node, Pos, Visitor};

pub mod converter;
pub mod diagnostics;
pub mod errors;
pub mod generators;
pub mod ir;
pub mod parsers;
pub mod transform;
