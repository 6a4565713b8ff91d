//! Format-specific generators. Each one renders the shared IR back to source
//! text, reporting lossy decisions through the caller's warning sink.

use crate::errors::ConvertError;
use crate::ir::Node;

pub mod erb;
pub mod haml;
pub mod phlex;
pub mod slim;

pub(crate) const INDENT: &str = "  ";

/// Unwraps the template root every generator requires.
pub(crate) fn template_children(root: &Node) -> Result<&[Node], ConvertError> {
    match root {
        Node::Template(template) => Ok(&template.children),
        other => Err(ConvertError::invalid_input(format!(
            "expected a template root, got {}",
            other.kind()
        ))),
    }
}

/// Escapes a literal attribute value for embedding in double quotes.
pub(crate) fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Escapes a string for embedding in a double-quoted Ruby literal.
pub(crate) fn escape_quotes(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
