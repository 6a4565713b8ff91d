//! Tree passes that run between parsing and generation. The normalizer
//! rewrites the tree functionally; the optimizer and validator traverse it
//! read-only through the [`crate::ir::Visitor`] hooks.

mod normalizer;
mod optimizer;
mod validator;

pub use normalizer::normalize;
pub use optimizer::optimize;
pub use validator::validate;
