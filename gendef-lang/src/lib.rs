//! Language description loading and `tree.def` generation.

pub mod error;
pub mod generator;
pub mod lang;
pub mod parser;

pub use error::{EmitError, LoadError, SyntaxError};
pub use lang::{Language, TreeType};
