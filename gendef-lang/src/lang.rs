use std::slice;

/// A single tree node kind, as declared in a language description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeType {
    name: String,
    friendly_name: String,
    line: usize,
}

impl TreeType {
    pub(crate) fn new(name: String, friendly_name: String, line: usize) -> Self {
        Self {
            name,
            friendly_name,
            line,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn friendly_name(&self) -> &str {
        &self.friendly_name
    }

    /// 1-based line of the declaration in its description file.
    pub fn line(&self) -> usize {
        self.line
    }
}

/// The node kinds of a language, in declaration order.
///
/// Only the parser builds a `Language`, so every value is already validated:
/// names are identifiers and no name appears twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Language {
    types: Vec<TreeType>,
}

impl Language {
    pub(crate) fn new(types: Vec<TreeType>) -> Self {
        Self { types }
    }

    pub fn types(&self) -> &[TreeType] {
        &self.types
    }

    pub fn iter(&self) -> slice::Iter<'_, TreeType> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl<'a> IntoIterator for &'a Language {
    type Item = &'a TreeType;
    type IntoIter = slice::Iter<'a, TreeType>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
