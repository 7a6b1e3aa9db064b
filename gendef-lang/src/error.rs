use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Why a line of a language description was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("invalid type name {0:?} (expected letters, digits and underscores)")]
    InvalidName(String),
    #[error("missing friendly name for type '{0}'")]
    MissingFriendlyName(String),
    #[error("expected a quoted friendly name, found {0:?}")]
    ExpectedString(String),
    #[error("unterminated string")]
    UnterminatedString,
    #[error("invalid escape sequence '\\{0}'")]
    InvalidEscape(char),
    #[error("unexpected input after friendly name: {0:?}")]
    TrailingInput(String),
    #[error("invalid UTF-8")]
    InvalidUtf8,
    #[error("duplicate type name '{name}' (first declared on line {first_line})")]
    DuplicateName { name: String, first_line: usize },
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not open language file {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },
    #[error("could not read language file {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("{}:{line}: {error}", path.display())]
    Syntax {
        path: PathBuf,
        line: usize,
        error: SyntaxError,
    },
}

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("could not create {}: {source}", path.display())]
    Create { path: PathBuf, source: io::Error },
    #[error("could not write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}
