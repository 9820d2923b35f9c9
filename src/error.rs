//! Error type shared by the parser, the quoting engine and the shell collaborator.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using vbuild's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Malformed token sequence, unterminated quote, unbalanced function body,
    /// unterminated `${...}`, or a parse failure reported by the shell.
    #[error("line {line}: {message} ({context})")]
    Syntax {
        message: String,
        /// The input line the error was found on.
        context: String,
        /// 1-based line number, 0 when unknown.
        line: usize,
    },

    /// The shell exited non-zero or wrote diagnostics to stderr.
    #[error("shell exited with status {exit_code}: {stderr}")]
    Evaluation { exit_code: i32, stderr: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{} not found", .0.display())]
    MissingRecipe(PathBuf),

    /// A recipe lacks a field generation cannot do without.
    #[error("{0} is missing")]
    MissingField(String),
}

impl Error {
    /// Create a syntax error.
    pub fn syntax(message: impl Into<String>, context: impl Into<String>, line: usize) -> Self {
        Self::Syntax {
            message: message.into(),
            context: context.into(),
            line,
        }
    }

    /// Captured shell diagnostics, if this error carries any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::Evaluation { stderr, .. } if !stderr.is_empty() => Some(stderr),
            _ => None,
        }
    }
}
