//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that can occur while parsing template source
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("unclosed tag starting at line {line}, column {column}")]
    UnclosedTag { line: u32, column: u32 },

    #[error("unclosed variable starting at line {line}, column {column}")]
    UnclosedVariable { line: u32, column: u32 },

    #[error("unknown tag '{tag}' at line {line}")]
    UnknownTag { tag: String, line: u32 },

    #[error("unexpected '{tag}' at line {line}, no open block to close")]
    UnexpectedEndTag { tag: String, line: u32 },

    #[error("block '{tag}' opened at line {line} is never closed")]
    UnclosedBlock { tag: String, line: u32 },

    #[error("malformed '{tag}' arguments at line {line}: {detail}")]
    BadTagArguments {
        tag: String,
        line: u32,
        detail: String,
    },
}

/// Errors that can occur while rendering a template
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("value '{name}' is not iterable")]
    NotIterable { name: String },

    #[error("template '{name}' is not registered")]
    UnknownTemplate { name: String },

    #[error("include depth limit exceeded while rendering '{name}'")]
    IncludeDepthExceeded { name: String },

    #[cfg(feature = "minijinja")]
    #[error("jinja render failed: {0}")]
    Jinja(#[from] minijinja::Error),
}

/// Errors that can occur during stats file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
