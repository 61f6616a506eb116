//! Error type for the docreflow crate.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A comment block was handed to a pass with no lines in it.
    #[error("cannot convert an empty comment block")]
    EmptyBatch,

    /// No line of the block ends in a line terminator, so there is no
    /// newline convention to reuse for synthesized lines.
    #[error("comment block has no line terminator")]
    MissingNewline,

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("argument '{0}' is not a valid directory")]
    InvalidOutputDir(PathBuf),

    #[error("invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

pub type Result<T> = std::result::Result<T, Error>;
