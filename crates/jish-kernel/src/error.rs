//! Shell error types.

use thiserror::Error;

/// Result type for kernel operations.
pub type ShellResult<T> = Result<T, ShellError>;

/// Errors recovered at the read-eval loop boundary.
///
/// None of these are fatal to the shell itself: the loop prints the
/// diagnostic, drops the offending command, and keeps going. Only the
/// `exit` builtin leaves the process.
#[derive(Debug, Error)]
pub enum ShellError {
    /// No free slot in the job table.
    #[error("job buffer is full")]
    TableFull,

    /// A pipeline stage's executable could not be resolved. Raised before
    /// any process for the pipeline is created.
    #[error("command not found: {0}")]
    CommandNotFound(String),

    /// The command line did not parse.
    #[error("invalid syntax")]
    InvalidSyntax,

    /// A builtin argument did not name an occupied job slot.
    #[error("invalid job reference: {0}")]
    InvalidJobReference(String),

    /// `kill -s` was given something outside the accepted signal range.
    #[error("invalid signal number: {0}")]
    InvalidSignalNumber(String),

    /// The input redirection file is unreadable.
    #[error("no such file or directory: {0}")]
    InfileUnreadable(String),

    /// The output redirection file cannot be created.
    #[error("permission denied: {0}")]
    OutfileUncreatable(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("system error: {0}")]
    Sys(#[from] nix::Error),
}
