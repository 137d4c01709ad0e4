use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Reasons a raw query never reaches dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("Reo can't find any text there! You sure you typed something?")]
    Empty,
    #[error(
        "Invalid Characters! Reo thinks that your input was actually just a bunch of useless characters."
    )]
    InvalidCharacters,
}

/// Failure to obtain output from one of the external lookup programs.
///
/// A program that runs but prints nothing is not an error; the formatters
/// decide what blank output means for their section.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("could not run `{program}`: {source}")]
    Unavailable {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("`{program}` did not answer within {}ms", .after.as_millis())]
    TimedOut { program: String, after: Duration },
    #[error("`{program}` exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
}

#[derive(Debug, Error)]
pub enum ReoError {
    #[error("word list {path:?} could not be read: {source}")]
    WordList {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("word list {0:?} has no words")]
    EmptyWordList(PathBuf),
    #[error("background task failed: {0}")]
    Task(String),
    #[error(transparent)]
    Backend(#[from] BackendError),
}
