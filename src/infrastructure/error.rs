//! Infrastructure-level errors (wraps application errors)

use std::io;

use thiserror::Error;

use crate::application::ApplicationError;

/// Application errors plus failures writing rendered headers to the terminal.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("cannot write {context}")]
    Output {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl InfraError {
    pub fn output(context: impl Into<String>, source: io::Error) -> Self {
        Self::Output {
            context: context.into(),
            source,
        }
    }

    /// Reader went away (e.g. output piped into `head`).
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, Self::Output { source, .. } if source.kind() == io::ErrorKind::BrokenPipe)
    }
}

/// Result type for infrastructure layer operations.
pub type InfraResult<T> = Result<T, InfraError>;
