use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("source file not found: {0}")]
    NotFound(PathBuf),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("data integrity violation: {0}")]
    DataIntegrity(String),
    #[error("linking failed: {0}")]
    Linking(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("graph build aborted in stage `{stage}`: {source}")]
    BuildAborted {
        stage: &'static str,
        source: Box<Error>,
    },
}

impl Error {
    /// Name of the pipeline stage a [`Error::BuildAborted`] originated in.
    pub fn stage(&self) -> Option<&'static str> {
        match self {
            Error::BuildAborted { stage, .. } => Some(stage),
            _ => None,
        }
    }

    /// The stage error wrapped by [`Error::BuildAborted`], or `self`.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::BuildAborted { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
