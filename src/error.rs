use reqwest::StatusCode;
use thiserror::Error;

use crate::models::ApiResponse;

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of a failure, used by callers to pick an exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input detected locally. Nothing was sent.
    Validation,
    /// The request could not be sent or the response could not be read.
    Transport,
    /// The remote service answered with a status >= 400.
    Api,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("failed to encode json request")]
    Encode(#[source] serde_json::Error),

    #[error("{context}")]
    Transport {
        context: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("request failed with status {status}")]
    Api { status: StatusCode, body: ApiResponse },

    #[error("failed to create new release")]
    ReleaseCreation(#[source] Box<Error>),

    #[error("failed to create new deploy")]
    DeployCreation(#[source] Box<Error>),
}

impl Error {
    pub(crate) fn transport(
        context: &'static str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transport {
            context,
            source: Box::new(source),
        }
    }

    /// Classification of the root cause, looking through operation wrappers.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::Encode(_) | Error::Transport { .. } => ErrorKind::Transport,
            Error::Api { .. } => ErrorKind::Api,
            Error::ReleaseCreation(inner) | Error::DeployCreation(inner) => inner.kind(),
        }
    }

    /// The body the server sent back, if the failure came with one.
    pub fn response(&self) -> Option<&ApiResponse> {
        match self {
            Error::Api { body, .. } => Some(body),
            Error::ReleaseCreation(inner) | Error::DeployCreation(inner) => inner.response(),
            _ => None,
        }
    }

    /// HTTP status of an API failure.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::ReleaseCreation(inner) | Error::DeployCreation(inner) => inner.status(),
            _ => None,
        }
    }
}
