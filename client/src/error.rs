// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use thiserror::Error;

/// Failure of the client-local key-value persistence.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to access local state file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Local state file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Anything a client-side operation can fail with.
///
/// `Display` is the message meant for the user: the server's own message
/// for API errors, a generic sentence otherwise.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Rejected locally, no request was sent.
    #[error("{0}")]
    Validation(String),
    /// The server answered with an error status.
    #[error("{message}")]
    Api { status: u16, message: String },
    /// The request never got a usable answer.
    #[error("Could not reach the task board service")]
    Transport(#[from] reqwest::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        ClientError::Validation(message.into())
    }

    /// HTTP status reported by the server, if the failure came from one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}
