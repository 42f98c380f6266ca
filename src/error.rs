//! Error types shared by ports, adapters and services.

use std::path::PathBuf;
use thiserror::Error;

/// Credential acquisition failed. Fatal for a whole run.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("no API key configured (set API_KEY)")]
    MissingApiKey,
    #[error("authentication rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("authentication request failed: {0}")]
    Request(String),
    #[error("invalid authentication response: {0}")]
    InvalidResponse(String),
}

/// The request never produced an HTTP response.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Failure of a single remote or local step inside a reconciliation.
#[derive(Debug, Error)]
pub enum CaptionError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("caption file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CaptionError {
    /// Maps an io error on `path`, keeping "not found" distinct.
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            CaptionError::FileNotFound(path)
        } else {
            CaptionError::Io { path, source }
        }
    }
}

/// Aborts a run before any target is attempted.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("captions folder not found: {}", .0.display())]
    FolderNotFound(PathBuf),
    #[error("caption file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("invalid API base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error(transparent)]
    Remote(#[from] CaptionError),
    #[error("failed to list {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
