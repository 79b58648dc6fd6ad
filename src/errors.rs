//! Error kinds surfaced by a dashboard run.

use std::path::PathBuf;
use thiserror::Error;

/// Errors with a defined recovery policy.
///
/// Only `CredentialMissing` is fatal. Remote failures fall back to the last
/// persisted snapshot; a corrupt snapshot is rebuilt from scratch.
#[derive(Debug, Clone, Error)]
pub enum DashError {
    /// No API key was configured.
    #[error("no API key configured (set {env_var} or pass --api-key)")]
    CredentialMissing { env_var: &'static str },
    /// Network or HTTP failure talking to the gateway.
    #[error("gateway unavailable: {message}")]
    RemoteUnavailable { message: String },
    /// The gateway answered with an unexpected payload.
    #[error("unexpected gateway response: {message}")]
    MalformedResponse { message: String },
    /// An existing snapshot file could not be read or parsed.
    #[error("snapshot {} is unreadable: {reason}", .path.display())]
    StoreCorrupt { path: PathBuf, reason: String },
}

impl DashError {
    pub fn remote(message: impl Into<String>) -> Self {
        Self::RemoteUnavailable {
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }
}
