use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the client and the local configuration store.
///
/// The core never catches-and-logs: every failure either recovers internally
/// (429 retry, corrupt-file reset) or propagates as one of these variants.
/// The CLI boundary turns them into exit codes and user-facing text.
#[derive(Debug, Error)]
pub enum GhlError {
    /// Non-2xx API response other than a retried 429. Always fatal to the
    /// current call.
    #[error("HTTP {status}: {message}")]
    Api {
        status: u16,
        message: String,
        body: Option<Value>,
    },

    /// A 429 on the final allowed attempt.
    #[error("{message}")]
    RateLimited { attempts: usize, message: String },

    /// Network-level failure (timeout, connection reset). Never retried here.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("Profile '{0}' does not exist")]
    ProfileNotFound(String),

    /// No resolvable token or location. Raised by the command layer from the
    /// store's `None` returns, not by the store itself.
    #[error("{0}")]
    Auth(String),

    #[error("Cannot write {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GhlError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            GhlError::Api { status, .. } => Some(*status),
            GhlError::RateLimited { .. } => Some(429),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, GhlError>;
