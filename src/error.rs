use std::path::PathBuf;

use thiserror::Error;

use crate::store::ErrorCode;

/// Every failure a store operation can report.
///
/// `CommitFailed` and `CacheStale` are the two cases where the file on disk and
/// the in-memory account list may disagree; callers should warn the user about
/// them rather than treat them like ordinary errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Wrong store password, or the file is not a valid password store (code {0}).")]
    Primitive(ErrorCode),

    #[error(
        "The change was written to {} but could not replace the store file. \
         Move it over the store manually to apply it.",
        shadow.display()
    )]
    CommitFailed {
        shadow: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("The store was updated, but the account list could not be reloaded. Reload the store.")]
    CacheStale(#[source] Option<Box<StoreError>>),

    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// True when disk and memory may have diverged and the user must be told.
    pub fn is_divergent(&self) -> bool {
        matches!(
            self,
            StoreError::CommitFailed { .. } | StoreError::CacheStale(_)
        )
    }
}

impl From<ErrorCode> for StoreError {
    fn from(code: ErrorCode) -> Self {
        StoreError::Primitive(code)
    }
}
