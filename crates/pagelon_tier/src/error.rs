// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error types for store and source operations.

use std::sync::Arc;

/// Boxed cause accepted by [`Error::from_message`] and [`Error::caused_by`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// An opaque failure reported by a [`PageStore`](crate::PageStore) or
/// [`PageSource`](crate::PageSource).
///
/// The cause is shared, so cloning an error is cheap and every clone reports the same
/// message.
///
/// # Examples
///
/// ```
/// use pagelon_tier::Error;
///
/// let error = Error::from_message("disk quota exceeded");
/// assert!(error.to_string().contains("disk quota exceeded"));
/// ```
#[derive(Debug, Clone, thiserror::Error)]
#[error("{cause}")]
pub struct Error {
    cause: Arc<dyn std::error::Error + Send + Sync>,
}

impl Error {
    /// Creates an error from a message or any boxable error.
    pub fn from_message(cause: impl Into<BoxError>) -> Self {
        Self {
            cause: Arc::from(cause.into()),
        }
    }

    /// Creates an error wrapping an underlying error.
    pub fn caused_by(cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self { cause: Arc::new(cause) }
    }

    /// Returns the underlying cause.
    #[must_use]
    pub fn cause(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        &*self.cause
    }
}

/// Result type for store and source operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
