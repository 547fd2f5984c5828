// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::borrow::Cow;

use thiserror::Error;

/// Any error reported by a [`Cache`](crate::Cache).
///
/// Errors are cheap to clone: a failure shared by several waiters, such as a failed
/// initialization or a deduplicated clear, is delivered to each of them.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum Error {
    /// The cache options were rejected when building the cache.
    #[error("invalid cache options: {0}")]
    InvalidOptions(Cow<'static, str>),

    /// The cache could not load or write its settings and is permanently unusable.
    ///
    /// Every later call on the cache reports this same error.
    #[error("cache initialization failed: {message}")]
    Initialization {
        /// What went wrong.
        message: Cow<'static, str>,
        /// The store failure behind it, if any.
        #[source]
        cause: Option<pagelon_tier::Error>,
    },

    /// The operation was canceled, either by its caller or by a concurrent clear.
    #[error("operation canceled")]
    Canceled,

    /// The remote source failed to serve a request.
    #[error("source request failed")]
    Source(#[source] pagelon_tier::Error),

    /// The local store failed a request that could not be degraded.
    #[error("store request failed")]
    Store(#[source] pagelon_tier::Error),
}

impl Error {
    /// Returns `true` if this error reports a cancellation.
    #[must_use]
    pub fn is_canceled(&self) -> bool {
        matches!(self, Self::Canceled)
    }

    pub(crate) fn initialization(message: impl Into<Cow<'static, str>>, cause: Option<pagelon_tier::Error>) -> Self {
        Self::Initialization {
            message: message.into(),
            cause,
        }
    }
}

/// Result type for cache operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
