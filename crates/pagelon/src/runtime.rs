// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Spawning of store and source requests.

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;

type SpawnFn = Arc<dyn Fn(BoxFuture<'static, ()>) + Send + Sync>;

/// Runs the background work of a cache.
///
/// Every store and source request a cache issues runs as its own task on the spawner.
/// A spawner must never poll the task inline from within `spawn`.
///
/// # Examples
///
/// ```
/// use pagelon::Spawner;
///
/// let spawner = Spawner::new_custom(|work| {
///     std::thread::spawn(move || futures::executor::block_on(work));
/// });
/// ```
#[derive(Clone)]
pub struct Spawner(SpawnerKind);

#[derive(Clone)]
enum SpawnerKind {
    #[cfg(feature = "tokio")]
    Tokio,
    Custom(SpawnFn),
}

impl fmt::Debug for Spawner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.0 {
            #[cfg(feature = "tokio")]
            SpawnerKind::Tokio => "tokio",
            SpawnerKind::Custom(_) => "custom",
        };
        f.debug_tuple("Spawner").field(&kind).finish()
    }
}

impl Spawner {
    /// Spawns onto the ambient Tokio runtime.
    ///
    /// The cache must then be used from within a Tokio runtime.
    #[cfg(feature = "tokio")]
    #[cfg_attr(docsrs, doc(cfg(feature = "tokio")))]
    #[must_use]
    pub fn new_tokio() -> Self {
        Self(SpawnerKind::Tokio)
    }

    /// Spawns with a caller-supplied function.
    pub fn new_custom<F>(spawn: F) -> Self
    where
        F: Fn(BoxFuture<'static, ()>) + Send + Sync + 'static,
    {
        Self(SpawnerKind::Custom(Arc::new(spawn)))
    }

    pub(crate) fn spawn(&self, work: impl Future<Output = ()> + Send + 'static) {
        match &self.0 {
            #[cfg(feature = "tokio")]
            SpawnerKind::Tokio => {
                ::tokio::spawn(work);
            }
            SpawnerKind::Custom(spawn) => spawn(Box::pin(work)),
        }
    }
}
