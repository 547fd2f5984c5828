// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt;

/// The single cache-wide state.
///
/// Exactly one state holds at any time. Operations claim the state they need before
/// touching the store, and wait while a state they cannot preempt is held.
///
/// From highest to lowest priority: `Destroy`, `Read`, `Prefetch`, `Idle`. `Write` is
/// exclusive for the duration of one page save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheState {
    /// Settings are being loaded; every operation waits.
    Init,
    /// Nothing holds the cache.
    Idle,
    /// A read is being served.
    Read,
    /// Pages are being fetched ahead of reads.
    Prefetch,
    /// A page is being saved.
    Write,
    /// The store is being cleared.
    Destroy,
}

impl CacheState {
    /// Stable lowercase name, used in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Idle => "idle",
            Self::Read => "read",
            Self::Prefetch => "prefetch",
            Self::Write => "write",
            Self::Destroy => "destroy",
        }
    }
}

impl fmt::Display for CacheState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
