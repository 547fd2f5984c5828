// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// Counters describing how a cache served its callers.
///
/// All counters reset to zero when the cache is cleared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Item counts fetched from the source.
    pub counts: u64,
    /// Pages fetched from the source on behalf of a read.
    pub net_reads: u64,
    /// Pages fetched from the source by prefetching.
    pub prefetches: u64,
    /// Reads completed.
    pub cache_reads: u64,
}
