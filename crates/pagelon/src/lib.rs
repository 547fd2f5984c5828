// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! On-demand paging cache between a remote collection and a local store.
//!
//! A [`Cache`] serves ranged reads over a collection that a [`PageSource`] can only
//! hand out one fixed-size page at a time. Pages are kept in a [`PageStore`] so later
//! reads avoid the source, and the pages after each read are prefetched in the
//! background. A settings record persisted next to the pages lets a new cache over
//! the same store pick up where the previous one left off.
//!
//! This crate provides:
//! - A builder with page size, byte budget and prefetch configuration
//! - Cancelable [`Request`]s for reads, counts, filters and clears
//! - `tracing` events for every cache activity, plus OpenTelemetry metrics behind the
//!   `metrics` feature
//! - An in-memory store behind the `memory` feature
//!
//! # Examples
//!
//! ```
//! # #[cfg(feature = "test-util")]
//! # fn main() {
//! use pagelon::Cache;
//! use pagelon_tier::testing::VecSource;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let source = VecSource::new("letters", vec!['a', 'b', 'c', 'd', 'e']);
//! let cache = Cache::builder::<char, _>("letters", source)
//!     .page_size(2)
//!     .memory()
//!     .build()?;
//!
//! assert_eq!(cache.read_range(1, 3)?.await?, vec!['b', 'c', 'd']);
//!
//! let vowels = cache.filter_forward(0, None, |c| "aeiou".contains(*c))?.await?;
//! assert_eq!(vowels.len(), 2);
//! # Ok::<(), pagelon::Error>(())
//! # }).unwrap();
//! # }
//! # #[cfg(not(feature = "test-util"))]
//! # fn main() {}
//! ```
//!
//! # Sizing
//!
//! The byte budget is compared against [`EstimateSize`] estimates of the saved pages,
//! not actual memory or disk usage. Implement the trait for item types, typically by
//! summing [`field_size`] over the fields.

pub mod builder;
mod cache;
mod engine;
mod error;
mod filter;
mod operation;
mod range;
mod request;
mod runtime;
mod settings;
mod size;
mod state;
mod stats;
mod telemetry;

#[doc(inline)]
pub use builder::CacheBuilder;
#[doc(inline)]
pub use cache::Cache;
#[doc(inline)]
pub use error::{Error, Result};
#[doc(inline)]
pub use filter::FilterMatch;
#[cfg(feature = "memory")]
#[doc(inline)]
pub use pagelon_memory::MemoryStore;
#[doc(inline)]
pub use pagelon_tier::{Page, PageSource, PageStore, SETTINGS_VERSION, Settings, StoreKey, StoreRecord};
#[doc(inline)]
pub use request::{CancelHandle, Request};
#[doc(inline)]
pub use runtime::Spawner;
#[doc(inline)]
pub use size::{EstimateSize, SCALAR_SIZE, field_size};
#[doc(inline)]
pub use state::CacheState;
#[doc(inline)]
pub use stats::Stats;
