// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! In-memory page store backed by moka.
//!
//! This crate provides [`MemoryStore`], a concurrent [`PageStore`](pagelon_tier::PageStore)
//! keeping pages and the settings record in memory. Clones share their records, so a
//! second cache built over a clone sees what the first one saved.
//!
//! # Quick Start
//!
//! ```
//! use pagelon_memory::MemoryStore;
//! use pagelon_tier::{Page, PageStore, StoreKey, StoreRecord};
//!
//! # futures::executor::block_on(async {
//! let store = MemoryStore::<String>::builder().name("people").build();
//!
//! let page = Page::new(0, vec!["ada".to_string(), "grace".to_string()]);
//! store.add_or_update(StoreKey::Page(0), StoreRecord::Page(page)).await.unwrap();
//!
//! assert!(store.contains(StoreKey::Page(0)).await.unwrap());
//! # });
//! ```

mod builder;
mod store;

#[doc(inline)]
pub use builder::MemoryStoreBuilder;
#[doc(inline)]
pub use store::MemoryStore;
