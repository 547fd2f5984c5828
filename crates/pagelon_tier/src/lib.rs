// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Store and source contracts for building paging cache backends.
//!
//! A paging cache sits between a caller and two collaborators:
//!
//! - a [`PageSource`], the remote ordered collection that serves fixed-size [`Page`]s
//!   and reports the total item count;
//! - a [`PageStore`], the local keyed store retaining fetched pages under
//!   [`StoreKey::Page`] plus one [`Settings`] record under [`StoreKey::Settings`].
//!
//! Both are asynchronous and report failures with the opaque [`Error`].
//!
//! # Implementing a Store
//!
//! ```
//! use std::collections::HashMap;
//! use std::sync::Mutex;
//!
//! use pagelon_tier::{Error, PageStore, StoreKey, StoreRecord};
//!
//! struct SimpleStore<T>(Mutex<HashMap<StoreKey, StoreRecord<T>>>);
//!
//! impl<T: Clone + Send + Sync> PageStore<T> for SimpleStore<T> {
//!     async fn contains(&self, key: StoreKey) -> Result<bool, Error> {
//!         Ok(self.0.lock().unwrap().contains_key(&key))
//!     }
//!
//!     async fn read(&self, key: StoreKey) -> Result<Option<StoreRecord<T>>, Error> {
//!         Ok(self.0.lock().unwrap().get(&key).cloned())
//!     }
//!
//!     async fn add_or_update(&self, key: StoreKey, record: StoreRecord<T>) -> Result<(), Error> {
//!         self.0.lock().unwrap().insert(key, record);
//!         Ok(())
//!     }
//!
//!     async fn remove(&self, key: StoreKey) -> Result<(), Error> {
//!         self.0.lock().unwrap().remove(&key);
//!         Ok(())
//!     }
//!
//!     async fn clear(&self) -> Result<(), Error> {
//!         self.0.lock().unwrap().clear();
//!         Ok(())
//!     }
//! }
//! ```

pub mod error;
mod page;
mod record;
mod source;
mod store;
#[cfg(any(feature = "test-util", test))]
pub mod testing;

#[doc(inline)]
pub use error::{Error, Result};
#[doc(inline)]
pub use page::Page;
#[doc(inline)]
pub use record::{SETTINGS_VERSION, Settings, StoreKey, StoreRecord};
#[doc(inline)]
pub use source::PageSource;
#[doc(inline)]
pub use store::PageStore;
