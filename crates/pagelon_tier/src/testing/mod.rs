// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! In-memory doubles for testing caches built on these contracts.
//!
//! [`MockStore`] and [`VecSource`] record every call they receive and support
//! failure injection through a predicate over the recorded operation.
//! [`VecSource`] can additionally park requests until released, which lets a test
//! observe a cache while a source request is outstanding.

mod source;
mod store;

pub use source::{SourceOp, VecSource};
pub use store::{MockStore, StoreOp};
