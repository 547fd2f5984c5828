// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;

use futures::channel::oneshot;
use parking_lot::Mutex;

use crate::{Error, Page, PageSource};

/// Recorded source operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceOp {
    /// `read` was called.
    Read {
        /// First requested item.
        index: u64,
        /// Requested item count.
        count: u64,
    },
    /// `count` was called.
    Count,
}

type FailPredicate = Box<dyn Fn(&SourceOp) -> bool + Send + Sync>;

#[derive(Debug, Default)]
struct Gate {
    held: bool,
    parked: Vec<oneshot::Sender<()>>,
}

/// A source serving pages out of a vector.
///
/// Calls are recorded when they arrive, before any failure or hold applies.
///
/// While [held](Self::hold), requests park until [`release`](Self::release) is
/// called. Dropping a parked request cancels it.
///
/// # Examples
///
/// ```
/// use pagelon_tier::testing::{SourceOp, VecSource};
/// use pagelon_tier::PageSource;
/// # futures::executor::block_on(async {
///
/// let source = VecSource::new("letters", vec!['a', 'b', 'c']);
/// let page = source.read(2, 2).await.unwrap();
///
/// assert_eq!(page.data(), &['c']);
/// assert_eq!(source.operations(), vec![SourceOp::Read { index: 2, count: 2 }]);
/// # });
/// ```
pub struct VecSource<T> {
    identifier: String,
    items: Arc<Mutex<Vec<T>>>,
    operations: Arc<Mutex<Vec<SourceOp>>>,
    fail_when: Arc<Mutex<Option<FailPredicate>>>,
    gate: Arc<Mutex<Gate>>,
}

impl<T: std::fmt::Debug> std::fmt::Debug for VecSource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VecSource")
            .field("identifier", &self.identifier)
            .field("items", &self.items)
            .field("operations", &self.operations)
            .field("fail_when", &self.fail_when.lock().is_some())
            .field("held", &self.gate.lock().held)
            .finish()
    }
}

impl<T> Clone for VecSource<T> {
    fn clone(&self) -> Self {
        Self {
            identifier: self.identifier.clone(),
            items: Arc::clone(&self.items),
            operations: Arc::clone(&self.operations),
            fail_when: Arc::clone(&self.fail_when),
            gate: Arc::clone(&self.gate),
        }
    }
}

impl<T> VecSource<T> {
    /// Creates a source named `identifier` serving `items`.
    #[must_use]
    pub fn new(identifier: impl Into<String>, items: Vec<T>) -> Self {
        Self {
            identifier: identifier.into(),
            items: Arc::new(Mutex::new(items)),
            operations: Arc::new(Mutex::new(Vec::new())),
            fail_when: Arc::new(Mutex::new(None)),
            gate: Arc::new(Mutex::new(Gate::default())),
        }
    }

    /// Returns a source serving the same items under another identity.
    ///
    /// The returned source keeps its own operation log.
    #[must_use]
    pub fn renamed(&self, identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            items: Arc::clone(&self.items),
            operations: Arc::new(Mutex::new(Vec::new())),
            fail_when: Arc::new(Mutex::new(None)),
            gate: Arc::new(Mutex::new(Gate::default())),
        }
    }

    /// Replaces the served items.
    pub fn set_items(&self, items: Vec<T>) {
        *self.items.lock() = items;
    }

    /// Returns all recorded operations in call order.
    #[must_use]
    pub fn operations(&self) -> Vec<SourceOp> {
        self.operations.lock().clone()
    }

    /// Returns the recorded reads as `(index, count)` pairs.
    #[must_use]
    pub fn reads(&self) -> Vec<(u64, u64)> {
        self.operations
            .lock()
            .iter()
            .filter_map(|op| match op {
                SourceOp::Read { index, count } => Some((*index, *count)),
                SourceOp::Count => None,
            })
            .collect()
    }

    /// Forgets all recorded operations.
    pub fn clear_operations(&self) {
        self.operations.lock().clear();
    }

    /// Sets a predicate deciding which operations fail.
    pub fn fail_when<F>(&self, predicate: F)
    where
        F: Fn(&SourceOp) -> bool + Send + Sync + 'static,
    {
        *self.fail_when.lock() = Some(Box::new(predicate));
    }

    /// Removes the failure predicate.
    pub fn clear_failures(&self) {
        *self.fail_when.lock() = None;
    }

    /// Parks every subsequent request until [`release`](Self::release).
    pub fn hold(&self) {
        self.gate.lock().held = true;
    }

    /// Stops parking requests and resumes every parked one.
    pub fn release(&self) {
        let parked = {
            let mut gate = self.gate.lock();
            gate.held = false;
            std::mem::take(&mut gate.parked)
        };

        for waiter in parked {
            // The request may have been dropped while parked.
            let _ = waiter.send(());
        }
    }

    /// Returns the number of requests currently parked.
    #[must_use]
    pub fn parked(&self) -> usize {
        self.gate.lock().parked.iter().filter(|waiter| !waiter.is_canceled()).count()
    }

    async fn admit(&self, op: SourceOp) -> Result<(), Error> {
        self.operations.lock().push(op);

        let parked = {
            let mut gate = self.gate.lock();
            if gate.held {
                let (sender, receiver) = oneshot::channel();
                gate.parked.push(sender);
                Some(receiver)
            } else {
                None
            }
        };

        if let Some(receiver) = parked {
            let _ = receiver.await;
        }

        if self.fail_when.lock().as_ref().is_some_and(|predicate| predicate(&op)) {
            return Err(Error::from_message("vec source: injected failure"));
        }

        Ok(())
    }
}

impl<T> PageSource<T> for VecSource<T>
where
    T: Clone + Send + Sync,
{
    fn identifier(&self) -> &str {
        &self.identifier
    }

    async fn read(&self, index: u64, count: u64) -> Result<Page<T>, Error> {
        self.admit(SourceOp::Read { index, count }).await?;

        let items = self.items.lock();
        let start = usize::try_from(index).unwrap_or(usize::MAX).min(items.len());
        let end = usize::try_from(index.saturating_add(count))
            .unwrap_or(usize::MAX)
            .min(items.len());

        Ok(Page::new(index, items[start..end].to_vec()))
    }

    async fn count(&self) -> Result<u64, Error> {
        self.admit(SourceOp::Count).await?;
        Ok(self.items.lock().len() as u64)
    }
}
