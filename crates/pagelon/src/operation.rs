// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Per-request state machines.
//!
//! An operation starts in [`Phase::Start`], runs kind-specific [`Step`]s, parks in
//! [`Phase::Wait`] while a store or source request is outstanding, and ends in
//! [`Phase::End`]. Cancellation and failure are transitions into `End` that settle the
//! caller's request first.

use futures::channel::oneshot;
use futures::future::AbortHandle;
use pagelon_tier::Page;

use crate::Error;
use crate::range::{Range, append_page};
use crate::telemetry::CacheOperation;

pub(crate) type OperationId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OperationKind {
    Read,
    Prefetch,
    Clear,
}

impl OperationKind {
    pub fn telemetry(self) -> CacheOperation {
        match self {
            Self::Read => CacheOperation::Read,
            Self::Prefetch => CacheOperation::Prefetch,
            Self::Clear => CacheOperation::Clear,
        }
    }
}

#[derive(Debug)]
pub(crate) enum Phase<T> {
    Start,
    Step(Step<T>),
    Wait,
    End,
}

#[derive(Debug)]
pub(crate) enum Step<T> {
    /// Look the page starting at the index up in the store.
    Local(u64),
    /// Fetch the page starting at the index from the source.
    Source(u64),
    Save(Page<T>),
    Done(Page<T>),
    Clear,
}

type ReadSender<T> = oneshot::Sender<Result<Vec<T>, Error>>;
type ClearSender = oneshot::Sender<Result<(), Error>>;

enum Completion<T> {
    Read(Option<ReadSender<T>>),
    Prefetch,
    Clear(Vec<ClearSender>),
}

pub(crate) struct Operation<T> {
    id: OperationId,
    requested: Range,
    data: Vec<T>,
    phase: Phase<T>,
    canceled: bool,
    /// Items a prefetch still has to fetch; `None` is unbounded.
    pending: Option<u64>,
    request: Option<AbortHandle>,
    completion: Completion<T>,
}

impl<T> Operation<T> {
    pub fn read(id: OperationId, requested: Range, sender: ReadSender<T>) -> Self {
        Self::new(id, requested, None, Completion::Read(Some(sender)))
    }

    pub fn prefetch(id: OperationId, index: u64, pending: Option<u64>) -> Self {
        Self::new(id, Range::new(index, pending.unwrap_or(u64::MAX)), pending, Completion::Prefetch)
    }

    pub fn clear(id: OperationId, sender: ClearSender) -> Self {
        Self::new(id, Range::new(0, 0), None, Completion::Clear(vec![sender]))
    }

    fn new(id: OperationId, requested: Range, pending: Option<u64>, completion: Completion<T>) -> Self {
        Self {
            id,
            requested,
            data: Vec::new(),
            phase: Phase::Start,
            canceled: false,
            pending,
            request: None,
            completion,
        }
    }

    pub fn id(&self) -> OperationId {
        self.id
    }

    pub fn kind(&self) -> OperationKind {
        match self.completion {
            Completion::Read(_) => OperationKind::Read,
            Completion::Prefetch => OperationKind::Prefetch,
            Completion::Clear(_) => OperationKind::Clear,
        }
    }

    pub fn requested(&self) -> Range {
        self.requested
    }

    pub fn pending(&self) -> Option<u64> {
        self.pending
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::End)
    }

    pub fn is_starting(&self) -> bool {
        matches!(self.phase, Phase::Start)
    }

    /// Takes the phase out for matching by value; the caller must put one back.
    pub fn take_phase(&mut self) -> Phase<T> {
        std::mem::replace(&mut self.phase, Phase::Wait)
    }

    pub fn set_phase(&mut self, phase: Phase<T>) {
        self.phase = phase;
    }

    pub fn go(&mut self, step: Step<T>) {
        self.phase = Phase::Step(step);
    }

    /// Parks until an outstanding request completes.
    ///
    /// Without a handle the request runs to completion even if the operation is canceled.
    pub fn wait(&mut self, request: Option<AbortHandle>) {
        self.request = request;
        self.phase = Phase::Wait;
    }

    pub fn detach(&mut self) {
        self.request = None;
    }

    /// Merges another caller into this clear.
    pub fn join(&mut self, sender: ClearSender) -> Result<(), ClearSender> {
        match &mut self.completion {
            Completion::Clear(senders) if !self.canceled => {
                senders.push(sender);
                Ok(())
            }
            _ => Err(sender),
        }
    }

    pub fn append(&mut self, page: &Page<T>)
    where
        T: Clone,
    {
        append_page(self.requested, &mut self.data, page);
    }

    pub fn is_satisfied(&self) -> bool {
        self.data.len() as u64 == self.requested.count
    }

    /// Counts `count` fetched items against the prefetch budget.
    pub fn consume(&mut self, count: u64) {
        if let Some(pending) = &mut self.pending {
            *pending -= count.min(*pending);
        }
    }

    /// Stops a prefetch at its next page.
    pub fn exhaust(&mut self) {
        if matches!(self.completion, Completion::Prefetch) {
            self.pending = Some(0);
        }
    }

    pub fn complete(&mut self) {
        self.phase = Phase::End;
    }

    /// Cancels the outstanding request and rejects the caller with [`Error::Canceled`].
    ///
    /// Returns `false` if the operation had already ended.
    pub fn cancel(&mut self) -> bool {
        self.fail(Error::Canceled)
    }

    /// Cancels the outstanding request and rejects the caller with `error`.
    pub fn fail(&mut self, error: Error) -> bool {
        if self.is_finished() {
            return false;
        }

        self.canceled = true;
        if let Some(request) = self.request.take() {
            request.abort();
        }
        self.reject(error);
        self.phase = Phase::End;
        true
    }

    /// Delivers the accumulated result, unless the operation was canceled.
    pub fn resolve(&mut self) {
        if self.canceled {
            return;
        }

        match &mut self.completion {
            Completion::Read(sender) => {
                if let Some(sender) = sender.take() {
                    let _ = sender.send(Ok(std::mem::take(&mut self.data)));
                }
            }
            Completion::Prefetch => {}
            Completion::Clear(senders) => {
                for sender in senders.drain(..) {
                    let _ = sender.send(Ok(()));
                }
            }
        }
    }

    fn reject(&mut self, error: Error) {
        match &mut self.completion {
            Completion::Read(sender) => {
                if let Some(sender) = sender.take() {
                    let _ = sender.send(Err(error));
                }
            }
            Completion::Prefetch => {}
            Completion::Clear(senders) => {
                for sender in senders.drain(..) {
                    let _ = sender.send(Err(error.clone()));
                }
            }
        }
    }
}
