// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::channel::oneshot;

use crate::Error;

pub(crate) type Canceler = Arc<dyn Fn() + Send + Sync>;

/// The pending outcome of a cache call.
///
/// Await the request for its result. Cancelling makes it resolve with
/// [`Error::Canceled`] unless it already settled.
///
/// Dropping a request does not cancel the work behind it.
#[must_use = "a request does nothing useful unless awaited or canceled"]
pub struct Request<T> {
    receiver: oneshot::Receiver<Result<T, Error>>,
    canceler: Option<Canceler>,
}

impl<T> Request<T> {
    pub(crate) fn new(receiver: oneshot::Receiver<Result<T, Error>>, canceler: Option<Canceler>) -> Self {
        Self { receiver, canceler }
    }

    pub(crate) fn ready(result: Result<T, Error>) -> Self {
        let (sender, receiver) = oneshot::channel();
        // The receiver is alive right here.
        let _ = sender.send(result);
        Self::new(receiver, None)
    }

    /// Cancels the request.
    ///
    /// The request rejects with [`Error::Canceled`] and writes nothing more to the
    /// store. A page write already under way still lands. Clears cannot be canceled;
    /// for them this does nothing.
    pub fn cancel(&self) {
        if let Some(cancel) = &self.canceler {
            cancel();
        }
    }

    /// Returns a handle that cancels this request from elsewhere.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle(self.canceler.clone())
    }
}

impl<T> Future for Request<T> {
    type Output = Result<T, Error>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(oneshot::Canceled)) => Poll::Ready(Err(Error::Canceled)),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T> fmt::Debug for Request<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("cancelable", &self.canceler.is_some())
            .finish_non_exhaustive()
    }
}

/// Cancels a [`Request`] without holding it.
#[derive(Clone)]
pub struct CancelHandle(Option<Canceler>);

impl CancelHandle {
    /// Cancels the request this handle was taken from.
    pub fn cancel(&self) {
        if let Some(cancel) = &self.0 {
            cancel();
        }
    }
}

impl fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CancelHandle").field(&self.0.is_some()).finish()
    }
}
