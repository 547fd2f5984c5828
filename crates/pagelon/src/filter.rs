// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Sequential scans built on top of ranged reads.

use std::collections::VecDeque;
use std::sync::Arc;

use futures::channel::oneshot;
use futures::stream::{self, Stream, StreamExt};
use pagelon_tier::{PageSource, PageStore};
use parking_lot::Mutex;

use crate::engine::Shared;
use crate::range::snap_to_page_boundaries;
use crate::request::{CancelHandle, Request};
use crate::{Error, EstimateSize};

/// An item accepted by a filter, with its position in the collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterMatch<T> {
    /// Position of the item in the collection.
    pub index: u64,
    /// The matching item.
    pub item: T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Forward,
    Back,
}

/// Links a scan to the read it is currently waiting on.
#[derive(Debug, Default)]
struct FilterControl {
    canceled: bool,
    pending: Option<CancelHandle>,
}

impl FilterControl {
    fn cancel(control: &Mutex<Self>) {
        let pending = {
            let mut control = control.lock();
            control.canceled = true;
            control.pending.take()
        };

        if let Some(pending) = pending {
            pending.cancel();
        }
    }
}

/// Starts a scan from `index` in `direction`, collecting up to `limit` matches.
pub(crate) fn filter<T, Src, St, P>(
    shared: &Arc<Shared<T, Src, St>>,
    direction: Direction,
    index: u64,
    limit: Option<usize>,
    predicate: P,
) -> Result<Request<Vec<FilterMatch<T>>>, Error>
where
    T: EstimateSize + Clone + Send + Sync + 'static,
    Src: PageSource<T> + 'static,
    St: PageStore<T> + 'static,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    if let Some(error) = shared.failure() {
        return Err(error);
    }

    let control = Arc::new(Mutex::new(FilterControl::default()));
    let (sender, receiver) = oneshot::channel();

    let scanner = Scanner {
        shared: Arc::clone(shared),
        control: Arc::clone(&control),
        limit,
        predicate,
    };
    shared.spawner.spawn(async move {
        let result = match direction {
            Direction::Forward => scanner.forward(index).await,
            Direction::Back => scanner.back(index).await,
        };
        let _ = sender.send(result);
    });

    Ok(Request::new(receiver, Some(Arc::new(move || FilterControl::cancel(&control)))))
}

struct Scanner<T, Src, St, P> {
    shared: Arc<Shared<T, Src, St>>,
    control: Arc<Mutex<FilterControl>>,
    limit: Option<usize>,
    predicate: P,
}

impl<T, Src, St, P> Scanner<T, Src, St, P>
where
    T: EstimateSize + Clone + Send + Sync + 'static,
    Src: PageSource<T> + 'static,
    St: PageStore<T> + 'static,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    fn is_full(&self, found: usize) -> bool {
        self.limit.is_some_and(|limit| found >= limit)
    }

    async fn read(&self, index: u64, count: u64) -> Result<Vec<T>, Error> {
        if self.control.lock().canceled {
            return Err(Error::Canceled);
        }

        let request = self.shared.read_range(index, count)?;
        {
            let mut control = self.control.lock();
            control.pending = Some(request.cancel_handle());
            if control.canceled {
                request.cancel();
            }
        }

        let result = request.await;
        self.control.lock().pending = None;
        result
    }

    async fn forward(&self, index: u64) -> Result<Vec<FilterMatch<T>>, Error> {
        let page_size = self.shared.options.page_size;
        let mut found = Vec::new();
        if self.is_full(0) {
            return Ok(found);
        }

        let mut read_index = index;
        let mut read_count = snap_to_page_boundaries(index, index, page_size).end() - index;

        loop {
            let data = self.read(read_index, read_count).await?;
            let short = (data.len() as u64) < read_count;

            for (position, item) in (read_index..).zip(data) {
                if (self.predicate)(&item) {
                    found.push(FilterMatch { index: position, item });
                    if self.is_full(found.len()) {
                        return Ok(found);
                    }
                }
            }

            if short {
                return Ok(found);
            }

            read_index += read_count;
            read_count = page_size;
        }
    }

    async fn back(&self, index: u64) -> Result<Vec<FilterMatch<T>>, Error> {
        let page_size = self.shared.options.page_size;
        let mut found = VecDeque::new();
        if self.is_full(0) {
            return Ok(Vec::new());
        }

        let mut read_index = snap_to_page_boundaries(index, index, page_size).index;
        let mut read_count = index - read_index + 1;

        loop {
            let data = self.read(read_index, read_count).await?;

            for (offset, item) in data.into_iter().enumerate().rev() {
                if (self.predicate)(&item) {
                    found.push_front(FilterMatch {
                        index: read_index + offset as u64,
                        item,
                    });
                    if self.is_full(found.len()) {
                        return Ok(found.into());
                    }
                }
            }

            if read_index == 0 {
                return Ok(found.into());
            }

            read_index = read_index.saturating_sub(page_size);
            read_count = page_size;
        }
    }
}

/// Every item of the collection in order, read one page at a time.
pub(crate) fn stream<T, Src, St>(shared: Arc<Shared<T, Src, St>>) -> impl Stream<Item = Result<T, Error>> + Send + 'static
where
    T: EstimateSize + Clone + Send + Sync + 'static,
    Src: PageSource<T> + 'static,
    St: PageStore<T> + 'static,
{
    let page_size = shared.options.page_size;

    stream::unfold(Some(0_u64), move |next| {
        let shared = Arc::clone(&shared);
        async move {
            let index = next?;
            let chunk = match shared.read_range(index, page_size) {
                Ok(request) => request.await,
                Err(error) => Err(error),
            };

            Some(match chunk {
                Ok(items) => {
                    let more = items.len() as u64 == page_size;
                    (Ok(items), more.then_some(index + page_size))
                }
                Err(error) => (Err(error), None),
            })
        }
    })
    .flat_map(|chunk| {
        let items: Vec<Result<T, Error>> = match chunk {
            Ok(items) => items.into_iter().map(Ok).collect(),
            Err(error) => vec![Err(error)],
        };
        stream::iter(items)
    })
}
