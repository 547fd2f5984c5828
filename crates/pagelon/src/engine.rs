// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The paging engine shared by every handle of one cache.
//!
//! All bookkeeping lives in [`Core`] behind a single lock. A step of an operation
//! runs to completion while the lock is held; the only suspension points are the
//! store and source requests, which run as spawned tasks and resume their operation
//! by id when they complete.
//!
//! While an operation runs it is taken out of the operation table, so a nested
//! dispatch triggered by its own state change never re-enters it.

use std::collections::HashMap;
use std::sync::Arc;

use futures::channel::oneshot;
use futures::future::abortable;
use pagelon_tier::{Page, PageSource, PageStore, StoreKey, StoreRecord};
use parking_lot::Mutex;

use crate::operation::{Operation, OperationId, OperationKind, Phase, Step};
use crate::range::{Range, snap_to_page_boundaries};
use crate::request::Request;
use crate::runtime::Spawner;
use crate::settings::Bookkeeping;
use crate::telemetry::{CacheActivity, CacheOperation, CacheTelemetry};
use crate::{CacheState, Error, EstimateSize, Stats};

pub(crate) type IdleCallback = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Options {
    pub page_size: u64,
    pub cache_size: u64,
    /// Items fetched ahead of a read; `None` is unbounded.
    pub prefetch_size: Option<u64>,
}

pub(crate) struct Core<T> {
    state: CacheState,
    failure: Option<Error>,
    operations: HashMap<OperationId, Operation<T>>,
    clear_queue: Vec<OperationId>,
    read_queue: Vec<OperationId>,
    prefetch_queue: Vec<OperationId>,
    next_id: OperationId,
    pending_operations: usize,
    books: Bookkeeping,
    stats: Stats,
    /// A page save is in flight.
    saving: bool,
    /// Pending operations dropped to zero; the idle callback is due.
    idle_pending: bool,
}

impl<T> Core<T> {
    fn new(options: Options) -> Self {
        Self {
            state: CacheState::Init,
            failure: None,
            operations: HashMap::new(),
            clear_queue: Vec::new(),
            read_queue: Vec::new(),
            prefetch_queue: Vec::new(),
            next_id: 0,
            pending_operations: 0,
            books: Bookkeeping::new(options.page_size, options.cache_size),
            stats: Stats::default(),
            saving: false,
            idle_pending: false,
        }
    }

    fn next_id(&mut self) -> OperationId {
        self.next_id += 1;
        self.next_id
    }

    fn queue(&mut self, kind: OperationKind) -> &mut Vec<OperationId> {
        match kind {
            OperationKind::Read => &mut self.read_queue,
            OperationKind::Prefetch => &mut self.prefetch_queue,
            OperationKind::Clear => &mut self.clear_queue,
        }
    }

    /// Queued operations in dispatch order.
    fn queued(&self) -> Vec<OperationId> {
        self.clear_queue
            .iter()
            .chain(&self.read_queue)
            .chain(&self.prefetch_queue)
            .copied()
            .collect()
    }

    fn dequeue(&mut self, id: OperationId, kind: OperationKind) {
        self.queue(kind).retain(|queued| *queued != id);
    }

    fn check(&self) -> Result<(), Error> {
        self.failure.clone().map_or(Ok(()), Err)
    }
}

pub(crate) struct Shared<T, Src, St> {
    pub name: String,
    pub options: Options,
    pub source: Src,
    pub store: St,
    pub spawner: Spawner,
    pub telemetry: CacheTelemetry,
    on_idle: Option<IdleCallback>,
    core: Mutex<Core<T>>,
}

impl<T, Src, St> Shared<T, Src, St>
where
    T: EstimateSize + Clone + Send + Sync + 'static,
    Src: PageSource<T> + 'static,
    St: PageStore<T> + 'static,
{
    pub fn new(
        name: String,
        options: Options,
        source: Src,
        store: St,
        spawner: Spawner,
        telemetry: CacheTelemetry,
        on_idle: Option<IdleCallback>,
    ) -> Arc<Self> {
        Arc::new(Self {
            name,
            options,
            source,
            store,
            spawner,
            telemetry,
            on_idle,
            core: Mutex::new(Core::new(options)),
        })
    }

    /// Loads the settings in the background; operations queue until it finishes.
    pub fn start(self: &Arc<Self>) {
        let shared = Arc::clone(self);
        self.spawner.spawn(async move {
            let outcome = shared.load_settings().await;
            shared.with_core(|shared, core| shared.finish_init(core, outcome));
        });
    }

    pub fn state(&self) -> CacheState {
        self.core.lock().state
    }

    pub fn stats(&self) -> Stats {
        self.core.lock().stats
    }

    pub fn settings(&self) -> pagelon_tier::Settings {
        self.core.lock().books.to_settings(self.source.identifier())
    }

    pub fn is_overflowed(&self) -> bool {
        self.core.lock().books.overflowed()
    }

    pub fn pending_operations(&self) -> usize {
        self.core.lock().pending_operations
    }

    pub fn failure(&self) -> Option<Error> {
        self.core.lock().failure.clone()
    }

    pub fn read_range(self: &Arc<Self>, index: u64, count: u64) -> Result<Request<Vec<T>>, Error> {
        self.with_core(|shared, core| {
            core.check()?;

            let (sender, receiver) = oneshot::channel();
            let id = core.next_id();
            shared.enqueue(core, Operation::read(id, Range::new(index, count), sender));

            let canceler = Arc::clone(shared);
            Ok(Request::new(receiver, Some(Arc::new(move || canceler.cancel_operation(id)))))
        })
    }

    pub fn clear(self: &Arc<Self>) -> Result<Request<()>, Error> {
        self.with_core(|shared, core| {
            core.check()?;

            let (sender, receiver) = oneshot::channel();
            let joined = match core.clear_queue.first().and_then(|id| core.operations.get_mut(id)) {
                Some(op) => op.join(sender),
                None => Err(sender),
            };

            if let Err(sender) = joined {
                let id = core.next_id();
                shared.enqueue(core, Operation::clear(id, sender));
            }

            Ok(Request::new(receiver, None))
        })
    }

    pub fn count(self: &Arc<Self>) -> Result<Request<u64>, Error> {
        let local = self.with_core(|_, core| {
            core.check()?;
            Ok::<_, Error>(if core.books.all_data_local() {
                core.books.collection_count()
            } else {
                None
            })
        })?;

        if let Some(count) = local {
            return Ok(Request::ready(Ok(count)));
        }

        let (sender, receiver) = oneshot::channel();
        let fetcher = Arc::clone(self);
        let (request, handle) = abortable(async move { fetcher.source.count().await });

        let shared = Arc::clone(self);
        self.spawner.spawn(async move {
            let result = match request.await {
                Ok(Ok(count)) => {
                    shared.with_core(|_, core| core.stats.counts += 1);
                    shared.record(CacheOperation::Count, CacheActivity::Completed);
                    Ok(count)
                }
                Ok(Err(error)) => {
                    shared.record(CacheOperation::Count, CacheActivity::Error);
                    Err(Error::Source(error))
                }
                Err(_aborted) => {
                    shared.record(CacheOperation::Count, CacheActivity::Canceled);
                    Err(Error::Canceled)
                }
            };
            let _ = sender.send(result);
        });

        Ok(Request::new(receiver, Some(Arc::new(move || handle.abort()))))
    }

    fn cancel_operation(self: &Arc<Self>, id: OperationId) {
        self.with_core(|shared, core| {
            if let Some(mut op) = core.operations.remove(&id) {
                shared.cancel(&mut op);
                shared.settle(core, op);
            }
        });
    }

    /// Runs `f` under the lock, then fires the idle callback if it became due.
    fn with_core<R>(self: &Arc<Self>, f: impl FnOnce(&Arc<Self>, &mut Core<T>) -> R) -> R {
        let (result, idle) = {
            let mut core = self.core.lock();
            let result = f(self, &mut *core);
            (result, std::mem::take(&mut core.idle_pending))
        };

        if idle && let Some(on_idle) = &self.on_idle {
            on_idle();
        }

        result
    }

    fn record(&self, operation: CacheOperation, activity: CacheActivity) {
        self.telemetry.record(&self.name, operation, activity);
    }

    fn store_failed(&self, operation: CacheOperation, error: &pagelon_tier::Error) {
        tracing::warn!(cache.name = self.name.as_str(), error = %error, "pagelon.store_error");
        self.record(operation, CacheActivity::StoreFailed);
    }

    // Initialization

    async fn load_settings(&self) -> Result<Option<Bookkeeping>, Error> {
        let record = self
            .store
            .read(StoreKey::Settings)
            .await
            .map_err(|error| Error::initialization("unable to read settings from the store", Some(error)))?;

        match record {
            Some(StoreRecord::Settings(settings)) => {
                if !settings.is_supported_version() {
                    return Err(Error::initialization(
                        format!("unsupported settings version '{}'", settings.version),
                        None,
                    ));
                }

                if settings.page_size == self.options.page_size && settings.source_id == self.source.identifier() {
                    return Ok(Some(Bookkeeping::restore(&settings, self.options.cache_size)));
                }

                self.record(CacheOperation::Init, CacheActivity::Invalidated);
                self.store
                    .clear()
                    .await
                    .map_err(|error| Error::initialization("unable to clear the store", Some(error)))?;
            }
            Some(StoreRecord::Page(_)) => {
                return Err(Error::initialization("the settings key holds a page", None));
            }
            None => {}
        }

        let fresh = Bookkeeping::new(self.options.page_size, self.options.cache_size);
        self.store
            .add_or_update(StoreKey::Settings, StoreRecord::Settings(fresh.to_settings(self.source.identifier())))
            .await
            .map_err(|error| Error::initialization("unable to write settings to the store", Some(error)))?;

        Ok(None)
    }

    fn finish_init(self: &Arc<Self>, core: &mut Core<T>, outcome: Result<Option<Bookkeeping>, Error>) {
        match outcome {
            Ok(restored) => {
                if let Some(books) = restored {
                    core.books = books;
                }
                self.record(CacheOperation::Init, CacheActivity::Ready);
                self.telemetry.record_store_size(&self.name, core.books.actual_cache_size());
                self.change_state(core, CacheState::Idle);
            }
            Err(error) => self.fail_cache(core, error),
        }
    }

    /// Puts the cache in permanent failure and rejects everything queued.
    fn fail_cache(&self, core: &mut Core<T>, error: Error) {
        tracing::error!(cache.name = self.name.as_str(), error = %error, "pagelon.failed");
        self.record(CacheOperation::Init, CacheActivity::Error);

        core.failure = Some(error.clone());
        for (_, mut op) in core.operations.drain() {
            op.fail(error.clone());
        }
        core.clear_queue.clear();
        core.read_queue.clear();
        core.prefetch_queue.clear();
        core.pending_operations = 0;
    }

    // Dispatch

    /// Moves the cache to `state` and gives every queued operation a chance to run.
    fn change_state(self: &Arc<Self>, core: &mut Core<T>, state: CacheState) {
        if core.state == state || core.failure.is_some() {
            return;
        }

        tracing::trace!(cache.name = self.name.as_str(), from = %core.state, to = %state, "pagelon.state");
        core.state = state;

        for id in core.queued() {
            self.run(core, id);
        }
    }

    fn enqueue(self: &Arc<Self>, core: &mut Core<T>, mut op: Operation<T>) {
        core.queue(op.kind()).push(op.id());
        core.pending_operations += 1;
        self.advance(core, &mut op);
        self.settle(core, op);
    }

    fn run(self: &Arc<Self>, core: &mut Core<T>, id: OperationId) {
        if let Some(mut op) = core.operations.remove(&id) {
            self.advance(core, &mut op);
            self.settle(core, op);
        }
    }

    /// Resumes a parked operation with the outcome of its request.
    fn resume(
        self: &Arc<Self>,
        core: &mut Core<T>,
        id: OperationId,
        outcome: impl FnOnce(&Arc<Self>, &mut Core<T>, &mut Operation<T>),
    ) {
        let Some(mut op) = core.operations.remove(&id) else {
            return;
        };

        op.detach();
        outcome(self, core, &mut op);
        self.advance(core, &mut op);
        self.settle(core, op);
    }

    fn advance(self: &Arc<Self>, core: &mut Core<T>, op: &mut Operation<T>) {
        loop {
            if op.is_finished() || (op.is_starting() && core.state == CacheState::Init) {
                return;
            }

            let progressed = match op.kind() {
                OperationKind::Read => self.step_read(core, op),
                OperationKind::Prefetch => self.step_prefetch(core, op),
                OperationKind::Clear => self.step_clear(core, op),
            };

            if !progressed {
                return;
            }
        }
    }

    fn settle(self: &Arc<Self>, core: &mut Core<T>, op: Operation<T>) {
        if op.is_finished() {
            self.finish(core, op);
        } else {
            core.operations.insert(op.id(), op);
        }
    }

    fn finish(self: &Arc<Self>, core: &mut Core<T>, mut op: Operation<T>) {
        core.dequeue(op.id(), op.kind());
        core.pending_operations = core.pending_operations.saturating_sub(1);

        // A save in flight keeps Write and a queued clear keeps Destroy.
        if core.state != CacheState::Init && !core.saving && core.clear_queue.is_empty() {
            self.change_state(core, CacheState::Idle);
        }

        if !op.is_canceled() {
            self.record(op.kind().telemetry(), CacheActivity::Completed);
        }
        op.resolve();

        if core.pending_operations == 0 {
            core.idle_pending = true;
        }
    }

    fn cancel(&self, op: &mut Operation<T>) {
        if op.cancel() {
            self.record(op.kind().telemetry(), CacheActivity::Canceled);
        }
    }

    // Machines

    fn step_read(self: &Arc<Self>, core: &mut Core<T>, op: &mut Operation<T>) -> bool {
        if core.state == CacheState::Destroy {
            self.cancel(op);
            return false;
        }

        match op.take_phase() {
            Phase::Start => {
                if !matches!(core.state, CacheState::Idle | CacheState::Prefetch) {
                    op.set_phase(Phase::Start);
                    return false;
                }

                self.change_state(core, CacheState::Read);
                let requested = op.requested();
                if requested.count > 0 {
                    let last = requested.index.saturating_add(requested.count - 1);
                    let pages = snap_to_page_boundaries(requested.index, last, self.options.page_size);
                    op.go(Step::Local(pages.index));
                } else {
                    op.go(Step::Done(Page::empty(requested.index)));
                }
                true
            }
            Phase::Step(Step::Local(index)) => self.step_local(core, op, index),
            Phase::Step(Step::Source(index)) => self.step_source(op, index),
            Phase::Step(Step::Save(page)) => self.step_save(core, op, page),
            Phase::Step(Step::Done(page)) => {
                op.append(&page);
                if op.is_satisfied() || page.count() < self.options.page_size {
                    core.stats.cache_reads += 1;
                    self.prefetch(core, page.end());
                    op.complete();
                } else {
                    op.go(Step::Local(page.index() + self.options.page_size));
                }
                true
            }
            phase => {
                op.set_phase(phase);
                false
            }
        }
    }

    fn step_prefetch(self: &Arc<Self>, core: &mut Core<T>, op: &mut Operation<T>) -> bool {
        match core.state {
            CacheState::Destroy => {
                self.cancel(op);
                return false;
            }
            CacheState::Idle => {
                self.change_state(core, CacheState::Prefetch);
                return core.state == CacheState::Prefetch;
            }
            CacheState::Prefetch => {}
            CacheState::Init | CacheState::Read | CacheState::Write => return false,
        }

        match op.take_phase() {
            Phase::Start => {
                if core.prefetch_queue.first() != Some(&op.id()) {
                    op.set_phase(Phase::Start);
                    return false;
                }
                op.go(Step::Local(op.requested().index));
                true
            }
            Phase::Step(Step::Local(index)) => self.step_local(core, op, index),
            Phase::Step(Step::Source(index)) => self.step_source(op, index),
            Phase::Step(Step::Save(page)) => self.step_save(core, op, page),
            Phase::Step(Step::Done(page)) => {
                op.consume(page.count());
                if core.books.all_data_local()
                    || op.pending() == Some(0)
                    || page.count() < self.options.page_size
                    || core.books.overflowed()
                {
                    op.complete();
                } else {
                    op.go(Step::Local(page.index() + self.options.page_size));
                }
                true
            }
            phase => {
                op.set_phase(phase);
                false
            }
        }
    }

    fn step_clear(self: &Arc<Self>, core: &mut Core<T>, op: &mut Operation<T>) -> bool {
        if core.state != CacheState::Destroy {
            self.change_state(core, CacheState::Destroy);
            return core.state == CacheState::Destroy;
        }

        match op.take_phase() {
            Phase::Start => {
                op.go(Step::Clear);
                true
            }
            Phase::Step(Step::Clear) => {
                // The store is only emptied once the last save has landed.
                if core.saving {
                    op.go(Step::Clear);
                } else {
                    self.issue_clear(op);
                }
                false
            }
            phase => {
                op.set_phase(phase);
                false
            }
        }
    }

    /// Lets the queue move on once a save has landed.
    fn release_write(self: &Arc<Self>, core: &mut Core<T>) {
        if core.clear_queue.is_empty() {
            self.change_state(core, CacheState::Idle);
        } else {
            // The cache is already in Destroy; wake the clear waiting on the save.
            for id in core.queued() {
                self.run(core, id);
            }
        }
    }

    /// Queues a prefetch of the pages starting at `start`.
    fn prefetch(self: &Arc<Self>, core: &mut Core<T>, start: u64) {
        let prefetch_size = self.options.prefetch_size;
        if core.books.all_data_local() || prefetch_size == Some(0) || core.books.overflowed() {
            return;
        }

        // An unbounded prefetch already covers everything after it.
        if prefetch_size.is_none() && !core.prefetch_queue.is_empty() {
            return;
        }

        let id = core.next_id();
        self.enqueue(core, Operation::prefetch(id, start, prefetch_size));
    }

    // Steps shared by reads and prefetches

    fn step_local(self: &Arc<Self>, core: &mut Core<T>, op: &mut Operation<T>, index: u64) -> bool {
        if core.books.is_past_end(index) {
            op.go(Step::Done(Page::empty(index)));
            return true;
        }

        let operation = op.kind().telemetry();
        let shared = Arc::clone(self);
        self.issue(
            op,
            async move { shared.read_page(index, operation).await },
            move |shared, _core, op, found| match found {
                Some(page) => {
                    shared.record(operation, CacheActivity::LocalHit);
                    op.go(Step::Done(page));
                }
                None => {
                    shared.record(operation, CacheActivity::LocalMiss);
                    op.go(Step::Source(index));
                }
            },
        );
        false
    }

    fn step_source(self: &Arc<Self>, op: &mut Operation<T>, index: u64) -> bool {
        let kind = op.kind();
        let page_size = self.options.page_size;
        let shared = Arc::clone(self);
        self.issue(
            op,
            async move { shared.source.read(index, page_size).await },
            move |shared, core, op, fetched| match fetched {
                Ok(page) => {
                    if kind == OperationKind::Prefetch {
                        core.stats.prefetches += 1;
                    } else {
                        core.stats.net_reads += 1;
                    }
                    shared.record(kind.telemetry(), CacheActivity::SourceRead);
                    op.go(Step::Save(aligned(page, index, page_size)));
                }
                Err(error) => {
                    shared.record(kind.telemetry(), CacheActivity::Error);
                    op.fail(Error::Source(error));
                }
            },
        );
        false
    }

    fn step_save(self: &Arc<Self>, core: &mut Core<T>, op: &mut Operation<T>, page: Page<T>) -> bool {
        if core.saving || core.state == CacheState::Write {
            op.go(Step::Save(page));
            return false;
        }

        core.saving = true;
        self.change_state(core, CacheState::Write);

        // Saves are never aborted so that Write is always released.
        op.wait(None);
        let id = op.id();
        let operation = op.kind().telemetry();
        let shared = Arc::clone(self);
        self.spawner.spawn(async move {
            let saved = shared.save_page(id, &page, operation).await;
            shared.with_core(|shared, core| {
                core.saving = false;
                shared.resume(core, id, |_, _, op| {
                    if !saved {
                        op.exhaust();
                    }
                    op.go(Step::Done(page));
                });
                shared.release_write(core);
            });
        });
        false
    }

    fn issue_clear(self: &Arc<Self>, op: &mut Operation<T>) {
        let shared = Arc::clone(self);
        self.issue(
            op,
            async move { shared.store.clear().await },
            |shared, core, op, cleared| match cleared {
                Ok(()) => {
                    core.books.reset();
                    core.stats = Stats::default();
                    shared.store.close();
                    shared.telemetry.record_store_size(&shared.name, 0);
                    op.complete();
                }
                Err(error) => {
                    shared.record(CacheOperation::Clear, CacheActivity::Error);
                    op.fail(Error::Store(error));
                }
            },
        );
    }

    /// Spawns `request` and parks `op` until it completes.
    ///
    /// `on_complete` runs under the lock, only if the operation is still alive.
    fn issue<R, F, H>(self: &Arc<Self>, op: &mut Operation<T>, request: F, on_complete: H)
    where
        R: Send + 'static,
        F: Future<Output = R> + Send + 'static,
        H: FnOnce(&Arc<Self>, &mut Core<T>, &mut Operation<T>, R) + Send + 'static,
    {
        let (request, handle) = abortable(request);
        op.wait(Some(handle));

        let id = op.id();
        let shared = Arc::clone(self);
        self.spawner.spawn(async move {
            if let Ok(result) = request.await {
                shared.with_core(|shared, core| {
                    shared.resume(core, id, |shared, core, op| on_complete(shared, core, op, result));
                });
            }
        });
    }

    // Store access

    /// Looks a page up; store failures read as a miss.
    async fn read_page(&self, index: u64, operation: CacheOperation) -> Option<Page<T>> {
        let key = StoreKey::Page(index);

        match self.store.contains(key).await {
            Ok(true) => {}
            Ok(false) => return None,
            Err(error) => {
                self.store_failed(operation, &error);
                return None;
            }
        }

        match self.store.read(key).await {
            Ok(Some(StoreRecord::Page(page))) => Some(page),
            Ok(_) => None,
            Err(error) => {
                self.store_failed(operation, &error);
                None
            }
        }
    }

    /// Writes a page within the budget and persists the updated settings.
    ///
    /// Once the saving operation `id` is canceled, nothing more is written. A page
    /// already written is still accounted for in memory.
    ///
    /// Returns `false` if the page was not saved.
    async fn save_page(&self, id: OperationId, page: &Page<T>, operation: CacheOperation) -> bool {
        let size = if page.is_empty() { 0 } else { page.estimate_size() };

        if !page.is_empty() {
            let admitted = {
                let mut core = self.core.lock();
                if !core.operations.contains_key(&id) {
                    return false;
                }
                core.books.admit(size)
            };
            if !admitted {
                self.record(operation, CacheActivity::Overflow);
                return false;
            }

            let record = StoreRecord::Page(page.clone());
            if let Err(error) = self.store.add_or_update(StoreKey::Page(page.index()), record).await {
                self.store_failed(operation, &error);
                return false;
            }
        }

        let (settings, actual, alive) = {
            let mut core = self.core.lock();
            core.books.record_page(page.index(), page.count(), size);
            (
                core.books.to_settings(self.source.identifier()),
                core.books.actual_cache_size(),
                core.operations.contains_key(&id),
            )
        };
        self.telemetry.record_store_size(&self.name, actual);

        if !alive {
            return false;
        }

        match self.store.add_or_update(StoreKey::Settings, StoreRecord::Settings(settings)).await {
            Ok(()) => {
                self.record(operation, CacheActivity::Saved);
                true
            }
            Err(error) => {
                self.store_failed(operation, &error);
                false
            }
        }
    }
}

/// Pins a fetched page to the requested start and trims it to one page.
fn aligned<T>(page: Page<T>, index: u64, page_size: u64) -> Page<T> {
    if page.index() == index && page.count() <= page_size {
        return page;
    }

    let mut data = page.into_data();
    data.truncate(usize::try_from(page_size).unwrap_or(usize::MAX));
    Page::new(index, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligned_keeps_well_formed_pages() {
        let page = aligned(Page::new(4, vec![1, 2]), 4, 2);
        assert_eq!(page, Page::new(4, vec![1, 2]));
    }

    #[test]
    fn aligned_rekeys_and_trims() {
        let page = aligned(Page::new(5, vec![1, 2, 3]), 4, 2);
        assert_eq!(page, Page::new(4, vec![1, 2]));
    }

    #[test]
    fn queued_order_is_clear_read_prefetch() {
        let options = Options {
            page_size: 2,
            cache_size: 10,
            prefetch_size: Some(2),
        };
        let mut core = Core::<u8>::new(options);
        core.prefetch_queue.push(1);
        core.read_queue.push(2);
        core.clear_queue.push(3);
        core.read_queue.push(4);

        assert_eq!(core.queued(), vec![3, 2, 4, 1]);

        core.dequeue(2, OperationKind::Read);
        assert_eq!(core.queued(), vec![3, 4, 1]);
    }

    #[test]
    fn failure_is_reported_by_check() {
        let options = Options {
            page_size: 2,
            cache_size: 10,
            prefetch_size: None,
        };
        let mut core = Core::<u8>::new(options);
        assert!(core.check().is_ok());

        core.failure = Some(Error::Canceled);
        assert!(core.check().unwrap_err().is_canceled());
    }
}
