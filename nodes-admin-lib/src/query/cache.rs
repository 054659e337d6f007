//! The query cache and mounted query handles.

use std::any::Any;
use std::future::Future;
use std::marker::PhantomData;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::time::Duration;
use std::time::Instant;

use chrono::DateTime;
use chrono::Utc;
use dashmap::DashMap;
use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::sync::watch;

use super::Invalidate;
use super::QueryKey;
use super::QueryOptions;
use super::QueryState;
use crate::error::Error;

type ErasedData = Arc<dyn Any + Send + Sync>;
type ErasedFetch = Arc<dyn Fn() -> BoxFuture<'static, Result<ErasedData, Error>> + Send + Sync>;

/// Process-wide cache of query results.
///
/// Cheap to clone; clones share the same entry table. Each entry is owned by
/// the handles mounted on its key and is evicted when the last one drops.
///
/// # Example
///
/// ```ignore
/// let cache = QueryCache::new();
/// let mut handle = cache.use_query(
///     QueryKey::new(tags::ANALYTICS),
///     move || { let client = client.clone(); async move { client.analytics().await } },
///     QueryOptions::default().with_stale_time(Duration::from_secs(60)),
/// );
/// let state = handle.settled().await;
/// ```
#[derive(Clone, Default)]
pub struct QueryCache {
    inner: Arc<QueryCacheInner>,
}

#[derive(Default)]
struct QueryCacheInner {
    entries: DashMap<QueryKey, Arc<Entry>>,
}

struct Entry {
    state: Mutex<EntryState>,
    version: watch::Sender<u64>,
}

#[derive(Default)]
struct EntryState {
    data: Option<ErasedData>,
    error: Option<Arc<Error>>,
    fetched_at: Option<Instant>,
    updated_at: Option<DateTime<Utc>>,
    /// Id of the request whose result will be applied.
    in_flight: Option<u64>,
    last_request: u64,
    subscribers: usize,
    invalidated: bool,
    evicted: bool,
    stale_time: Duration,
    fetcher: Option<ErasedFetch>,
}

impl EntryState {
    fn is_stale(&self) -> bool {
        if self.invalidated {
            return true;
        }
        match self.fetched_at {
            Some(at) => at.elapsed() >= self.stale_time,
            None => true,
        }
    }
}

impl Entry {
    fn new() -> Self {
        let (version, _) = watch::channel(0);
        Self {
            state: Mutex::new(EntryState::default()),
            version,
        }
    }

    fn lock(&self) -> MutexGuard<'_, EntryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self) {
        self.version.send_modify(|v| *v = v.wrapping_add(1));
    }

    fn snapshot<T: Send + Sync + 'static>(&self) -> QueryState<T> {
        let state = self.lock();
        QueryState {
            data: state
                .data
                .clone()
                .and_then(|data| data.downcast::<T>().ok()),
            error: state.error.clone(),
            is_fetching: state.in_flight.is_some(),
            updated_at: state.updated_at,
        }
    }

    /// Starts a request unless one is pending; `supersede` starts one regardless.
    ///
    /// Returns `true` if a request was started.
    fn start_fetch(self: &Arc<Self>, key: &QueryKey, supersede: bool) -> bool {
        let (request, fetch) = {
            let mut state = self.lock();
            if state.evicted {
                return false;
            }
            if state.in_flight.is_some() && !supersede {
                log::trace!("{}: joining in-flight request", key);
                return false;
            }
            let Some(fetch) = state.fetcher.clone() else {
                return false;
            };
            state.last_request += 1;
            let request = state.last_request;
            state.in_flight = Some(request);
            (request, fetch)
        };

        log::trace!("{}: starting request {}", key, request);
        self.notify();

        let entry = Arc::clone(self);
        let key = key.clone();
        tokio::spawn(async move {
            let result = match AssertUnwindSafe(fetch()).catch_unwind().await {
                Ok(result) => result,
                Err(_) => Err(Error::FetcherPanicked(key.cache_key())),
            };
            entry.complete(&key, request, result);
        });
        true
    }

    fn complete(&self, key: &QueryKey, request: u64, result: Result<ErasedData, Error>) {
        {
            let mut state = self.lock();
            if state.evicted {
                log::trace!("{}: discarding request {} (unmounted)", key, request);
                return;
            }
            if state.in_flight != Some(request) {
                log::trace!("{}: discarding request {} (superseded)", key, request);
                return;
            }
            state.in_flight = None;
            match result {
                Ok(data) => {
                    state.data = Some(data);
                    state.error = None;
                    state.fetched_at = Some(Instant::now());
                    state.updated_at = Some(Utc::now());
                    state.invalidated = false;
                }
                Err(err) => {
                    log::warn!("{}: request {} failed: {}", key, request, err);
                    state.error = Some(Arc::new(err));
                }
            }
        }
        self.notify();
    }
}

impl QueryCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mounts a consumer on `key` and returns its handle.
    ///
    /// Starts a request when the entry has no data or its data is stale,
    /// unless a request for the key is already in flight, in which case the
    /// consumer shares it. The fetcher replaces the one stored for the key
    /// and is reused by later refetches and invalidations.
    ///
    /// Must be called inside a tokio runtime; the request runs on a spawned task.
    pub fn use_query<T, F, Fut>(&self, key: QueryKey, fetcher: F, options: QueryOptions) -> QueryHandle<T>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, Error>> + Send + 'static,
    {
        let fetch: ErasedFetch = Arc::new(move || {
            let request = fetcher();
            async move { request.await.map(|data| Arc::new(data) as ErasedData) }.boxed()
        });

        let (entry, stale) = {
            let slot = self
                .inner
                .entries
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Entry::new()));
            let entry = Arc::clone(slot.value());
            let mut state = entry.lock();
            state.subscribers += 1;
            state.fetcher = Some(fetch);
            state.stale_time = options.stale_time;
            let stale = state.is_stale();
            drop(state);
            (entry, stale)
        };

        if stale {
            entry.start_fetch(&key, false);
        } else {
            log::trace!("{}: serving fresh data", key);
        }

        let receiver = entry.version.subscribe();
        QueryHandle {
            cache: self.clone(),
            key,
            entry,
            receiver,
            _marker: PhantomData,
        }
    }

    /// Mounts, waits for the query to settle and unmounts.
    ///
    /// Returns the data, or the error of the most recent fetch.
    pub async fn fetch_query<T, F, Fut>(
        &self,
        key: QueryKey,
        fetcher: F,
        options: QueryOptions,
    ) -> Result<Arc<T>, Arc<Error>>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, Error>> + Send + 'static,
    {
        let mut handle = self.use_query(key, fetcher, options);
        let state = handle.settled().await;
        if let Some(error) = state.error {
            return Err(error);
        }
        state
            .data
            .ok_or_else(|| Arc::new(Error::NoData(handle.key().cache_key())))
    }

    /// Marks matching entries stale and refetches them.
    ///
    /// Every entry in the table has at least one mounted consumer, so each
    /// match refetches at once, superseding a pending request. Returns the
    /// number of entries matched.
    pub fn invalidate(&self, target: impl Into<Invalidate>) -> usize {
        let target = target.into();
        let mut matched = 0;
        for item in self.inner.entries.iter() {
            if !target.matches(item.key()) {
                continue;
            }
            matched += 1;
            let mounted = {
                let mut state = item.value().lock();
                state.invalidated = true;
                state.subscribers > 0
            };
            if mounted {
                item.value().start_fetch(item.key(), true);
            }
        }
        log::debug!("invalidated {:?}: {} entries", target, matched);
        matched
    }

    /// Writes data into an existing entry without fetching.
    ///
    /// The updater receives the current data if it has type `T`. The write is
    /// replaced by the next completed fetch. Returns `false` when no consumer
    /// is mounted on `key`.
    pub fn set_query_data<T, F>(&self, key: &QueryKey, updater: F) -> bool
    where
        T: Send + Sync + 'static,
        F: FnOnce(Option<&T>) -> T,
    {
        let Some(entry) = self.inner.entries.get(key).map(|e| Arc::clone(e.value())) else {
            return false;
        };
        {
            let mut state = entry.lock();
            let current = state.data.as_ref().and_then(|data| (**data).downcast_ref::<T>());
            let next = updater(current);
            state.data = Some(Arc::new(next));
            state.error = None;
        }
        entry.notify();
        true
    }

    /// Returns the cached data for `key` if present and of type `T`.
    pub fn get_query_data<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<T>> {
        let entry = self.inner.entries.get(key).map(|e| Arc::clone(e.value()))?;
        let data = entry.lock().data.clone()?;
        data.downcast::<T>().ok()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    /// Returns `true` if no entry is live.
    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    /// Returns `true` if a consumer is mounted on `key`.
    pub fn contains(&self, key: &QueryKey) -> bool {
        self.inner.entries.contains_key(key)
    }

    /// Drops one subscriber of `key`, evicting the entry when it was the last.
    fn release(&self, key: &QueryKey) {
        let evicted = self.inner.entries.remove_if(key, |_, entry| {
            let mut state = entry.lock();
            state.subscribers = state.subscribers.saturating_sub(1);
            if state.subscribers == 0 {
                state.evicted = true;
                true
            } else {
                false
            }
        });
        if evicted.is_some() {
            log::trace!("{}: evicted", key);
        }
    }
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.inner.entries.len())
            .finish()
    }
}

/// A mounted consumer of one query.
///
/// Dropping the handle unmounts it; results arriving after the last handle
/// of a key dropped are discarded.
pub struct QueryHandle<T> {
    cache: QueryCache,
    key: QueryKey,
    entry: Arc<Entry>,
    receiver: watch::Receiver<u64>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> QueryHandle<T> {
    /// The key this handle is mounted on.
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Current state of the query.
    pub fn state(&self) -> QueryState<T> {
        self.entry.snapshot()
    }

    /// Waits for the next change (request started, finished, or data written).
    pub async fn changed(&mut self) -> QueryState<T> {
        let _ = self.receiver.changed().await;
        self.state()
    }

    /// Waits until no request is in flight and returns the state.
    pub async fn settled(&mut self) -> QueryState<T> {
        loop {
            self.receiver.borrow_and_update();
            let state = self.state();
            if !state.is_fetching {
                return state;
            }
            if self.receiver.changed().await.is_err() {
                return self.state();
            }
        }
    }

    /// Starts a new request, superseding a pending one.
    pub fn refetch(&self) -> bool {
        self.entry.start_fetch(&self.key, true)
    }
}

impl<T> Drop for QueryHandle<T> {
    fn drop(&mut self) {
        self.cache.release(&self.key);
    }
}

impl<T> std::fmt::Debug for QueryHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryHandle")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::error::ApiError;
    use crate::query::tags;

    fn counting_fetcher(
        calls: Arc<AtomicUsize>,
        delay: Duration,
    ) -> impl Fn() -> BoxFuture<'static, Result<usize, Error>> + Send + Sync + 'static {
        move || {
            let calls = calls.clone();
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                tokio::time::sleep(delay).await;
                Ok(n)
            }
            .boxed()
        }
    }

    #[tokio::test]
    async fn test_concurrent_mounts_share_one_request() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new(tags::USERS);

        let mut a = cache.use_query(
            key.clone(),
            counting_fetcher(calls.clone(), Duration::from_millis(30)),
            QueryOptions::default(),
        );
        let mut b = cache.use_query(
            key.clone(),
            counting_fetcher(calls.clone(), Duration::from_millis(30)),
            QueryOptions::default(),
        );

        assert!(a.state().is_loading());
        let (sa, sb) = tokio::join!(a.settled(), b.settled());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(sa.data(), Some(&1));
        assert_eq!(sb.data(), Some(&1));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_fetch_query_dedups() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new(tags::COMMUNITIES);

        let (a, b) = tokio::join!(
            cache.fetch_query(
                key.clone(),
                counting_fetcher(calls.clone(), Duration::from_millis(30)),
                QueryOptions::default(),
            ),
            cache.fetch_query(
                key.clone(),
                counting_fetcher(calls.clone(), Duration::from_millis(30)),
                QueryOptions::default(),
            ),
        );
        assert_eq!(*a.unwrap(), 1);
        assert_eq!(*b.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_failure_keeps_stale_data() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let fetcher = move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Ok("first".to_string())
                } else {
                    Err(Error::from(ApiError::http(502, "bad gateway")))
                }
            }
        };

        let mut handle = cache.use_query(QueryKey::new(tags::ANALYTICS), fetcher, QueryOptions::default());
        let state = handle.settled().await;
        assert_eq!(state.data().map(String::as_str), Some("first"));
        assert!(!state.is_error());

        assert!(handle.refetch());
        let state = handle.settled().await;
        assert_eq!(state.data().map(String::as_str), Some("first"));
        assert!(state.is_error());
        assert_eq!(
            state.error.as_deref().and_then(Error::as_api).and_then(ApiError::status_code),
            Some(502)
        );
    }

    #[tokio::test]
    async fn test_fresh_data_is_served_without_refetch() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new(tags::ANALYTICS);
        let options = QueryOptions::default().with_stale_time(Duration::from_secs(60));

        let mut first = cache.use_query(key.clone(), counting_fetcher(calls.clone(), Duration::ZERO), options.clone());
        first.settled().await;

        let second = cache.use_query(key.clone(), counting_fetcher(calls.clone(), Duration::ZERO), options);
        let state = second.state();
        assert!(!state.is_fetching);
        assert_eq!(state.data(), Some(&1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stale_data_refetches_in_background() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new(tags::USERS);

        let mut first = cache.use_query(key.clone(), counting_fetcher(calls.clone(), Duration::from_millis(20)), QueryOptions::default());
        first.settled().await;

        let mut second = cache.use_query(key.clone(), counting_fetcher(calls.clone(), Duration::from_millis(20)), QueryOptions::default());
        let state = second.state();
        assert!(state.is_fetching);
        assert!(!state.is_loading());
        assert_eq!(state.data(), Some(&1));

        let state = second.settled().await;
        assert_eq!(state.data(), Some(&2));
    }

    #[tokio::test]
    async fn test_newer_request_supersedes_older() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let fetcher = move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    tokio::time::sleep(Duration::from_millis(150)).await;
                    Ok("old")
                } else {
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    Ok("new")
                }
            }
        };

        let mut handle = cache.use_query(QueryKey::new(tags::USERS), fetcher, QueryOptions::default());
        assert!(handle.refetch());
        let state = handle.settled().await;
        assert_eq!(state.data(), Some(&"new"));

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(handle.state().data(), Some(&"new"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_last_unmount_evicts() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new(tags::COMMUNITIES);

        let mut a = cache.use_query(key.clone(), counting_fetcher(calls.clone(), Duration::ZERO), QueryOptions::default());
        let b = cache.use_query(key.clone(), counting_fetcher(calls.clone(), Duration::ZERO), QueryOptions::default());
        a.settled().await;

        drop(a);
        assert!(cache.contains(&key));
        drop(b);
        assert!(!cache.contains(&key));
        assert!(cache.get_query_data::<usize>(&key).is_none());
    }

    #[tokio::test]
    async fn test_result_after_unmount_is_discarded() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new(tags::USERS);

        let handle = cache.use_query(key.clone(), counting_fetcher(calls.clone(), Duration::from_millis(30)), QueryOptions::default());
        drop(handle);
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(cache.is_empty());

        let mut handle = cache.use_query(key.clone(), counting_fetcher(calls.clone(), Duration::ZERO), QueryOptions::default());
        assert!(handle.state().is_loading());
        assert_eq!(handle.settled().await.data(), Some(&2));
    }

    #[tokio::test]
    async fn test_invalidate_by_tag_refetches_mounted() {
        let cache = QueryCache::new();
        let user_calls = Arc::new(AtomicUsize::new(0));
        let community_calls = Arc::new(AtomicUsize::new(0));
        let options = QueryOptions::never_stale();

        let mut users = cache.use_query(QueryKey::new(tags::USERS), counting_fetcher(user_calls.clone(), Duration::ZERO), options.clone());
        let mut communities = cache.use_query(
            QueryKey::new(tags::COMMUNITIES).param("id", 1),
            counting_fetcher(community_calls.clone(), Duration::ZERO),
            options,
        );
        users.settled().await;
        communities.settled().await;

        assert_eq!(cache.invalidate(tags::USERS), 1);
        assert_eq!(users.settled().await.data(), Some(&2));
        assert_eq!(communities.settled().await.data(), Some(&1));

        assert_eq!(cache.invalidate(tags::COMMUNITIES), 1);
        assert_eq!(communities.settled().await.data(), Some(&2));
        assert_eq!(cache.invalidate(tags::ATTESTATIONS), 0);
    }

    #[tokio::test]
    async fn test_set_query_data_is_replaced_by_next_fetch() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::new(tags::USERS);

        let mut handle = cache.use_query(key.clone(), counting_fetcher(calls.clone(), Duration::ZERO), QueryOptions::default());
        handle.settled().await;

        assert!(cache.set_query_data::<usize, _>(&key, |current| current.copied().unwrap_or(0) + 100));
        assert_eq!(handle.state().data(), Some(&101));

        handle.refetch();
        assert_eq!(handle.settled().await.data(), Some(&2));
        assert!(!cache.set_query_data::<usize, _>(&QueryKey::new("missing"), |_| 0));
    }

    #[tokio::test]
    async fn test_panicking_fetcher_surfaces_error() {
        let cache = QueryCache::new();
        let fetcher = || async {
            if true {
                panic!("fetcher exploded");
            }
            Ok::<u32, Error>(1)
        };
        let result = cache
            .fetch_query(QueryKey::new(tags::AUTH), fetcher, QueryOptions::default())
            .await;
        let err = result.unwrap_err();
        assert!(matches!(*err, Error::FetcherPanicked(_)));
    }
}
