use crate::errors::{AppError, AppResult};
use crate::store::local::LocalStore;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::{Mutex, watch};
use tracing::{debug, warn};

/// In-memory value of one synchronized collection.
pub trait Record: Clone + Default + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// What a single mutation sends to the remote mirror.
    type Change: Send + Sync;

    /// Key under which the whole value is cached on the device.
    const LOCAL_KEY: &'static str;

    /// Collection name used in logs and `NotReady` errors.
    const NAME: &'static str;

    fn is_empty(&self) -> bool;

    /// Decode the device cache. The flag is set when some of `raw` could not
    /// be read and was left out of the value.
    fn from_cache(raw: &str) -> serde_json::Result<(Self, bool)> {
        serde_json::from_str(raw).map(|value| (value, false))
    }
}

/// Where an unreadable cache entry is set aside before it can be overwritten.
pub fn unreadable_key(key: &str) -> String {
    format!("{key}.unreadable")
}

/// Remote side of a collection.
#[async_trait]
pub trait RemoteMirror<T: Record>: Send + Sync {
    async fn fetch(&self) -> AppResult<T>;
    async fn push(&self, change: &T::Change) -> AppResult<()>;
}

fn log_remote_failure(collection: &str, op: &str, err: &AppError) {
    match err {
        AppError::NotAuthenticated => {
            debug!(collection, op, "remote skipped: not signed in");
        }
        _ => warn!(collection, op, error = %err, "remote call failed, keeping local state"),
    }
}

/// Local-first repository with a best-effort remote mirror.
///
/// Mutations are published before any I/O is awaited, then written locally
/// and remotely at the same time. A failed local write rolls the value back
/// and is returned to the caller; a failed remote write is only logged.
/// Mutations on one repository never interleave.
pub struct SyncedRepository<T: Record> {
    state: watch::Sender<T>,
    ready: AtomicBool,
    writes: Mutex<()>,
    /// Bumped on every committed change; lets a slow fetch detect it is stale.
    generation: AtomicU64,
    local: Arc<dyn LocalStore>,
    remote: Arc<dyn RemoteMirror<T>>,
}

impl<T: Record> SyncedRepository<T> {
    pub fn new(local: Arc<dyn LocalStore>, remote: Arc<dyn RemoteMirror<T>>) -> Self {
        Self {
            state: watch::Sender::new(T::default()),
            ready: AtomicBool::new(false),
            writes: Mutex::new(()),
            generation: AtomicU64::new(0),
            local,
            remote,
        }
    }

    pub fn snapshot(&self) -> T {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.state.subscribe()
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// Phase 1: populate from the device cache and accept mutations.
    ///
    /// Whatever can be read from the cache is kept. If anything could not,
    /// the raw cache is copied under `unreadable_key` first, so the next
    /// write cannot destroy it.
    pub async fn load_local(&self) -> AppResult<()> {
        let _guard = self.writes.lock().await;

        let value = match self.local.get(T::LOCAL_KEY).await? {
            Some(raw) => match T::from_cache(&raw) {
                Ok((value, false)) => value,
                Ok((value, true)) => {
                    warn!(collection = T::NAME, "dropped unreadable entries from local cache");
                    self.set_aside(&raw).await?;
                    value
                }
                Err(e) => {
                    warn!(
                        collection = T::NAME,
                        error = %e,
                        "unreadable local cache, starting empty"
                    );
                    self.set_aside(&raw).await?;
                    T::default()
                }
            },
            None => T::default(),
        };

        self.state.send_replace(value);
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.ready.store(true, Ordering::SeqCst);
        debug!(collection = T::NAME, "local load complete");
        Ok(())
    }

    async fn set_aside(&self, raw: &str) -> AppResult<()> {
        let key = unreadable_key(T::LOCAL_KEY);
        self.local.set(&key, raw).await?;
        warn!(collection = T::NAME, %key, "unreadable cache kept for recovery");
        Ok(())
    }

    /// Apply one change.
    ///
    /// `apply` receives the current value and returns the next value plus the
    /// change to mirror remotely. An error from `apply` leaves everything
    /// untouched.
    pub async fn mutate<F>(&self, apply: F) -> AppResult<T>
    where
        F: FnOnce(&T) -> AppResult<(T, T::Change)> + Send,
    {
        if !self.is_ready() {
            return Err(AppError::NotReady(T::NAME));
        }

        let _guard = self.writes.lock().await;

        let previous = self.snapshot();
        let (next, change) = apply(&previous)?;
        let raw = serde_json::to_string(&next)?;
        // non-finite floats encode as `null`, which would not load back
        if !matches!(T::from_cache(&raw), Ok((_, false))) {
            return Err(AppError::LocalStore(format!(
                "{} value cannot be cached faithfully",
                T::NAME
            )));
        }

        self.state.send_replace(next.clone());

        let (local, remote) = tokio::join!(
            self.local.set(T::LOCAL_KEY, &raw),
            self.remote.push(&change)
        );
        self.generation.fetch_add(1, Ordering::SeqCst);

        if let Err(e) = remote {
            log_remote_failure(T::NAME, "push", &e);
        }

        if let Err(e) = local {
            warn!(collection = T::NAME, error = %e, "local write failed, rolling back");
            self.state.send_replace(previous);
            return Err(e);
        }

        Ok(next)
    }

    /// Phase 2: adopt the remote copy.
    ///
    /// Remote wins when the fetch succeeds and either returned something or
    /// there is nothing local to keep. Returns whether the remote copy was
    /// adopted.
    pub async fn reconcile(&self) -> bool {
        if !self.is_ready() {
            return false;
        }

        let started = self.generation.load(Ordering::SeqCst);
        let fetched = match self.remote.fetch().await {
            Ok(v) => v,
            Err(e) => {
                log_remote_failure(T::NAME, "fetch", &e);
                return false;
            }
        };

        let _guard = self.writes.lock().await;

        if self.generation.load(Ordering::SeqCst) != started {
            debug!(collection = T::NAME, "local state changed during fetch, discarding");
            return false;
        }

        let has_local = !self.state.borrow().is_empty();
        if fetched.is_empty() && has_local {
            debug!(collection = T::NAME, "remote empty, keeping local state");
            return false;
        }

        match serde_json::to_string(&fetched) {
            Ok(raw) => {
                if let Err(e) = self.local.set(T::LOCAL_KEY, &raw).await {
                    warn!(collection = T::NAME, error = %e, "could not cache remote copy");
                }
            }
            Err(e) => warn!(collection = T::NAME, error = %e, "could not encode remote copy"),
        }

        self.state.send_replace(fetched);
        self.generation.fetch_add(1, Ordering::SeqCst);
        debug!(collection = T::NAME, "reconciled from remote");
        true
    }

    /// Forget everything held for the current account, in memory and on the
    /// device. Mutations are refused until the next `load_local`.
    pub async fn clear(&self) {
        let _guard = self.writes.lock().await;

        self.ready.store(false, Ordering::SeqCst);
        self.state.send_replace(T::default());
        self.generation.fetch_add(1, Ordering::SeqCst);

        if let Err(e) = self.local.remove(T::LOCAL_KEY).await {
            warn!(collection = T::NAME, error = %e, "could not clear local cache");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryLocalStore;
    use serde::Deserialize;
    use std::sync::atomic::AtomicUsize;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Tally(Vec<u32>);

    impl Record for Tally {
        type Change = u32;
        const LOCAL_KEY: &'static str = "tally";
        const NAME: &'static str = "tally";

        fn is_empty(&self) -> bool {
            self.0.is_empty()
        }
    }

    #[derive(Default)]
    struct FakeMirror {
        remote: parking_lot::Mutex<Tally>,
        fail: AtomicBool,
        pushes: AtomicUsize,
    }

    #[async_trait]
    impl RemoteMirror<Tally> for FakeMirror {
        async fn fetch(&self) -> AppResult<Tally> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(AppError::Remote("offline".into()));
            }
            Ok(self.remote.lock().clone())
        }

        async fn push(&self, change: &u32) -> AppResult<()> {
            self.pushes.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(AppError::Remote("offline".into()));
            }
            self.remote.lock().0.push(*change);
            Ok(())
        }
    }

    fn repo() -> (
        SyncedRepository<Tally>,
        Arc<MemoryLocalStore>,
        Arc<FakeMirror>,
    ) {
        let local = Arc::new(MemoryLocalStore::new());
        let mirror = Arc::new(FakeMirror::default());
        let repo = SyncedRepository::new(local.clone(), mirror.clone());
        (repo, local, mirror)
    }

    fn push_value(v: u32) -> impl FnOnce(&Tally) -> AppResult<(Tally, u32)> + Send {
        move |t: &Tally| {
            let mut next = t.clone();
            next.0.push(v);
            Ok((next, v))
        }
    }

    #[tokio::test]
    async fn mutation_before_local_load_is_refused() {
        let (repo, _local, mirror) = repo();
        let err = repo.mutate(push_value(1)).await.unwrap_err();
        assert!(matches!(err, AppError::NotReady("tally")));
        assert_eq!(mirror.pushes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn mutation_writes_both_sides() {
        let (repo, local, mirror) = repo();
        repo.load_local().await.unwrap();

        let mut rx = repo.subscribe();
        repo.mutate(push_value(7)).await.unwrap();

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().0, vec![7]);
        assert_eq!(local.raw("tally").as_deref(), Some("[7]"));
        assert_eq!(mirror.remote.lock().0, vec![7]);
    }

    #[tokio::test]
    async fn validation_error_changes_nothing() {
        let (repo, local, mirror) = repo();
        repo.load_local().await.unwrap();

        let err = repo
            .mutate(|_| Err(AppError::InvalidShift("nope".into())))
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(repo.snapshot().0.is_empty());
        assert!(local.raw("tally").is_none());
        assert_eq!(mirror.pushes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn local_failure_rolls_back() {
        let (repo, local, _mirror) = repo();
        repo.load_local().await.unwrap();
        repo.mutate(push_value(1)).await.unwrap();

        local.set_fail_writes(true);
        let err = repo.mutate(push_value(2)).await.unwrap_err();
        assert!(matches!(err, AppError::LocalStore(_)));
        assert_eq!(repo.snapshot().0, vec![1]);
    }

    #[tokio::test]
    async fn remote_failure_is_swallowed() {
        let (repo, local, mirror) = repo();
        repo.load_local().await.unwrap();
        mirror.fail.store(true, Ordering::SeqCst);

        let next = repo.mutate(push_value(3)).await.unwrap();
        assert_eq!(next.0, vec![3]);
        assert_eq!(local.raw("tally").as_deref(), Some("[3]"));
        assert!(mirror.remote.lock().0.is_empty());
    }

    #[tokio::test]
    async fn corrupt_cache_loads_as_default_and_is_kept() {
        let (repo, local, _mirror) = repo();
        local.put_raw("tally", "{not json");
        repo.load_local().await.unwrap();
        assert!(repo.snapshot().0.is_empty());
        assert!(repo.is_ready());

        repo.mutate(push_value(1)).await.unwrap();
        assert_eq!(local.raw("tally").as_deref(), Some("[1]"));
        assert_eq!(local.raw("tally.unreadable").as_deref(), Some("{not json"));
    }

    #[tokio::test]
    async fn corrupt_cache_is_not_touched_when_it_cannot_be_kept() {
        let (repo, local, _mirror) = repo();
        local.put_raw("tally", "{not json");
        local.set_fail_writes(true);

        assert!(repo.load_local().await.is_err());
        assert!(!repo.is_ready());
        assert_eq!(local.raw("tally").as_deref(), Some("{not json"));
    }

    #[tokio::test]
    async fn value_that_would_not_load_back_is_refused() {
        #[derive(Debug, Clone, Default, Serialize, Deserialize)]
        struct Rate(f64);

        impl Record for Rate {
            type Change = ();
            const LOCAL_KEY: &'static str = "rate";
            const NAME: &'static str = "rate";

            fn is_empty(&self) -> bool {
                false
            }
        }

        struct Silent;

        #[async_trait]
        impl RemoteMirror<Rate> for Silent {
            async fn fetch(&self) -> AppResult<Rate> {
                Ok(Rate::default())
            }

            async fn push(&self, _: &()) -> AppResult<()> {
                Ok(())
            }
        }

        let local = Arc::new(MemoryLocalStore::new());
        let repo = SyncedRepository::new(local.clone(), Arc::new(Silent));
        repo.load_local().await.unwrap();

        let err = repo
            .mutate(|_| Ok((Rate(f64::INFINITY), ())))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::LocalStore(_)));
        assert_eq!(repo.snapshot().0, 0.0);
        assert!(local.raw("rate").is_none());
    }

    #[tokio::test]
    async fn reconcile_remote_wins() {
        let (repo, local, mirror) = repo();
        local.put_raw("tally", "[1,2]");
        repo.load_local().await.unwrap();
        *mirror.remote.lock() = Tally(vec![9]);

        assert!(repo.reconcile().await);
        assert_eq!(repo.snapshot().0, vec![9]);
        assert_eq!(local.raw("tally").as_deref(), Some("[9]"));
    }

    #[tokio::test]
    async fn reconcile_keeps_local_when_remote_empty_or_down() {
        let (repo, local, mirror) = repo();
        local.put_raw("tally", "[4]");
        repo.load_local().await.unwrap();

        assert!(!repo.reconcile().await);
        assert_eq!(repo.snapshot().0, vec![4]);

        *mirror.remote.lock() = Tally(vec![5]);
        mirror.fail.store(true, Ordering::SeqCst);
        assert!(!repo.reconcile().await);
        assert_eq!(repo.snapshot().0, vec![4]);
    }

    #[tokio::test]
    async fn concurrent_mutations_do_not_lose_updates() {
        let (repo, _local, _mirror) = repo();
        repo.load_local().await.unwrap();
        let repo = Arc::new(repo);

        let mut handles = Vec::new();
        for v in 0..20 {
            let r = repo.clone();
            handles.push(tokio::spawn(async move { r.mutate(push_value(v)).await }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }

        let mut got = repo.snapshot().0;
        got.sort();
        assert_eq!(got, (0..20).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn clear_resets_and_requires_reload() {
        let (repo, local, _mirror) = repo();
        repo.load_local().await.unwrap();
        repo.mutate(push_value(1)).await.unwrap();

        repo.clear().await;
        assert!(!repo.is_ready());
        assert!(repo.snapshot().0.is_empty());
        assert!(local.raw("tally").is_none());
        assert!(matches!(
            repo.mutate(push_value(2)).await,
            Err(AppError::NotReady(_))
        ));
    }
}
