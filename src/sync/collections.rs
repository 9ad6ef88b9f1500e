//! The two synchronized collections and their remote adapters.

use crate::errors::AppResult;
use crate::models::settings::{SettingsPatch, UserSettings};
use crate::models::shift::{Shift, ShiftChange};
use crate::store::local::keys;
use crate::store::remote::RemoteStore;
use crate::sync::repository::{Record, RemoteMirror, SyncedRepository};
use async_trait::async_trait;
use std::sync::Arc;

pub type ShiftsRepository = SyncedRepository<Vec<Shift>>;
pub type SettingsRepository = SyncedRepository<UserSettings>;

impl Record for Vec<Shift> {
    type Change = ShiftChange;
    const LOCAL_KEY: &'static str = keys::SHIFTS;
    const NAME: &'static str = "shifts";

    fn is_empty(&self) -> bool {
        <[Shift]>::is_empty(self)
    }

    /// Keep every shift that still reads; one bad row does not cost the rest.
    fn from_cache(raw: &str) -> serde_json::Result<(Self, bool)> {
        let rows: Vec<serde_json::Value> = serde_json::from_str(raw)?;
        let total = rows.len();
        let shifts: Vec<Shift> = rows
            .into_iter()
            .filter_map(|row| serde_json::from_value(row).ok())
            .collect();
        let lossy = shifts.len() != total;
        Ok((shifts, lossy))
    }
}

impl Record for UserSettings {
    type Change = SettingsPatch;
    const LOCAL_KEY: &'static str = keys::SETTINGS;
    const NAME: &'static str = "settings";

    /// Settings always exist remotely once fetched.
    fn is_empty(&self) -> bool {
        false
    }
}

pub struct ShiftsMirror {
    remote: Arc<dyn RemoteStore>,
}

impl ShiftsMirror {
    pub fn new(remote: Arc<dyn RemoteStore>) -> Self {
        Self { remote }
    }
}

#[async_trait]
impl RemoteMirror<Vec<Shift>> for ShiftsMirror {
    async fn fetch(&self) -> AppResult<Vec<Shift>> {
        self.remote.list_shifts().await
    }

    async fn push(&self, change: &ShiftChange) -> AppResult<()> {
        match change {
            ShiftChange::Insert(shift) => self.remote.insert_shift(shift).await,
            ShiftChange::Update(shift) => self.remote.update_shift(shift).await,
            ShiftChange::Delete(id) => self.remote.delete_shift(id).await,
        }
    }
}

pub struct SettingsMirror {
    remote: Arc<dyn RemoteStore>,
}

impl SettingsMirror {
    pub fn new(remote: Arc<dyn RemoteStore>) -> Self {
        Self { remote }
    }
}

#[async_trait]
impl RemoteMirror<UserSettings> for SettingsMirror {
    async fn fetch(&self) -> AppResult<UserSettings> {
        self.remote.get_settings().await
    }

    async fn push(&self, patch: &SettingsPatch) -> AppResult<()> {
        if patch.is_empty() {
            return Ok(());
        }
        self.remote.update_settings(patch).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::{MemoryLocalStore, MemoryRemoteStore};
    use crate::store::AuthSession;
    use crate::sync::repository::unreadable_key;

    const CACHE: &str = r#"[
        {"id":"shift-a","date":"2025-05-01","clockIn":"2025-05-01T09:00:00+00:00",
         "clockOut":"2025-05-01T17:00:00+00:00","breaks":[],
         "totalHours":8.0,"hourlyRate":15.0,"earnings":120.0},
        {"id":"shift-b","date":"2025-05-02","clockIn":"2025-05-02T09:00:00+00:00",
         "clockOut":"2025-05-02T17:00:00+00:00","breaks":[],
         "totalHours":8.0,"hourlyRate":null,"earnings":null}
    ]"#;

    #[test]
    fn bad_row_does_not_discard_the_others() {
        let (shifts, lossy) = <Vec<Shift>>::from_cache(CACHE).unwrap();
        assert!(lossy);
        assert_eq!(shifts.len(), 1);
        assert_eq!(shifts[0].id, "shift-a");

        assert!(<Vec<Shift>>::from_cache("{}").is_err());
    }

    #[tokio::test]
    async fn partial_cache_is_loaded_and_set_aside() {
        let local = Arc::new(MemoryLocalStore::new());
        local.put_raw(keys::SHIFTS, CACHE);
        let remote = Arc::new(MemoryRemoteStore::new(Arc::new(AuthSession::new())));
        let repo = ShiftsRepository::new(local.clone(), Arc::new(ShiftsMirror::new(remote)));

        repo.load_local().await.unwrap();

        assert_eq!(repo.snapshot().len(), 1);
        assert_eq!(local.raw(&unreadable_key(keys::SHIFTS)).as_deref(), Some(CACHE));
    }
}
