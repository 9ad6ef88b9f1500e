//! In-process store implementations used by tests and `--test` runs.

use crate::errors::{AppError, AppResult};
use crate::models::settings::{SettingsPatch, UserSettings};
use crate::models::shift::Shift;
use crate::store::auth::AuthSession;
use crate::store::local::LocalStore;
use crate::store::remote::RemoteStore;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Default)]
pub struct MemoryLocalStore {
    entries: Mutex<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    /// Writes to these keys fail even when `fail_writes` is off.
    failing_keys: Mutex<Vec<String>>,
    /// Yield to the scheduler before each write.
    slow_writes: AtomicBool,
}

impl MemoryLocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_failing_key(&self, key: &str, fail: bool) {
        let mut keys = self.failing_keys.lock();
        keys.retain(|k| k != key);
        if fail {
            keys.push(key.to_string());
        }
    }

    pub fn set_slow_writes(&self, slow: bool) {
        self.slow_writes.store(slow, Ordering::SeqCst);
    }

    fn write_fails(&self, key: &str) -> bool {
        self.fail_writes.load(Ordering::SeqCst) || self.failing_keys.lock().iter().any(|k| k == key)
    }

    /// Stored value for `key`, bypassing failure injection.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    pub fn put_raw(&self, key: &str, value: &str) {
        self.entries.lock().insert(key.to_string(), value.to_string());
    }
}

#[async_trait]
impl LocalStore for MemoryLocalStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::LocalStore(format!("read of '{key}' failed")));
        }
        Ok(self.raw(key))
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        if self.slow_writes.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }
        if self.write_fails(key) {
            return Err(AppError::LocalStore(format!("write of '{key}' failed")));
        }
        self.put_raw(key, value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        if self.slow_writes.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }
        if self.write_fails(key) {
            return Err(AppError::LocalStore(format!("remove of '{key}' failed")));
        }
        self.entries.lock().remove(key);
        Ok(())
    }
}

#[derive(Default)]
struct RemoteTables {
    shifts: HashMap<String, Vec<(String, Shift)>>,
    settings: HashMap<String, UserSettings>,
}

/// Remote backend kept in memory, scoped per signed-in user.
pub struct MemoryRemoteStore {
    auth: Arc<AuthSession>,
    tables: Mutex<RemoteTables>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryRemoteStore {
    pub fn new(auth: Arc<AuthSession>) -> Self {
        Self {
            auth,
            tables: Mutex::new(RemoteTables::default()),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn seed_shifts(&self, user_id: &str, shifts: Vec<Shift>) {
        let rows = shifts.into_iter().map(|s| (s.id.clone(), s)).collect();
        self.tables.lock().shifts.insert(user_id.to_string(), rows);
    }

    pub fn seed_settings(&self, user_id: &str, settings: UserSettings) {
        self.tables
            .lock()
            .settings
            .insert(user_id.to_string(), settings);
    }

    /// Rows stored for `user_id`, in insertion order.
    pub fn shifts_for(&self, user_id: &str) -> Vec<Shift> {
        self.tables
            .lock()
            .shifts
            .get(user_id)
            .map(|rows| rows.iter().map(|(_, s)| s.clone()).collect())
            .unwrap_or_default()
    }

    pub fn settings_for(&self, user_id: &str) -> Option<UserSettings> {
        self.tables.lock().settings.get(user_id).cloned()
    }

    fn check_read(&self) -> AppResult<String> {
        let user = self.auth.require_user()?;
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::Remote("network unreachable".into()));
        }
        Ok(user.id)
    }

    fn check_write(&self) -> AppResult<String> {
        let user = self.auth.require_user()?;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Remote("network unreachable".into()));
        }
        Ok(user.id)
    }
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn list_shifts(&self) -> AppResult<Vec<Shift>> {
        let user_id = self.check_read()?;
        let mut out = self.shifts_for(&user_id);
        out.sort_by(|a, b| b.date.cmp(&a.date).then(b.clock_in.cmp(&a.clock_in)));
        Ok(out)
    }

    async fn insert_shift(&self, shift: &Shift) -> AppResult<()> {
        let user_id = self.check_write()?;
        let mut tables = self.tables.lock();
        let rows = tables.shifts.entry(user_id).or_default();
        if rows.iter().any(|(id, _)| id == &shift.id) {
            return Err(AppError::Remote(format!("duplicate key: {}", shift.id)));
        }
        rows.push((shift.id.clone(), shift.clone()));
        Ok(())
    }

    async fn update_shift(&self, shift: &Shift) -> AppResult<()> {
        let user_id = self.check_write()?;
        let mut tables = self.tables.lock();
        if let Some(rows) = tables.shifts.get_mut(&user_id)
            && let Some(row) = rows.iter_mut().find(|(id, _)| id == &shift.id)
        {
            row.1 = shift.clone();
        }
        Ok(())
    }

    async fn delete_shift(&self, id: &str) -> AppResult<()> {
        let user_id = self.check_write()?;
        if let Some(rows) = self.tables.lock().shifts.get_mut(&user_id) {
            rows.retain(|(row_id, _)| row_id != id);
        }
        Ok(())
    }

    async fn get_settings(&self) -> AppResult<UserSettings> {
        let user_id = self.check_read()?;
        Ok(self
            .tables
            .lock()
            .settings
            .entry(user_id)
            .or_default()
            .clone())
    }

    async fn update_settings(&self, patch: &SettingsPatch) -> AppResult<()> {
        let user_id = self.check_write()?;
        let mut tables = self.tables.lock();
        let row = tables.settings.entry(user_id).or_default();
        *row = row.apply(patch);
        Ok(())
    }
}
