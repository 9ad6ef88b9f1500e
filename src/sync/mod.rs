//! Local-first synchronization between the device cache and the remote store.

pub mod collections;
pub mod repository;

pub use collections::{SettingsMirror, SettingsRepository, ShiftsMirror, ShiftsRepository};
pub use repository::{Record, RemoteMirror, SyncedRepository};
