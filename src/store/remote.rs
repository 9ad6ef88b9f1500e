use crate::db::migrate::run_remote_migrations;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::models::settings::{SettingsPatch, UserSettings};
use crate::models::shift::{Break, Shift};
use crate::models::user::User;
use crate::store::auth::AuthSession;
use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, NaiveTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::sync::Arc;

/// Per-user CRUD against the hosted backend.
///
/// Every call resolves the signed-in user first and fails with
/// `NotAuthenticated` when there is none.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// All shifts of the current user, newest date first.
    async fn list_shifts(&self) -> AppResult<Vec<Shift>>;

    async fn shifts_in_range(&self, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<Shift>> {
        let all = self.list_shifts().await?;
        Ok(all
            .into_iter()
            .filter(|s| s.date >= start && s.date <= end)
            .collect())
    }

    async fn insert_shift(&self, shift: &Shift) -> AppResult<()>;
    async fn update_shift(&self, shift: &Shift) -> AppResult<()>;
    async fn delete_shift(&self, id: &str) -> AppResult<()>;

    /// Settings of the current user; a default row is created on first access.
    async fn get_settings(&self) -> AppResult<UserSettings>;

    /// Upsert only the fields present in `patch`.
    async fn update_settings(&self, patch: &SettingsPatch) -> AppResult<()>;
}

fn remote_err(e: rusqlite::Error) -> AppError {
    AppError::Remote(e.to_string())
}

fn conversion_err(idx: usize, msg: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        idx,
        rusqlite::types::Type::Text,
        Box::<dyn std::error::Error + Send + Sync>::from(msg),
    )
}

fn parse_instant(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Local>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Local))
        .map_err(|_| conversion_err(idx, format!("Invalid timestamp: {raw}")))
}

fn parse_clock(idx: usize, raw: &str) -> rusqlite::Result<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|_| conversion_err(idx, format!("Invalid time: {raw}")))
}

fn map_shift(row: &Row) -> rusqlite::Result<Shift> {
    let date_str: String = row.get("date")?;
    let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
        .map_err(|_| conversion_err(2, format!("Invalid date: {date_str}")))?;

    let clock_in: String = row.get("clock_in")?;
    let clock_out: Option<String> = row.get("clock_out")?;
    let breaks_json: String = row.get("breaks")?;
    let breaks: Vec<Break> = serde_json::from_str(&breaks_json)
        .map_err(|e| conversion_err(5, format!("Invalid breaks: {e}")))?;

    Ok(Shift {
        id: row.get("id")?,
        date,
        clock_in: parse_instant(3, &clock_in)?,
        clock_out: clock_out.as_deref().map(|s| parse_instant(4, s)).transpose()?,
        breaks,
        total_hours: row.get::<_, Option<f64>>("total_hours")?.unwrap_or(0.0),
        hourly_rate: row.get("hourly_rate")?,
        earnings: row.get::<_, Option<f64>>("earnings")?.unwrap_or(0.0),
    })
}

fn map_settings(row: &Row) -> rusqlite::Result<UserSettings> {
    let start: String = row.get("work_start_time")?;
    let end: String = row.get("work_end_time")?;
    Ok(UserSettings {
        hourly_rate: row.get("hourly_rate")?,
        monthly_goal: row.get("monthly_goal")?,
        work_start_time: parse_clock(3, &start)?,
        work_end_time: parse_clock(4, &end)?,
        notifications_enabled: row.get::<_, i64>("notifications_enabled")? != 0,
        auto_clock_out: row.get::<_, i64>("auto_clock_out")? != 0,
    })
}

fn ensure_settings_row(conn: &Connection, user_id: &str) -> rusqlite::Result<()> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT OR IGNORE INTO user_settings (user_id, created_at, updated_at) VALUES (?1, ?2, ?2)",
        params![user_id, now],
    )?;
    Ok(())
}

/// SQLite file standing in for the hosted relational backend.
///
/// Rows are scoped by `user_id`; nothing crosses accounts.
pub struct SqliteRemoteStore {
    pool: DbPool,
    auth: Arc<AuthSession>,
}

impl SqliteRemoteStore {
    pub fn open(path: &str, auth: Arc<AuthSession>) -> AppResult<Self> {
        let pool = DbPool::new(path)?;
        pool.with_conn(|conn| run_remote_migrations(conn))?;
        Ok(Self { pool, auth })
    }

    pub fn in_memory(auth: Arc<AuthSession>) -> AppResult<Self> {
        let pool = DbPool::in_memory()?;
        pool.with_conn(|conn| run_remote_migrations(conn))?;
        Ok(Self { pool, auth })
    }

    /// Find the account for `email`, creating it on first use.
    pub fn register_user(&self, email: &str) -> AppResult<User> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::InvalidSetting(format!("Invalid email: {email}")));
        }

        self.pool
            .with_conn(|conn| {
                let existing = conn
                    .query_row(
                        "SELECT id, email, created_at FROM users WHERE email = ?1",
                        [&email],
                        |row| {
                            Ok((
                                row.get::<_, String>(0)?,
                                row.get::<_, String>(1)?,
                                row.get::<_, String>(2)?,
                            ))
                        },
                    )
                    .optional()?;

                if let Some((id, email, created_at)) = existing {
                    let created_at = DateTime::parse_from_rfc3339(&created_at)
                        .map(|dt| dt.with_timezone(&Utc))
                        .map_err(|_| {
                            conversion_err(2, format!("Invalid timestamp: {created_at}"))
                        })?;
                    return Ok(User {
                        id,
                        email,
                        created_at,
                    });
                }

                let user = User {
                    id: uuid::Uuid::new_v4().to_string(),
                    email: email.clone(),
                    created_at: Utc::now(),
                };
                conn.execute(
                    "INSERT INTO users (id, email, created_at) VALUES (?1, ?2, ?3)",
                    params![user.id, user.email, user.created_at.to_rfc3339()],
                )?;
                Ok(user)
            })
            .map_err(remote_err)
    }
}

#[async_trait]
impl RemoteStore for SqliteRemoteStore {
    async fn list_shifts(&self) -> AppResult<Vec<Shift>> {
        let user = self.auth.require_user()?;
        self.pool
            .with_conn(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, date, clock_in, clock_out, breaks, total_hours, hourly_rate, earnings
                     FROM shifts
                     WHERE user_id = ?1
                     ORDER BY date DESC, clock_in DESC",
                )?;
                let rows = stmt.query_map([&user.id], map_shift)?;

                let mut out = Vec::new();
                for r in rows {
                    out.push(r?);
                }
                Ok(out)
            })
            .map_err(remote_err)
    }

    async fn shifts_in_range(&self, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<Shift>> {
        let user = self.auth.require_user()?;
        self.pool
            .with_conn(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, date, clock_in, clock_out, breaks, total_hours, hourly_rate, earnings
                     FROM shifts
                     WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3
                     ORDER BY date DESC, clock_in DESC",
                )?;
                let rows = stmt.query_map(
                    params![user.id, start.to_string(), end.to_string()],
                    map_shift,
                )?;

                let mut out = Vec::new();
                for r in rows {
                    out.push(r?);
                }
                Ok(out)
            })
            .map_err(remote_err)
    }

    async fn insert_shift(&self, shift: &Shift) -> AppResult<()> {
        let user = self.auth.require_user()?;
        let breaks = serde_json::to_string(&shift.breaks)?;
        let now = Utc::now().to_rfc3339();

        self.pool
            .with_conn(|conn| {
                conn.execute(
                    "INSERT INTO shifts (id, user_id, date, clock_in, clock_out, breaks,
                                         total_hours, hourly_rate, earnings, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
                    params![
                        shift.id,
                        user.id,
                        shift.date_str(),
                        shift.clock_in.to_rfc3339(),
                        shift.clock_out.map(|t| t.to_rfc3339()),
                        breaks,
                        shift.total_hours,
                        shift.hourly_rate,
                        shift.earnings,
                        now,
                    ],
                )
            })
            .map_err(remote_err)?;
        Ok(())
    }

    async fn update_shift(&self, shift: &Shift) -> AppResult<()> {
        let user = self.auth.require_user()?;
        let breaks = serde_json::to_string(&shift.breaks)?;
        let now = Utc::now().to_rfc3339();

        self.pool
            .with_conn(|conn| {
                conn.execute(
                    "UPDATE shifts
                     SET date = ?1, clock_in = ?2, clock_out = ?3, breaks = ?4,
                         total_hours = ?5, hourly_rate = ?6, earnings = ?7, updated_at = ?8
                     WHERE id = ?9 AND user_id = ?10",
                    params![
                        shift.date_str(),
                        shift.clock_in.to_rfc3339(),
                        shift.clock_out.map(|t| t.to_rfc3339()),
                        breaks,
                        shift.total_hours,
                        shift.hourly_rate,
                        shift.earnings,
                        now,
                        shift.id,
                        user.id,
                    ],
                )
            })
            .map_err(remote_err)?;
        Ok(())
    }

    async fn delete_shift(&self, id: &str) -> AppResult<()> {
        let user = self.auth.require_user()?;
        self.pool
            .with_conn(|conn| {
                conn.execute(
                    "DELETE FROM shifts WHERE id = ?1 AND user_id = ?2",
                    params![id, user.id],
                )
            })
            .map_err(remote_err)?;
        Ok(())
    }

    async fn get_settings(&self) -> AppResult<UserSettings> {
        let user = self.auth.require_user()?;
        self.pool
            .with_conn(|conn| {
                ensure_settings_row(conn, &user.id)?;
                conn.query_row(
                    "SELECT hourly_rate, monthly_goal, work_start_time, work_end_time,
                            notifications_enabled, auto_clock_out
                     FROM user_settings WHERE user_id = ?1",
                    [&user.id],
                    map_settings,
                )
            })
            .map_err(remote_err)
    }

    async fn update_settings(&self, patch: &SettingsPatch) -> AppResult<()> {
        let user = self.auth.require_user()?;
        let now = Utc::now().to_rfc3339();

        self.pool
            .with_conn(|conn| {
                let tx = conn.transaction()?;
                ensure_settings_row(&tx, &user.id)?;

                if let Some(v) = patch.hourly_rate {
                    tx.execute(
                        "UPDATE user_settings SET hourly_rate = ?1 WHERE user_id = ?2",
                        params![v, user.id],
                    )?;
                }
                if let Some(v) = patch.monthly_goal {
                    tx.execute(
                        "UPDATE user_settings SET monthly_goal = ?1 WHERE user_id = ?2",
                        params![v, user.id],
                    )?;
                }
                if let Some(v) = patch.work_start_time {
                    tx.execute(
                        "UPDATE user_settings SET work_start_time = ?1 WHERE user_id = ?2",
                        params![v.format("%H:%M:%S").to_string(), user.id],
                    )?;
                }
                if let Some(v) = patch.work_end_time {
                    tx.execute(
                        "UPDATE user_settings SET work_end_time = ?1 WHERE user_id = ?2",
                        params![v.format("%H:%M:%S").to_string(), user.id],
                    )?;
                }
                if let Some(v) = patch.notifications_enabled {
                    tx.execute(
                        "UPDATE user_settings SET notifications_enabled = ?1 WHERE user_id = ?2",
                        params![v, user.id],
                    )?;
                }
                if let Some(v) = patch.auto_clock_out {
                    tx.execute(
                        "UPDATE user_settings SET auto_clock_out = ?1 WHERE user_id = ?2",
                        params![v, user.id],
                    )?;
                }

                tx.execute(
                    "UPDATE user_settings SET updated_at = ?1 WHERE user_id = ?2",
                    params![now, user.id],
                )?;
                tx.commit()
            })
            .map_err(remote_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::add::{AddLogic, ManualEntry};

    fn store() -> (SqliteRemoteStore, Arc<AuthSession>) {
        let auth = Arc::new(AuthSession::new());
        let store = SqliteRemoteStore::in_memory(auth.clone()).unwrap();
        (store, auth)
    }

    fn shift_on(day: u32) -> Shift {
        AddLogic::build(
            &[],
            &ManualEntry {
                date: NaiveDate::from_ymd_opt(2025, 4, day).unwrap(),
                clock_in: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                clock_out: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
                break_minutes: 30,
            },
            20.0,
            NaiveDate::from_ymd_opt(2025, 4, 30).unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn calls_fail_closed_without_user() {
        let (store, _auth) = store();
        assert!(matches!(
            store.list_shifts().await,
            Err(AppError::NotAuthenticated)
        ));
        assert!(matches!(
            store.insert_shift(&shift_on(1)).await,
            Err(AppError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn shifts_are_scoped_per_user() {
        let (store, auth) = store();
        let ada = store.register_user("ada@example.com").unwrap();
        let bob = store.register_user("bob@example.com").unwrap();

        auth.sign_in(ada.clone());
        let s = shift_on(3);
        store.insert_shift(&s).await.unwrap();
        assert_eq!(store.list_shifts().await.unwrap(), vec![s.clone()]);

        auth.sign_in(bob);
        assert!(store.list_shifts().await.unwrap().is_empty());
        // deleting someone else's row is a no-op
        store.delete_shift(&s.id).await.unwrap();

        auth.sign_in(ada);
        assert_eq!(store.list_shifts().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_and_range_queries() {
        let (store, auth) = store();
        auth.sign_in(store.register_user("ada@example.com").unwrap());

        let mut a = shift_on(2);
        let b = shift_on(20);
        store.insert_shift(&a).await.unwrap();
        store.insert_shift(&b).await.unwrap();

        a.hourly_rate = 30.0;
        a.earnings = 225.0;
        store.update_shift(&a).await.unwrap();

        let start = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 4, 10).unwrap();
        let in_range = store.shifts_in_range(start, end).await.unwrap();
        assert_eq!(in_range, vec![a]);

        let all = store.list_shifts().await.unwrap();
        assert_eq!(all[0].date, b.date);
    }

    #[tokio::test]
    async fn settings_created_lazily_and_patched() {
        let (store, auth) = store();
        auth.sign_in(store.register_user("ada@example.com").unwrap());

        assert_eq!(store.get_settings().await.unwrap(), UserSettings::default());

        let patch = SettingsPatch {
            monthly_goal: Some(2500.0),
            work_end_time: NaiveTime::from_hms_opt(18, 30, 0),
            ..Default::default()
        };
        store.update_settings(&patch).await.unwrap();

        let s = store.get_settings().await.unwrap();
        assert_eq!(s.monthly_goal, 2500.0);
        assert_eq!(s.work_end_time, NaiveTime::from_hms_opt(18, 30, 0).unwrap());
        assert_eq!(s.hourly_rate, 15.0);
    }

    #[test]
    fn register_user_is_idempotent() {
        let (store, _auth) = store();
        let a = store.register_user("Ada@Example.com").unwrap();
        let b = store.register_user("ada@example.com").unwrap();
        assert_eq!(a.id, b.id);
        assert!(store.register_user("not-an-email").is_err());
    }
}
