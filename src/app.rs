//! Application state shared by every front end.
//!
//! `AppState` owns the synchronized collections and the in-progress session,
//! with the stores injected at construction. Lifecycle:
//!
//! 1. `init` restores the signed-in user and loads every collection from the
//!    device (Phase 1), then starts remote reconciliation (Phase 2) in the
//!    background.
//! 2. Operations mutate state optimistically through the repositories.
//! 3. `teardown` gives the background reconciliation a bounded amount of
//!    time to finish before abandoning it.

use crate::core::add::{AddLogic, ManualEntry};
use crate::core::edit::{EditLogic, ShiftPatch};
use crate::core::engine::{compute_shift, positive_amount};
use crate::core::session::{SessionManager, auto_clock_out_at};
use crate::core::summary::{MonthSummary, month_summary};
use crate::errors::{AppError, AppResult};
use crate::export::{Period, Timesheet};
use crate::models::session::SessionState;
use crate::models::settings::{SettingsPatch, UserSettings};
use crate::models::shift::{Shift, ShiftChange};
use crate::models::user::User;
use crate::store::{AuthEvent, AuthSession, LocalStore, RemoteStore};
use crate::sync::{SettingsMirror, SettingsRepository, ShiftsMirror, ShiftsRepository};
use chrono::{DateTime, Local, NaiveDate, NaiveTime};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Which collections adopted the remote copy during a reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub shifts: bool,
    pub settings: bool,
}

pub struct AppState {
    local: Arc<dyn LocalStore>,
    auth: Arc<AuthSession>,
    shifts: Arc<ShiftsRepository>,
    settings: Arc<SettingsRepository>,
    session: SessionManager,
    background: parking_lot::Mutex<Option<JoinHandle<ReconcileReport>>>,
}

async fn reconcile_all(
    shifts: &ShiftsRepository,
    settings: &SettingsRepository,
) -> ReconcileReport {
    let (shifts, settings) = tokio::join!(shifts.reconcile(), settings.reconcile());
    ReconcileReport { shifts, settings }
}

impl AppState {
    pub fn new(
        local: Arc<dyn LocalStore>,
        remote: Arc<dyn RemoteStore>,
        auth: Arc<AuthSession>,
    ) -> Self {
        let shifts = Arc::new(ShiftsRepository::new(
            local.clone(),
            Arc::new(ShiftsMirror::new(remote.clone())),
        ));
        let settings = Arc::new(SettingsRepository::new(
            local.clone(),
            Arc::new(SettingsMirror::new(remote)),
        ));
        Self {
            session: SessionManager::new(local.clone()),
            local,
            auth,
            shifts,
            settings,
            background: parking_lot::Mutex::new(None),
        }
    }

    pub fn auth(&self) -> &Arc<AuthSession> {
        &self.auth
    }

    pub fn shifts(&self) -> &ShiftsRepository {
        &self.shifts
    }

    pub fn settings(&self) -> &SettingsRepository {
        &self.settings
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn current_user(&self) -> Option<User> {
        self.auth.current_user()
    }

    // ---------------------------
    // Lifecycle
    // ---------------------------

    /// Phase 1 for everything, then Phase 2 in the background.
    pub async fn init(&self) -> AppResult<()> {
        match self.auth.restore(self.local.as_ref()).await {
            Ok(Some(user)) => debug!(user = %user.email, "session restored"),
            Ok(None) => debug!("no saved session"),
            Err(e) => warn!(error = %e, "could not restore saved session"),
        }

        self.load_local().await?;
        self.spawn_reconcile();
        Ok(())
    }

    async fn load_local(&self) -> AppResult<()> {
        self.shifts.load_local().await?;
        self.settings.load_local().await?;
        self.session.load().await
    }

    fn spawn_reconcile(&self) {
        let shifts = self.shifts.clone();
        let settings = self.settings.clone();
        let handle = tokio::spawn(async move { reconcile_all(&shifts, &settings).await });

        if let Some(previous) = self.background.lock().replace(handle) {
            previous.abort();
        }
    }

    /// Wait for the background reconciliation started by `init`.
    pub async fn reconciled(&self) -> ReconcileReport {
        let handle = self.background.lock().take();
        match handle {
            Some(h) => h.await.unwrap_or_default(),
            None => ReconcileReport::default(),
        }
    }

    /// Give background work up to `timeout`, then abandon it.
    pub async fn teardown(&self, timeout: Duration) {
        let Some(mut handle) = self.background.lock().take() else {
            return;
        };

        match tokio::time::timeout(timeout, &mut handle).await {
            Ok(Ok(report)) => debug!(?report, "background reconciliation finished"),
            Ok(Err(e)) => warn!(error = %e, "background reconciliation task failed"),
            Err(_) => {
                warn!(?timeout, "remote store did not answer in time, abandoning sync");
                handle.abort();
            }
        }
    }

    /// Reconcile now and wait for the result.
    pub async fn sync_now(&self) -> AppResult<ReconcileReport> {
        self.auth.require_user()?;
        if let Some(h) = self.background.lock().take() {
            h.abort();
        }
        Ok(reconcile_all(&self.shifts, &self.settings).await)
    }

    // ---------------------------
    // Authentication
    // ---------------------------

    /// Sign in, then reload so the account's data replaces what was shown.
    pub async fn sign_in(&self, user: User) -> AppResult<ReconcileReport> {
        self.auth.sign_in(user);
        self.auth.persist(self.local.as_ref()).await?;
        self.reload().await
    }

    pub async fn sign_out(&self) -> AppResult<()> {
        self.auth.sign_out();
        self.auth.persist(self.local.as_ref()).await?;
        self.forget_account().await
    }

    async fn reload(&self) -> AppResult<ReconcileReport> {
        self.load_local().await?;
        Ok(reconcile_all(&self.shifts, &self.settings).await)
    }

    /// Drop in-memory and cached data of the signed-out account.
    async fn forget_account(&self) -> AppResult<()> {
        if let Some(h) = self.background.lock().take() {
            h.abort();
        }
        self.shifts.clear().await;
        self.settings.clear().await;
        self.session.reset().await?;
        // usable again right away, starting from defaults
        self.shifts.load_local().await?;
        self.settings.load_local().await
    }

    pub async fn handle_auth_event(&self, event: AuthEvent) -> AppResult<()> {
        match event {
            AuthEvent::SignedIn(user) => {
                info!(user = %user.email, "signed in, reloading");
                self.reload().await.map(|_| ())
            }
            AuthEvent::SignedOut => {
                info!("signed out, clearing state");
                self.forget_account().await
            }
        }
    }

    /// React to sign-in/out performed anywhere on the shared `AuthSession`.
    pub fn spawn_auth_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let app = Arc::clone(self);
        let mut events = app.auth.subscribe();

        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        if let Err(e) = app.handle_auth_event(event).await {
                            warn!(error = %e, "could not apply auth change");
                        }
                    }
                    Err(RecvError::Lagged(n)) => warn!(skipped = n, "auth events lagged"),
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    // ---------------------------
    // Session
    // ---------------------------

    pub async fn clock_in(&self, now: DateTime<Local>) -> AppResult<SessionState> {
        self.session.clock_in(now).await
    }

    pub async fn start_break(&self, now: DateTime<Local>) -> AppResult<SessionState> {
        self.session.start_break(now).await
    }

    pub async fn end_break(&self, now: DateTime<Local>) -> AppResult<SessionState> {
        self.session.end_break(now).await
    }

    /// Turn the running session into a stored shift at the current rate.
    ///
    /// Either both the shift is stored and the session is idle, or neither
    /// changed.
    pub async fn clock_out(&self, now: DateTime<Local>) -> AppResult<Shift> {
        let shift = self
            .session
            .clock_out(now, move |finished| async move {
                let rate = self.settings.snapshot().hourly_rate;
                let totals =
                    compute_shift(finished.clock_in, finished.clock_out, &finished.breaks, rate)?;

                let shift = Shift {
                    id: Shift::new_id(),
                    date: finished.clock_in.date_naive(),
                    clock_in: finished.clock_in,
                    clock_out: Some(finished.clock_out),
                    breaks: finished.breaks,
                    total_hours: totals.total_hours,
                    hourly_rate: rate,
                    earnings: totals.earnings,
                };

                let stored = shift.clone();
                self.shifts
                    .mutate(move |list| {
                        let mut next = list.clone();
                        next.push(stored.clone());
                        Ok((next, ShiftChange::Insert(stored)))
                    })
                    .await?;
                Ok(shift)
            })
            .await?;

        info!(id = %shift.id, hours = shift.total_hours, "clocked out");
        Ok(shift)
    }

    /// Clock out at the configured work end time if the session overran it.
    pub async fn apply_auto_clock_out(&self, now: DateTime<Local>) -> AppResult<Option<Shift>> {
        let at = auto_clock_out_at(&self.session.snapshot(), &self.settings.snapshot(), now);
        match at {
            Some(at) => self.clock_out(at).await.map(Some),
            None => Ok(None),
        }
    }

    // ---------------------------
    // Shifts
    // ---------------------------

    pub async fn add_shift(&self, entry: ManualEntry, today: NaiveDate) -> AppResult<Shift> {
        let rate = self.settings.snapshot().hourly_rate;
        let list = self
            .shifts
            .mutate(move |list| {
                let shift = AddLogic::build(list, &entry, rate, today)?;
                let mut next = list.clone();
                next.push(shift.clone());
                Ok((next, ShiftChange::Insert(shift)))
            })
            .await?;
        list.last()
            .cloned()
            .ok_or_else(|| AppError::Other("added shift missing".into()))
    }

    pub async fn update_shift(
        &self,
        id: &str,
        patch: ShiftPatch,
        today: NaiveDate,
    ) -> AppResult<Shift> {
        let id = id.to_string();
        let target = id.clone();
        let list = self
            .shifts
            .mutate(move |list| {
                let edited = EditLogic::apply(list, &target, &patch, today)?;
                let next = list
                    .iter()
                    .map(|s| if s.id == target { edited.clone() } else { s.clone() })
                    .collect();
                Ok((next, ShiftChange::Update(edited)))
            })
            .await?;
        list.into_iter()
            .find(|s| s.id == id)
            .ok_or(AppError::ShiftNotFound(id))
    }

    pub async fn delete_shift(&self, id: &str) -> AppResult<Shift> {
        let target = id.to_string();
        let removed = self
            .shifts
            .snapshot()
            .into_iter()
            .find(|s| s.id == id)
            .ok_or_else(|| AppError::ShiftNotFound(id.to_string()))?;

        self.shifts
            .mutate(move |list| {
                if !list.iter().any(|s| s.id == target) {
                    return Err(AppError::ShiftNotFound(target));
                }
                let next = list.iter().filter(|s| s.id != target).cloned().collect();
                Ok((next, ShiftChange::Delete(target)))
            })
            .await?;
        Ok(removed)
    }

    // ---------------------------
    // Settings
    // ---------------------------

    /// Write only the fields present in `patch`.
    pub async fn update_settings(&self, patch: SettingsPatch) -> AppResult<UserSettings> {
        if let Some(v) = patch.hourly_rate {
            positive_amount(v, "Hourly rate")?;
        }
        if let Some(v) = patch.monthly_goal {
            positive_amount(v, "Monthly goal")?;
        }

        self.settings
            .mutate(move |current| {
                let next = current.apply(&patch);
                let moves_hours = patch.work_start_time.is_some() || patch.work_end_time.is_some();
                if moves_hours && next.work_end_time <= next.work_start_time {
                    return Err(AppError::InvalidSetting(
                        "Work end time must be after work start time".into(),
                    ));
                }
                Ok((next, patch))
            })
            .await
    }

    pub async fn set_hourly_rate(&self, rate: f64) -> AppResult<UserSettings> {
        self.update_settings(SettingsPatch {
            hourly_rate: Some(rate),
            ..Default::default()
        })
        .await
    }

    pub async fn set_monthly_goal(&self, goal: f64) -> AppResult<UserSettings> {
        self.update_settings(SettingsPatch {
            monthly_goal: Some(goal),
            ..Default::default()
        })
        .await
    }

    pub async fn set_work_hours(
        &self,
        start: NaiveTime,
        end: NaiveTime,
    ) -> AppResult<UserSettings> {
        self.update_settings(SettingsPatch {
            work_start_time: Some(start),
            work_end_time: Some(end),
            ..Default::default()
        })
        .await
    }

    pub async fn set_notifications_enabled(&self, enabled: bool) -> AppResult<UserSettings> {
        self.update_settings(SettingsPatch {
            notifications_enabled: Some(enabled),
            ..Default::default()
        })
        .await
    }

    pub async fn set_auto_clock_out(&self, enabled: bool) -> AppResult<UserSettings> {
        self.update_settings(SettingsPatch {
            auto_clock_out: Some(enabled),
            ..Default::default()
        })
        .await
    }

    // ---------------------------
    // Reports
    // ---------------------------

    pub fn month_summary(&self, year: i32, month: u32) -> MonthSummary {
        let goal = self.settings.snapshot().monthly_goal;
        month_summary(&self.shifts.snapshot(), year, month, goal)
    }

    pub fn timesheet(&self, period: &Period, today: NaiveDate) -> Timesheet {
        Timesheet::build(&self.shifts.snapshot(), period, today)
    }
}
