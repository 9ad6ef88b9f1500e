//! Clock-in / break / clock-out state machine.
//!
//! ```text
//! idle --clock_in--> clocked-in --start_break--> on-break
//!  ^                   |  ^                         |
//!  |                   |  +-------- end_break ------+
//!  +---- clock_out ----+ (also from on-break)
//! ```
//!
//! The in-progress session is cached on the device under `status`,
//! `current_clock_in` and `current_breaks` so it survives restarts.

use crate::errors::{AppError, AppResult};
use crate::core::engine::local_datetime;
use crate::models::session::{SessionState, Status};
use crate::models::settings::UserSettings;
use crate::models::shift::Break;
use crate::store::local::{LocalStore, get_json, keys, set_json};
use chrono::{DateTime, Local};
use std::sync::Arc;
use tokio::sync::{Mutex, watch};
use tracing::{debug, warn};

/// A session that has been closed and is ready to become a `Shift`.
#[derive(Debug, Clone, PartialEq)]
pub struct FinishedSession {
    pub clock_in: DateTime<Local>,
    pub clock_out: DateTime<Local>,
    pub breaks: Vec<Break>,
}

fn transition_err(status: Status, action: &'static str) -> AppError {
    AppError::InvalidTransition { status, action }
}

/// Pure transition function. Returns the next state or the reason the
/// action is not allowed from `state`.
pub fn next_state(state: &SessionState, action: SessionAction) -> AppResult<SessionState> {
    match (state.status, action) {
        (Status::Idle, SessionAction::ClockIn(now)) => Ok(SessionState {
            status: Status::ClockedIn,
            clock_in_time: Some(now),
            current_breaks: Vec::new(),
        }),
        (Status::ClockedIn, SessionAction::StartBreak(now)) => {
            let mut next = state.clone();
            next.status = Status::OnBreak;
            next.current_breaks.push(Break::open(now));
            Ok(next)
        }
        (Status::OnBreak, SessionAction::EndBreak(now)) => {
            let mut next = state.clone();
            next.status = Status::ClockedIn;
            if let Some(open) = next.current_breaks.last_mut()
                && open.is_open()
            {
                open.end = Some(now.max(open.start));
            }
            Ok(next)
        }
        (status, action) => Err(transition_err(status, action.verb())),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionAction {
    ClockIn(DateTime<Local>),
    StartBreak(DateTime<Local>),
    EndBreak(DateTime<Local>),
}

impl SessionAction {
    fn verb(&self) -> &'static str {
        match self {
            SessionAction::ClockIn(_) => "clock in",
            SessionAction::StartBreak(_) => "start a break",
            SessionAction::EndBreak(_) => "end a break",
        }
    }
}

/// Close the session at `now`.
///
/// Breaks are clipped to `[clock_in, now]`: one still open is closed at
/// `now`, and one starting at or after `now` is dropped.
pub fn finish(state: &SessionState, now: DateTime<Local>) -> AppResult<FinishedSession> {
    if state.status == Status::Idle {
        return Err(transition_err(Status::Idle, "clock out"));
    }

    let clock_in = state
        .clock_in_time
        .ok_or_else(|| AppError::InvalidShift("Session has no clock in time".into()))?;

    let breaks = state
        .current_breaks
        .iter()
        .filter(|b| b.start < now)
        .map(|b| {
            let start = b.start.max(clock_in);
            let end = b.end.unwrap_or(now).min(now).max(start);
            Break::closed(start, end)
        })
        .collect();

    Ok(FinishedSession {
        clock_in,
        clock_out: now,
        breaks,
    })
}

/// Instant at which an open session should be clocked out automatically:
/// the configured work end time on the clock-in day, once `now` is past it.
pub fn auto_clock_out_at(
    state: &SessionState,
    settings: &UserSettings,
    now: DateTime<Local>,
) -> Option<DateTime<Local>> {
    if !settings.auto_clock_out || state.status == Status::Idle {
        return None;
    }
    let clock_in = state.clock_in_time?;
    let end = local_datetime(clock_in.date_naive().and_time(settings.work_end_time)).ok()?;
    (end > clock_in && now >= end).then_some(end)
}

/// Owns the in-progress session and keeps its device cache current.
pub struct SessionManager {
    state: watch::Sender<SessionState>,
    local: Arc<dyn LocalStore>,
    writes: Mutex<()>,
}

impl SessionManager {
    pub fn new(local: Arc<dyn LocalStore>) -> Self {
        Self {
            state: watch::Sender::new(SessionState::default()),
            local,
            writes: Mutex::new(()),
        }
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn status(&self) -> Status {
        self.state.borrow().status
    }

    /// Restore a session interrupted by a restart.
    ///
    /// Inconsistent cached values (e.g. clocked-in without a clock-in time)
    /// reset the session to idle.
    pub async fn load(&self) -> AppResult<()> {
        let _guard = self.writes.lock().await;
        let local = self.local.as_ref();

        let status: Status = get_json(local, keys::STATUS)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "unreadable session status");
                None
            })
            .unwrap_or_default();
        let clock_in_time: Option<DateTime<Local>> =
            get_json(local, keys::CURRENT_CLOCK_IN).await.unwrap_or(None);
        let current_breaks: Vec<Break> = get_json(local, keys::CURRENT_BREAKS)
            .await
            .unwrap_or(None)
            .unwrap_or_default();

        let restored = match (status, clock_in_time) {
            (Status::Idle, _) => SessionState::default(),
            (_, None) => {
                warn!(%status, "session without clock-in time, resetting to idle");
                SessionState::default()
            }
            (status, Some(t)) => SessionState {
                status,
                clock_in_time: Some(t),
                current_breaks,
            },
        };

        debug!(status = %restored.status, "session restored");
        self.state.send_replace(restored);
        Ok(())
    }

    pub async fn clock_in(&self, now: DateTime<Local>) -> AppResult<SessionState> {
        self.transition(SessionAction::ClockIn(now)).await
    }

    pub async fn start_break(&self, now: DateTime<Local>) -> AppResult<SessionState> {
        self.transition(SessionAction::StartBreak(now)).await
    }

    pub async fn end_break(&self, now: DateTime<Local>) -> AppResult<SessionState> {
        self.transition(SessionAction::EndBreak(now)).await
    }

    /// Close the session at `now` and hand it to `store`, holding the
    /// session lock throughout so a second clock-out waits and then fails.
    ///
    /// The session goes idle first; if `store` fails, the running session is
    /// put back and the error returned.
    pub async fn clock_out<F, Fut, T>(&self, now: DateTime<Local>, store: F) -> AppResult<T>
    where
        F: FnOnce(FinishedSession) -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let _guard = self.writes.lock().await;
        let previous = self.snapshot();
        let finished = finish(&previous, now)?;

        self.commit(SessionState::default()).await?;

        match store(finished).await {
            Ok(out) => Ok(out),
            Err(e) => {
                warn!(error = %e, "could not store finished shift, resuming session");
                self.state.send_replace(previous.clone());
                if let Err(resume) = self.persist(&previous).await {
                    warn!(error = %resume, "could not save resumed session");
                }
                Err(e)
            }
        }
    }

    /// Return to idle once the finished shift has been stored.
    pub async fn reset(&self) -> AppResult<()> {
        let _guard = self.writes.lock().await;
        self.commit(SessionState::default()).await
    }

    async fn transition(&self, action: SessionAction) -> AppResult<SessionState> {
        let _guard = self.writes.lock().await;
        let next = next_state(&self.snapshot(), action)?;
        self.commit(next.clone()).await?;
        debug!(status = %next.status, "session transition");
        Ok(next)
    }

    /// Publish `next`, then persist it; a failed write restores the previous state.
    async fn commit(&self, next: SessionState) -> AppResult<()> {
        let previous = self.state.send_replace(next.clone());

        if let Err(e) = self.persist(&next).await {
            warn!(error = %e, "could not save session, rolling back");
            self.state.send_replace(previous.clone());
            // best effort to put the cache back in line with memory
            let _ = self.persist(&previous).await;
            return Err(e);
        }
        Ok(())
    }

    async fn persist(&self, state: &SessionState) -> AppResult<()> {
        let local = self.local.as_ref();
        set_json(local, keys::STATUS, &state.status).await?;

        match state.clock_in_time {
            Some(t) => set_json(local, keys::CURRENT_CLOCK_IN, &t).await?,
            None => local.remove(keys::CURRENT_CLOCK_IN).await?,
        }

        if state.current_breaks.is_empty() {
            local.remove(keys::CURRENT_BREAKS).await
        } else {
            set_json(local, keys::CURRENT_BREAKS, &state.current_breaks).await
        }
    }
}
