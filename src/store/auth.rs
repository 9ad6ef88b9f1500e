use crate::errors::{AppError, AppResult};
use crate::models::user::User;
use crate::store::local::{LocalStore, get_json, keys, set_json};
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    SignedIn(User),
    SignedOut,
}

/// Who is signed in. Remote calls fail closed when nobody is.
pub struct AuthSession {
    user: RwLock<Option<User>>,
    events: broadcast::Sender<AuthEvent>,
}

impl Default for AuthSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthSession {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            user: RwLock::new(None),
            events,
        }
    }

    pub fn current_user(&self) -> Option<User> {
        self.user.read().clone()
    }

    pub fn require_user(&self) -> AppResult<User> {
        self.current_user().ok_or(AppError::NotAuthenticated)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    pub fn sign_in(&self, user: User) {
        *self.user.write() = Some(user.clone());
        debug!(user = %user.email, "signed in");
        // no subscribers is fine
        let _ = self.events.send(AuthEvent::SignedIn(user));
    }

    pub fn sign_out(&self) {
        let previous = self.user.write().take();
        if previous.is_some() {
            debug!("signed out");
            let _ = self.events.send(AuthEvent::SignedOut);
        }
    }

    /// Reload a persisted session without emitting an event.
    pub async fn restore(&self, local: &dyn LocalStore) -> AppResult<Option<User>> {
        let user: Option<User> = get_json(local, keys::AUTH_SESSION).await?;
        *self.user.write() = user.clone();
        Ok(user)
    }

    pub async fn persist(&self, local: &dyn LocalStore) -> AppResult<()> {
        match self.current_user() {
            Some(user) => set_json(local, keys::AUTH_SESSION, &user).await,
            None => local.remove(keys::AUTH_SESSION).await,
        }
    }
}
