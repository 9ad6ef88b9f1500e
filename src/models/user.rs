use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Authenticated account on the remote backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}
