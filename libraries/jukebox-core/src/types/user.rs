/// User domain type
use serde::{Deserialize, Serialize};

pub type UserId = i64;

/// User account (referenced as owner only)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: UserId,

    /// Display name
    pub name: String,

    /// Account creation timestamp (ISO string)
    pub created_at: String,
}
