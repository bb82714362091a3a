//! Promoter account row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A sales representative ("promotor") with an account on the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Promoter {
    pub id: i64,
    pub email: String,

    /// Salted password hash; never serialized out.
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub name: String,

    /// Account role tag ("promotor" today, "admin" reserved).
    pub role: String,

    /// Operating region (zona).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zona: Option<String>,

    /// Count of clients currently in "activo" status. Recomputed on every
    /// client mutation.
    pub clientes_activos: i64,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
