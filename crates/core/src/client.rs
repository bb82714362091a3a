//! Client (prospect/customer) rows managed by promoters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pipeline status of a client. Wire values stay in Spanish — they are the
/// stored values the original dataset uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    /// A lead not yet converted.
    Prospecto,
    /// An active, transacting client.
    Activo,
    /// A churned or paused client.
    Inactivo,
}

impl ClientStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ClientStatus::Prospecto => "prospecto",
            ClientStatus::Activo => "activo",
            ClientStatus::Inactivo => "inactivo",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "prospecto" => Some(ClientStatus::Prospecto),
            "activo" => Some(ClientStatus::Activo),
            "inactivo" => Some(ClientStatus::Inactivo),
            _ => None,
        }
    }
}

impl Default for ClientStatus {
    fn default() -> Self {
        ClientStatus::Prospecto
    }
}

impl std::fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A client record owned by one promoter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    pub promotor_id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_type: Option<String>,
    pub status: ClientStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_contact: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips() {
        for s in ["prospecto", "activo", "inactivo"] {
            assert_eq!(ClientStatus::parse(s).unwrap().as_str(), s);
        }
        assert_eq!(ClientStatus::parse("lead"), None);
    }

    #[test]
    fn status_serializes_spanish_lowercase() {
        let json = serde_json::to_string(&ClientStatus::Activo).unwrap();
        assert_eq!(json, "\"activo\"");
    }

    #[test]
    fn default_status_is_prospecto() {
        assert_eq!(ClientStatus::default(), ClientStatus::Prospecto);
    }
}
