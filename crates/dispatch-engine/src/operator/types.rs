//! Core types for operator management

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier for any chat participant, operator or customer
///
/// Operators and customers share one id space (the chat platform's numeric
/// user id), which is what lets the session relay treat the two ends of a
/// tunnel symmetrically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartyId(pub i64);

impl From<i64> for PartyId {
    fn from(id: i64) -> Self {
        PartyId(id)
    }
}

impl fmt::Display for PartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Operator role
///
/// The main operator manages the roster and never receives assignments; only
/// admin-role operators appear in the online snapshot that round robin cycles
/// through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperatorRole {
    /// Roster manager; fixed at registry construction, cannot be removed
    Main,

    /// Regular operator eligible for order assignment while online
    Admin,
}

impl fmt::Display for OperatorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatorRole::Main => write!(f, "main"),
            OperatorRole::Admin => write!(f, "admin"),
        }
    }
}

/// Operator availability status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperatorStatus {
    /// Eligible for new assignments
    Online,

    /// Not eligible; the default for a freshly registered operator
    Offline,
}

impl std::str::FromStr for OperatorStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "online" | "Online" | "ONLINE" => Ok(OperatorStatus::Online),
            "offline" | "Offline" | "OFFLINE" => Ok(OperatorStatus::Offline),
            _ => Err(format!("Unknown operator status: {}", s)),
        }
    }
}

impl fmt::Display for OperatorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatorStatus::Online => write!(f, "online"),
            OperatorStatus::Offline => write!(f, "offline"),
        }
    }
}

/// Operator roster entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operator {
    /// Unique operator identifier
    pub id: PartyId,

    /// Roster role
    pub role: OperatorRole,

    /// Current availability status
    pub status: OperatorStatus,

    /// When the status last changed (registration time for new entries)
    pub status_changed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_common_spellings() {
        assert_eq!("online".parse::<OperatorStatus>().unwrap(), OperatorStatus::Online);
        assert_eq!("OFFLINE".parse::<OperatorStatus>().unwrap(), OperatorStatus::Offline);
        assert!("away".parse::<OperatorStatus>().is_err());
    }
}
