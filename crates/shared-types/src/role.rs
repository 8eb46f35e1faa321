use serde::{Deserialize, Serialize};
use std::fmt;

/// Authorization category of a user, as recorded by the backend profile.
///
/// The identity provider only knows *who* a user is; the role always comes
/// from `GET /users/me`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[default]
    Employee,
    Manager,
    Admin,
}

impl Role {
    /// Parse a profile `role` value. Matching is case-sensitive and anything
    /// other than `MANAGER` or `ADMIN` is treated as an employee.
    pub fn from_profile_value(s: &str) -> Self {
        Self::parse_exact(s).unwrap_or_default()
    }

    /// Parse only the three wire spellings. Used to tell a known employee
    /// apart from an unrecognized value when logging.
    pub fn parse_exact(s: &str) -> Option<Self> {
        match s {
            "EMPLOYEE" => Some(Role::Employee),
            "MANAGER" => Some(Role::Manager),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }

    /// Wire spelling used by the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Employee => "EMPLOYEE",
            Role::Manager => "MANAGER",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
