use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::Role;

/// The signed-in user's record as returned by `GET /users/me`.
///
/// Only `role` matters to routing. The backend echoes whatever it stores for
/// the user, so every other field is optional and unknown fields are kept in
/// `extra`. The body must be a JSON object; anything else fails to parse.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Raw role value. Non-string values are read as missing.
    #[serde(
        default,
        deserialize_with = "string_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub role: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Profile {
    pub fn with_role(role: impl Into<String>) -> Self {
        Self {
            role: Some(role.into()),
            ..Self::default()
        }
    }

    /// Effective role. Missing and unrecognized values fall back to employee.
    pub fn role(&self) -> Role {
        self.role
            .as_deref()
            .map(Role::from_profile_value)
            .unwrap_or_default()
    }

    /// True when `role` is one of the three known spellings.
    pub fn has_recognized_role(&self) -> bool {
        self.role.as_deref().and_then(Role::parse_exact).is_some()
    }
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}
