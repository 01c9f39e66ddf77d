//! Account role types.

use serde::{Deserialize, Serialize};

/// Account permission level.
///
/// Wire format: `u8` (0 = Student, 1 = Staff). Staff is the privileged role
/// capped by the admin quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountRole {
    Student = 0,
    Staff = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown account role: {0}")]
pub struct UnknownRole(pub u8);

impl AccountRole {
    /// Convert from `u8` wire value. Returns `None` for unknown values.
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Student),
            1 => Some(Self::Staff),
            _ => None,
        }
    }

    /// Convert to `u8` wire value.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn is_privileged(self) -> bool {
        matches!(self, Self::Staff)
    }
}

impl TryFrom<u8> for AccountRole {
    type Error = UnknownRole;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        Self::from_u8(v).ok_or(UnknownRole(v))
    }
}
