//! User role domain types.

use serde::{Deserialize, Serialize};

/// Campus user role, ordered by privilege.
///
/// Wire format: `u8` (0 = Student, 1 = SubTeacher, 2 = ClassTeacher,
/// 3 = SubAdmin, 4 = SuperAdmin).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Student = 0,
    SubTeacher = 1,
    ClassTeacher = 2,
    #[serde(rename = "subadmin")]
    SubAdmin = 3,
    #[serde(rename = "superadmin")]
    SuperAdmin = 4,
}

impl UserRole {
    /// Convert from `u8` wire value. Returns `None` for unknown values.
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Student),
            1 => Some(Self::SubTeacher),
            2 => Some(Self::ClassTeacher),
            3 => Some(Self::SubAdmin),
            4 => Some(Self::SuperAdmin),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Whether this role may present a class session (issue and revoke session codes).
    pub fn can_present(self) -> bool {
        self >= Self::SubTeacher
    }
}

impl PartialOrd for UserRole {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for UserRole {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_u8().cmp(&other.as_u8())
    }
}
