use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Admin = 1,
    Hr = 2,
    Employee = 3,
    Hod = 4,
    Dean = 5,
    Vc = 6,
    President = 7,
    Finance = 8,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Admin),
            2 => Some(Role::Hr),
            3 => Some(Role::Employee),
            4 => Some(Role::Hod),
            5 => Some(Role::Dean),
            6 => Some(Role::Vc),
            7 => Some(Role::President),
            8 => Some(Role::Finance),
            _ => None,
        }
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    /// Human readable label used in audit trails.
    pub fn label(self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Hr => "HR",
            Role::Employee => "Employee",
            Role::Hod => "HOD",
            Role::Dean => "Dean",
            Role::Vc => "VC",
            Role::President => "President",
            Role::Finance => "Finance",
        }
    }

    pub fn is_hr_or_admin(self) -> bool {
        matches!(self, Role::Hr | Role::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn role_ids_round_trip() {
        for id in 1..=8u8 {
            let role = Role::from_id(id).unwrap();
            assert_eq!(role.id(), id);
        }
        assert_eq!(Role::from_id(0), None);
        assert_eq!(Role::from_id(9), None);
    }

    #[test]
    fn parses_lowercase_names() {
        assert_eq!(Role::from_str("hod").unwrap(), Role::Hod);
        assert_eq!(Role::Vc.to_string(), "vc");
        assert_eq!(Role::Vc.label(), "VC");
    }
}
