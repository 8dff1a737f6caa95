//! Command/query facade over the entity store.
//!
//! Each command runs as one store transaction: load the rows it needs,
//! run the workflow on copies, and commit only when everything passed.
//! Queries hand back cloned snapshots.

mod attendance;
mod employee;
mod leave;
mod pams;
mod payroll;
mod profile;
mod promotion;
mod provident_fund;
mod resignation;
mod users;

pub use attendance::{AttendanceFilter, CorrectionFilter, MarkAttendance, NewCorrection};
pub use employee::{LeaveBalances, NewEmployee};
pub use leave::{LeaveFilter, NewLeave};
pub use pams::{NewPams, PamsFilter, PamsResubmission};
pub use promotion::NewPromotion;
pub use provident_fund::NewPfRequest;
pub use resignation::NewResignation;

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};

use crate::clock::Clock;
use crate::config::Policy;
use crate::error::{HrError, HrResult};
use crate::model::role::Role;
use crate::store::EntityStore;
use crate::workflow::Actor;

pub struct HrService {
    store: EntityStore,
    policy: Policy,
    clock: Arc<dyn Clock>,
}

impl HrService {
    pub fn new(policy: Policy, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: EntityStore::new(policy.payroll.clone()),
            policy,
            clock,
        }
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn today(&self) -> NaiveDate {
        self.clock.today()
    }
}

fn require_role(actor: &Actor, allowed: &[Role], what: &str) -> HrResult<()> {
    if allowed.contains(&actor.role) {
        Ok(())
    } else {
        Err(HrError::forbidden(format!("{} is not permitted to {}", actor.role.label(), what)))
    }
}

/// Owner of the record, or one of the privileged roles.
fn require_self_or(actor: &Actor, employee_id: u64, allowed: &[Role], what: &str) -> HrResult<()> {
    if actor.owns(employee_id) || allowed.contains(&actor.role) {
        Ok(())
    } else {
        Err(HrError::forbidden(format!("{} is not permitted to {}", actor.role.label(), what)))
    }
}

/// The employee record linked to the acting user.
fn own_employee_id(actor: &Actor) -> HrResult<u64> {
    actor
        .employee_id
        .ok_or_else(|| HrError::forbidden("No employee profile"))
}

fn require_text(value: &str, field: &str, min_len: usize) -> HrResult<()> {
    let len = value.trim().chars().count();
    if len == 0 {
        Err(HrError::validation(format!("{} is required", field)))
    } else if len < min_len {
        Err(HrError::validation(format!(
            "{} must be at least {} characters",
            field, min_len
        )))
    } else {
        Ok(())
    }
}

/// Reviewer and approver roles, i.e. everyone who may read other people's requests.
const REVIEWERS: &[Role] = &[
    Role::Admin,
    Role::Hr,
    Role::Hod,
    Role::Dean,
    Role::Vc,
    Role::President,
];

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::clock::FixedClock;

    pub const AYESHA: u64 = 1;
    pub const RAFIQ: u64 = 2;
    pub const JUNIOR: u64 = 3;

    pub fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub fn actor(role: Role, employee_id: Option<u64>) -> Actor {
        Actor::new(format!("{} user", role.label()), role, employee_id)
    }

    pub fn hr() -> Actor {
        actor(Role::Hr, None)
    }

    pub fn employee_actor(id: u64) -> Actor {
        actor(Role::Employee, Some(id))
    }

    /// Service pinned to 2026-03-01 09:00 with three employees:
    /// Ayesha (female, joined 2019, born 1985), Rafiq (male, joined 2015,
    /// born 1970) and a junior hire (female, joined 2025).
    pub fn service() -> HrService {
        service_at(FixedClock::on(today()).0)
    }

    pub fn service_at(now: DateTime<Utc>) -> HrService {
        let service = HrService::new(Policy::default(), Arc::new(FixedClock(now)));
        let admin = actor(Role::Admin, None);
        let people = [
            ("EMP-001", "Ayesha Karim", "female", date(1985, 4, 12), date(2019, 7, 1)),
            ("EMP-002", "Rafiq Islam", "male", date(1970, 1, 20), date(2015, 1, 5)),
            ("EMP-003", "Tania Sultana", "Female", date(1998, 9, 9), date(2025, 8, 1)),
        ];
        for (code, name, gender, dob, joined) in people {
            service
                .create_employee(
                    &admin,
                    NewEmployee {
                        code: code.into(),
                        name: name.into(),
                        email: format!("{}@university.edu", code.to_lowercase()),
                        gender: gender.into(),
                        date_of_birth: Some(dob),
                        joining_date: joined,
                        department: "Computer Science".into(),
                        faculty: "Engineering".into(),
                        designation: "Assistant Professor".into(),
                        salary_base: 90_000.0,
                        pf_balance: 100_000.0,
                    },
                )
                .unwrap();
        }
        service
    }
}
