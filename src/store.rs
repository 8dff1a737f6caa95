//! In-process entity store.
//!
//! Every table lives behind one lock. A command takes the write lock once,
//! validates against the current rows, and only then commits the changed
//! rows, so a failed command leaves the store exactly as it found it.

use std::collections::BTreeMap;

use parking_lot::RwLock;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::{HrError, HrResult};
use crate::model::{
    approval::{AuditEntry, AuditTrail},
    attendance::{Attendance, AttendanceCorrection},
    employee::Employee,
    leave_request::LeaveRequest,
    pams::PamsSubmission,
    payroll::{PayrollRun, PayrollSettings},
    profile_update::ProfileUpdateRequest,
    promotion::PromotionRequest,
    provident_fund::PfRequest,
    resignation::Resignation,
    user::UserAccount,
};

pub trait Entity: Clone + Serialize + DeserializeOwned {
    const KIND: &'static str;
    /// Top-level fields a patch may never touch.
    const IMMUTABLE: &'static [&'static str] = &["id", "version"];

    fn id(&self) -> u64;
    fn version(&self) -> u64;
    fn bump_version(&mut self);
}

pub trait Audited: Entity {
    fn audit_mut(&mut self) -> &mut AuditTrail;
}

#[derive(Debug, Clone)]
pub struct Table<T> {
    rows: BTreeMap<u64, T>,
    next_id: u64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 0,
        }
    }
}

impl<T: Entity> Table<T> {
    /// Allocates the next id and stores the row built for it.
    pub fn insert_with(&mut self, build: impl FnOnce(u64) -> T) -> T {
        self.next_id += 1;
        let row = build(self.next_id);
        self.rows.insert(row.id(), row.clone());
        row
    }

    pub fn get(&self, id: u64) -> HrResult<&T> {
        self.rows.get(&id).ok_or(HrError::NotFound { kind: T::KIND, id })
    }

    /// Cloned row for staging a change.
    pub fn fetch(&self, id: u64) -> HrResult<T> {
        self.get(id).cloned()
    }

    /// Like [`Table::fetch`], but fails when the caller's view is stale.
    pub fn fetch_at(&self, id: u64, expected_version: Option<u64>) -> HrResult<T> {
        let row = self.fetch(id)?;
        match expected_version {
            Some(expected) if expected != row.version() => Err(HrError::Conflict(format!(
                "{} {} was modified (expected version {}, current {})",
                T::KIND,
                id,
                expected,
                row.version()
            ))),
            _ => Ok(row),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }

    pub fn find(&self, mut pred: impl FnMut(&T) -> bool) -> Option<&T> {
        self.rows.values().find(|row| pred(row))
    }

    pub fn filter(&self, mut pred: impl FnMut(&T) -> bool) -> Vec<T> {
        self.rows.values().filter(|row| pred(row)).cloned().collect()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Stores a staged row, bumping its version.
    pub fn commit(&mut self, mut row: T) -> T {
        row.bump_version();
        self.rows.insert(row.id(), row.clone());
        row
    }

    /// Shallow-merges `patch` into the row: each top-level key replaces the
    /// stored value wholesale, nested objects included.
    pub fn update(&mut self, id: u64, patch: &Value) -> HrResult<T> {
        let merged = merge_patch(self.get(id)?, patch)?;
        Ok(self.commit(merged))
    }

    pub fn append_audit(&mut self, id: u64, entry: AuditEntry) -> HrResult<T>
    where
        T: Audited,
    {
        let mut row = self.fetch(id)?;
        row.audit_mut().append(entry);
        Ok(self.commit(row))
    }
}

pub fn merge_patch<T: Entity>(current: &T, patch: &Value) -> HrResult<T> {
    let fields = patch
        .as_object()
        .ok_or_else(|| HrError::validation("Payload must be a JSON object"))?;

    if fields.is_empty() {
        return Err(HrError::validation("No fields provided for update"));
    }

    let mut encoded = serde_json::to_value(current)
        .map_err(|e| HrError::validation(format!("{} could not be encoded: {}", T::KIND, e)))?;
    let target = encoded
        .as_object_mut()
        .ok_or_else(|| HrError::validation(format!("{} is not an object", T::KIND)))?;

    for (key, value) in fields {
        if T::IMMUTABLE.contains(&key.as_str()) {
            return Err(HrError::validation(format!("Field `{}` cannot be updated", key)));
        }
        if !target.contains_key(key) {
            return Err(HrError::validation(format!("Unknown field `{}`", key)));
        }
        target.insert(key.clone(), value.clone());
    }

    serde_json::from_value(encoded)
        .map_err(|e| HrError::validation(format!("Invalid update: {}", e)))
}

#[derive(Debug, Clone, Default)]
pub struct StoreState {
    pub employees: Table<Employee>,
    pub users: Table<UserAccount>,
    pub leaves: Table<LeaveRequest>,
    pub pams: Table<PamsSubmission>,
    pub resignations: Table<Resignation>,
    pub attendance: Table<Attendance>,
    pub corrections: Table<AttendanceCorrection>,
    pub promotions: Table<PromotionRequest>,
    pub pf_requests: Table<PfRequest>,
    pub profile_updates: Table<ProfileUpdateRequest>,
    pub payroll_runs: Table<PayrollRun>,
    pub payroll_settings: PayrollSettings,
}

pub struct EntityStore {
    state: RwLock<StoreState>,
}

impl EntityStore {
    pub fn new(payroll_settings: PayrollSettings) -> Self {
        Self {
            state: RwLock::new(StoreState {
                payroll_settings,
                ..StoreState::default()
            }),
        }
    }

    pub fn read<R>(&self, query: impl FnOnce(&StoreState) -> R) -> R {
        query(&self.state.read())
    }

    /// Runs `command` under the write lock. Commands stage changes on cloned
    /// rows and commit them only after every check has passed.
    pub fn transaction<R>(&self, command: impl FnOnce(&mut StoreState) -> HrResult<R>) -> HrResult<R> {
        command(&mut self.state.write())
    }
}
