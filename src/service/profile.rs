use serde_json::Value;
use tracing::info;

use super::{HrService, own_employee_id, require_role, require_self_or};
use crate::error::{HrError, HrResult};
use crate::model::{
    approval::{AuditEntry, AuditTrail, RequestStatus},
    employee::{Employee, ProfileRecord, ProfileSection},
    profile_update::ProfileUpdateRequest,
    role::Role,
};
use crate::store::merge_patch;
use crate::workflow::{
    Actor, clean_comment,
    chain::{Decision, decide_single},
};

/// Fields only HR may change, even through an approved request.
const HR_ONLY_FIELDS: &[&str] = &[
    "salary_base",
    "pf_balance",
    "leave_balance",
    "employment_status",
    "designation",
    "joining_date",
];

const PROFILE_EDITORS: &[Role] = &[Role::Admin, Role::Hr];

/// Runs `$body` with `$records` bound to the employee's collection for `$section`.
macro_rules! with_section {
    ($employee:expr, $section:expr, |$records:ident| $body:expr) => {
        match $section {
            ProfileSection::FypSupervised => {
                let $records = &mut $employee.fyp_supervised;
                $body
            }
            ProfileSection::ThesisSupervised => {
                let $records = &mut $employee.thesis_supervised;
                $body
            }
            ProfileSection::ResearchGrants => {
                let $records = &mut $employee.research_grants;
                $body
            }
            ProfileSection::AdministrativeDuties => {
                let $records = &mut $employee.administrative_duties;
                $body
            }
            ProfileSection::Publications => {
                let $records = &mut $employee.publications;
                $body
            }
            ProfileSection::Qualifications => {
                let $records = &mut $employee.qualifications;
                $body
            }
            ProfileSection::Dependents => {
                let $records = &mut $employee.dependents;
                $body
            }
        }
    };
}

fn decode<R: ProfileRecord>(payload: &Value) -> HrResult<R> {
    serde_json::from_value(payload.clone()).map_err(|e| HrError::validation(format!("Invalid record: {}", e)))
}

fn encode<R: ProfileRecord>(record: &R) -> HrResult<Value> {
    serde_json::to_value(record).map_err(|e| HrError::Internal(e.to_string()))
}

fn insert_record<R: ProfileRecord>(records: &mut Vec<R>, payload: &Value) -> HrResult<Value> {
    let mut record: R = decode(payload)?;
    record.validate()?;
    let next_id = records.iter().map(|r| r.id()).max().unwrap_or(0) + 1;
    record.set_id(next_id);
    let encoded = encode(&record)?;
    records.push(record);
    Ok(encoded)
}

fn replace_record<R: ProfileRecord>(
    records: &mut [R],
    section: ProfileSection,
    record_id: u64,
    payload: &Value,
) -> HrResult<Value> {
    let slot = records
        .iter_mut()
        .find(|r| r.id() == record_id)
        .ok_or_else(|| HrError::validation(format!("No {} record with id {}", section, record_id)))?;
    let mut record: R = decode(payload)?;
    record.set_id(record_id);
    record.validate()?;
    let encoded = encode(&record)?;
    *slot = record;
    Ok(encoded)
}

fn delete_record<R: ProfileRecord>(records: &mut Vec<R>, section: ProfileSection, record_id: u64) -> HrResult<()> {
    let before = records.len();
    records.retain(|r| r.id() != record_id);
    if records.len() == before {
        return Err(HrError::validation(format!("No {} record with id {}", section, record_id)));
    }
    Ok(())
}

fn encode_all<R: ProfileRecord>(records: &[R]) -> HrResult<Value> {
    serde_json::to_value(records).map_err(|e| HrError::Internal(e.to_string()))
}

impl HrService {
    pub fn list_records(&self, actor: &Actor, employee_id: u64, section: ProfileSection) -> HrResult<Value> {
        let mut employee: Employee = self.get_employee(actor, employee_id)?;
        with_section!(employee, section, |records| encode_all(records))
    }

    pub fn add_record(
        &self,
        actor: &Actor,
        employee_id: u64,
        section: ProfileSection,
        payload: &Value,
    ) -> HrResult<Value> {
        self.edit_profile(actor, employee_id, section, |employee| {
            with_section!(employee, section, |records| insert_record(records, payload))
        })
    }

    pub fn update_record(
        &self,
        actor: &Actor,
        employee_id: u64,
        section: ProfileSection,
        record_id: u64,
        payload: &Value,
    ) -> HrResult<Value> {
        self.edit_profile(actor, employee_id, section, |employee| {
            with_section!(employee, section, |records| replace_record(
                records, section, record_id, payload
            ))
        })
    }

    pub fn remove_record(
        &self,
        actor: &Actor,
        employee_id: u64,
        section: ProfileSection,
        record_id: u64,
    ) -> HrResult<()> {
        self.edit_profile(actor, employee_id, section, |employee| {
            with_section!(employee, section, |records| delete_record(records, section, record_id))
        })
    }

    fn edit_profile<R>(
        &self,
        actor: &Actor,
        employee_id: u64,
        section: ProfileSection,
        edit: impl FnOnce(&mut Employee) -> HrResult<R>,
    ) -> HrResult<R> {
        require_self_or(actor, employee_id, PROFILE_EDITORS, "edit this profile")?;
        let result = self.store.transaction(|s| {
            let mut employee = s.employees.fetch(employee_id)?;
            let result = edit(&mut employee)?;
            s.employees.commit(employee);
            Ok(result)
        })?;
        info!(employee_id, section = %section, by = %actor.name, "Profile records changed");
        Ok(result)
    }

    pub fn submit_profile_update(
        &self,
        actor: &Actor,
        changes: Value,
        note: Option<String>,
    ) -> HrResult<ProfileUpdateRequest> {
        let employee_id = own_employee_id(actor)?;
        if let Some(fields) = changes.as_object() {
            if let Some(field) = fields.keys().find(|k| HR_ONLY_FIELDS.contains(&k.as_str())) {
                return Err(HrError::validation(format!("Field `{}` can only be changed by HR", field)));
            }
        }
        let now = self.now();

        let request = self.store.transaction(|s| {
            // reject malformed patches at submission rather than at approval
            merge_patch(s.employees.get(employee_id)?, &changes)?;

            let mut audit = AuditTrail::default();
            audit.append(AuditEntry::new("submitted", actor.name.as_str(), now, None));
            Ok(s.profile_updates.insert_with(|id| ProfileUpdateRequest {
                id,
                employee_id,
                changes: changes.clone(),
                note: clean_comment(note),
                submitted_at: now,
                status: RequestStatus::Pending,
                audit,
                version: 0,
            }))
        })?;

        info!(request_id = request.id, employee_id, "Profile update submitted");
        Ok(request)
    }

    pub fn review_profile_update(
        &self,
        actor: &Actor,
        id: u64,
        decision: Decision,
        comment: Option<String>,
        expected_version: Option<u64>,
    ) -> HrResult<ProfileUpdateRequest> {
        require_role(actor, PROFILE_EDITORS, "review profile updates")?;
        let now = self.now();

        let request = self.store.transaction(|s| {
            let mut request = s.profile_updates.fetch_at(id, expected_version)?;
            let status = decide_single(&mut request.status, &mut request.audit, actor, decision, comment, now)?;
            if status == RequestStatus::Approved {
                let updated = merge_patch(s.employees.get(request.employee_id)?, &request.changes)?;
                s.employees.commit(updated);
            }
            Ok(s.profile_updates.commit(request))
        })?;

        info!(request_id = id, status = %request.status, by = %actor.name, "Profile update reviewed");
        Ok(request)
    }

    pub fn list_profile_updates(
        &self,
        actor: &Actor,
        status: Option<RequestStatus>,
    ) -> HrResult<Vec<ProfileUpdateRequest>> {
        let mine_only = !PROFILE_EDITORS.contains(&actor.role);
        let own = actor.employee_id;
        if mine_only && own.is_none() {
            return Err(HrError::forbidden("No employee profile"));
        }
        Ok(self.store.read(|s| {
            s.profile_updates.filter(|r| {
                (!mine_only || Some(r.employee_id) == own) && status.is_none_or(|st| r.status == st)
            })
        }))
    }
}
