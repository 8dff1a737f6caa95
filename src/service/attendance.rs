use chrono::{Duration, NaiveDate};
use serde::Deserialize;
use tracing::{info, warn};
use utoipa::{IntoParams, ToSchema};

use super::{HrService, REVIEWERS, own_employee_id, require_role, require_self_or, require_text};
use crate::error::{HrError, HrResult};
use crate::model::{
    approval::{AuditEntry, AuditTrail, DocumentInput, RequestStatus, attach_documents},
    attendance::{Attendance, AttendanceCorrection, AttendanceStatus},
    role::Role,
};
use crate::store::StoreState;
use crate::utils::csv_export;
use crate::workflow::{Actor, chain::Decision, correction};

pub const CORRECTION_CSV_HEADER: [&str; 9] = [
    "Employee ID",
    "Employee Name",
    "Department",
    "Date",
    "Original Status",
    "Requested Status",
    "Current Status",
    "Submitted On",
    "Reason",
];

const CORRECTION_REVIEWERS: &[Role] = &[Role::Admin, Role::Hr, Role::Hod];

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MarkAttendance {
    pub employee_id: u64,
    #[schema(example = "2026-02-10")]
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct AttendanceFilter {
    pub employee_id: Option<u64>,
    pub status: Option<AttendanceStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[schema(example = json!({
    "date": "2026-02-10",
    "requested_status": "present",
    "reason": "Biometric device was down"
}))]
pub struct NewCorrection {
    pub date: NaiveDate,
    pub requested_status: AttendanceStatus,
    pub reason: String,
    #[serde(default)]
    pub documents: Vec<DocumentInput>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct CorrectionFilter {
    pub employee_id: Option<u64>,
    pub status: Option<RequestStatus>,
    #[schema(example = "Computer Science")]
    pub department: Option<String>,
    /// Earliest attendance date, inclusive
    pub from: Option<NaiveDate>,
    /// Latest attendance date, inclusive
    pub to: Option<NaiveDate>,
}

impl CorrectionFilter {
    fn matches(&self, c: &AttendanceCorrection) -> bool {
        self.employee_id.is_none_or(|id| c.employee_id == id)
            && self.status.is_none_or(|s| c.status == s)
            && self
                .department
                .as_deref()
                .is_none_or(|d| c.department.eq_ignore_ascii_case(d.trim()))
            && self.from.is_none_or(|from| c.date >= from)
            && self.to.is_none_or(|to| c.date <= to)
    }
}

fn correction_row(c: &AttendanceCorrection) -> Vec<String> {
    vec![
        c.employee_id.to_string(),
        c.employee_name.clone(),
        c.department.clone(),
        c.date.to_string(),
        c.original_status.to_string(),
        c.requested_status.to_string(),
        c.status.to_string(),
        c.submitted_on.format("%Y-%m-%d").to_string(),
        c.reason.clone(),
    ]
}

/// Writes `status` onto the employee's record for `date`, creating it if needed.
fn set_day_status(s: &mut StoreState, employee_id: u64, date: NaiveDate, status: AttendanceStatus) -> Attendance {
    match s
        .attendance
        .find(|a| a.employee_id == employee_id && a.date == date)
        .cloned()
    {
        Some(mut record) => {
            record.status = status;
            s.attendance.commit(record)
        }
        None => s.attendance.insert_with(|id| Attendance {
            id,
            employee_id,
            date,
            status,
            check_in: None,
            check_out: None,
            version: 0,
        }),
    }
}

impl HrService {
    /// Self-service check-in; after office start plus grace counts as late.
    pub fn check_in(&self, actor: &Actor) -> HrResult<Attendance> {
        let employee_id = own_employee_id(actor)?;
        let now = self.now();
        let today = now.date_naive();
        let cutoff = self.policy.office_start + Duration::minutes(self.policy.late_grace_minutes);
        let status = if now.time() > cutoff {
            AttendanceStatus::Late
        } else {
            AttendanceStatus::Present
        };

        let record = self.store.transaction(|s| {
            s.employees.get(employee_id)?;
            match s
                .attendance
                .find(|a| a.employee_id == employee_id && a.date == today)
                .cloned()
            {
                Some(existing) if existing.check_in.is_some() => {
                    Err(HrError::Conflict("Already checked in today".into()))
                }
                Some(mut existing) => {
                    existing.check_in = Some(now.time());
                    existing.status = status;
                    Ok(s.attendance.commit(existing))
                }
                None => Ok(s.attendance.insert_with(|id| Attendance {
                    id,
                    employee_id,
                    date: today,
                    status,
                    check_in: Some(now.time()),
                    check_out: None,
                    version: 0,
                })),
            }
        })?;

        info!(employee_id, status = %record.status, "Checked in");
        Ok(record)
    }

    pub fn check_out(&self, actor: &Actor) -> HrResult<Attendance> {
        let employee_id = own_employee_id(actor)?;
        let now = self.now();
        let today = now.date_naive();

        let record = self.store.transaction(|s| {
            let mut record = s
                .attendance
                .find(|a| a.employee_id == employee_id && a.date == today && a.check_in.is_some())
                .cloned()
                .ok_or_else(|| HrError::Conflict("Not checked in today".into()))?;
            if record.check_out.is_some() {
                return Err(HrError::Conflict("Already checked out today".into()));
            }
            record.check_out = Some(now.time());
            Ok(s.attendance.commit(record))
        })?;

        info!(employee_id, "Checked out");
        Ok(record)
    }

    pub fn mark_attendance(&self, actor: &Actor, input: MarkAttendance) -> HrResult<Attendance> {
        require_role(actor, &[Role::Admin, Role::Hr], "mark attendance")?;
        if input.date > self.today() {
            return Err(HrError::validation("Attendance cannot be marked for a future date"));
        }
        let record = self.store.transaction(|s| {
            s.employees.get(input.employee_id)?;
            Ok(set_day_status(s, input.employee_id, input.date, input.status))
        })?;
        info!(employee_id = input.employee_id, date = %input.date, status = %input.status, "Attendance marked");
        Ok(record)
    }

    pub fn list_attendance(&self, actor: &Actor, filter: &AttendanceFilter) -> HrResult<Vec<Attendance>> {
        let own = if REVIEWERS.contains(&actor.role) {
            None
        } else {
            Some(own_employee_id(actor)?)
        };
        Ok(self.store.read(|s| {
            s.attendance.filter(|a| {
                own.is_none_or(|id| a.employee_id == id)
                    && filter.employee_id.is_none_or(|id| a.employee_id == id)
                    && filter.status.is_none_or(|st| a.status == st)
                    && filter.from.is_none_or(|from| a.date >= from)
                    && filter.to.is_none_or(|to| a.date <= to)
            })
        }))
    }

    pub fn submit_correction(&self, actor: &Actor, input: NewCorrection) -> HrResult<AttendanceCorrection> {
        let employee_id = own_employee_id(actor)?;
        require_text(&input.reason, "Reason", 5)?;
        if input.reason.contains(['\r', '\n']) {
            return Err(HrError::validation("Reason must be a single line"));
        }
        if input.date > self.today() {
            return Err(HrError::validation("Cannot correct attendance for a future date"));
        }
        let now = self.now();

        let correction = self.store.transaction(|s| {
            let employee = s.employees.get(employee_id)?.clone();
            let original_status = s
                .attendance
                .find(|a| a.employee_id == employee_id && a.date == input.date)
                .map(|a| a.status)
                .unwrap_or(AttendanceStatus::Absent);
            if original_status == input.requested_status {
                return Err(HrError::validation(format!(
                    "Attendance on {} is already {}",
                    input.date, original_status
                )));
            }
            let pending = s.corrections.find(|c| {
                c.employee_id == employee_id && c.date == input.date && c.status == RequestStatus::Pending
            });
            if pending.is_some() {
                return Err(HrError::Conflict(format!(
                    "A correction for {} is already pending",
                    input.date
                )));
            }

            let mut audit = AuditTrail::default();
            audit.append(AuditEntry::new("submitted", actor.name.as_str(), now, None));
            Ok(s.corrections.insert_with(|id| AttendanceCorrection {
                id,
                employee_id,
                employee_name: employee.name,
                department: employee.department,
                date: input.date,
                original_status,
                requested_status: input.requested_status,
                reason: input.reason.trim().to_string(),
                submitted_on: now,
                status: RequestStatus::Pending,
                reviewed_by: None,
                audit,
                documents: attach_documents(input.documents),
                version: 0,
            }))
        })?;

        info!(correction_id = correction.id, employee_id, date = %correction.date, "Attendance correction submitted");
        Ok(correction)
    }

    pub fn review_correction(
        &self,
        actor: &Actor,
        id: u64,
        decision: Decision,
        comment: Option<String>,
        expected_version: Option<u64>,
    ) -> HrResult<AttendanceCorrection> {
        let now = self.now();
        let correction = self.store.transaction(|s| {
            let mut correction = s.corrections.fetch_at(id, expected_version)?;
            correction::review(&mut correction, actor, decision, comment, now)?;
            set_day_status(s, correction.employee_id, correction.date, correction.effective_status());
            Ok(s.corrections.commit(correction))
        })?;

        info!(correction_id = id, status = %correction.status, by = %actor.name, "Attendance correction reviewed");
        Ok(correction)
    }

    /// HR flips a resolved correction; the day's attendance follows.
    pub fn override_correction(
        &self,
        actor: &Actor,
        id: u64,
        new_status: RequestStatus,
        reason: Option<String>,
        expected_version: Option<u64>,
    ) -> HrResult<AttendanceCorrection> {
        let now = self.now();
        let correction = self.store.transaction(|s| {
            let mut correction = s.corrections.fetch_at(id, expected_version)?;
            correction::override_decision(&mut correction, actor, new_status, reason, now)?;
            set_day_status(s, correction.employee_id, correction.date, correction.effective_status());
            Ok(s.corrections.commit(correction))
        })?;

        warn!(correction_id = id, status = %correction.status, by = %actor.name, "Attendance correction overridden");
        Ok(correction)
    }

    pub fn get_correction(&self, actor: &Actor, id: u64) -> HrResult<AttendanceCorrection> {
        let correction = self.store.read(|s| s.corrections.fetch(id))?;
        require_self_or(actor, correction.employee_id, REVIEWERS, "view this correction")?;
        Ok(correction)
    }

    pub fn list_corrections(&self, actor: &Actor, filter: &CorrectionFilter) -> HrResult<Vec<AttendanceCorrection>> {
        let own = if REVIEWERS.contains(&actor.role) {
            None
        } else {
            Some(own_employee_id(actor)?)
        };
        Ok(self.store.read(|s| {
            s.corrections
                .filter(|c| own.is_none_or(|id| c.employee_id == id) && filter.matches(c))
        }))
    }

    pub fn export_corrections_csv(&self, actor: &Actor, filter: &CorrectionFilter) -> HrResult<String> {
        require_role(actor, CORRECTION_REVIEWERS, "export attendance corrections")?;
        let rows = self.list_corrections(actor, filter)?;
        info!(rows = rows.len(), by = %actor.name, "Attendance corrections exported");
        Ok(csv_export::render(&CORRECTION_CSV_HEADER, rows.iter().map(correction_row)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::*;
    use crate::workflow::{TransitionError, correction::OVERRIDE_ACTOR};

    fn request(day: u32, reason: &str) -> NewCorrection {
        NewCorrection {
            date: date(2026, 2, day),
            requested_status: AttendanceStatus::Present,
            reason: reason.into(),
            documents: vec![],
        }
    }

    #[test]
    fn check_in_within_grace_is_present() {
        let svc = service();
        let me = employee_actor(AYESHA);
        let record = svc.check_in(&me).unwrap();
        assert_eq!(record.status, AttendanceStatus::Present);
        assert!(matches!(svc.check_in(&me), Err(HrError::Conflict(_))));

        let out = svc.check_out(&me).unwrap();
        assert!(out.check_out.is_some());
        assert!(svc.check_out(&me).is_err());
    }

    #[test]
    fn check_in_after_grace_is_late() {
        let late = today().and_hms_opt(9, 16, 0).unwrap().and_utc();
        let svc = service_at(late);
        assert_eq!(svc.check_in(&employee_actor(RAFIQ)).unwrap().status, AttendanceStatus::Late);
    }

    #[test]
    fn approval_rewrites_attendance_and_override_reverts_it() {
        let svc = service();
        svc.mark_attendance(
            &hr(),
            MarkAttendance {
                employee_id: AYESHA,
                date: date(2026, 2, 10),
                status: AttendanceStatus::Absent,
            },
        )
        .unwrap();
        let c = svc
            .submit_correction(&employee_actor(AYESHA), request(10, "Biometric device was down"))
            .unwrap();
        assert_eq!(c.original_status, AttendanceStatus::Absent);

        svc.review_correction(&actor(Role::Hod, None), c.id, Decision::Approve, None, None)
            .unwrap();
        let day = AttendanceFilter {
            employee_id: Some(AYESHA),
            from: Some(date(2026, 2, 10)),
            to: Some(date(2026, 2, 10)),
            ..AttendanceFilter::default()
        };
        assert_eq!(svc.list_attendance(&hr(), &day).unwrap()[0].status, AttendanceStatus::Present);

        assert!(matches!(
            svc.override_correction(&hr(), c.id, RequestStatus::Rejected, Some("  ".into()), None),
            Err(HrError::InvalidTransition(TransitionError::OverrideReasonRequired))
        ));
        let flipped = svc
            .override_correction(&hr(), c.id, RequestStatus::Rejected, Some("CCTV shows absence".into()), None)
            .unwrap();
        assert_eq!(flipped.status, RequestStatus::Rejected);
        assert_eq!(flipped.audit.latest().unwrap().by, OVERRIDE_ACTOR);
        assert_eq!(svc.list_attendance(&hr(), &day).unwrap()[0].status, AttendanceStatus::Absent);
    }

    #[test]
    fn override_requires_resolution_and_hr() {
        let svc = service();
        let c = svc
            .submit_correction(&employee_actor(AYESHA), request(11, "Forgot to swipe"))
            .unwrap();
        assert!(
            svc.override_correction(&hr(), c.id, RequestStatus::Approved, Some("x".into()), None)
                .is_err()
        );
        svc.review_correction(&hr(), c.id, Decision::Reject, None, None).unwrap();
        assert!(
            svc.override_correction(&actor(Role::Hod, None), c.id, RequestStatus::Approved, Some("x".into()), None)
                .is_err()
        );
    }

    #[test]
    fn duplicate_pending_correction_conflicts() {
        let svc = service();
        let me = employee_actor(AYESHA);
        svc.submit_correction(&me, request(12, "Forgot to swipe")).unwrap();
        assert!(matches!(
            svc.submit_correction(&me, request(12, "Forgot to swipe")),
            Err(HrError::Conflict(_))
        ));
    }

    #[test]
    fn csv_export_filters_and_quotes() {
        let svc = service();
        svc.submit_correction(&employee_actor(AYESHA), request(10, r#"Device said "error""#))
            .unwrap();
        svc.submit_correction(&employee_actor(RAFIQ), request(20, "Forgot to swipe"))
            .unwrap();
        assert!(matches!(
            svc.submit_correction(&employee_actor(RAFIQ), request(12, "Device down\nswiped twice")),
            Err(HrError::Validation(_))
        ));

        let filter = CorrectionFilter {
            to: Some(date(2026, 2, 15)),
            ..CorrectionFilter::default()
        };
        let csv = svc.export_corrections_csv(&hr(), &filter).unwrap();
        let lines: Vec<&str> = csv.split('\n').collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("\"Employee ID\",\"Employee Name\""));
        assert_eq!(
            lines[1],
            "\"1\",\"Ayesha Karim\",\"Computer Science\",\"2026-02-10\",\"absent\",\"present\",\"Pending\",\"2026-03-01\",\"Device said \"\"error\"\"\""
        );
        assert!(svc.export_corrections_csv(&employee_actor(AYESHA), &filter).is_err());
    }
}
