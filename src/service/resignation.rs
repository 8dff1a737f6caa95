use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;

use super::{HrService, REVIEWERS, own_employee_id, require_self_or, require_text};
use crate::error::{HrError, HrResult};
use crate::model::{
    approval::{AuditEntry, AuditTrail, DocumentInput, attach_documents},
    employee::EmploymentStatus,
    resignation::{ExitSurvey, HandoverStatus, Resignation, ResignationStatus},
};
use crate::utils::resignation_form::{self, ResignationForm};
use crate::workflow::{
    Actor,
    resignation::{self as lifecycle, ResignationAction},
};

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[schema(example = json!({
    "reason": "Relocating abroad for doctoral studies",
    "last_working_day": "2026-04-30"
}))]
pub struct NewResignation {
    pub reason: String,
    pub last_working_day: NaiveDate,
    #[serde(default)]
    pub documents: Vec<DocumentInput>,
}

const MIN_REASON_LEN: usize = 10;

impl HrService {
    pub fn submit_resignation(&self, actor: &Actor, input: NewResignation) -> HrResult<Resignation> {
        let employee_id = own_employee_id(actor)?;
        require_text(&input.reason, "Reason", MIN_REASON_LEN)?;
        let today = self.today();
        if input.last_working_day < today {
            return Err(HrError::validation("Last working day cannot be in the past"));
        }
        let now = self.now();

        let resignation = self.store.transaction(|s| {
            let employee = s.employees.get(employee_id)?;
            if employee.employment_status == EmploymentStatus::Resigned {
                return Err(HrError::Conflict("Employee has already resigned".into()));
            }
            if s.resignations
                .find(|r| r.employee_id == employee_id && r.status.is_open())
                .is_some()
            {
                return Err(HrError::Conflict("An open resignation already exists".into()));
            }

            let mut audit = AuditTrail::default();
            audit.append(AuditEntry::new("submitted", actor.name.as_str(), now, None));
            Ok(s.resignations.insert_with(|id| Resignation {
                id,
                employee_id,
                reason: input.reason.trim().to_string(),
                submitted_on: today,
                last_working_day: input.last_working_day,
                status: ResignationStatus::Pending,
                handover_status: HandoverStatus::NotStarted,
                exit_survey: None,
                audit,
                documents: attach_documents(input.documents),
                version: 0,
            }))
        })?;

        info!(resignation_id = resignation.id, employee_id, "Resignation submitted");
        Ok(resignation)
    }

    /// Approve, reject, withdraw or complete. Completion marks the employee
    /// as resigned.
    pub fn decide_resignation(
        &self,
        actor: &Actor,
        id: u64,
        action: ResignationAction,
        comment: Option<String>,
        expected_version: Option<u64>,
    ) -> HrResult<Resignation> {
        let now = self.now();

        let resignation = self.store.transaction(|s| {
            let mut resignation = s.resignations.fetch_at(id, expected_version)?;
            let next = lifecycle::apply(&mut resignation, actor, action, comment, now)?;
            if next == ResignationStatus::Completed {
                let mut employee = s.employees.fetch(resignation.employee_id)?;
                employee.employment_status = EmploymentStatus::Resigned;
                s.employees.commit(employee);
            }
            Ok(s.resignations.commit(resignation))
        })?;

        info!(
            resignation_id = id,
            employee_id = resignation.employee_id,
            %action,
            status = %resignation.status,
            by = %actor.name,
            "Resignation updated"
        );
        Ok(resignation)
    }

    pub fn submit_exit_survey(&self, actor: &Actor, id: u64, survey: ExitSurvey) -> HrResult<Resignation> {
        require_text(&survey.primary_reason, "Primary reason", 1)?;
        if !(1..=5).contains(&survey.overall_rating) {
            return Err(HrError::validation("Overall rating must be between 1 and 5"));
        }
        let now = self.now();

        let resignation = self.store.transaction(|s| {
            let mut resignation = s.resignations.fetch(id)?;
            lifecycle::attach_exit_survey(&mut resignation, actor, survey, now)?;
            Ok(s.resignations.commit(resignation))
        })?;

        info!(resignation_id = id, "Exit survey submitted");
        Ok(resignation)
    }

    pub fn set_handover(&self, actor: &Actor, id: u64, handover: HandoverStatus) -> HrResult<Resignation> {
        let now = self.now();
        let resignation = self.store.transaction(|s| {
            let current = s.resignations.fetch(id)?;
            let entry = lifecycle::handover_entry(&current, actor, handover, now)?;
            s.resignations.update(id, &json!({ "handover_status": handover }))?;
            s.resignations.append_audit(id, entry)
        })?;

        info!(resignation_id = id, handover = %handover, "Handover status updated");
        Ok(resignation)
    }

    pub fn get_resignation(&self, actor: &Actor, id: u64) -> HrResult<Resignation> {
        let resignation = self.store.read(|s| s.resignations.fetch(id))?;
        require_self_or(actor, resignation.employee_id, REVIEWERS, "view this resignation")?;
        Ok(resignation)
    }

    pub fn list_resignations(
        &self,
        actor: &Actor,
        status: Option<ResignationStatus>,
    ) -> HrResult<Vec<Resignation>> {
        let own = if REVIEWERS.contains(&actor.role) {
            None
        } else {
            Some(own_employee_id(actor)?)
        };
        Ok(self.store.read(|s| {
            s.resignations.filter(|r| {
                own.is_none_or(|id| r.employee_id == id) && status.is_none_or(|st| r.status == st)
            })
        }))
    }

    /// Printable form for the employee, filled from their latest resignation.
    pub fn resignation_form(&self, actor: &Actor, employee_id: u64) -> HrResult<ResignationForm> {
        require_self_or(actor, employee_id, REVIEWERS, "download this resignation form")?;
        let today = self.today();
        self.store.read(|s| {
            let employee = s.employees.get(employee_id)?;
            let latest = s
                .resignations
                .iter()
                .filter(|r| r.employee_id == employee_id)
                .max_by_key(|r| r.id);
            Ok(resignation_form::render(employee, latest, today))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::model::role::Role;
    use crate::service::test_support::*;
    use crate::workflow::TransitionError;

    fn resign(svc: &HrService, employee_id: u64) -> Resignation {
        svc.submit_resignation(
            &employee_actor(employee_id),
            NewResignation {
                reason: "Relocating abroad for studies".into(),
                last_working_day: date(2026, 4, 30),
                documents: vec![],
            },
        )
        .unwrap()
    }

    fn survey() -> ExitSurvey {
        ExitSurvey {
            primary_reason: "Higher studies".into(),
            overall_rating: 4,
            would_recommend: true,
            answers: BTreeMap::new(),
            comments: None,
            submitted_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn completion_marks_employee_resigned() {
        let svc = service();
        let r = resign(&svc, AYESHA);
        svc.decide_resignation(&hr(), r.id, ResignationAction::Approve, None, Some(0)).unwrap();
        svc.submit_exit_survey(&employee_actor(AYESHA), r.id, survey()).unwrap();
        let done = svc
            .decide_resignation(&hr(), r.id, ResignationAction::Complete, None, None)
            .unwrap();

        assert_eq!(done.status, ResignationStatus::Completed);
        assert!(done.exit_survey.is_some());
        assert_eq!(
            svc.get_employee(&hr(), AYESHA).unwrap().employment_status,
            EmploymentStatus::Resigned
        );
    }

    #[test]
    fn only_owner_withdraws() {
        let svc = service();
        let r = resign(&svc, AYESHA);
        assert!(matches!(
            svc.decide_resignation(&hr(), r.id, ResignationAction::Withdraw, None, None),
            Err(HrError::InvalidTransition(TransitionError::NotOwner(_)))
        ));
        let withdrawn = svc
            .decide_resignation(&employee_actor(AYESHA), r.id, ResignationAction::Withdraw, None, None)
            .unwrap();
        assert_eq!(withdrawn.status, ResignationStatus::Withdrawn);
        // a new one may be filed after withdrawing
        resign(&svc, AYESHA);
    }

    #[test]
    fn one_open_resignation_per_employee() {
        let svc = service();
        resign(&svc, AYESHA);
        let err = svc
            .submit_resignation(
                &employee_actor(AYESHA),
                NewResignation {
                    reason: "Changed my mind about timing".into(),
                    last_working_day: date(2026, 5, 31),
                    documents: vec![],
                },
            )
            .unwrap_err();
        assert!(matches!(err, HrError::Conflict(_)));
    }

    #[test]
    fn survey_needs_approval_first() {
        let svc = service();
        let r = resign(&svc, AYESHA);
        assert!(svc.submit_exit_survey(&employee_actor(AYESHA), r.id, survey()).is_err());
    }

    #[test]
    fn completion_does_not_wait_for_handover() {
        let svc = service();
        let r = resign(&svc, RAFIQ);
        svc.set_handover(&actor(Role::Hod, None), r.id, HandoverStatus::InProgress).unwrap();
        svc.decide_resignation(&hr(), r.id, ResignationAction::Approve, None, None).unwrap();
        let done = svc
            .decide_resignation(&hr(), r.id, ResignationAction::Complete, None, None)
            .unwrap();
        assert_eq!(done.handover_status, HandoverStatus::InProgress);
        assert_eq!(done.status, ResignationStatus::Completed);
    }

    #[test]
    fn form_is_filled_from_latest_resignation() {
        let svc = service();
        resign(&svc, AYESHA);
        let form = svc.resignation_form(&employee_actor(AYESHA), AYESHA).unwrap();
        assert_eq!(form.file_name, "Resignation_Form_Ayesha_Karim_2026-03-01.html");
        assert!(form.html.contains("2026-04-30"));
        assert!(svc.resignation_form(&employee_actor(RAFIQ), AYESHA).is_err());
    }
}
