use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::{info, warn};
use utoipa::{IntoParams, ToSchema};

use super::{HrService, REVIEWERS, own_employee_id, require_self_or, require_text};
use crate::error::HrResult;
use crate::model::{
    approval::{AuditEntry, AuditTrail, DocumentInput, attach_documents},
    pams::{PamsCategory, PamsStatus, PamsSubmission, Workload},
    role::Role,
};
use crate::workflow::{
    Actor, TransitionError,
    pams::{self, PamsReview},
};

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[schema(example = json!({
    "period": "2025-2026",
    "workload": { "teaching": "CSE101, CSE305", "research": "2 journal papers" },
    "rubric": { "teaching": "Redesigned the lab syllabus" }
}))]
pub struct NewPams {
    pub period: String,
    pub workload: Workload,
    #[serde(default)]
    pub rubric: BTreeMap<String, String>,
    #[serde(default)]
    pub documents: Vec<DocumentInput>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PamsResubmission {
    pub workload: Workload,
    #[serde(default)]
    pub rubric: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct PamsFilter {
    pub employee_id: Option<u64>,
    #[schema(example = "2025-2026")]
    pub period: Option<String>,
    pub status: Option<PamsStatus>,
    /// Only submissions waiting on this role
    pub awaiting: Option<Role>,
}

impl PamsFilter {
    fn matches(&self, sub: &PamsSubmission) -> bool {
        self.employee_id.is_none_or(|id| sub.employee_id == id)
            && self.period.as_deref().is_none_or(|p| sub.period == p.trim())
            && self.status.is_none_or(|s| sub.status == s)
            && self
                .awaiting
                .is_none_or(|role| pams::reviewer_for(sub.status, sub.category) == Some(role))
    }
}

fn category_for(role: Role) -> PamsCategory {
    match role {
        Role::Hod => PamsCategory::Hod,
        _ => PamsCategory::Faculty,
    }
}

fn validate_workload(workload: &Workload) -> HrResult<()> {
    require_text(&workload.teaching, "Teaching workload", 1)?;
    require_text(&workload.research, "Research workload", 1)
}

impl HrService {
    pub fn submit_pams(&self, actor: &Actor, input: NewPams) -> HrResult<PamsSubmission> {
        let employee_id = own_employee_id(actor)?;
        require_text(&input.period, "Period", 4)?;
        validate_workload(&input.workload)?;
        let period = input.period.trim().to_string();
        let now = self.now();

        let submission = self.store.transaction(|s| {
            s.employees.get(employee_id)?;
            if s.pams
                .find(|p| p.employee_id == employee_id && p.period == period)
                .is_some()
            {
                return Err(TransitionError::DuplicateSubmission { period: period.clone() }.into());
            }

            let mut audit = AuditTrail::default();
            audit.append(AuditEntry::new("submitted", actor.name.as_str(), now, None));
            Ok(s.pams.insert_with(|id| PamsSubmission {
                id,
                employee_id,
                period: period.clone(),
                category: category_for(actor.role),
                workload: input.workload,
                rubric: input.rubric,
                status: PamsStatus::Submitted,
                assessments: vec![],
                audit,
                documents: attach_documents(input.documents),
                submitted_at: now,
                resubmissions: 0,
                version: 0,
            }))
        })?;

        info!(
            pams_id = submission.id,
            employee_id,
            period = %submission.period,
            category = %submission.category,
            "PAMS submitted"
        );
        Ok(submission)
    }

    pub fn review_pams(
        &self,
        actor: &Actor,
        id: u64,
        review: PamsReview,
        expected_version: Option<u64>,
    ) -> HrResult<PamsSubmission> {
        let now = self.now();
        let action = review.action;

        let submission = self.store.transaction(|s| {
            let mut submission = s.pams.fetch_at(id, expected_version)?;
            pams::review(&mut submission, actor, review, now)?;
            Ok(s.pams.commit(submission))
        })?;

        match submission.status {
            PamsStatus::Returned => warn!(pams_id = id, by = %actor.name, "PAMS returned"),
            status => info!(pams_id = id, by = %actor.name, %action, status = %status, "PAMS reviewed"),
        }
        Ok(submission)
    }

    pub fn resubmit_pams(
        &self,
        actor: &Actor,
        id: u64,
        input: PamsResubmission,
        expected_version: Option<u64>,
    ) -> HrResult<PamsSubmission> {
        validate_workload(&input.workload)?;
        let now = self.now();

        let submission = self.store.transaction(|s| {
            let mut submission = s.pams.fetch_at(id, expected_version)?;
            pams::resubmit(&mut submission, actor, input.workload, input.rubric, now)?;
            Ok(s.pams.commit(submission))
        })?;

        info!(pams_id = id, resubmissions = submission.resubmissions, "PAMS resubmitted");
        Ok(submission)
    }

    pub fn get_pams(&self, actor: &Actor, id: u64) -> HrResult<PamsSubmission> {
        let submission = self.store.read(|s| s.pams.fetch(id))?;
        require_self_or(actor, submission.employee_id, REVIEWERS, "view this appraisal")?;
        Ok(submission)
    }

    pub fn list_pams(&self, actor: &Actor, filter: &PamsFilter) -> HrResult<Vec<PamsSubmission>> {
        let own = if REVIEWERS.contains(&actor.role) {
            None
        } else {
            Some(own_employee_id(actor)?)
        };
        Ok(self.store.read(|s| {
            s.pams
                .filter(|p| own.is_none_or(|id| p.employee_id == id) && filter.matches(p))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HrError;
    use crate::service::test_support::*;
    use crate::workflow::pams::PamsAction;

    fn new_pams(period: &str) -> NewPams {
        NewPams {
            period: period.into(),
            workload: Workload {
                teaching: "CSE101".into(),
                research: "1 paper".into(),
                administration: None,
                community: None,
            },
            rubric: BTreeMap::new(),
            documents: vec![],
        }
    }

    fn confirm(meeting: Option<&str>) -> PamsReview {
        PamsReview {
            action: PamsAction::Confirm,
            levels: BTreeMap::from([("teaching".to_string(), "meets".to_string())]),
            comments: None,
            meeting_date: meeting.map(str::to_string),
        }
    }

    fn give_back(comment: Option<&str>) -> PamsReview {
        PamsReview {
            action: PamsAction::Return,
            levels: BTreeMap::new(),
            comments: comment.map(str::to_string),
            meeting_date: None,
        }
    }

    #[test]
    fn faculty_route_runs_to_hr_final() {
        let svc = service();
        let sub = svc.submit_pams(&employee_actor(AYESHA), new_pams("2025-2026")).unwrap();
        assert_eq!(sub.category, PamsCategory::Faculty);

        svc.review_pams(&actor(Role::Hod, None), sub.id, confirm(Some("2026-03-15")), None)
            .unwrap();
        svc.review_pams(&actor(Role::Dean, None), sub.id, confirm(Some("2026-04-01")), None)
            .unwrap();
        svc.review_pams(&actor(Role::Vc, None), sub.id, confirm(None), None).unwrap();
        let done = svc.review_pams(&hr(), sub.id, confirm(None), None).unwrap();

        assert_eq!(done.status, PamsStatus::HrFinal);
        assert_eq!(done.assessments.len(), 4);
        assert!(done.assessments.iter().any(|a| a.role == Role::Hod && a.meeting_date.is_some()));
    }

    #[test]
    fn hod_submission_skips_hod_step() {
        let svc = service();
        let hod = actor(Role::Hod, Some(RAFIQ));
        let sub = svc.submit_pams(&hod, new_pams("2025-2026")).unwrap();
        assert_eq!(sub.category, PamsCategory::Hod);

        let err = svc
            .review_pams(&actor(Role::Hod, None), sub.id, confirm(Some("2026-03-15")), None)
            .unwrap_err();
        assert!(matches!(err, HrError::InvalidTransition(TransitionError::NotCurrentStep { .. })));

        let next = svc
            .review_pams(&actor(Role::Dean, None), sub.id, confirm(Some("2026-03-15")), None)
            .unwrap();
        assert_eq!(next.status, PamsStatus::DeanConfirmed);
    }

    #[test]
    fn meeting_date_rules_leave_submission_untouched() {
        let svc = service();
        let sub = svc.submit_pams(&employee_actor(AYESHA), new_pams("2025-2026")).unwrap();
        let hod = actor(Role::Hod, None);

        for bad in [None, Some("15/03/2026"), Some("2026-02-28"), Some("2027-03-02")] {
            let err = svc.review_pams(&hod, sub.id, confirm(bad), None).unwrap_err();
            assert!(matches!(err, HrError::InvalidTransition(TransitionError::MeetingDate(_))));
        }
        assert_eq!(svc.get_pams(&hr(), sub.id).unwrap(), sub);
    }

    #[test]
    fn return_and_resubmit() {
        let svc = service();
        let owner = employee_actor(AYESHA);
        let sub = svc.submit_pams(&owner, new_pams("2025-2026")).unwrap();
        let hod = actor(Role::Hod, None);

        assert!(svc.review_pams(&hod, sub.id, give_back(None), None).is_err());
        let returned = svc
            .review_pams(&hod, sub.id, give_back(Some("Add research evidence")), None)
            .unwrap();
        assert_eq!(returned.status, PamsStatus::Returned);

        let replacement = PamsResubmission {
            workload: Workload {
                teaching: "CSE101".into(),
                research: "1 paper, 1 grant".into(),
                administration: None,
                community: None,
            },
            rubric: BTreeMap::new(),
        };
        assert!(matches!(
            svc.resubmit_pams(&employee_actor(RAFIQ), sub.id, replacement.clone(), None),
            Err(HrError::InvalidTransition(TransitionError::NotOwner(_)))
        ));
        let again = svc.resubmit_pams(&owner, sub.id, replacement, None).unwrap();
        assert_eq!(again.status, PamsStatus::Submitted);
        assert_eq!(again.resubmissions, 1);
        assert_eq!(again.workload.research, "1 paper, 1 grant");
    }

    #[test]
    fn duplicate_period_is_refused() {
        let svc = service();
        let owner = employee_actor(AYESHA);
        svc.submit_pams(&owner, new_pams("2025-2026")).unwrap();
        assert!(matches!(
            svc.submit_pams(&owner, new_pams(" 2025-2026 ")),
            Err(HrError::InvalidTransition(TransitionError::DuplicateSubmission { .. }))
        ));
        assert!(svc.submit_pams(&owner, new_pams("2026-2027")).is_ok());
    }

    #[test]
    fn awaiting_filter_follows_route() {
        let svc = service();
        svc.submit_pams(&employee_actor(AYESHA), new_pams("2025-2026")).unwrap();
        svc.submit_pams(&actor(Role::Hod, Some(RAFIQ)), new_pams("2025-2026")).unwrap();

        let for_dean = PamsFilter {
            awaiting: Some(Role::Dean),
            ..PamsFilter::default()
        };
        let waiting = svc.list_pams(&actor(Role::Dean, None), &for_dean).unwrap();
        assert_eq!(waiting.len(), 1);
        assert_eq!(waiting[0].employee_id, RAFIQ);
    }
}
