use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{info, warn};
use utoipa::{IntoParams, ToSchema};

use super::{HrService, REVIEWERS, own_employee_id, require_self_or, require_text};
use crate::eligibility::{self, Ineligible};
use crate::error::{HrError, HrResult};
use crate::model::{
    approval::{AuditEntry, AuditTrail, DocumentInput, RequestStatus, attach_documents},
    leave_request::{LeaveRequest, LeaveType},
    role::Role,
};
use crate::workflow::{
    Actor,
    chain::{ChainOutcome, Decision},
    leave,
};

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[schema(example = json!({
    "leave_type": "casual",
    "start_date": "2026-03-10",
    "end_date": "2026-03-12",
    "reason": "Family event out of town"
}))]
pub struct NewLeave {
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    /// Required for maternity leave.
    pub expected_delivery_date: Option<NaiveDate>,
    #[serde(default)]
    pub documents: Vec<DocumentInput>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    /// Filter by employee ID
    pub employee_id: Option<u64>,
    /// Filter by overall status
    pub status: Option<RequestStatus>,
    pub leave_type: Option<LeaveType>,
    /// Only requests whose current step belongs to this role
    pub awaiting: Option<Role>,
}

impl LeaveFilter {
    fn matches(&self, leave: &LeaveRequest) -> bool {
        self.employee_id.is_none_or(|id| leave.employee_id == id)
            && self.status.is_none_or(|s| leave.status == s)
            && self.leave_type.is_none_or(|t| leave.leave_type == t)
            && self
                .awaiting
                .is_none_or(|role| leave.approval_chain.current_role() == Some(role))
    }
}

const MIN_REASON_LEN: usize = 5;

impl HrService {
    pub fn submit_leave(&self, actor: &Actor, input: NewLeave) -> HrResult<LeaveRequest> {
        let employee_id = own_employee_id(actor)?;
        require_text(&input.reason, "Reason", MIN_REASON_LEN)?;
        let days = leave::leave_days(input.start_date, input.end_date)
            .ok_or_else(|| HrError::validation("start_date cannot be after end_date"))?;
        let today = self.today();
        let now = self.now();

        let request = self.store.transaction(|s| {
            let employee = s.employees.get(employee_id)?;
            let existing = s.leaves.filter(|l| l.employee_id == employee_id);

            let overlaps = existing.iter().any(|l| {
                l.status != RequestStatus::Rejected && l.start_date <= input.end_date && input.start_date <= l.end_date
            });
            if overlaps {
                return Err(HrError::Conflict("Leave overlaps an existing request".into()));
            }

            if input.leave_type == LeaveType::Maternity {
                eligibility::check_maternity_eligibility(employee, &existing, &self.policy.maternity, today)?;
                eligibility::check_maternity_notice(input.expected_delivery_date, today, &self.policy.maternity)?;
            }
            eligibility::check_leave_balance(employee, input.leave_type, days, &self.policy.leave_allotments)?;

            let mut audit = AuditTrail::default();
            audit.append(AuditEntry::new("submitted", actor.name.as_str(), now, None));
            Ok(s.leaves.insert_with(|id| LeaveRequest {
                id,
                employee_id,
                leave_type: input.leave_type,
                start_date: input.start_date,
                end_date: input.end_date,
                days,
                reason: input.reason.trim().to_string(),
                expected_delivery_date: input.expected_delivery_date,
                applied_on: today,
                status: RequestStatus::Pending,
                approval_chain: leave::chain_for(input.leave_type),
                audit,
                documents: attach_documents(input.documents),
                version: 0,
            }))
        })?;

        info!(
            leave_id = request.id,
            employee_id,
            leave_type = %request.leave_type,
            days = request.days,
            "Leave request submitted"
        );
        Ok(request)
    }

    /// Records the acting role's decision on the current step. Final approval
    /// debits the employee's balance for capped leave types.
    pub fn review_leave(
        &self,
        actor: &Actor,
        id: u64,
        decision: Decision,
        comment: Option<String>,
        expected_version: Option<u64>,
    ) -> HrResult<LeaveRequest> {
        let now = self.now();

        let (request, outcome) = self.store.transaction(|s| {
            let mut request = s.leaves.fetch_at(id, expected_version)?;
            let outcome = leave::review(&mut request, actor, decision, comment, now)?;

            if outcome == ChainOutcome::Approved {
                let mut employee = s.employees.fetch(request.employee_id)?;
                if let Some(available) =
                    eligibility::available_balance(&employee, request.leave_type, &self.policy.leave_allotments)
                {
                    let requested = f64::from(request.days);
                    if requested > available {
                        return Err(Ineligible::InsufficientBalance {
                            leave_type: request.leave_type,
                            requested,
                            available,
                        }
                        .into());
                    }
                    employee
                        .leave_balance
                        .insert(request.leave_type, available - requested);
                    s.employees.commit(employee);
                }
            }
            Ok((s.leaves.commit(request), outcome))
        })?;

        match outcome {
            ChainOutcome::Advanced { next } => {
                info!(leave_id = id, by = %actor.name, next = %next, "Leave step approved")
            }
            ChainOutcome::Approved => info!(leave_id = id, by = %actor.name, "Leave approved"),
            ChainOutcome::Rejected => warn!(leave_id = id, by = %actor.name, "Leave rejected"),
        }
        Ok(request)
    }

    pub fn get_leave(&self, actor: &Actor, id: u64) -> HrResult<LeaveRequest> {
        let leave = self.store.read(|s| s.leaves.fetch(id))?;
        require_self_or(actor, leave.employee_id, REVIEWERS, "view this leave request")?;
        Ok(leave)
    }

    /// Reviewers see every request; employees only their own.
    pub fn list_leaves(&self, actor: &Actor, filter: &LeaveFilter) -> HrResult<Vec<LeaveRequest>> {
        let own = if REVIEWERS.contains(&actor.role) {
            None
        } else {
            Some(own_employee_id(actor)?)
        };
        Ok(self.store.read(|s| {
            s.leaves
                .filter(|l| own.is_none_or(|id| l.employee_id == id) && filter.matches(l))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eligibility::Ineligible;
    use crate::service::test_support::*;
    use crate::workflow::TransitionError;

    fn casual(start: NaiveDate, end: NaiveDate) -> NewLeave {
        NewLeave {
            leave_type: LeaveType::Casual,
            start_date: start,
            end_date: end,
            reason: "Family event".into(),
            expected_delivery_date: None,
            documents: vec![],
        }
    }

    fn reviewer(role: Role) -> Actor {
        actor(role, None)
    }

    #[test]
    fn full_chain_approval_debits_balance() {
        let svc = service();
        let leave = svc
            .submit_leave(&employee_actor(AYESHA), casual(date(2026, 3, 10), date(2026, 3, 12)))
            .unwrap();
        assert_eq!(leave.days, 3);

        svc.review_leave(&reviewer(Role::Hod), leave.id, Decision::Approve, None, None).unwrap();
        svc.review_leave(&reviewer(Role::Dean), leave.id, Decision::Approve, None, None).unwrap();
        let done = svc
            .review_leave(&reviewer(Role::Hr), leave.id, Decision::Approve, Some("ok".into()), None)
            .unwrap();

        assert_eq!(done.status, RequestStatus::Approved);
        assert_eq!(done.audit.latest().unwrap().action, "approved by HR");
        let balances = svc.leave_balances(&hr(), AYESHA).unwrap();
        assert_eq!(balances[&LeaveType::Casual], Some(7.0));
    }

    #[test]
    fn out_of_turn_reviewer_leaves_store_untouched() {
        let svc = service();
        let leave = svc
            .submit_leave(&employee_actor(AYESHA), casual(date(2026, 3, 10), date(2026, 3, 12)))
            .unwrap();

        let err = svc
            .review_leave(&reviewer(Role::Dean), leave.id, Decision::Approve, None, None)
            .unwrap_err();
        assert_eq!(
            err,
            HrError::InvalidTransition(TransitionError::NotCurrentStep {
                role: Role::Dean,
                expected: Role::Hod
            })
        );
        assert_eq!(svc.get_leave(&hr(), leave.id).unwrap(), leave);
    }

    #[test]
    fn rejection_closes_the_chain() {
        let svc = service();
        let leave = svc
            .submit_leave(&employee_actor(AYESHA), casual(date(2026, 3, 10), date(2026, 3, 10)))
            .unwrap();
        let rejected = svc
            .review_leave(&reviewer(Role::Hod), leave.id, Decision::Reject, Some("busy week".into()), None)
            .unwrap();
        assert_eq!(rejected.status, RequestStatus::Rejected);
        assert!(
            svc.review_leave(&reviewer(Role::Dean), leave.id, Decision::Approve, None, None)
                .is_err()
        );
    }

    #[test]
    fn stale_version_conflicts() {
        let svc = service();
        let leave = svc
            .submit_leave(&employee_actor(AYESHA), casual(date(2026, 3, 10), date(2026, 3, 10)))
            .unwrap();
        svc.review_leave(&reviewer(Role::Hod), leave.id, Decision::Approve, None, Some(0)).unwrap();
        assert!(matches!(
            svc.review_leave(&reviewer(Role::Dean), leave.id, Decision::Approve, None, Some(0)),
            Err(HrError::Conflict(_))
        ));
    }

    #[test]
    fn submission_rules() {
        let svc = service();
        let me = employee_actor(AYESHA);

        assert!(matches!(
            svc.submit_leave(&me, casual(date(2026, 3, 12), date(2026, 3, 10))),
            Err(HrError::Validation(_))
        ));
        assert!(matches!(
            svc.submit_leave(&me, casual(date(2026, 3, 1), date(2026, 3, 11))),
            Err(HrError::Ineligible(Ineligible::InsufficientBalance { .. }))
        ));

        svc.submit_leave(&me, casual(date(2026, 3, 10), date(2026, 3, 12))).unwrap();
        assert!(matches!(
            svc.submit_leave(&me, casual(date(2026, 3, 12), date(2026, 3, 13))),
            Err(HrError::Conflict(_))
        ));
    }

    #[test]
    fn maternity_checks_gender_and_notice() {
        let svc = service();
        let mut input = casual(date(2026, 4, 1), date(2026, 7, 29));
        input.leave_type = LeaveType::Maternity;
        input.expected_delivery_date = Some(date(2026, 4, 10));

        assert_eq!(
            svc.submit_leave(&employee_actor(RAFIQ), input.clone()).unwrap_err(),
            HrError::Ineligible(Ineligible::NotFemale)
        );
        assert!(matches!(
            svc.submit_leave(&employee_actor(AYESHA), input.clone()),
            Err(HrError::Ineligible(Ineligible::NoticeTooShort { days: 40, required: 60 }))
        ));

        input.expected_delivery_date = Some(date(2026, 5, 15));
        let leave = svc.submit_leave(&employee_actor(AYESHA), input).unwrap();
        assert_eq!(leave.approval_chain.current_role(), Some(Role::Hod));
    }

    #[test]
    fn medical_leave_uses_vc_chain() {
        let svc = service();
        let mut input = casual(date(2026, 3, 2), date(2026, 3, 4));
        input.leave_type = LeaveType::Medical;
        let leave = svc.submit_leave(&employee_actor(RAFIQ), input).unwrap();

        svc.review_leave(&reviewer(Role::Hod), leave.id, Decision::Approve, None, None).unwrap();
        let filter = LeaveFilter {
            awaiting: Some(Role::Vc),
            ..LeaveFilter::default()
        };
        assert_eq!(svc.list_leaves(&reviewer(Role::Vc), &filter).unwrap().len(), 1);
    }

    #[test]
    fn employees_list_only_their_own() {
        let svc = service();
        svc.submit_leave(&employee_actor(AYESHA), casual(date(2026, 3, 10), date(2026, 3, 10)))
            .unwrap();
        svc.submit_leave(&employee_actor(RAFIQ), casual(date(2026, 3, 10), date(2026, 3, 10)))
            .unwrap();

        let mine = svc
            .list_leaves(&employee_actor(AYESHA), &LeaveFilter::default())
            .unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(svc.list_leaves(&hr(), &LeaveFilter::default()).unwrap().len(), 2);
        assert!(svc.get_leave(&employee_actor(RAFIQ), mine[0].id).is_err());
    }
}
