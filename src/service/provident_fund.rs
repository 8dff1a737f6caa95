use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use super::{HrService, own_employee_id, require_role, require_self_or, require_text};
use crate::eligibility::{self, PfApplicant};
use crate::error::HrResult;
use crate::model::{
    approval::{AuditEntry, AuditTrail, RequestStatus},
    provident_fund::{LoanType, PfRequest},
    role::Role,
};
use crate::workflow::{
    Actor,
    chain::{Decision, decide_single},
};

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[schema(example = json!({
    "loan_type": "Refundable",
    "amount": 50000.0,
    "purpose": "House repair"
}))]
pub struct NewPfRequest {
    pub loan_type: LoanType,
    pub amount: f64,
    pub purpose: String,
}

const PF_OFFICERS: &[Role] = &[Role::Admin, Role::Finance];

impl HrService {
    pub fn submit_pf_request(&self, actor: &Actor, input: NewPfRequest) -> HrResult<PfRequest> {
        let employee_id = own_employee_id(actor)?;
        require_text(&input.purpose, "Purpose", 3)?;
        let today = self.today();
        let now = self.now();

        let request = self.store.transaction(|s| {
            let applicant = PfApplicant::from_employee(s.employees.get(employee_id)?, today);
            eligibility::check_pf_request(&applicant, input.loan_type, input.amount, &self.policy.provident_fund)?;

            let mut audit = AuditTrail::default();
            audit.append(AuditEntry::new("submitted", actor.name.as_str(), now, None));
            Ok(s.pf_requests.insert_with(|id| PfRequest {
                id,
                employee_id,
                loan_type: input.loan_type,
                amount: input.amount,
                purpose: input.purpose.trim().to_string(),
                balance_at_request: applicant.balance,
                submitted_at: now,
                status: RequestStatus::Pending,
                audit,
                version: 0,
            }))
        })?;

        info!(
            pf_request_id = request.id,
            employee_id,
            loan_type = %request.loan_type,
            amount = request.amount,
            "Provident fund request submitted"
        );
        Ok(request)
    }

    /// Finance decision. Approval re-runs the eligibility rule against the
    /// current balance, then debits it.
    pub fn review_pf_request(
        &self,
        actor: &Actor,
        id: u64,
        decision: Decision,
        comment: Option<String>,
        expected_version: Option<u64>,
    ) -> HrResult<PfRequest> {
        require_role(actor, PF_OFFICERS, "review provident fund requests")?;
        let today = self.today();
        let now = self.now();

        let request = self.store.transaction(|s| {
            let mut request = s.pf_requests.fetch_at(id, expected_version)?;
            let status = decide_single(&mut request.status, &mut request.audit, actor, decision, comment, now)?;
            if status == RequestStatus::Approved {
                let mut employee = s.employees.fetch(request.employee_id)?;
                let applicant = PfApplicant::from_employee(&employee, today);
                eligibility::check_pf_request(
                    &applicant,
                    request.loan_type,
                    request.amount,
                    &self.policy.provident_fund,
                )?;
                employee.pf_balance -= request.amount;
                s.employees.commit(employee);
            }
            Ok(s.pf_requests.commit(request))
        })?;

        info!(pf_request_id = id, status = %request.status, by = %actor.name, "Provident fund request reviewed");
        Ok(request)
    }

    pub fn list_pf_requests(&self, actor: &Actor, status: Option<RequestStatus>) -> HrResult<Vec<PfRequest>> {
        let own = if PF_OFFICERS.contains(&actor.role) || actor.role == Role::Hr {
            None
        } else {
            Some(own_employee_id(actor)?)
        };
        Ok(self.store.read(|s| {
            s.pf_requests.filter(|r| {
                own.is_none_or(|id| r.employee_id == id) && status.is_none_or(|st| r.status == st)
            })
        }))
    }

    pub fn get_pf_request(&self, actor: &Actor, id: u64) -> HrResult<PfRequest> {
        let request = self.store.read(|s| s.pf_requests.fetch(id))?;
        require_self_or(
            actor,
            request.employee_id,
            &[Role::Admin, Role::Finance, Role::Hr],
            "view this provident fund request",
        )?;
        Ok(request)
    }
}
