use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use super::{HrService, REVIEWERS, own_employee_id, require_self_or, require_text};
use crate::error::{HrError, HrResult};
use crate::model::{
    approval::{AuditEntry, AuditTrail, DocumentInput, RequestStatus, attach_documents},
    promotion::PromotionRequest,
    role::Role,
};
use crate::workflow::{
    Actor,
    chain::{ChainOutcome, Decision},
    promotion,
};

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[schema(example = json!({
    "proposed_designation": "Associate Professor",
    "justification": "Six journal publications and two funded grants since last promotion"
}))]
pub struct NewPromotion {
    /// Defaults to the requester's own profile; HOD and HR may file for others.
    pub employee_id: Option<u64>,
    pub proposed_designation: String,
    pub justification: String,
    #[serde(default)]
    pub documents: Vec<DocumentInput>,
}

const ON_BEHALF: &[Role] = &[Role::Admin, Role::Hr, Role::Hod];

impl HrService {
    pub fn submit_promotion(&self, actor: &Actor, input: NewPromotion) -> HrResult<PromotionRequest> {
        let employee_id = match input.employee_id {
            Some(id) => id,
            None => own_employee_id(actor)?,
        };
        require_self_or(actor, employee_id, ON_BEHALF, "request a promotion for this employee")?;
        require_text(&input.proposed_designation, "Proposed designation", 2)?;
        require_text(&input.justification, "Justification", 20)?;
        let now = self.now();

        let request = self.store.transaction(|s| {
            let employee = s.employees.get(employee_id)?;
            let proposed = input.proposed_designation.trim().to_string();
            if employee.designation.eq_ignore_ascii_case(&proposed) {
                return Err(HrError::validation("Proposed designation matches the current one"));
            }
            if s.promotions
                .find(|p| p.employee_id == employee_id && p.status == RequestStatus::Pending)
                .is_some()
            {
                return Err(HrError::Conflict("A promotion request is already pending".into()));
            }

            let current_designation = employee.designation.clone();
            let mut audit = AuditTrail::default();
            audit.append(AuditEntry::new("submitted", actor.name.as_str(), now, None));
            Ok(s.promotions.insert_with(|id| PromotionRequest {
                id,
                employee_id,
                current_designation,
                proposed_designation: proposed,
                justification: input.justification.trim().to_string(),
                requested_by: actor.name.clone(),
                submitted_at: now,
                status: RequestStatus::Pending,
                approval_chain: promotion::chain(),
                audit,
                documents: attach_documents(input.documents),
                version: 0,
            }))
        })?;

        info!(promotion_id = request.id, employee_id, "Promotion requested");
        Ok(request)
    }

    /// Final approval applies the proposed designation.
    pub fn review_promotion(
        &self,
        actor: &Actor,
        id: u64,
        decision: Decision,
        comment: Option<String>,
        expected_version: Option<u64>,
    ) -> HrResult<PromotionRequest> {
        let now = self.now();
        let request = self.store.transaction(|s| {
            let mut request = s.promotions.fetch_at(id, expected_version)?;
            let outcome = promotion::review(&mut request, actor, decision, comment, now)?;
            if outcome == ChainOutcome::Approved {
                let mut employee = s.employees.fetch(request.employee_id)?;
                employee.designation = request.proposed_designation.clone();
                s.employees.commit(employee);
            }
            Ok(s.promotions.commit(request))
        })?;

        info!(promotion_id = id, status = %request.status, by = %actor.name, "Promotion reviewed");
        Ok(request)
    }

    pub fn get_promotion(&self, actor: &Actor, id: u64) -> HrResult<PromotionRequest> {
        let request = self.store.read(|s| s.promotions.fetch(id))?;
        require_self_or(actor, request.employee_id, REVIEWERS, "view this promotion request")?;
        Ok(request)
    }

    pub fn list_promotions(&self, actor: &Actor, status: Option<RequestStatus>) -> HrResult<Vec<PromotionRequest>> {
        let own = if REVIEWERS.contains(&actor.role) {
            None
        } else {
            Some(own_employee_id(actor)?)
        };
        Ok(self.store.read(|s| {
            s.promotions.filter(|p| {
                own.is_none_or(|id| p.employee_id == id) && status.is_none_or(|st| p.status == st)
            })
        }))
    }
}
