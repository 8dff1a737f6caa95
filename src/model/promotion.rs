use chrono::DateTime;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::approval::{AuditTrail, Document, RequestStatus};
use crate::store::{Audited, Entity};
use crate::workflow::chain::ApprovalChain;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PromotionRequest {
    pub id: u64,
    pub employee_id: u64,
    #[schema(example = "Assistant Professor")]
    pub current_designation: String,
    #[schema(example = "Associate Professor")]
    pub proposed_designation: String,
    pub justification: String,
    pub requested_by: String,
    pub submitted_at: DateTime<Utc>,
    pub status: RequestStatus,
    pub approval_chain: ApprovalChain,
    pub audit: AuditTrail,
    pub documents: Vec<Document>,
    #[serde(default)]
    pub version: u64,
}

impl Entity for PromotionRequest {
    const KIND: &'static str = "Promotion request";
    const IMMUTABLE: &'static [&'static str] =
        &["id", "employee_id", "status", "approval_chain", "audit", "version"];

    fn id(&self) -> u64 {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn bump_version(&mut self) {
        self.version += 1;
    }
}

impl Audited for PromotionRequest {
    fn audit_mut(&mut self) -> &mut AuditTrail {
        &mut self.audit
    }
}
