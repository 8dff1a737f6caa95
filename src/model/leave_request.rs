use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

use crate::model::{
    approval::{AuditTrail, Document, RequestStatus},
    role::Role,
};
use crate::store::{Audited, Entity};
use crate::workflow::chain::ApprovalChain;

#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveType {
    Annual,
    Casual,
    Sick,
    Medical,
    Maternity,
    Unpaid,
}

impl LeaveType {
    /// Reviewers in the order they must act.
    pub fn approval_roles(self) -> &'static [Role] {
        match self {
            LeaveType::Medical => &[Role::Hod, Role::Vc, Role::President],
            _ => &[Role::Hod, Role::Dean, Role::Hr],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LeaveRequest {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1000)]
    pub employee_id: u64,
    pub leave_type: LeaveType,
    #[schema(example = "2026-01-01")]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-03")]
    pub end_date: NaiveDate,
    /// Inclusive calendar days between start and end.
    #[schema(example = 3)]
    pub days: u32,
    pub reason: String,
    pub expected_delivery_date: Option<NaiveDate>,
    pub applied_on: NaiveDate,
    pub status: RequestStatus,
    pub approval_chain: ApprovalChain,
    pub audit: AuditTrail,
    pub documents: Vec<Document>,
    pub version: u64,
}

impl LeaveRequest {
    /// Pending or approved leave that has not yet ended.
    pub fn is_active_on(&self, day: NaiveDate) -> bool {
        self.status != RequestStatus::Rejected && self.end_date >= day
    }
}

impl Entity for LeaveRequest {
    const KIND: &'static str = "Leave request";
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

impl Audited for LeaveRequest {
    fn audit_mut(&mut self) -> &mut AuditTrail {
        &mut self.audit
    }
}
