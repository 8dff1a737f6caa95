use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use crate::model::approval::{AuditTrail, RequestStatus};
use crate::store::{Audited, Entity};

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
pub enum LoanType {
    Refundable,
    #[serde(rename = "Non-Refundable")]
    #[strum(serialize = "Non-Refundable")]
    NonRefundable,
}

/// CECPF loan or withdrawal request handled by the finance office.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PfRequest {
    pub id: u64,
    pub employee_id: u64,
    pub loan_type: LoanType,
    #[schema(example = 50000.0)]
    pub amount: f64,
    pub purpose: String,
    /// Balance the request was evaluated against.
    pub balance_at_request: f64,
    pub submitted_at: DateTime<Utc>,
    pub status: RequestStatus,
    pub audit: AuditTrail,
    #[serde(default)]
    pub version: u64,
}

impl Entity for PfRequest {
    const KIND: &'static str = "Provident fund request";
    const IMMUTABLE: &'static [&'static str] = &["id", "employee_id", "status", "audit", "version"];

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

impl Audited for PfRequest {
    fn audit_mut(&mut self) -> &mut AuditTrail {
        &mut self.audit
    }
}
