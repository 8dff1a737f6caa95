use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::model::approval::{AuditTrail, RequestStatus};
use crate::store::{Audited, Entity};

/// Self-service change to an employee's own profile, applied once HR approves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProfileUpdateRequest {
    pub id: u64,
    pub employee_id: u64,
    /// Top-level employee fields to replace.
    #[schema(value_type = Object, example = json!({ "email": "new@university.edu" }))]
    pub changes: Value,
    pub note: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub status: RequestStatus,
    pub audit: AuditTrail,
    #[serde(default)]
    pub version: u64,
}

impl Entity for ProfileUpdateRequest {
    const KIND: &'static str = "Profile update request";
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

impl Audited for ProfileUpdateRequest {
    fn audit_mut(&mut self) -> &mut AuditTrail {
        &mut self.audit
    }
}
