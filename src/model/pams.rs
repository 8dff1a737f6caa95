use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use crate::model::{
    approval::{AuditTrail, Document},
    role::Role,
};
use crate::store::{Audited, Entity};

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum PamsStatus {
    Submitted,
    Returned,
    HodConfirmed,
    DeanConfirmed,
    VcApproved,
    HrFinal,
}

/// Faculty submissions are reviewed by their HOD first; an HOD's own
/// submission goes straight to the dean.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PamsCategory {
    Faculty,
    Hod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Workload {
    pub teaching: String,
    pub research: String,
    #[serde(default)]
    pub administration: Option<String>,
    #[serde(default)]
    pub community: Option<String>,
}

/// One reviewer's verdict, layered next to the others rather than over them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Assessment {
    pub role: Role,
    pub by: String,
    /// Rubric category -> achievement level.
    pub levels: BTreeMap<String, String>,
    pub comments: Option<String>,
    pub meeting_date: Option<NaiveDate>,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PamsSubmission {
    pub id: u64,
    pub employee_id: u64,
    #[schema(example = "2025-2026")]
    pub period: String,
    pub category: PamsCategory,
    pub workload: Workload,
    /// Self-assessment against the rubric: category -> narrative.
    pub rubric: BTreeMap<String, String>,
    pub status: PamsStatus,
    pub assessments: Vec<Assessment>,
    pub audit: AuditTrail,
    pub documents: Vec<Document>,
    pub submitted_at: DateTime<Utc>,
    pub resubmissions: u32,
    #[serde(default)]
    pub version: u64,
}

impl Entity for PamsSubmission {
    const KIND: &'static str = "PAMS submission";
    const IMMUTABLE: &'static [&'static str] = &[
        "id",
        "employee_id",
        "period",
        "status",
        "assessments",
        "audit",
        "version",
    ];

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

impl Audited for PamsSubmission {
    fn audit_mut(&mut self) -> &mut AuditTrail {
        &mut self.audit
    }
}
