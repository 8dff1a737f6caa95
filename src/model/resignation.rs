use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use crate::model::approval::{AuditTrail, Document};
use crate::store::{Audited, Entity};

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
pub enum ResignationStatus {
    Pending,
    Approved,
    Completed,
    Rejected,
    Withdrawn,
}

impl ResignationStatus {
    pub fn is_open(self) -> bool {
        matches!(self, ResignationStatus::Pending | ResignationStatus::Approved)
    }
}

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum HandoverStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ExitSurvey {
    pub primary_reason: String,
    /// 1 (poor) to 5 (excellent).
    pub overall_rating: u8,
    pub would_recommend: bool,
    #[serde(default)]
    pub answers: BTreeMap<String, String>,
    pub comments: Option<String>,
    #[serde(default = "Utc::now")]
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Resignation {
    pub id: u64,
    pub employee_id: u64,
    pub reason: String,
    pub submitted_on: NaiveDate,
    pub last_working_day: NaiveDate,
    pub status: ResignationStatus,
    pub handover_status: HandoverStatus,
    pub exit_survey: Option<ExitSurvey>,
    pub audit: AuditTrail,
    pub documents: Vec<Document>,
    #[serde(default)]
    pub version: u64,
}

impl Entity for Resignation {
    const KIND: &'static str = "Resignation";
    const IMMUTABLE: &'static [&'static str] =
        &["id", "employee_id", "status", "exit_survey", "audit", "version"];

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

impl Audited for Resignation {
    fn audit_mut(&mut self) -> &mut AuditTrail {
        &mut self.audit
    }
}
