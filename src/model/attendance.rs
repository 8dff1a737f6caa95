use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use crate::model::approval::{AuditTrail, Document, RequestStatus};
use crate::store::{Audited, Entity};

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
    OnLeave,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Attendance {
    pub id: u64,
    pub employee_id: u64,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[schema(value_type = Option<String>, example = "09:05:00")]
    pub check_in: Option<NaiveTime>,
    #[schema(value_type = Option<String>, example = "17:00:00")]
    pub check_out: Option<NaiveTime>,
    #[serde(default)]
    pub version: u64,
}

impl Entity for Attendance {
    const KIND: &'static str = "Attendance record";
    const IMMUTABLE: &'static [&'static str] = &["id", "employee_id", "date", "version"];

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

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceCorrection {
    pub id: u64,
    pub employee_id: u64,
    pub employee_name: String,
    pub department: String,
    pub date: NaiveDate,
    pub original_status: AttendanceStatus,
    pub requested_status: AttendanceStatus,
    pub reason: String,
    pub submitted_on: DateTime<Utc>,
    pub status: RequestStatus,
    pub reviewed_by: Option<String>,
    pub audit: AuditTrail,
    pub documents: Vec<Document>,
    #[serde(default)]
    pub version: u64,
}

impl AttendanceCorrection {
    /// Attendance status the day should carry given the current resolution.
    pub fn effective_status(&self) -> AttendanceStatus {
        match self.status {
            RequestStatus::Approved => self.requested_status,
            RequestStatus::Pending | RequestStatus::Rejected => self.original_status,
        }
    }
}

impl Entity for AttendanceCorrection {
    const KIND: &'static str = "Attendance correction";
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

impl Audited for AttendanceCorrection {
    fn audit_mut(&mut self) -> &mut AuditTrail {
        &mut self.audit
    }
}
