use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use crate::eligibility;
use crate::error::{HrError, HrResult};
use crate::model::leave_request::LeaveType;
use crate::store::Entity;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EmploymentStatus {
    #[default]
    Active,
    Resigned,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "code": "EMP-001",
        "name": "Ayesha Karim",
        "email": "ayesha@university.edu",
        "gender": "female",
        "date_of_birth": "1985-04-12",
        "joining_date": "2019-07-01",
        "department": "Computer Science",
        "faculty": "Engineering",
        "designation": "Assistant Professor",
        "employment_status": "active",
        "leave_balance": { "casual": 8.0 },
        "salary_base": 90000.0,
        "pf_balance": 250000.0
    })
)]
pub struct Employee {
    pub id: u64,
    pub code: String,
    pub name: String,
    pub email: String,
    pub gender: String,
    pub date_of_birth: Option<NaiveDate>,
    pub joining_date: NaiveDate,
    pub department: String,
    pub faculty: String,
    pub designation: String,
    #[serde(default)]
    pub employment_status: EmploymentStatus,
    /// Per-type overrides; types without an entry use the policy allotment.
    #[serde(default)]
    pub leave_balance: BTreeMap<LeaveType, f64>,
    pub salary_base: f64,
    #[serde(default)]
    pub pf_balance: f64,

    #[serde(default)]
    pub fyp_supervised: Vec<Supervision>,
    #[serde(default)]
    pub thesis_supervised: Vec<Supervision>,
    #[serde(default)]
    pub research_grants: Vec<ResearchGrant>,
    #[serde(default)]
    pub administrative_duties: Vec<AdministrativeDuty>,
    #[serde(default)]
    pub publications: Vec<Publication>,
    #[serde(default)]
    pub qualifications: Vec<Qualification>,
    #[serde(default)]
    pub dependents: Vec<Dependent>,

    #[serde(default)]
    pub version: u64,
}

impl Employee {
    pub fn is_female(&self) -> bool {
        self.gender.trim().eq_ignore_ascii_case("female")
    }

    pub fn years_of_service(&self, today: NaiveDate) -> u32 {
        full_years_between(self.joining_date, today)
    }

    pub fn months_of_service(&self, today: NaiveDate) -> i64 {
        full_months_between(self.joining_date, today)
    }

    pub fn age(&self, today: NaiveDate) -> Option<u32> {
        self.date_of_birth.map(|dob| full_years_between(dob, today))
    }
}

impl Entity for Employee {
    const KIND: &'static str = "Employee";
    const IMMUTABLE: &'static [&'static str] = &["id", "code", "version"];

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

pub fn full_months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    if to < from {
        return 0;
    }
    let mut months = (to.year() - from.year()) as i64 * 12 + to.month() as i64 - from.month() as i64;
    if to.day() < from.day() {
        months -= 1;
    }
    months.max(0)
}

pub fn full_years_between(from: NaiveDate, to: NaiveDate) -> u32 {
    (full_months_between(from, to) / 12) as u32
}

/* =========================
Nested profile collections
========================= */

/// A record kept in one of the employee's nested collections.
pub trait ProfileRecord: Clone + Serialize + DeserializeOwned {
    fn id(&self) -> u64;
    fn set_id(&mut self, id: u64);

    fn validate(&self) -> HrResult<()> {
        Ok(())
    }
}

fn require(value: &str, field: &str) -> HrResult<()> {
    if value.trim().is_empty() {
        Err(HrError::validation(format!("{} is required", field)))
    } else {
        Ok(())
    }
}

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ProfileSection {
    FypSupervised,
    ThesisSupervised,
    ResearchGrants,
    AdministrativeDuties,
    Publications,
    Qualifications,
    Dependents,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Supervision {
    #[serde(default)]
    pub id: u64,
    pub student_name: String,
    pub title: String,
    pub level: Option<String>,
    pub year: Option<i32>,
    pub status: Option<String>,
}

impl ProfileRecord for Supervision {
    fn id(&self) -> u64 {
        self.id
    }
    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
    fn validate(&self) -> HrResult<()> {
        require(&self.student_name, "Student name")?;
        require(&self.title, "Title")
    }
}

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GrantOutcome {
    Submitted,
    Pending,
    Approved,
    Awarded,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ResearchGrant {
    #[serde(default)]
    pub id: u64,
    pub title: String,
    pub agency: String,
    #[schema(example = 500000.0)]
    pub amount: f64,
    pub outcome: GrantOutcome,
    pub submitted_date: Option<NaiveDate>,
    pub approved_date: Option<NaiveDate>,
    pub amount_obtained: Option<f64>,
}

impl ProfileRecord for ResearchGrant {
    fn id(&self) -> u64 {
        self.id
    }
    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
    fn validate(&self) -> HrResult<()> {
        require(&self.title, "Title")?;
        require(&self.agency, "Funding agency")?;
        eligibility::check_grant(self)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AdministrativeDuty {
    #[serde(default)]
    pub id: u64,
    pub title: String,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub description: Option<String>,
}

impl ProfileRecord for AdministrativeDuty {
    fn id(&self) -> u64 {
        self.id
    }
    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
    fn validate(&self) -> HrResult<()> {
        require(&self.title, "Title")?;
        match (self.from, self.to) {
            (Some(from), Some(to)) if to < from => {
                Err(HrError::validation("Duty end date cannot be before its start date"))
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Publication {
    #[serde(default)]
    pub id: u64,
    pub title: String,
    pub venue: String,
    pub year: i32,
    pub kind: Option<String>,
}

impl ProfileRecord for Publication {
    fn id(&self) -> u64 {
        self.id
    }
    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
    fn validate(&self) -> HrResult<()> {
        require(&self.title, "Title")?;
        require(&self.venue, "Venue")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Qualification {
    #[serde(default)]
    pub id: u64,
    pub degree: String,
    pub institution: String,
    pub year: Option<i32>,
}

impl ProfileRecord for Qualification {
    fn id(&self) -> u64 {
        self.id
    }
    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
    fn validate(&self) -> HrResult<()> {
        require(&self.degree, "Degree")?;
        require(&self.institution, "Institution")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Dependent {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    pub relationship: String,
    pub date_of_birth: Option<NaiveDate>,
}

impl ProfileRecord for Dependent {
    fn id(&self) -> u64 {
        self.id
    }
    fn set_id(&mut self, id: u64) {
        self.id = id;
    }
    fn validate(&self) -> HrResult<()> {
        require(&self.name, "Name")?;
        require(&self.relationship, "Relationship")
    }
}
