use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use strum::IntoEnumIterator;
use tracing::info;
use utoipa::ToSchema;

use super::{HrService, REVIEWERS, require_role, require_self_or, require_text};
use crate::eligibility::{self, PfApplicant, Verdict};
use crate::error::{HrError, HrResult};
use crate::model::{
    employee::{Employee, EmploymentStatus},
    leave_request::LeaveType,
    provident_fund::LoanType,
    role::Role,
};
use crate::workflow::Actor;

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "code": "EMP-001",
        "name": "Ayesha Karim",
        "email": "ayesha@university.edu",
        "gender": "female",
        "date_of_birth": "1985-04-12",
        "joining_date": "2019-07-01",
        "department": "Computer Science",
        "faculty": "Engineering",
        "designation": "Assistant Professor",
        "salary_base": 90000.0,
        "pf_balance": 250000.0
    })
)]
pub struct NewEmployee {
    pub code: String,
    pub name: String,
    pub email: String,
    pub gender: String,
    pub date_of_birth: Option<NaiveDate>,
    pub joining_date: NaiveDate,
    pub department: String,
    pub faculty: String,
    pub designation: String,
    pub salary_base: f64,
    #[serde(default)]
    pub pf_balance: f64,
}

/// Remaining days per leave type; `None` for uncapped types.
pub type LeaveBalances = BTreeMap<LeaveType, Option<f64>>;

impl HrService {
    pub fn create_employee(&self, actor: &Actor, input: NewEmployee) -> HrResult<Employee> {
        require_role(actor, &[Role::Admin, Role::Hr], "create employees")?;
        require_text(&input.code, "Employee code", 1)?;
        require_text(&input.name, "Name", 2)?;
        if !input.email.contains('@') {
            return Err(HrError::validation("Email address is invalid"));
        }
        if input.salary_base < 0.0 || input.pf_balance < 0.0 {
            return Err(HrError::validation("Salary and PF balance cannot be negative"));
        }

        let code = input.code.trim().to_uppercase();
        let employee = self.store.transaction(|s| {
            if s.employees.find(|e| e.code == code).is_some() {
                return Err(HrError::Conflict(format!("Employee code {} already exists", code)));
            }
            Ok(s.employees.insert_with(|id| Employee {
                id,
                code: code.clone(),
                name: input.name.trim().to_string(),
                email: input.email.trim().to_lowercase(),
                gender: input.gender.trim().to_string(),
                date_of_birth: input.date_of_birth,
                joining_date: input.joining_date,
                department: input.department.trim().to_string(),
                faculty: input.faculty.trim().to_string(),
                designation: input.designation.trim().to_string(),
                employment_status: EmploymentStatus::Active,
                leave_balance: BTreeMap::new(),
                salary_base: input.salary_base,
                pf_balance: input.pf_balance,
                fyp_supervised: vec![],
                thesis_supervised: vec![],
                research_grants: vec![],
                administrative_duties: vec![],
                publications: vec![],
                qualifications: vec![],
                dependents: vec![],
                version: 0,
            }))
        })?;

        info!(employee_id = employee.id, code = %employee.code, "Employee created");
        Ok(employee)
    }

    pub fn get_employee(&self, actor: &Actor, id: u64) -> HrResult<Employee> {
        require_self_or(actor, id, REVIEWERS, "view this employee")?;
        self.store.read(|s| s.employees.fetch(id))
    }

    pub fn list_employees(&self, actor: &Actor, department: Option<&str>) -> HrResult<Vec<Employee>> {
        require_role(actor, REVIEWERS, "list employees")?;
        Ok(self.store.read(|s| {
            s.employees.filter(|e| {
                department.is_none_or(|d| e.department.eq_ignore_ascii_case(d.trim()))
            })
        }))
    }

    /// HR edit of top-level employee fields (shallow merge).
    pub fn update_employee(&self, actor: &Actor, id: u64, patch: &Value) -> HrResult<Employee> {
        require_role(actor, &[Role::Admin, Role::Hr], "edit employees")?;
        let employee = self.store.transaction(|s| s.employees.update(id, patch))?;
        info!(employee_id = id, version = employee.version, "Employee updated");
        Ok(employee)
    }

    pub fn leave_balances(&self, actor: &Actor, employee_id: u64) -> HrResult<LeaveBalances> {
        let employee = self.get_employee(actor, employee_id)?;
        Ok(LeaveType::iter()
            .map(|t| {
                let available = eligibility::available_balance(&employee, t, &self.policy.leave_allotments);
                (t, available)
            })
            .collect())
    }

    pub fn maternity_eligibility(&self, actor: &Actor, employee_id: u64) -> HrResult<Verdict> {
        require_self_or(actor, employee_id, REVIEWERS, "check maternity eligibility")?;
        let today = self.today();
        self.store.read(|s| {
            let employee = s.employees.get(employee_id)?;
            let leaves = s.leaves.filter(|l| l.employee_id == employee_id);
            Ok(eligibility::check_maternity_eligibility(employee, &leaves, &self.policy.maternity, today).into())
        })
    }

    pub fn pf_eligibility(
        &self,
        actor: &Actor,
        employee_id: u64,
        loan_type: LoanType,
        amount: f64,
    ) -> HrResult<Verdict> {
        require_self_or(
            actor,
            employee_id,
            &[Role::Admin, Role::Hr, Role::Finance],
            "check provident fund eligibility",
        )?;
        let today = self.today();
        self.store.read(|s| {
            let applicant = PfApplicant::from_employee(s.employees.get(employee_id)?, today);
            Ok(eligibility::check_pf_request(&applicant, loan_type, amount, &self.policy.provident_fund).into())
        })
    }
}
