use chrono::NaiveDate;
use tracing::info;

use super::{HrService, require_role, require_self_or};
use crate::error::{HrError, HrResult};
use crate::model::{
    employee::EmploymentStatus,
    payroll::{PayrollItem, PayrollRun, PayrollSettings, month_start},
    role::Role,
};
use crate::store::StoreState;
use crate::workflow::Actor;

const PAYROLL_OFFICERS: &[Role] = &[Role::Admin, Role::Hr, Role::Finance];

fn compute_items(s: &StoreState, month: NaiveDate) -> Vec<PayrollItem> {
    let attendance: Vec<_> = s.attendance.iter().cloned().collect();
    s.employees
        .iter()
        .filter(|e| e.employment_status == EmploymentStatus::Active)
        .map(|e| PayrollItem::compute(e, &s.payroll_settings, &attendance, month))
        .collect()
}

impl HrService {
    /// Items for `month` under the current settings, without posting them.
    pub fn compute_payroll(&self, actor: &Actor, month: NaiveDate) -> HrResult<Vec<PayrollItem>> {
        require_role(actor, PAYROLL_OFFICERS, "compute payroll")?;
        Ok(self.store.read(|s| compute_items(s, month)))
    }

    /// The frozen item when the month is posted, otherwise a live computation.
    pub fn payslip(&self, actor: &Actor, employee_id: u64, month: NaiveDate) -> HrResult<PayrollItem> {
        require_self_or(actor, employee_id, PAYROLL_OFFICERS, "view this payslip")?;
        let month = month_start(month);
        self.store.read(|s| {
            let posted = s
                .payroll_runs
                .find(|r| r.month == month)
                .and_then(|r| r.items.iter().find(|i| i.employee_id == employee_id));
            if let Some(item) = posted {
                return Ok(item.clone());
            }
            let employee = s.employees.get(employee_id)?;
            let attendance: Vec<_> = s
                .attendance
                .filter(|a| a.employee_id == employee_id);
            Ok(PayrollItem::compute(employee, &s.payroll_settings, &attendance, month))
        })
    }

    pub fn post_payroll_run(&self, actor: &Actor, month: NaiveDate) -> HrResult<PayrollRun> {
        require_role(actor, PAYROLL_OFFICERS, "post payroll")?;
        let month = month_start(month);
        if month > month_start(self.today()) {
            return Err(HrError::validation("Cannot post payroll for a future month"));
        }
        let now = self.now();

        let run = self.store.transaction(|s| {
            if s.payroll_runs.find(|r| r.month == month).is_some() {
                return Err(HrError::Conflict(format!(
                    "Payroll for {} has already been posted",
                    month.format("%Y-%m")
                )));
            }
            let items = compute_items(s, month);
            let total_net = (items.iter().map(|i| i.net_pay).sum::<f64>() * 100.0).round() / 100.0;
            let settings = s.payroll_settings.clone();
            Ok(s.payroll_runs.insert_with(|id| PayrollRun {
                id,
                month,
                posted_by: actor.name.clone(),
                posted_at: now,
                settings,
                items,
                total_net,
                version: 0,
            }))
        })?;

        info!(run_id = run.id, month = %run.month, employees = run.items.len(), total_net = run.total_net, "Payroll posted");
        Ok(run)
    }

    pub fn list_payroll_runs(&self, actor: &Actor) -> HrResult<Vec<PayrollRun>> {
        require_role(actor, PAYROLL_OFFICERS, "view payroll runs")?;
        Ok(self.store.read(|s| s.payroll_runs.filter(|_| true)))
    }

    pub fn payroll_settings(&self, actor: &Actor) -> HrResult<PayrollSettings> {
        require_role(actor, PAYROLL_OFFICERS, "view payroll settings")?;
        Ok(self.store.read(|s| s.payroll_settings.clone()))
    }

    /// New settings apply to future computations; posted runs keep theirs.
    pub fn update_payroll_settings(&self, actor: &Actor, settings: PayrollSettings) -> HrResult<PayrollSettings> {
        require_role(actor, &[Role::Admin, Role::Hr], "change payroll settings")?;
        settings.validate().map_err(HrError::Validation)?;
        self.store.transaction(|s| {
            s.payroll_settings = settings.clone();
            Ok(())
        })?;
        info!(by = %actor.name, ?settings, "Payroll settings updated");
        Ok(settings)
    }
}
