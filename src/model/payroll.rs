use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::{
    attendance::{Attendance, AttendanceStatus},
    employee::Employee,
};
use crate::store::Entity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PayrollSettings {
    #[schema(example = 40.0)]
    pub house_rent_pct: f64,
    #[schema(example = 10.0)]
    pub medical_pct: f64,
    #[schema(example = 5.0)]
    pub conveyance_pct: f64,
    /// Monthly gross above which tax applies.
    #[schema(example = 100000.0)]
    pub tax_threshold: f64,
    #[schema(example = 10.0)]
    pub tax_rate_pct: f64,
    /// Flat deduction per late day.
    #[schema(example = 500.0)]
    pub late_penalty: f64,
    /// Divisor turning the base salary into a daily rate.
    #[schema(example = 22)]
    pub working_days_divisor: u32,
}

impl Default for PayrollSettings {
    fn default() -> Self {
        Self {
            house_rent_pct: 40.0,
            medical_pct: 10.0,
            conveyance_pct: 5.0,
            tax_threshold: 100_000.0,
            tax_rate_pct: 10.0,
            late_penalty: 500.0,
            working_days_divisor: 22,
        }
    }
}

impl PayrollSettings {
    pub fn validate(&self) -> Result<(), String> {
        let pcts = [
            ("house_rent_pct", self.house_rent_pct),
            ("medical_pct", self.medical_pct),
            ("conveyance_pct", self.conveyance_pct),
            ("tax_rate_pct", self.tax_rate_pct),
        ];
        if let Some((name, _)) = pcts.iter().find(|(_, v)| !(0.0..=100.0).contains(v)) {
            return Err(format!("{} must be between 0 and 100", name));
        }
        if self.tax_threshold < 0.0 || self.late_penalty < 0.0 {
            return Err("tax_threshold and late_penalty cannot be negative".into());
        }
        if self.working_days_divisor == 0 {
            return Err("working_days_divisor must be greater than zero".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PayrollItem {
    pub employee_id: u64,
    pub employee_name: String,
    pub department: String,
    #[schema(example = "2026-01-01")]
    pub month: NaiveDate,
    pub base_salary: f64,
    pub allowances: f64,
    pub gross: f64,
    pub late_days: u32,
    pub absent_days: u32,
    pub late_deduction: f64,
    pub absent_deduction: f64,
    pub tax: f64,
    pub net_pay: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// First day of the month containing `day`.
pub fn month_start(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

impl PayrollItem {
    /// Computes the item from the employee's base salary and the attendance
    /// records falling in `month`. Records for other months or employees are
    /// ignored.
    pub fn compute(
        employee: &Employee,
        settings: &PayrollSettings,
        attendance: &[Attendance],
        month: NaiveDate,
    ) -> Self {
        let month = month_start(month);
        let in_month = |a: &&Attendance| {
            a.employee_id == employee.id && a.date.year() == month.year() && a.date.month() == month.month()
        };
        let late_days = attendance
            .iter()
            .filter(in_month)
            .filter(|a| a.status == AttendanceStatus::Late)
            .count() as u32;
        let absent_days = attendance
            .iter()
            .filter(in_month)
            .filter(|a| a.status == AttendanceStatus::Absent)
            .count() as u32;

        let base = employee.salary_base;
        let allowances = round2(
            base * (settings.house_rent_pct + settings.medical_pct + settings.conveyance_pct) / 100.0,
        );
        let gross = round2(base + allowances);
        let late_deduction = round2(late_days as f64 * settings.late_penalty);
        let daily_rate = base / settings.working_days_divisor.max(1) as f64;
        let absent_deduction = round2(absent_days as f64 * daily_rate);
        let tax = round2((gross - settings.tax_threshold).max(0.0) * settings.tax_rate_pct / 100.0);
        let net_pay = round2(gross - (late_deduction + absent_deduction + tax));

        Self {
            employee_id: employee.id,
            employee_name: employee.name.clone(),
            department: employee.department.clone(),
            month,
            base_salary: base,
            allowances,
            gross,
            late_days,
            absent_days,
            late_deduction,
            absent_deduction,
            tax,
            net_pay,
        }
    }
}

/// A posted payroll: the items are frozen at posting time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PayrollRun {
    pub id: u64,
    #[schema(example = "2026-01-01")]
    pub month: NaiveDate,
    pub posted_by: String,
    pub posted_at: DateTime<Utc>,
    pub settings: PayrollSettings,
    pub items: Vec<PayrollItem>,
    pub total_net: f64,
    #[serde(default)]
    pub version: u64,
}

impl Entity for PayrollRun {
    const KIND: &'static str = "Payroll run";

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
