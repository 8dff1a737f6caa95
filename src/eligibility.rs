//! Side-effect-free eligibility rules.
//!
//! Every check returns the first rule that fails; nothing is aggregated.

use chrono::NaiveDate;
use derive_more::Display;
use serde::Serialize;
use utoipa::ToSchema;

use crate::config::{LeaveAllotments, MaternityPolicy, PfPolicy};
use crate::model::{
    employee::{Employee, GrantOutcome, ResearchGrant},
    leave_request::{LeaveRequest, LeaveType},
    provident_fund::LoanType,
};

#[derive(Debug, Display, Clone, PartialEq)]
pub enum Ineligible {
    #[display(fmt = "Maternity leave is only available to female employees")]
    NotFemale,
    #[display(fmt = "An active maternity leave already exists")]
    ActiveMaternityLeave,
    #[display(
        fmt = "Maternity leave requires at least {} months of service (currently {})",
        required,
        months
    )]
    InsufficientTenure { months: i64, required: u32 },
    #[display(
        fmt = "Maternity leave must be applied at least {} days before the expected delivery date (only {} days remain)",
        required,
        days
    )]
    NoticeTooShort { days: i64, required: i64 },
    #[display(fmt = "Expected delivery date is required for maternity leave")]
    MissingDeliveryDate,
    #[display(
        fmt = "Minimum {} years of service required (currently {})",
        required,
        years
    )]
    InsufficientService { years: u32, required: u32 },
    #[display(
        fmt = "Non-refundable withdrawal requires age {} or above (currently {})",
        required,
        age
    )]
    UnderAge { age: u32, required: u32 },
    #[display(fmt = "Date of birth is required for a non-refundable withdrawal")]
    UnknownAge,
    #[display(
        fmt = "Requested amount {:.2} exceeds the limit of {:.2} ({}% of balance)",
        requested,
        cap,
        percent
    )]
    ExceedsCap { requested: f64, cap: f64, percent: u32 },
    #[display(fmt = "Requested amount must be greater than zero")]
    NonPositiveAmount,
    #[display(
        fmt = "Insufficient {} leave balance: requested {} days, available {}",
        leave_type,
        requested,
        available
    )]
    InsufficientBalance {
        leave_type: LeaveType,
        requested: f64,
        available: f64,
    },
    #[display(fmt = "Approved date is required when the grant is {}", outcome)]
    MissingApprovedDate { outcome: GrantOutcome },
    #[display(
        fmt = "Amount obtained ({}) cannot exceed the grant amount ({})",
        obtained,
        amount
    )]
    ObtainedExceedsAmount { obtained: f64, amount: f64 },
}

impl std::error::Error for Ineligible {}

pub type Check = Result<(), Ineligible>;

/// Wire form of a check result.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Verdict {
    pub eligible: bool,
    pub reason: Option<String>,
}

impl From<Check> for Verdict {
    fn from(check: Check) -> Self {
        match check {
            Ok(()) => Verdict {
                eligible: true,
                reason: None,
            },
            Err(why) => Verdict {
                eligible: false,
                reason: Some(why.to_string()),
            },
        }
    }
}

/// Female, no maternity leave still running, and (if configured) enough
/// tenure.
pub fn check_maternity_eligibility(
    employee: &Employee,
    existing: &[LeaveRequest],
    policy: &MaternityPolicy,
    today: NaiveDate,
) -> Check {
    if !employee.is_female() {
        return Err(Ineligible::NotFemale);
    }
    let has_active = existing.iter().any(|leave| {
        leave.employee_id == employee.id
            && leave.leave_type == LeaveType::Maternity
            && leave.is_active_on(today)
    });
    if has_active {
        return Err(Ineligible::ActiveMaternityLeave);
    }
    if let Some(required) = policy.min_service_months {
        let months = employee.months_of_service(today);
        if months < required as i64 {
            return Err(Ineligible::InsufficientTenure { months, required });
        }
    }
    Ok(())
}

pub fn check_maternity_notice(
    expected_delivery: Option<NaiveDate>,
    applied_on: NaiveDate,
    policy: &MaternityPolicy,
) -> Check {
    let expected = expected_delivery.ok_or(Ineligible::MissingDeliveryDate)?;
    let days = (expected - applied_on).num_days();
    if days < policy.advance_notice_days {
        return Err(Ineligible::NoticeTooShort {
            days,
            required: policy.advance_notice_days,
        });
    }
    Ok(())
}

/// Inputs to the provident fund rule, already derived from the employee.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PfApplicant {
    pub years_of_service: u32,
    pub age: Option<u32>,
    pub balance: f64,
}

impl PfApplicant {
    pub fn from_employee(employee: &Employee, today: NaiveDate) -> Self {
        Self {
            years_of_service: employee.years_of_service(today),
            age: employee.age(today),
            balance: employee.pf_balance,
        }
    }
}

/// Years of service, then age (non-refundable only), then the balance cap.
pub fn check_pf_request(
    applicant: &PfApplicant,
    loan_type: LoanType,
    amount: f64,
    policy: &PfPolicy,
) -> Check {
    if applicant.years_of_service < policy.min_service_years {
        return Err(Ineligible::InsufficientService {
            years: applicant.years_of_service,
            required: policy.min_service_years,
        });
    }
    if loan_type == LoanType::NonRefundable {
        let age = applicant.age.ok_or(Ineligible::UnknownAge)?;
        if age < policy.non_refundable_min_age {
            return Err(Ineligible::UnderAge {
                age,
                required: policy.non_refundable_min_age,
            });
        }
    }
    if amount <= 0.0 {
        return Err(Ineligible::NonPositiveAmount);
    }
    let cap = applicant.balance * policy.max_balance_ratio;
    if amount > cap {
        return Err(Ineligible::ExceedsCap {
            requested: amount,
            cap,
            percent: (policy.max_balance_ratio * 100.0).round() as u32,
        });
    }
    Ok(())
}

/// Remaining days of `leave_type`; `None` when the type is uncapped.
pub fn available_balance(
    employee: &Employee,
    leave_type: LeaveType,
    allotments: &LeaveAllotments,
) -> Option<f64> {
    employee
        .leave_balance
        .get(&leave_type)
        .copied()
        .or_else(|| allotments.default_for(leave_type))
}

pub fn check_leave_balance(
    employee: &Employee,
    leave_type: LeaveType,
    requested_days: u32,
    allotments: &LeaveAllotments,
) -> Check {
    match available_balance(employee, leave_type, allotments) {
        Some(available) if f64::from(requested_days) > available => Err(Ineligible::InsufficientBalance {
            leave_type,
            requested: f64::from(requested_days),
            available,
        }),
        _ => Ok(()),
    }
}

pub fn check_grant(grant: &ResearchGrant) -> Check {
    if matches!(grant.outcome, GrantOutcome::Approved | GrantOutcome::Awarded)
        && grant.approved_date.is_none()
    {
        return Err(Ineligible::MissingApprovedDate {
            outcome: grant.outcome,
        });
    }
    if let Some(obtained) = grant.amount_obtained {
        if obtained > grant.amount {
            return Err(Ineligible::ObtainedExceedsAmount {
                obtained,
                amount: grant.amount,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Policy;
    use crate::model::employee::tests::sample_employee;
    use crate::model::leave_request::tests::sample_leave;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn applicant(years: u32, age: u32, balance: f64) -> PfApplicant {
        PfApplicant {
            years_of_service: years,
            age: Some(age),
            balance,
        }
    }

    #[test]
    fn pf_years_checked_first() {
        let policy = Policy::default().provident_fund;
        let err = check_pf_request(&applicant(2, 30, 100_000.0), LoanType::Refundable, 50_000.0, &policy)
            .unwrap_err();
        assert_eq!(err, Ineligible::InsufficientService { years: 2, required: 3 });
        assert!(err.to_string().contains("3 years of service"));
    }

    #[test]
    fn pf_age_checked_for_non_refundable() {
        let policy = Policy::default().provident_fund;
        let err = check_pf_request(&applicant(5, 45, 100_000.0), LoanType::NonRefundable, 50_000.0, &policy)
            .unwrap_err();
        assert_eq!(err, Ineligible::UnderAge { age: 45, required: 50 });
        assert!(err.to_string().contains("age 50"));
    }

    #[test]
    fn pf_short_circuits_before_amount() {
        let policy = Policy::default().provident_fund;
        // fails both years and amount; only years is reported
        let err = check_pf_request(&applicant(1, 55, 100.0), LoanType::NonRefundable, 1_000_000.0, &policy)
            .unwrap_err();
        assert!(matches!(err, Ineligible::InsufficientService { .. }));
    }

    #[rstest]
    #[case(80_000.0, true)]
    #[case(80_000.01, false)]
    #[case(0.0, false)]
    fn pf_amount_capped_at_eighty_percent(#[case] amount: f64, #[case] ok: bool) {
        let policy = Policy::default().provident_fund;
        let result = check_pf_request(&applicant(5, 45, 100_000.0), LoanType::Refundable, amount, &policy);
        assert_eq!(result.is_ok(), ok);
    }

    #[test]
    fn refundable_loan_ignores_age() {
        let policy = Policy::default().provident_fund;
        assert!(check_pf_request(&applicant(5, 30, 100_000.0), LoanType::Refundable, 50_000.0, &policy).is_ok());
    }

    #[rstest]
    #[case(40, false)]
    #[case(59, false)]
    #[case(60, true)]
    #[case(200, true)]
    fn maternity_notice_window(#[case] days_out: i64, #[case] ok: bool) {
        let policy = Policy::default().maternity;
        let applied = date(2026, 3, 1);
        let expected = applied + chrono::Duration::days(days_out);
        let result = check_maternity_notice(Some(expected), applied, &policy);
        assert_eq!(result.is_ok(), ok);
        if let Err(why) = result {
            assert!(why.to_string().contains("60 days"));
            assert!(why.to_string().contains(&format!("only {} days", days_out)));
        }
    }

    #[test]
    fn maternity_requires_female() {
        let policy = Policy::default().maternity;
        let employee = sample_employee(1, "Rafiq", "Male");
        assert_eq!(
            check_maternity_eligibility(&employee, &[], &policy, date(2026, 3, 1)),
            Err(Ineligible::NotFemale)
        );
    }

    #[test]
    fn maternity_blocked_by_running_leave() {
        let policy = Policy::default().maternity;
        let employee = sample_employee(1, "Ayesha", "female");
        let mut running = sample_leave(7, 1);
        running.leave_type = LeaveType::Maternity;
        running.end_date = date(2026, 6, 1);

        assert_eq!(
            check_maternity_eligibility(&employee, &[running.clone()], &policy, date(2026, 3, 1)),
            Err(Ineligible::ActiveMaternityLeave)
        );
        // once ended it no longer blocks
        assert!(check_maternity_eligibility(&employee, &[running], &policy, date(2026, 7, 1)).is_ok());
    }

    #[test]
    fn maternity_tenure_only_when_configured() {
        let mut policy = Policy::default().maternity;
        let mut employee = sample_employee(1, "Ayesha", "female");
        employee.joining_date = date(2026, 1, 1);
        assert!(check_maternity_eligibility(&employee, &[], &policy, date(2026, 3, 1)).is_ok());

        policy.min_service_months = Some(6);
        assert_eq!(
            check_maternity_eligibility(&employee, &[], &policy, date(2026, 3, 1)),
            Err(Ineligible::InsufficientTenure { months: 2, required: 6 })
        );
    }

    #[test]
    fn leave_balance_falls_back_to_allotment() {
        let allotments = Policy::default().leave_allotments;
        let mut employee = sample_employee(1, "Ayesha", "female");

        assert!(check_leave_balance(&employee, LeaveType::Casual, 10, &allotments).is_ok());
        assert!(check_leave_balance(&employee, LeaveType::Casual, 11, &allotments).is_err());

        employee.leave_balance.insert(LeaveType::Casual, 2.0);
        assert_eq!(
            check_leave_balance(&employee, LeaveType::Casual, 3, &allotments),
            Err(Ineligible::InsufficientBalance {
                leave_type: LeaveType::Casual,
                requested: 3.0,
                available: 2.0
            })
        );
        assert!(check_leave_balance(&employee, LeaveType::Unpaid, 365, &allotments).is_ok());
    }

    fn grant(outcome: GrantOutcome, approved: Option<NaiveDate>, obtained: Option<f64>) -> ResearchGrant {
        ResearchGrant {
            id: 0,
            title: "Edge AI".into(),
            agency: "UGC".into(),
            amount: 100_000.0,
            outcome,
            submitted_date: None,
            approved_date: approved,
            amount_obtained: obtained,
        }
    }

    #[rstest]
    #[case(GrantOutcome::Approved, None, None, false)]
    #[case(GrantOutcome::Awarded, None, None, false)]
    #[case(GrantOutcome::Awarded, Some(date(2025, 1, 1)), None, true)]
    #[case(GrantOutcome::Pending, None, None, true)]
    #[case(GrantOutcome::Awarded, Some(date(2025, 1, 1)), Some(120_000.0), false)]
    #[case(GrantOutcome::Awarded, Some(date(2025, 1, 1)), Some(100_000.0), true)]
    fn grant_rules(
        #[case] outcome: GrantOutcome,
        #[case] approved: Option<NaiveDate>,
        #[case] obtained: Option<f64>,
        #[case] ok: bool,
    ) {
        assert_eq!(check_grant(&grant(outcome, approved, obtained)).is_ok(), ok);
    }

    #[test]
    fn verdict_carries_reason() {
        let verdict = Verdict::from(Err(Ineligible::NotFemale));
        assert!(!verdict.eligible);
        assert_eq!(
            verdict.reason.as_deref(),
            Some("Maternity leave is only available to female employees")
        );
        assert!(Verdict::from(Ok(())).eligible);
    }
}
