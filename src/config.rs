use std::env;
use std::fmt::Display;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use chrono::NaiveTime;
use dotenvy::dotenv;

use crate::model::{leave_request::LeaveType, payroll::PayrollSettings};

#[derive(Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub server_addr: String,
    pub access_token_ttl: usize,
    pub refresh_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_refresh_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    /// Seeded at startup so the first HR accounts can be created.
    pub bootstrap_admin_username: String,
    pub bootstrap_admin_password: Option<String>,

    pub policy: Policy,
}

/// Business rules HR can tune without a code change.
#[derive(Debug, Clone, PartialEq)]
pub struct Policy {
    pub leave_allotments: LeaveAllotments,
    pub maternity: MaternityPolicy,
    pub provident_fund: PfPolicy,
    pub office_start: NaiveTime,
    pub late_grace_minutes: i64,
    pub payroll: PayrollSettings,
}

/// Default yearly days per leave type, used when an employee has no
/// explicit balance for that type.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaveAllotments {
    pub annual: f64,
    pub casual: f64,
    pub sick: f64,
    pub medical: f64,
    pub maternity: f64,
}

impl LeaveAllotments {
    /// `None` means the type is uncapped.
    pub fn default_for(&self, leave_type: LeaveType) -> Option<f64> {
        match leave_type {
            LeaveType::Annual => Some(self.annual),
            LeaveType::Casual => Some(self.casual),
            LeaveType::Sick => Some(self.sick),
            LeaveType::Medical => Some(self.medical),
            LeaveType::Maternity => Some(self.maternity),
            LeaveType::Unpaid => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaternityPolicy {
    pub advance_notice_days: i64,
    pub min_service_months: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PfPolicy {
    pub min_service_years: u32,
    pub non_refundable_min_age: u32,
    /// Share of the balance that may be requested, 0.0 - 1.0.
    pub max_balance_ratio: f64,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            leave_allotments: LeaveAllotments {
                annual: 20.0,
                casual: 10.0,
                sick: 14.0,
                medical: 30.0,
                maternity: 120.0,
            },
            maternity: MaternityPolicy {
                advance_notice_days: 60,
                min_service_months: None,
            },
            provident_fund: PfPolicy {
                min_service_years: 3,
                non_refundable_min_age: 50,
                max_balance_ratio: 0.8,
            },
            office_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            late_grace_minutes: 15,
            payroll: PayrollSettings::default(),
        }
    }
}

fn parse_var<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{} has an invalid value `{}`: {}", key, raw, e)),
        Err(_) => Ok(default),
    }
}

fn required_var(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{} must be set", key))
}

impl Policy {
    pub fn from_env() -> Result<Self> {
        let defaults = Policy::default();

        let office_start = match env::var("OFFICE_START") {
            Ok(raw) => NaiveTime::parse_from_str(raw.trim(), "%H:%M")
                .with_context(|| format!("OFFICE_START has an invalid value `{}`", raw))?,
            Err(_) => defaults.office_start,
        };

        let min_service_months = match env::var("MATERNITY_MIN_SERVICE_MONTHS") {
            Ok(raw) if !raw.trim().is_empty() => Some(
                raw.trim()
                    .parse()
                    .with_context(|| format!("MATERNITY_MIN_SERVICE_MONTHS has an invalid value `{}`", raw))?,
            ),
            _ => defaults.maternity.min_service_months,
        };

        let a = &defaults.leave_allotments;
        let p = &defaults.payroll;
        let policy = Self {
            leave_allotments: LeaveAllotments {
                annual: parse_var("LEAVE_ANNUAL_DAYS", a.annual)?,
                casual: parse_var("LEAVE_CASUAL_DAYS", a.casual)?,
                sick: parse_var("LEAVE_SICK_DAYS", a.sick)?,
                medical: parse_var("LEAVE_MEDICAL_DAYS", a.medical)?,
                maternity: parse_var("LEAVE_MATERNITY_DAYS", a.maternity)?,
            },
            maternity: MaternityPolicy {
                advance_notice_days: parse_var(
                    "MATERNITY_NOTICE_DAYS",
                    defaults.maternity.advance_notice_days,
                )?,
                min_service_months,
            },
            provident_fund: PfPolicy {
                min_service_years: parse_var(
                    "PF_MIN_SERVICE_YEARS",
                    defaults.provident_fund.min_service_years,
                )?,
                non_refundable_min_age: parse_var(
                    "PF_NON_REFUNDABLE_MIN_AGE",
                    defaults.provident_fund.non_refundable_min_age,
                )?,
                max_balance_ratio: parse_var(
                    "PF_MAX_BALANCE_RATIO",
                    defaults.provident_fund.max_balance_ratio,
                )?,
            },
            office_start,
            late_grace_minutes: parse_var("LATE_GRACE_MINUTES", defaults.late_grace_minutes)?,
            payroll: PayrollSettings {
                house_rent_pct: parse_var("PAYROLL_HOUSE_RENT_PCT", p.house_rent_pct)?,
                medical_pct: parse_var("PAYROLL_MEDICAL_PCT", p.medical_pct)?,
                conveyance_pct: parse_var("PAYROLL_CONVEYANCE_PCT", p.conveyance_pct)?,
                tax_threshold: parse_var("PAYROLL_TAX_THRESHOLD", p.tax_threshold)?,
                tax_rate_pct: parse_var("PAYROLL_TAX_RATE_PCT", p.tax_rate_pct)?,
                late_penalty: parse_var("PAYROLL_LATE_PENALTY", p.late_penalty)?,
                working_days_divisor: parse_var(
                    "PAYROLL_WORKING_DAYS_DIVISOR",
                    p.working_days_divisor,
                )?,
            },
        };

        policy.payroll.validate().map_err(|e| anyhow!(e))?;
        if !(0.0..=1.0).contains(&policy.provident_fund.max_balance_ratio) {
            return Err(anyhow!("PF_MAX_BALANCE_RATIO must be between 0 and 1"));
        }
        Ok(policy)
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_addr: required_var("SERVER_ADDR")?,
            jwt_secret: required_var("JWT_SECRET")?,
            access_token_ttl: parse_var("ACCESS_TOKEN_TTL", 900)?, // default 15 min
            refresh_token_ttl: parse_var("REFRESH_TOKEN_TTL", 604_800)?, // default 7 days

            rate_login_per_min: parse_var("RATE_LOGIN_PER_MIN", 60)?,
            rate_refresh_per_min: parse_var("RATE_REFRESH_PER_MIN", 30)?,
            rate_protected_per_min: parse_var("RATE_PROTECTED_PER_MIN", 1000)?,

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api/v1".to_string()),

            bootstrap_admin_username: env::var("BOOTSTRAP_ADMIN_USERNAME")
                .unwrap_or_else(|_| "admin".to_string()),
            bootstrap_admin_password: env::var("BOOTSTRAP_ADMIN_PASSWORD").ok(),

            policy: Policy::from_env()?,
        })
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Self {
            jwt_secret: "test-secret".to_string(),
            server_addr: "127.0.0.1:0".to_string(),
            access_token_ttl: 900,
            refresh_token_ttl: 3600,
            rate_login_per_min: 1000,
            rate_refresh_per_min: 1000,
            rate_protected_per_min: 10_000,
            api_prefix: "/api/v1".to_string(),
            bootstrap_admin_username: "admin".to_string(),
            bootstrap_admin_password: None,
            policy: Policy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpaid_leave_is_uncapped() {
        let policy = Policy::default();
        assert_eq!(policy.leave_allotments.default_for(LeaveType::Unpaid), None);
        assert_eq!(policy.leave_allotments.default_for(LeaveType::Casual), Some(10.0));
    }

    #[test]
    fn defaults_match_published_rules() {
        let policy = Policy::default();
        assert_eq!(policy.maternity.advance_notice_days, 60);
        assert_eq!(policy.provident_fund.min_service_years, 3);
        assert_eq!(policy.provident_fund.non_refundable_min_age, 50);
        assert_eq!(policy.provident_fund.max_balance_ratio, 0.8);
    }
}
