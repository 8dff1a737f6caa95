use chrono::{DateTime, Utc};

use super::{
    Actor, TransitionError,
    chain::{Decision, decide_single},
    clean_comment,
};
use crate::model::{
    approval::{AuditEntry, RequestStatus},
    attendance::AttendanceCorrection,
    role::Role,
};

/// Audit actor recorded for every override.
pub const OVERRIDE_ACTOR: &str = "HR Override";

pub fn review(
    correction: &mut AttendanceCorrection,
    actor: &Actor,
    decision: Decision,
    comment: Option<String>,
    at: DateTime<Utc>,
) -> Result<RequestStatus, TransitionError> {
    if !matches!(actor.role, Role::Hod | Role::Hr | Role::Admin) {
        return Err(TransitionError::role_not_permitted(actor.role, "review attendance corrections"));
    }
    let status = decide_single(&mut correction.status, &mut correction.audit, actor, decision, comment, at)?;
    correction.reviewed_by = Some(actor.name.clone());
    Ok(status)
}

/// Flips an already resolved correction. The earlier decision stays in the
/// audit trail; the newest entry and `status` carry the override.
pub fn override_decision(
    correction: &mut AttendanceCorrection,
    actor: &Actor,
    new_status: RequestStatus,
    reason: Option<String>,
    at: DateTime<Utc>,
) -> Result<RequestStatus, TransitionError> {
    if !actor.role.is_hr_or_admin() {
        return Err(TransitionError::role_not_permitted(actor.role, "override attendance corrections"));
    }
    let reason = clean_comment(reason).ok_or(TransitionError::OverrideReasonRequired)?;
    let current = correction.status;
    if !current.is_resolved() || !new_status.is_resolved() || new_status == current {
        return Err(TransitionError::NotAllowed {
            from: current.to_string(),
            action: format!("override to {}", new_status),
        });
    }

    correction.status = new_status;
    correction.reviewed_by = Some(actor.name.clone());
    correction.audit.append(AuditEntry::new(
        format!("override: {} -> {} ({})", current, new_status, actor.name),
        OVERRIDE_ACTOR,
        at,
        Some(reason),
    ));
    Ok(new_status)
}
